pub mod html;

pub use html::{count_subresources, looks_like_html};
