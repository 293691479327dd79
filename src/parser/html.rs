use log::trace;
use scraper::{Html, Selector};

const SUBRESOURCE_SELECTOR: &str = concat!(
    "script[src], link[rel~=stylesheet][href], link[rel~=preload][href], ",
    "img[src], iframe[src], video[src], audio[src], source[src], embed[src]",
);

/// Counts the sub-resources an HTML document references and a browser would
/// have to fetch on top of the document itself.
pub fn count_subresources(body: &str) -> Option<u64> {
    let selector = Selector::parse(SUBRESOURCE_SELECTOR).ok()?;
    let document = Html::parse_document(body);

    let count = document.select(&selector).count() as u64;
    trace!("Counted {} sub-resources", count);
    Some(count)
}

/// Decides whether a body should be handed to [`count_subresources`].
pub fn looks_like_html(content_type: Option<&str>, body: &str) -> bool {
    match content_type {
        Some(content_type) => {
            content_type.contains("text/html") || content_type.contains("xhtml")
        }
        None => {
            let start = body.trim_start();
            start.starts_with("<!DOCTYPE")
                || start.starts_with("<!doctype")
                || start.starts_with("<html")
        }
    }
}
