mod collector;

pub use collector::{run, Collector, RunResult};
