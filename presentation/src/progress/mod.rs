//! Progress reporting

mod reporter;

pub use reporter::ConsoleProgress;
