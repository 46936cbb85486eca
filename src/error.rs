//! CLI Error Types

use derive_more::{Display, Error};

/// A CLI error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not open the Calibre library")]
    Library,
    #[display("could not query the Calibre catalogue")]
    Catalogue,
    #[display("could not read the document")]
    Document,
    #[display("could not write output")]
    Output,
}
