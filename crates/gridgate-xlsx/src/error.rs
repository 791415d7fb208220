//! Errors of the xlsx reader and writer

use thiserror::Error;

pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Failure to read or write an xlsx package
#[derive(Debug, Error)]
pub enum XlsxError {
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),

    /// Not a zip archive, or a damaged one
    #[error("zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The archive is not a spreadsheet package
    #[error("not an xlsx package: {0}")]
    InvalidFormat(String),

    /// A part referenced by the package is absent
    #[error("missing part {0}")]
    MissingPart(String),

    /// A cell reference, shared string index or style index is unusable
    #[error("unreadable cell data: {0}")]
    Parse(String),

    /// The package describes a workbook the model rejects (bad sheet names,
    /// out-of-range cells)
    #[error("invalid workbook content: {0}")]
    Core(#[from] gridgate_core::Error),
}
