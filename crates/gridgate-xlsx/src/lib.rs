//! # gridgate-xlsx
//!
//! XLSX (Office Open XML) reader and writer for gridgate.
//!
//! The reader keeps what test data needs: cell values, cached formula
//! results, number formats (so dates can be told apart from numbers), row
//! presence and the workbook's date system. The writer produces the same
//! subset and is used to create fixtures and starter workbooks.

pub mod error;
pub mod reader;
pub mod writer;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
