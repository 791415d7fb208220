//! Cell number formats
//!
//! Test data only needs the part of cell styling that changes how a value
//! reads: the number format. A date is stored as a plain number and is only
//! recognisable through its format.
//!
//! - [`NumberFormat`] - A built-in or custom number format
//! - [`FormatPool`] - Deduplicated formats referenced by cells

mod number_format;
mod pool;

pub use number_format::NumberFormat;
pub use pool::FormatPool;
