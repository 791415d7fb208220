//! A1 references

use std::fmt;

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// 0-based location of a cell
///
/// Documents write rows from 1 and columns as letters (`A`..`XFD`); the
/// translation lives in [`CellAddress::parse`] and
/// [`CellAddress::to_a1_string`] only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub row: u32,
    pub col: u16,
}

impl CellAddress {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse `B7`, `$B$7`, `b7`
    ///
    /// ```
    /// use gridgate_core::CellAddress;
    ///
    /// let at = CellAddress::parse("$AB$12").unwrap();
    /// assert_eq!((at.row, at.col), (11, 27));
    /// ```
    pub fn parse(reference: &str) -> Result<Self> {
        let invalid = |why: &str| Error::InvalidAddress(format!("{} in '{}'", why, reference));

        let unmarked = reference.trim().replacen('$', "", 2);
        let split = unmarked
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(unmarked.len());
        let (letters, digits) = unmarked.split_at(split);

        if letters.is_empty() {
            return Err(invalid("no column letters"));
        }
        if digits.is_empty() {
            return Err(invalid("no row number"));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("invalid row number"));
        }

        let col = Self::letters_to_column(letters)?;
        let row = match digits.parse::<u32>() {
            Ok(0) => return Err(invalid("row numbers start at 1")),
            Ok(n) => n - 1,
            Err(_) => return Err(Error::RowOutOfBounds(u32::MAX, MAX_ROWS - 1)),
        };
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }

        Ok(Self { row, col })
    }

    /// `0 -> A`, `25 -> Z`, `26 -> AA`
    pub fn column_to_letters(col: u16) -> String {
        let mut letters = Vec::with_capacity(3);
        let mut rest = u32::from(col) + 1;
        while rest > 0 {
            let digit = (rest - 1) % 26;
            letters.push(b'A' + digit as u8);
            rest = (rest - 1) / 26;
        }
        letters.iter().rev().map(|&b| char::from(b)).collect()
    }

    /// Inverse of [`CellAddress::column_to_letters`], case-insensitive
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let number = letters.bytes().try_fold(0u32, |acc, b| {
            if !b.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    char::from(b)
                )));
            }
            let acc = acc * 26 + u32::from(b.to_ascii_uppercase() - b'A') + 1;
            if acc > u32::from(MAX_COLS) {
                return Err(Error::ColumnOutOfBounds(u16::MAX, MAX_COLS - 1));
            }
            Ok(acc)
        })?;

        Ok((number - 1) as u16)
    }

    pub fn to_a1_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::column_to_letters(self.col), self.row + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(CellAddress::parse("C7").unwrap(), CellAddress::new(6, 2));
        assert_eq!(CellAddress::parse(" aa3 ").unwrap(), CellAddress::new(2, 26));
        assert_eq!(
            CellAddress::parse("$B$2").unwrap(),
            CellAddress::parse("B2").unwrap()
        );
    }

    #[test]
    fn test_parse_rejects() {
        for bad in ["", "12", "A", "A0", "A1B", "A-1", "XFE1", "A1048577", "A99999999999"] {
            assert!(CellAddress::parse(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(CellAddress::column_to_letters(0), "A");
        assert_eq!(CellAddress::column_to_letters(25), "Z");
        assert_eq!(CellAddress::column_to_letters(26), "AA");
        assert_eq!(CellAddress::column_to_letters(16383), "XFD");
        assert_eq!(CellAddress::letters_to_column("xfd").unwrap(), 16383);
        assert!(CellAddress::letters_to_column("A1").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(CellAddress::new(0, 0).to_a1_string(), "A1");
        assert_eq!(CellAddress::new(41, 3).to_string(), "D42");
    }
}
