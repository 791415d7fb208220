//! Cell values as read from a workbook

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Content of one cell
///
/// Dates have no variant of their own: they are numbers whose cell carries a
/// date number format.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Boolean(bool),
    Number(f64),
    String(SharedString),
    Error(CellError),
    /// Formula text plus the result the saving application cached, if any.
    /// Formulas are never evaluated here.
    Formula {
        text: String,
        cached_value: Option<Box<CellValue>>,
    },
}

/// Type tag of a cell, independent of its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Text,
    Numeric,
    Boolean,
    Blank,
    /// Whatever its cached result
    Formula,
    Error,
}

impl CellKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellKind::Text => "text",
            CellKind::Numeric => "numeric",
            CellKind::Boolean => "boolean",
            CellKind::Blank => "blank",
            CellKind::Formula => "formula",
            CellKind::Error => "error",
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CellValue {
    pub fn string(text: impl Into<String>) -> Self {
        CellValue::String(SharedString::from(text.into()))
    }

    /// Formula cell; `text` is kept as given
    pub fn formula(text: impl Into<String>, cached: Option<CellValue>) -> Self {
        CellValue::Formula {
            text: text.into(),
            cached_value: cached.map(Box::new),
        }
    }

    pub fn kind(&self) -> CellKind {
        match self {
            CellValue::Empty => CellKind::Blank,
            CellValue::Boolean(_) => CellKind::Boolean,
            CellValue::Number(_) => CellKind::Numeric,
            CellValue::String(_) => CellKind::Text,
            CellValue::Error(_) => CellKind::Error,
            CellValue::Formula { .. } => CellKind::Formula,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn is_formula(&self) -> bool {
        self.kind() == CellKind::Formula
    }

    /// The numeric value, looking through a formula to its cached result
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Formula { .. } => self.cached_value().and_then(CellValue::as_number),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let CellValue::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// The text of a string cell (formulas are not looked through)
    pub fn as_string(&self) -> Option<&str> {
        if let CellValue::String(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    pub fn formula_text(&self) -> Option<&str> {
        if let CellValue::Formula { text, .. } = self {
            Some(text)
        } else {
            None
        }
    }

    pub fn cached_value(&self) -> Option<&CellValue> {
        if let CellValue::Formula { cached_value, .. } = self {
            cached_value.as_deref()
        } else {
            None
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::string(s)
    }
}

/// Error literal stored in a cell (`#N/A`, `#REF!`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    Null,
    Div0,
    Value,
    Ref,
    Name,
    Num,
    Na,
    GettingData,
    Spill,
    Calc,
}

impl CellError {
    const ALL: [CellError; 10] = [
        CellError::Null,
        CellError::Div0,
        CellError::Value,
        CellError::Ref,
        CellError::Name,
        CellError::Num,
        CellError::Na,
        CellError::GettingData,
        CellError::Spill,
        CellError::Calc,
    ];

    /// The literal as it appears in a cell
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Null => "#NULL!",
            CellError::Div0 => "#DIV/0!",
            CellError::Value => "#VALUE!",
            CellError::Ref => "#REF!",
            CellError::Name => "#NAME?",
            CellError::Num => "#NUM!",
            CellError::Na => "#N/A",
            CellError::GettingData => "#GETTING_DATA",
            CellError::Spill => "#SPILL!",
            CellError::Calc => "#CALC!",
        }
    }

    /// Parse a literal, ignoring ASCII case
    pub fn parse(literal: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(literal))
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference-counted immutable text
///
/// Test data repeats the same few strings ("Y", "N", a shared password) on
/// every row; cells holding equal text can share one allocation.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SharedString(Arc<str>);

impl SharedString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SharedString {
    fn from(s: &str) -> Self {
        SharedString(Arc::from(s))
    }
}

impl From<String> for SharedString {
    fn from(s: String) -> Self {
        SharedString(Arc::from(s))
    }
}

/// Interning table handing out one [`SharedString`] per distinct text
#[derive(Debug, Default)]
pub struct StringPool {
    strings: HashSet<Arc<str>>,
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: &str) -> SharedString {
        if let Some(existing) = self.strings.get(text) {
            return SharedString(Arc::clone(existing));
        }
        let arc: Arc<str> = Arc::from(text);
        self.strings.insert(Arc::clone(&arc));
        SharedString(arc)
    }

    /// Number of distinct strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(CellValue::from(3.5), CellValue::Number(3.5));
        assert_eq!(CellValue::from(true).as_bool(), Some(true));
        assert_eq!(CellValue::from("admin").as_string(), Some("admin"));
        assert_eq!(CellValue::from(String::from("Y")), CellValue::string("Y"));
    }

    #[test]
    fn test_kind() {
        assert_eq!(CellValue::Empty.kind(), CellKind::Blank);
        assert_eq!(CellValue::from("x").kind(), CellKind::Text);
        assert_eq!(CellValue::from(1.0).kind(), CellKind::Numeric);
        assert_eq!(CellValue::from(false).kind(), CellKind::Boolean);
        assert_eq!(CellValue::Error(CellError::Na).kind(), CellKind::Error);
        assert_eq!(
            CellValue::formula("=1+1", Some(CellValue::Number(2.0))).kind(),
            CellKind::Formula
        );
        assert_eq!(CellKind::Numeric.to_string(), "numeric");
    }

    #[test]
    fn test_formula_cached_number() {
        let f = CellValue::formula("=A1*2", Some(CellValue::Number(8.0)));
        assert_eq!(f.as_number(), Some(8.0));
        assert_eq!(f.formula_text(), Some("=A1*2"));
        assert!(f.is_formula());

        let text_result = CellValue::formula("=A1", Some(CellValue::string("x")));
        assert_eq!(text_result.as_number(), None);
        assert_eq!(text_result.as_string(), None);

        let uncached = CellValue::formula("=A1", None);
        assert_eq!(uncached.as_number(), None);
        assert!(uncached.cached_value().is_none());
    }

    #[test]
    fn test_cell_error_literals() {
        assert_eq!(CellError::parse("#DIV/0!"), Some(CellError::Div0));
        assert_eq!(CellError::parse("#n/a"), Some(CellError::Na));
        assert_eq!(CellError::parse("#spill!"), Some(CellError::Spill));
        assert_eq!(CellError::parse("N/A"), None);
        assert_eq!(CellError::Value.to_string(), "#VALUE!");
    }

    #[test]
    fn test_string_pool_shares_allocations() {
        let mut pool = StringPool::new();

        let y1 = pool.intern("Y");
        let y2 = pool.intern("Y");
        let n = pool.intern("N");

        assert!(Arc::ptr_eq(&y1.0, &y2.0));
        assert!(!Arc::ptr_eq(&y1.0, &n.0));
        assert_eq!(pool.len(), 2);
        assert_eq!(format!("{:?}", y1), "\"Y\"");
    }
}
