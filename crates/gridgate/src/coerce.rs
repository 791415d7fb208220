//! Cell value coercion
//!
//! Every cell a test reads arrives as a string. Text is passed through,
//! numbers are rendered the way Java prints a `double` and numbers carrying
//! a date format become short calendar dates.
//!
//! The two read paths render dates differently: reads keyed by header name
//! produce `D/M/YY`, reads keyed by column index produce `M/D/YY`. Existing
//! workbooks depend on each form, so both are kept and callers choose the
//! path (and with it the [`DateOrder`]) knowingly.

use chrono::{Datelike, NaiveDate};
use gridgate_core::date::{is_valid_serial, serial_to_date};
use gridgate_core::{CellKind, CellValue, DateSystem, NumberFormat};

use crate::error::CoercionFailure;

/// Day/month order for rendered dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// `3/5/24` for 3 May 2024 (header-name reads)
    DayMonthYear,
    /// `5/3/24` for 3 May 2024 (column-index reads)
    MonthDayYear,
}

impl DateOrder {
    /// Render a date without zero padding and with a two-digit year
    pub fn render(self, date: NaiveDate) -> String {
        let year = date.year().rem_euclid(100);
        match self {
            DateOrder::DayMonthYear => format!("{}/{}/{:02}", date.day(), date.month(), year),
            DateOrder::MonthDayYear => format!("{}/{}/{:02}", date.month(), date.day(), year),
        }
    }
}

/// Render a number the way it appears in test data
///
/// The form is Java's `Double.toString`, which existing test suites compare
/// against: magnitudes in `[1e-3, 1e7)` are plain decimals that always keep
/// a fractional digit (`42.0`, `2.5`), everything else uses `E` notation
/// with a fractional mantissa (`9.87654321E9`, `1.0E-4`). Digits are the
/// shortest that read back to the same value.
pub fn render_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }

    let magnitude = n.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return with_fraction(n.to_string());
    }

    let scientific = format!("{:e}", n);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    format!("{}E{}", with_fraction(mantissa.to_owned()), exponent)
}

fn with_fraction(digits: String) -> String {
    if digits.contains('.') {
        digits
    } else {
        digits + ".0"
    }
}

/// Render a cell value as a string
///
/// `format` is the cell's number format; a numeric value (or numeric
/// formula result) with a date format and a serial inside the valid date
/// range is rendered as a date in `order`. Formulas without a numeric
/// cached result and error values cannot be rendered.
pub fn coerce(
    value: &CellValue,
    format: &NumberFormat,
    order: DateOrder,
    system: DateSystem,
) -> Result<String, CoercionFailure> {
    match value {
        CellValue::Empty => Ok(String::new()),
        CellValue::String(s) => Ok(s.as_str().to_string()),
        CellValue::Boolean(b) => Ok(b.to_string()),
        CellValue::Number(n) => Ok(render_numeric(*n, format, order, system)),
        CellValue::Formula { cached_value, .. } => match cached_value.as_deref() {
            Some(CellValue::Number(n)) => Ok(render_numeric(*n, format, order, system)),
            Some(other) => Err(CoercionFailure::NonNumericFormula(other.kind())),
            None => Err(CoercionFailure::UncachedFormula),
        },
        CellValue::Error(e) => Err(CoercionFailure::ErrorValue(*e)),
    }
}

fn render_numeric(n: f64, format: &NumberFormat, order: DateOrder, system: DateSystem) -> String {
    if format.is_date_format() && is_valid_serial(n) {
        if let Some(date) = serial_to_date(n, system) {
            return order.render(date);
        }
    }
    render_number(n)
}

/// Turn a coerced string back into a cell value of the given kind
///
/// This inverts [`coerce`] for text, numeric, boolean and blank cells
/// without a date format: `coerce(parse_back(s, kind))` gives back `s`.
/// Returns `None` when `text` cannot be a rendering of that kind, and for
/// formula and error kinds, which have no inverse.
pub fn parse_back(text: &str, kind: CellKind) -> Option<CellValue> {
    match kind {
        CellKind::Text => Some(CellValue::string(text)),
        CellKind::Blank => text.is_empty().then_some(CellValue::Empty),
        CellKind::Boolean => match text {
            "true" => Some(CellValue::Boolean(true)),
            "false" => Some(CellValue::Boolean(false)),
            _ => None,
        },
        CellKind::Numeric => text.parse::<f64>().ok().map(CellValue::Number),
        CellKind::Formula | CellKind::Error => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridgate_core::CellError;

    fn plain(value: &CellValue) -> Result<String, CoercionFailure> {
        coerce(
            value,
            &NumberFormat::General,
            DateOrder::MonthDayYear,
            DateSystem::Excel1900,
        )
    }

    fn dated(value: &CellValue, order: DateOrder) -> Result<String, CoercionFailure> {
        coerce(
            value,
            &NumberFormat::date_short(),
            order,
            DateSystem::Excel1900,
        )
    }

    #[test]
    fn test_text_verbatim() {
        assert_eq!(plain(&CellValue::string(" admin ")).unwrap(), " admin ");
        assert_eq!(plain(&CellValue::string("")).unwrap(), "");
    }

    #[test]
    fn test_boolean_and_blank() {
        assert_eq!(plain(&CellValue::Boolean(true)).unwrap(), "true");
        assert_eq!(plain(&CellValue::Boolean(false)).unwrap(), "false");
        assert_eq!(plain(&CellValue::Empty).unwrap(), "");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(plain(&CellValue::Number(42.0)).unwrap(), "42.0");
        assert_eq!(plain(&CellValue::Number(-7.0)).unwrap(), "-7.0");
        assert_eq!(plain(&CellValue::Number(3.5)).unwrap(), "3.5");
        assert_eq!(plain(&CellValue::Number(0.1)).unwrap(), "0.1");
        assert_eq!(plain(&CellValue::Number(1234567.0)).unwrap(), "1234567.0");
        assert_eq!(plain(&CellValue::Number(0.001)).unwrap(), "0.001");
        assert_eq!(render_number(0.0), "0.0");
        assert_eq!(render_number(-0.0), "-0.0");
    }

    #[test]
    fn test_large_and_small_numbers_use_e_notation() {
        assert_eq!(plain(&CellValue::Number(9876543210.0)).unwrap(), "9.87654321E9");
        assert_eq!(render_number(1e7), "1.0E7");
        assert_eq!(render_number(-12345678.0), "-1.2345678E7");
        assert_eq!(render_number(1e20), "1.0E20");
        assert_eq!(render_number(0.0001), "1.0E-4");
        assert_eq!(render_number(0.00025), "2.5E-4");
        assert_eq!(render_number(f64::INFINITY), "Infinity");
        assert_eq!(render_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_formula_numeric_result() {
        let value = CellValue::formula("=1+1", Some(CellValue::Number(2.0)));
        assert_eq!(plain(&value).unwrap(), "2.0");
    }

    #[test]
    fn test_formula_without_numeric_result() {
        let text = CellValue::formula("=\"a\"", Some(CellValue::string("a")));
        assert_eq!(
            plain(&text),
            Err(CoercionFailure::NonNumericFormula(CellKind::Text))
        );

        let uncached = CellValue::formula("=NOW()", None);
        assert_eq!(plain(&uncached), Err(CoercionFailure::UncachedFormula));
    }

    #[test]
    fn test_error_cell() {
        assert_eq!(
            plain(&CellValue::Error(CellError::Div0)),
            Err(CoercionFailure::ErrorValue(CellError::Div0))
        );
    }

    #[test]
    fn test_date_orders_differ() {
        // 2024-05-03
        let value = CellValue::Number(45415.0);
        assert_eq!(dated(&value, DateOrder::MonthDayYear).unwrap(), "5/3/24");
        assert_eq!(dated(&value, DateOrder::DayMonthYear).unwrap(), "3/5/24");
    }

    #[test]
    fn test_serial_60_renders_as_march_first() {
        // 1900-02-29 does not exist; serials 60 and 61 share 1900-03-01
        let value = CellValue::Number(60.0);
        assert_eq!(dated(&value, DateOrder::MonthDayYear).unwrap(), "3/1/00");
        assert_eq!(dated(&CellValue::Number(59.0), DateOrder::MonthDayYear).unwrap(), "2/28/00");
    }

    #[test]
    fn test_date_time_fraction_ignored() {
        // 2024-12-25 18:00
        let value = CellValue::Number(45651.75);
        assert_eq!(dated(&value, DateOrder::DayMonthYear).unwrap(), "25/12/24");
    }

    #[test]
    fn test_date_two_digit_year_keeps_leading_zero() {
        // 2005-01-09
        let value = CellValue::Number(38361.0);
        assert_eq!(dated(&value, DateOrder::MonthDayYear).unwrap(), "1/9/05");
    }

    #[test]
    fn test_formula_date_result() {
        let value = CellValue::formula("=DATE(2024,5,3)", Some(CellValue::Number(45415.0)));
        assert_eq!(dated(&value, DateOrder::MonthDayYear).unwrap(), "5/3/24");
    }

    #[test]
    fn test_negative_serial_with_date_format_is_a_number() {
        let value = CellValue::Number(-3.0);
        assert_eq!(dated(&value, DateOrder::MonthDayYear).unwrap(), "-3.0");
    }

    #[test]
    fn test_1904_date_system() {
        let value = CellValue::Number(43953.0);
        let rendered = coerce(
            &value,
            &NumberFormat::date_short(),
            DateOrder::MonthDayYear,
            DateSystem::Excel1904,
        )
        .unwrap();
        assert_eq!(rendered, "5/3/24");
    }

    #[test]
    fn test_custom_date_format() {
        let value = CellValue::Number(45415.0);
        let rendered = coerce(
            &value,
            &NumberFormat::from_string("dd/mm/yyyy"),
            DateOrder::DayMonthYear,
            DateSystem::Excel1900,
        )
        .unwrap();
        assert_eq!(rendered, "3/5/24");
    }

    #[test]
    fn test_parse_back_round_trip() {
        let values = [
            CellValue::string("admin123"),
            CellValue::string("  spaced  "),
            CellValue::Boolean(true),
            CellValue::Boolean(false),
            CellValue::Number(42.0),
            CellValue::Number(-0.25),
            CellValue::Number(1.0 / 3.0),
            CellValue::Number(123456789012.0),
            CellValue::Empty,
        ];

        for value in values {
            let text = plain(&value).unwrap();
            let back = parse_back(&text, value.kind()).unwrap();
            assert_eq!(back, value, "round trip of {:?}", text);
            assert_eq!(plain(&back).unwrap(), text);
        }
    }

    #[test]
    fn test_parse_back_rejects_mismatched_text() {
        assert_eq!(parse_back("yes", CellKind::Boolean), None);
        assert_eq!(parse_back("abc", CellKind::Numeric), None);
        assert_eq!(parse_back("x", CellKind::Blank), None);
        assert_eq!(parse_back("1", CellKind::Formula), None);
    }
}
