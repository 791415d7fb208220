//! Number formats and date detection

/// How a cell's number is meant to be shown
///
/// Only the distinction between dates and everything else matters to the
/// engine, so built-in formats are kept as bare ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    #[default]
    General,
    /// Built-in format id (1..=163)
    BuiltIn(u32),
    /// Format code from a `numFmt` element
    Custom(String),
}

impl NumberFormat {
    pub const ID_GENERAL: u32 = 0;
    /// `mm-dd-yy`
    pub const ID_DATE_SHORT: u32 = 14;
    /// Ids below this are built in
    pub const FIRST_CUSTOM_ID: u32 = 164;

    pub fn from_string(code: impl Into<String>) -> Self {
        NumberFormat::Custom(code.into())
    }

    /// Built-in format by id; id 0 is General
    pub fn from_id(id: u32) -> Self {
        match id {
            Self::ID_GENERAL => NumberFormat::General,
            id => NumberFormat::BuiltIn(id),
        }
    }

    pub fn date_short() -> Self {
        NumberFormat::BuiltIn(Self::ID_DATE_SHORT)
    }

    /// Whether a number in this format is a date or time
    ///
    /// Built-in ids 14-22 and 45-47 are dates. A custom code is a date when,
    /// after dropping quoted literals, escaped characters and bracketed
    /// modifiers (colors, conditions, locales), its first section has a
    /// y/m/d/h/s token and no digit placeholder outside a fractional-seconds
    /// suffix. Elapsed-time brackets such as `[h]` count as date tokens.
    pub fn is_date_format(&self) -> bool {
        match self {
            NumberFormat::General => false,
            NumberFormat::BuiltIn(id) => matches!(id, 14..=22 | 45..=47),
            NumberFormat::Custom(code) => is_date_pattern(code),
        }
    }
}

fn is_date_pattern(format: &str) -> bool {
    let section = first_section(format);
    let mut saw_date_token = false;
    let mut saw_seconds = false;
    let mut chars = section.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                }
            }
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                let mut inner = String::new();
                for b in chars.by_ref() {
                    if b == ']' {
                        break;
                    }
                    inner.push(b);
                }
                let lower = inner.to_ascii_lowercase();
                if !lower.is_empty() && lower.chars().all(|x| matches!(x, 'h' | 'm' | 's')) {
                    saw_date_token = true;
                }
            }
            'y' | 'Y' | 'm' | 'M' | 'd' | 'D' | 'h' | 'H' => saw_date_token = true,
            's' | 'S' => {
                saw_date_token = true;
                saw_seconds = true;
            }
            '0' | '#' | '?' => {
                // ss.0 / ss.00 fractional seconds are allowed
                if !saw_seconds {
                    return false;
                }
            }
            _ => {}
        }
    }

    saw_date_token
}

/// The first `;`-separated section, ignoring separators inside quotes
fn first_section(format: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in format.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => return &format[..i],
            _ => {}
        }
    }
    format
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_dates() {
        assert!(NumberFormat::date_short().is_date_format());
        assert!(NumberFormat::from_id(22).is_date_format());
        assert!(NumberFormat::from_id(46).is_date_format());
        assert!(!NumberFormat::from_id(2).is_date_format());
        assert!(!NumberFormat::from_id(49).is_date_format());
        assert!(!NumberFormat::General.is_date_format());
    }

    #[test]
    fn test_from_id_general() {
        assert_eq!(NumberFormat::from_id(0), NumberFormat::General);
        assert_eq!(NumberFormat::from_id(14), NumberFormat::date_short());
    }

    #[test]
    fn test_custom_dates() {
        assert!(NumberFormat::from_string("d/m/yyyy").is_date_format());
        assert!(NumberFormat::from_string("yyyy-mm-dd").is_date_format());
        assert!(NumberFormat::from_string("dd\"/\"mm\"/\"yyyy").is_date_format());
        assert!(NumberFormat::from_string("[$-409]mmmm d, yyyy;@").is_date_format());
        assert!(NumberFormat::from_string("[h]:mm").is_date_format());
        assert!(NumberFormat::from_string("mm:ss.00").is_date_format());
    }

    #[test]
    fn test_custom_non_dates() {
        assert!(!NumberFormat::from_string("0.00").is_date_format());
        assert!(!NumberFormat::from_string("#,##0").is_date_format());
        assert!(!NumberFormat::from_string("@").is_date_format());
        assert!(!NumberFormat::from_string("[Red]0.00").is_date_format());
        assert!(!NumberFormat::from_string("0\" days\"").is_date_format());
        assert!(!NumberFormat::from_string("General").is_date_format());
    }
}
