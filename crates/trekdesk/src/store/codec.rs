//! Pipe-delimited line format.
//!
//! Every data file holds one record per line with positional fields joined
//! by `|`. There is no header and no escaping, so values containing the
//! delimiter or a line break are refused at encode time.

use std::str::FromStr;

use crate::error::{Error, Result};

/// Field separator.
pub const DELIMITER: char = '|';

/// A type persisted as one line of a data file.
pub trait Record: Sized {
    /// File name inside the data directory.
    const FILE_NAME: &'static str;

    /// Positional field names, used for error messages.
    const FIELD_NAMES: &'static [&'static str];

    /// Fields a line must carry to be decoded; trailing fields past this
    /// count are optional.
    const MIN_FIELDS: usize;

    /// The record's identifier (always the first field).
    fn id(&self) -> &str;

    /// Encode into positional field values.
    fn to_fields(&self) -> Vec<String>;

    /// Decode from positional field values.
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be parsed.
    fn from_fields(fields: &Fields<'_>) -> Result<Self>;
}

/// Split a line into fields, keeping empty ones.
#[must_use]
pub fn split_line(line: &str) -> Vec<&str> {
    line.split(DELIMITER).collect()
}

/// Id field of a raw line.
#[must_use]
pub fn line_id(line: &str) -> &str {
    line.split(DELIMITER).next().unwrap_or_default()
}

/// Encode a record as a single line (without the trailing newline).
///
/// # Errors
///
/// Returns [`Error::InvalidField`] if a value contains the delimiter or a
/// line break.
pub fn encode<R: Record>(record: &R) -> Result<String> {
    let values = record.to_fields();
    for (index, value) in values.iter().enumerate() {
        if value.contains([DELIMITER, '\n', '\r']) {
            let field = R::FIELD_NAMES
                .get(index)
                .map_or_else(|| format!("#{index}"), |name| (*name).to_string());
            return Err(Error::InvalidField { field });
        }
    }
    Ok(values.join("|"))
}

/// Decode a line into a record.
///
/// # Errors
///
/// Returns [`Error::CorruptRecord`] if the line is too short or a field
/// cannot be parsed.
pub fn decode<R: Record>(line: &str) -> Result<R> {
    let parts = split_line(line);
    if parts.len() < R::MIN_FIELDS {
        return Err(Error::corrupt(
            R::FILE_NAME,
            format!(
                "expected at least {} fields, found {}",
                R::MIN_FIELDS,
                parts.len()
            ),
        ));
    }
    R::from_fields(&Fields {
        file: R::FILE_NAME,
        names: R::FIELD_NAMES,
        parts,
    })
}

/// Positional accessor over the fields of one line.
#[derive(Debug)]
pub struct Fields<'a> {
    file: &'static str,
    names: &'static [&'static str],
    parts: Vec<&'a str>,
}

impl Fields<'_> {
    fn name(&self, index: usize) -> &'static str {
        self.names.get(index).copied().unwrap_or("?")
    }

    /// Raw text of a field; missing trailing fields read as empty.
    #[must_use]
    pub fn text(&self, index: usize) -> String {
        self.parts.get(index).copied().unwrap_or_default().to_string()
    }

    /// Text of a field, `None` when missing or empty.
    #[must_use]
    pub fn optional(&self, index: usize) -> Option<String> {
        self.parts
            .get(index)
            .filter(|value| !value.is_empty())
            .map(|value| (*value).to_string())
    }

    /// Parse a required field.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is missing or fails to parse.
    pub fn parse<T: FromStr>(&self, index: usize) -> Result<T> {
        let raw = self.parts.get(index).copied().unwrap_or_default();
        raw.trim().parse().map_err(|_| {
            Error::corrupt(
                self.file,
                format!("field '{}' has invalid value '{raw}'", self.name(index)),
            )
        })
    }

    /// Parse an optional field, falling back to `default` when missing or empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is present but fails to parse.
    pub fn parse_or<T: FromStr>(&self, index: usize, default: T) -> Result<T> {
        match self.parts.get(index) {
            Some(raw) if !raw.is_empty() => self.parse(index),
            _ => Ok(default),
        }
    }

    /// Boolean field: only `true` (any case) is true.
    #[must_use]
    pub fn flag(&self, index: usize) -> bool {
        self.parts
            .get(index)
            .is_some_and(|raw| raw.trim().eq_ignore_ascii_case("true"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Pair {
        id: String,
        label: String,
        count: u32,
        on: bool,
    }

    impl Record for Pair {
        const FILE_NAME: &'static str = "pairs.txt";
        const FIELD_NAMES: &'static [&'static str] = &["id", "label", "count", "on"];
        const MIN_FIELDS: usize = 3;

        fn id(&self) -> &str {
            &self.id
        }

        fn to_fields(&self) -> Vec<String> {
            vec![
                self.id.clone(),
                self.label.clone(),
                self.count.to_string(),
                self.on.to_string(),
            ]
        }

        fn from_fields(fields: &Fields<'_>) -> Result<Self> {
            Ok(Self {
                id: fields.text(0),
                label: fields.text(1),
                count: fields.parse(2)?,
                on: fields.flag(3),
            })
        }
    }

    #[test]
    fn test_split_keeps_empty_fields() {
        assert_eq!(split_line("a||c|"), vec!["a", "", "c", ""]);
    }

    #[test]
    fn test_line_id() {
        assert_eq!(line_id("abc|def"), "abc");
        assert_eq!(line_id(""), "");
    }

    #[test]
    fn test_encode_joins_fields() {
        let pair = Pair {
            id: "1".to_string(),
            label: "Poon Hill".to_string(),
            count: 5,
            on: true,
        };
        assert_eq!(encode(&pair).unwrap(), "1|Poon Hill|5|true");
    }

    #[test]
    fn test_encode_rejects_delimiter() {
        let pair = Pair {
            id: "1".to_string(),
            label: "a|b".to_string(),
            count: 0,
            on: false,
        };
        let err = encode(&pair).unwrap_err();
        assert!(matches!(err, Error::InvalidField { ref field } if field == "label"));
    }

    #[test]
    fn test_encode_rejects_newline() {
        let pair = Pair {
            id: "1".to_string(),
            label: "line\nbreak".to_string(),
            count: 0,
            on: false,
        };
        assert!(encode(&pair).is_err());
    }

    #[test]
    fn test_decode_missing_optional_trailing_field() {
        let pair: Pair = decode("7|Langtang|3").unwrap();
        assert_eq!(pair.count, 3);
        assert!(!pair.on);
    }

    #[test]
    fn test_decode_too_short() {
        let err = decode::<Pair>("7|Langtang").unwrap_err();
        assert!(err.to_string().contains("at least 3 fields"));
    }

    #[test]
    fn test_decode_bad_number_names_field() {
        let err = decode::<Pair>("7|Langtang|many").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("count"));
        assert!(msg.contains("many"));
    }

    #[test]
    fn test_flag_is_case_insensitive() {
        let pair: Pair = decode("1|x|0|TRUE").unwrap();
        assert!(pair.on);
        let pair: Pair = decode("1|x|0|yes").unwrap();
        assert!(!pair.on);
    }

    #[test]
    fn test_parse_or_default() {
        let fields = Fields {
            file: "t",
            names: &["a", "b"],
            parts: vec!["1", ""],
        };
        assert_eq!(fields.parse_or(1, 9_u32).unwrap(), 9);
        assert_eq!(fields.parse_or(5, 4_u32).unwrap(), 4);
        assert_eq!(fields.parse_or(0, 4_u32).unwrap(), 1);
    }

    #[test]
    fn test_optional_field() {
        let fields = Fields {
            file: "t",
            names: &["a", "b"],
            parts: vec!["x", ""],
        };
        assert_eq!(fields.optional(0), Some("x".to_string()));
        assert_eq!(fields.optional(1), None);
        assert_eq!(fields.optional(2), None);
    }
}
