//! Movie runtime value and its wire codec.
//!
//! In memory a runtime is a bare signed count of minutes. The unit only
//! exists on the wire, where the value travels as the JSON string
//! `"<minutes> mins"`. Storage keeps the plain integer.
//!
//! # Invariants
//! - `Runtime::decode(&r.encode()) == Ok(r)` for every `i32`.
//! - Decoding is all-or-nothing: any deviation from the exact shape
//!   yields `RuntimeFormatError`.

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const UNIT_SUFFIX: &str = "mins";

/// Duration of a movie in whole minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Runtime(pub i32);

/// The text is not a quoted `"<minutes> mins"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeFormatError;

impl Display for RuntimeFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid runtime format")
    }
}

impl Error for RuntimeFormatError {}

impl Runtime {
    pub fn minutes(self) -> i32 {
        self.0
    }

    /// Produces the quoted wire text, e.g. `"102 mins"` including quotes.
    pub fn encode(self) -> String {
        // A JSON string of digits, a space and ASCII letters needs no escaping.
        format!("\"{self}\"")
    }

    /// Parses quoted wire text produced by [`Runtime::encode`].
    ///
    /// The first and last bytes must be the quotes themselves; nothing may
    /// surround them. Inside, escapes follow JSON string rules, so forms
    /// such as `"\u0031 mins"` are accepted after unquoting.
    pub fn decode(text: &str) -> Result<Self, RuntimeFormatError> {
        if text.len() < 2 || !text.starts_with('"') || !text.ends_with('"') {
            return Err(RuntimeFormatError);
        }

        let mut de = serde_json::Deserializer::from_str(text);
        let unquoted = String::deserialize(&mut de).map_err(|_| RuntimeFormatError)?;
        de.end().map_err(|_| RuntimeFormatError)?;
        unquoted.parse()
    }
}

impl Display for Runtime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {UNIT_SUFFIX}", self.0)
    }
}

/// Parses the unquoted form, e.g. `102 mins`.
impl FromStr for Runtime {
    type Err = RuntimeFormatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.split(' ');
        let (Some(number), Some(UNIT_SUFFIX), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(RuntimeFormatError);
        };

        number
            .parse::<i32>()
            .map(Runtime)
            .map_err(|_| RuntimeFormatError)
    }
}

impl From<i32> for Runtime {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(RuntimeVisitor)
    }
}

struct RuntimeVisitor;

impl Visitor<'_> for RuntimeVisitor {
    type Value = Runtime;

    fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("a string of the form \"<minutes> mins\"")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        value.parse().map_err(E::custom)
    }
}

impl ToSql for Runtime {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Runtime {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i32::column_result(value).map(Runtime)
    }
}

#[cfg(test)]
mod tests {
    use super::{Runtime, RuntimeFormatError};

    #[test]
    fn encode_quotes_minutes_with_suffix() {
        assert_eq!(Runtime(102).encode(), "\"102 mins\"");
        assert_eq!(Runtime(-5).encode(), "\"-5 mins\"");
    }

    #[test]
    fn decode_accepts_canonical_form() {
        assert_eq!(Runtime::decode("\"102 mins\""), Ok(Runtime(102)));
        assert_eq!(Runtime::decode("\"0 mins\""), Ok(Runtime(0)));
        assert_eq!(Runtime::decode("\"\\u0031 mins\""), Ok(Runtime(1)));
    }

    #[test]
    fn decode_round_trips_type_extremes() {
        for minutes in [i32::MIN, -1, 0, 1, i32::MAX] {
            let runtime = Runtime(minutes);
            assert_eq!(Runtime::decode(&runtime.encode()), Ok(runtime));
        }
    }

    #[test]
    fn decode_rejects_malformed_text() {
        let cases = [
            "\"90 minutes\"",
            "\"abc mins\"",
            "\"120\"",
            "",
            "120 mins",
            "\"120  mins\"",
            "\" 120 mins\"",
            "\"120 mins \"",
            "\"2147483648 mins\"",
            "\"12x mins\"",
            "\"120 mins",
            " \"120 mins\"",
            "\"120 mins\"\n",
            "\"",
            "\"120\" \"mins\"",
        ];
        for text in cases {
            assert_eq!(Runtime::decode(text), Err(RuntimeFormatError), "input: {text:?}");
        }
    }

    #[test]
    fn from_str_parses_unquoted_form() {
        assert_eq!("45 mins".parse::<Runtime>(), Ok(Runtime(45)));
        assert!("45".parse::<Runtime>().is_err());
    }
}
