//! Encoding and decoding between [`StoredValue`] and the `kind`/`value`
//! text columns.
//!
//! Dates are stored as `YYYY-MM-DD`; integers as decimal text.

use chrono::NaiveDate;
use streaks_core::store::{StoredValue, ValueKind};

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Split a value into its `(kind, value)` column pair.
pub fn encode_value(value: &StoredValue) -> (String, String) {
  let text = match value {
    StoredValue::Date(d) => d.format(DATE_FORMAT).to_string(),
    StoredValue::Integer(n) => n.to_string(),
  };
  (value.kind().to_string(), text)
}

/// Rebuild a value from its column pair. `key` is only used for errors.
pub fn decode_value(key: &str, kind: &str, text: &str) -> Result<StoredValue> {
  let kind: ValueKind = kind
    .parse()
    .map_err(|_| Error::UnknownValueKind(kind.to_owned()))?;
  let decode_err = |message: String| Error::Decode {
    key: key.to_owned(),
    message,
  };

  match kind {
    ValueKind::Date => NaiveDate::parse_from_str(text, DATE_FORMAT)
      .map(StoredValue::Date)
      .map_err(|e| decode_err(e.to_string())),
    ValueKind::Integer => text
      .parse::<i64>()
      .map(StoredValue::Integer)
      .map_err(|e| decode_err(e.to_string())),
  }
}
