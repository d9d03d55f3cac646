use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};

/// Field names of a song document.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const ARTIST: &str = "artist";
    pub const DIFFICULTY: &str = "difficulty";
    pub const LEVEL: &str = "level";
    pub const RELEASED: &str = "released";
    pub const RATING: &str = "rating";
}

/// Store-assigned song identifier.
///
/// Ids are handed out in insertion order and never reused. Outside the crate they
/// travel as a fixed-width, 16 digit lower-case hex token, so lexical and numeric
/// order agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SongId(pub u64);

impl SongId {
    pub const TOKEN_LEN: usize = 16;

    pub fn new(id: u64) -> Self {
        SongId(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for SongId {
    fn from(id: u64) -> Self {
        SongId(id)
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for SongId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != Self::TOKEN_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::validation(format!(
                "'{}' is not a valid song id, expected {} hex digits",
                s,
                Self::TOKEN_LEN
            )));
        }

        u64::from_str_radix(s, 16)
            .map(SongId)
            .map_err(|e| Error::validation(format!("'{}' is not a valid song id: {}", s, e)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Integer(i64),
    Null,
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view used by aggregation; integers widen to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            FieldValue::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Numbers compare by value regardless of representation, everything else
    /// compares structurally.
    pub fn loosely_equals(&self, other: &FieldValue) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }
}

impl TryFrom<serde_json::Value> for FieldValue {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Null => Ok(FieldValue::Null),
            serde_json::Value::String(s) => Ok(FieldValue::Text(s)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(FieldValue::Integer(i)),
                None => n.as_f64().map(FieldValue::Number).ok_or_else(|| {
                    Error::new(ErrorKind::Parse, format!("number {} out of range", n))
                }),
            },
            other => Err(Error::new(
                ErrorKind::Parse,
                format!("unsupported field value: {}", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: SongId,
    pub fields: HashMap<String, FieldValue>,
}

impl Document {
    pub fn new(id: SongId) -> Self {
        Document {
            id,
            fields: HashMap::new(),
        }
    }

    pub fn with_fields(id: SongId, fields: HashMap<String, FieldValue>) -> Self {
        Document { id, fields }
    }

    pub fn add_field(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    fn text(&self, name: &str) -> Result<String> {
        self.get_field(name)
            .and_then(FieldValue::as_text)
            .map(str::to_string)
            .ok_or_else(|| self.missing(name))
    }

    fn missing(&self, name: &str) -> Error {
        Error::new(
            ErrorKind::Parse,
            format!("song {} has no usable '{}' field", self.id, name),
        )
    }
}

/// Typed view over a song document.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub id: SongId,
    pub artist: String,
    pub title: String,
    pub difficulty: f64,
    pub level: i64,
    pub released: String,
    pub rating: Option<u8>,
}

impl Song {
    pub fn from_document(doc: &Document) -> Result<Self> {
        let difficulty = doc
            .get_field(fields::DIFFICULTY)
            .and_then(FieldValue::as_f64)
            .ok_or_else(|| doc.missing(fields::DIFFICULTY))?;
        let level = doc
            .get_field(fields::LEVEL)
            .and_then(FieldValue::as_i64)
            .ok_or_else(|| doc.missing(fields::LEVEL))?;
        let rating = match doc.get_field(fields::RATING) {
            None | Some(FieldValue::Null) => None,
            Some(value) => Some(
                value
                    .as_i64()
                    .and_then(|r| u8::try_from(r).ok())
                    .ok_or_else(|| doc.missing(fields::RATING))?,
            ),
        };

        Ok(Song {
            id: doc.id,
            artist: doc.text(fields::ARTIST)?,
            title: doc.text(fields::TITLE)?,
            difficulty,
            level,
            released: doc.text(fields::RELEASED)?,
            rating,
        })
    }
}

/// One line of the newline-delimited import format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRecord {
    pub title: String,
    pub artist: String,
    pub difficulty: f64,
    pub level: i64,
    pub released: String,
}

impl SongRecord {
    pub fn into_fields(self) -> HashMap<String, FieldValue> {
        HashMap::from([
            (fields::TITLE.to_string(), FieldValue::Text(self.title)),
            (fields::ARTIST.to_string(), FieldValue::Text(self.artist)),
            (fields::DIFFICULTY.to_string(), FieldValue::Number(self.difficulty)),
            (fields::LEVEL.to_string(), FieldValue::Integer(self.level)),
            (fields::RELEASED.to_string(), FieldValue::Text(self.released)),
        ])
    }
}

/// Precomputed per-level partial sums, one record per level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub level: i64,
    pub total_difficulty: f64,
    pub number_of_songs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_id_token_is_fixed_width_hex() {
        let id = SongId::new(42);
        assert_eq!(id.to_string(), "000000000000002a");
        assert_eq!("000000000000002a".parse::<SongId>().unwrap(), id);
    }

    #[test]
    fn song_id_rejects_malformed_tokens() {
        for bad in ["", "2a", "zzzzzzzzzzzzzzzz", "000000000000002a0", "-00000000000002a"] {
            let err = bad.parse::<SongId>().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "accepted {:?}", bad);
        }
    }

    #[test]
    fn token_order_matches_id_order() {
        let a = SongId::new(9).to_string();
        let b = SongId::new(10).to_string();
        assert!(a < b);
    }

    #[test]
    fn json_numbers_keep_integer_representation() {
        let level = FieldValue::try_from(serde_json::json!(5)).unwrap();
        let difficulty = FieldValue::try_from(serde_json::json!(5.5)).unwrap();
        assert_eq!(level, FieldValue::Integer(5));
        assert_eq!(difficulty, FieldValue::Number(5.5));
        assert!(FieldValue::Number(5.0).loosely_equals(&level));
        assert!(FieldValue::try_from(serde_json::json!([1])).is_err());
    }

    #[test]
    fn song_view_requires_core_fields() {
        let mut doc = Document::new(SongId::new(1));
        doc.add_field(fields::TITLE, FieldValue::Text("A New Kennel".into()));
        assert_eq!(Song::from_document(&doc).unwrap_err().kind(), ErrorKind::Parse);

        doc.add_field(fields::ARTIST, FieldValue::Text("The Yousicians".into()));
        doc.add_field(fields::DIFFICULTY, FieldValue::Number(9.1));
        doc.add_field(fields::LEVEL, FieldValue::Integer(9));
        doc.add_field(fields::RELEASED, FieldValue::Text("2010-02-03".into()));
        let song = Song::from_document(&doc).unwrap();
        assert_eq!(song.rating, None);

        doc.add_field(fields::RATING, FieldValue::Integer(4));
        assert_eq!(Song::from_document(&doc).unwrap().rating, Some(4));
    }
}
