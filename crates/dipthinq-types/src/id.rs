//! Identifiers for conversations and messages.
//!
//! New ids are UUID v4 strings. Collections written by the original web
//! client keyed everything by `Date.now()`, so numeric ids are still accepted
//! on load and kept as their decimal string.

use serde::{Deserialize, Deserializer};

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

/// `deserialize_with` helper accepting either a string or a number.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Unsigned(n) => n.to_string(),
        RawId::Signed(n) => n.to_string(),
        // `Date.now() + 1` style ids are integral; anything else keeps its float form
        RawId::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => (f as i64).to_string(),
        RawId::Float(f) => f.to_string(),
    })
}
