//! Composite key encoding.
//!
//! A composite key is the object type followed by each attribute, every
//! segment terminated by [`SENTINEL`]:
//!
//! ```text
//! Account␞c1␞a1␞
//! ```
//!
//! Because the final segment is terminated too, no key for one attribute
//! tuple is a prefix of the key for another tuple of the same object type.
//! A prefix scan covers `[build_key(prefix), build_key(prefix) + SCAN_UPPER)`.

use std::fmt;

/// Segment terminator (U+10FFFE, a noncharacter).
///
/// Sorts after every character an attribute may contain.
pub const SENTINEL: char = '\u{10FFFE}';

/// Appended to a prefix to form the exclusive upper bound of a scan.
pub const SCAN_UPPER: char = char::MAX;

/// Errors raised while building or parsing composite keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// Object type is empty.
    #[error("object type must not be empty")]
    EmptyObjectType,

    /// A segment contains the sentinel or the scan bound character.
    #[error("key segment {0:?} contains a reserved character")]
    ReservedCharacter(String),

    /// Input is not a composite key.
    #[error("malformed composite key")]
    Malformed,
}

/// Half-open key range `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    /// Inclusive lower bound.
    pub start: String,
    /// Exclusive upper bound.
    pub end: String,
}

fn check_segment(segment: &str) -> Result<(), KeyError> {
    if segment.contains([SENTINEL, SCAN_UPPER]) {
        return Err(KeyError::ReservedCharacter(segment.to_string()));
    }
    Ok(())
}

/// Build the composite key for `object_type` and `attributes`.
///
/// # Errors
///
/// Returns an error if the object type is empty or any segment contains a
/// reserved character.
pub fn build_key(object_type: &str, attributes: &[&str]) -> Result<String, KeyError> {
    if object_type.is_empty() {
        return Err(KeyError::EmptyObjectType);
    }
    check_segment(object_type)?;

    let capacity = object_type.len()
        + attributes.iter().map(|a| a.len()).sum::<usize>()
        + (attributes.len() + 1) * SENTINEL.len_utf8();
    let mut key = String::with_capacity(capacity);
    key.push_str(object_type);
    key.push(SENTINEL);
    for attribute in attributes {
        check_segment(attribute)?;
        key.push_str(attribute);
        key.push(SENTINEL);
    }
    Ok(key)
}

/// Range covering every key under `object_type` whose attributes start with
/// `prefix`.
///
/// # Errors
///
/// Same as [`build_key`].
pub fn prefix_range(object_type: &str, prefix: &[&str]) -> Result<KeyRange, KeyError> {
    let start = build_key(object_type, prefix)?;
    let mut end = start.clone();
    end.push(SCAN_UPPER);
    Ok(KeyRange { start, end })
}

/// Split a composite key into its object type and attributes.
///
/// # Errors
///
/// Returns `Malformed` if the key is not sentinel-terminated or has an empty
/// object type.
pub fn split_key(key: &str) -> Result<(String, Vec<String>), KeyError> {
    let body = key.strip_suffix(SENTINEL).ok_or(KeyError::Malformed)?;
    let mut segments = body.split(SENTINEL).map(str::to_string);
    let object_type = segments
        .next()
        .filter(|s| !s.is_empty())
        .ok_or(KeyError::Malformed)?;
    Ok((object_type, segments.collect()))
}

/// Printable form of a composite key for logs and error messages.
pub struct DisplayKey<'a>(pub &'a str);

impl fmt::Display for DisplayKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.trim_end_matches(SENTINEL).split(SENTINEL).enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}
