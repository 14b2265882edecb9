//! Decoding of JSON values that are either a list of strings or a map of
//! string keys to string lists.
//!
//! The shape is sniffed by trying a list first, then a map. Anything that
//! coerces into one of the shapes is accepted, including `[]`, `{}` and
//! `null` (which reads as an empty list).

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;

/// A string list in one of two shapes. Exactly one shape is populated; an
/// empty input decodes to [`FlexibleList::Empty`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FlexibleList {
    #[default]
    Empty,
    Sequence(Vec<String>),
    Mapping(BTreeMap<String, Vec<String>>),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    /// Neither shape matched. Carries the map-shape parse error.
    #[error("value is neither a string list nor a map of string lists: {0}")]
    Shape(#[source] serde_json::Error),
}

impl FlexibleList {
    /// Items of the sequence shape; empty for the other variants.
    pub fn as_sequence(&self) -> &[String] {
        match self {
            FlexibleList::Sequence(items) => items,
            _ => &[],
        }
    }

    /// Items of the mapping shape, if that is the decoded shape.
    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            FlexibleList::Mapping(items) => Some(items),
            _ => None,
        }
    }

    /// True when no strings or keys were decoded.
    pub fn is_empty(&self) -> bool {
        match self {
            FlexibleList::Empty => true,
            FlexibleList::Sequence(items) => items.is_empty(),
            FlexibleList::Mapping(items) => items.is_empty(),
        }
    }
}

/// Decode `bytes` as a flexible list. Empty input yields `Empty`.
pub fn decode_flexible_list(bytes: &[u8]) -> Result<FlexibleList, DecodeError> {
    if bytes.is_empty() {
        return Ok(FlexibleList::Empty);
    }
    if let Ok(items) = serde_json::from_slice::<Option<Vec<String>>>(bytes) {
        return Ok(FlexibleList::Sequence(items.unwrap_or_default()));
    }
    serde_json::from_slice::<BTreeMap<String, Vec<String>>>(bytes)
        .map(FlexibleList::Mapping)
        .map_err(DecodeError::Shape)
}

impl<'de> Deserialize<'de> for FlexibleList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        if let Ok(items) = Option::<Vec<String>>::deserialize(&value) {
            return Ok(FlexibleList::Sequence(items.unwrap_or_default()));
        }
        BTreeMap::<String, Vec<String>>::deserialize(&value)
            .map(FlexibleList::Mapping)
            .map_err(|e| de::Error::custom(DecodeError::Shape(e)))
    }
}

impl Serialize for FlexibleList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FlexibleList::Empty => Vec::<String>::new().serialize(serializer),
            FlexibleList::Sequence(items) => items.serialize(serializer),
            FlexibleList::Mapping(items) => items.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bytes_decode_to_empty() {
        let v = decode_flexible_list(b"").unwrap();
        assert_eq!(v, FlexibleList::Empty);
        assert!(v.as_sequence().is_empty());
        assert!(v.as_mapping().is_none());
        assert!(v.is_empty());
    }

    #[test]
    fn list_of_strings() {
        let v = decode_flexible_list(br#"["a","b"]"#).unwrap();
        assert_eq!(v.as_sequence(), ["a".to_string(), "b".to_string()]);
        assert!(v.as_mapping().is_none());
    }

    #[test]
    fn map_of_string_lists() {
        let v = decode_flexible_list(br#"{"x":["a"]}"#).unwrap();
        let m = v.as_mapping().unwrap();
        assert_eq!(m.len(), 1);
        assert_eq!(m["x"], vec!["a".to_string()]);
        assert!(v.as_sequence().is_empty());
    }

    #[test]
    fn scalar_is_rejected_with_map_error() {
        let err = decode_flexible_list(b"42").unwrap_err();
        let DecodeError::Shape(inner) = &err;
        assert!(inner.to_string().contains("map"), "{}", inner);
    }

    #[test]
    fn mixed_list_is_rejected() {
        assert!(decode_flexible_list(br#"["a", 1]"#).is_err());
        assert!(decode_flexible_list(br#"{"x": "a"}"#).is_err());
    }

    #[test]
    fn empty_containers_and_null() {
        assert_eq!(
            decode_flexible_list(b"[]").unwrap(),
            FlexibleList::Sequence(Vec::new())
        );
        assert_eq!(
            decode_flexible_list(b"{}").unwrap(),
            FlexibleList::Mapping(BTreeMap::new())
        );
        assert_eq!(
            decode_flexible_list(b"null").unwrap(),
            FlexibleList::Sequence(Vec::new())
        );
    }

    #[test]
    fn whitespace_only_is_an_error() {
        assert!(decode_flexible_list(b"   ").is_err());
    }

    #[test]
    fn decode_is_idempotent() {
        let inputs: [&[u8]; 4] = [br#"["a","b"]"#, br#"{"k":["v","w"],"j":[]}"#, b"", b"null"];
        for input in inputs {
            let a = decode_flexible_list(input).unwrap();
            let b = decode_flexible_list(input).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn embedded_in_document() {
        #[derive(serde::Deserialize)]
        struct Doc {
            wanted: FlexibleList,
            other: FlexibleList,
        }
        let doc: Doc =
            serde_json::from_str(r#"{"wanted": ["cn", "private"], "other": {"cn": ["a"]}}"#)
                .unwrap();
        assert_eq!(doc.wanted.as_sequence().len(), 2);
        assert!(doc.other.as_mapping().is_some());

        let bad = serde_json::from_str::<Doc>(r#"{"wanted": 1, "other": []}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn serializes_in_decoded_shape() {
        let seq = decode_flexible_list(br#"["a"]"#).unwrap();
        assert_eq!(serde_json::to_string(&seq).unwrap(), r#"["a"]"#);
        let map = decode_flexible_list(br#"{"x":["a"]}"#).unwrap();
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"x":["a"]}"#);
        assert_eq!(serde_json::to_string(&FlexibleList::Empty).unwrap(), "[]");
    }
}
