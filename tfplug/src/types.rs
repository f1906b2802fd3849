//! Core type system for tfplug
//!
//! This module provides the value types exchanged with Terraform: the
//! `Dynamic` value tree, its `DynamicValue` wrapper with path accessors,
//! `AttributePath` and `Diagnostic`.

use crate::error::{Result, TfplugError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Terraform encodes unknown values as msgpack extension type 0.
const UNKNOWN_EXT_TYPE: i8 = 0;

/// rmp-serde maps this newtype name onto msgpack extension values.
const MSGPACK_EXT_STRUCT_NAME: &str = "_ExtStruct";

/// Human readable encodings have no extension types, so unknown values are
/// represented by this sentinel instead.
const UNKNOWN_SENTINEL: &str = "__unknown__";

/// Dynamic represents Terraform values that can be of any type
/// This is the core type for all configuration and state data
/// IMPORTANT: Prefer the accessors over matching directly
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    /// Explicit null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value (all numbers are f64 to match Terraform)
    Number(f64),
    /// String value
    String(String),
    /// List, set or tuple of values
    List(Vec<Dynamic>),
    /// Map or object (objects are represented as Maps)
    Map(HashMap<String, Dynamic>),
    /// Value not yet known (during planning)
    Unknown,
}

impl Dynamic {
    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Dynamic::Unknown)
    }

    /// Known and not null
    pub fn is_set(&self) -> bool {
        !self.is_null() && !self.is_unknown()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Dynamic::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64().map(|n| n as i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Dynamic::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Dynamic]> {
        match self {
            Dynamic::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, Dynamic>> {
        match self {
            Dynamic::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Number(_) => "number",
            Dynamic::String(_) => "string",
            Dynamic::List(_) => "list",
            Dynamic::Map(_) => "map",
            Dynamic::Unknown => "unknown",
        }
    }
}

impl From<bool> for Dynamic {
    fn from(value: bool) -> Self {
        Dynamic::Bool(value)
    }
}

impl From<i64> for Dynamic {
    fn from(value: i64) -> Self {
        Dynamic::Number(value as f64)
    }
}

impl From<f64> for Dynamic {
    fn from(value: f64) -> Self {
        Dynamic::Number(value)
    }
}

impl From<String> for Dynamic {
    fn from(value: String) -> Self {
        Dynamic::String(value)
    }
}

impl From<&str> for Dynamic {
    fn from(value: &str) -> Self {
        Dynamic::String(value.to_string())
    }
}

impl<T: Into<Dynamic>> From<Option<T>> for Dynamic {
    fn from(value: Option<T>) -> Self {
        value.map_or(Dynamic::Null, Into::into)
    }
}

struct UnknownPayload;

impl Serialize for UnknownPayload {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bytes(&[0])
    }
}

impl Serialize for Dynamic {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Dynamic::Null => serializer.serialize_unit(),
            Dynamic::Bool(b) => serializer.serialize_bool(*b),
            Dynamic::Number(n) => {
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Dynamic::String(s) => serializer.serialize_str(s),
            Dynamic::List(l) => l.serialize(serializer),
            Dynamic::Map(m) => m.serialize(serializer),
            Dynamic::Unknown => {
                if serializer.is_human_readable() {
                    serializer.serialize_str(UNKNOWN_SENTINEL)
                } else {
                    serializer.serialize_newtype_struct(
                        MSGPACK_EXT_STRUCT_NAME,
                        &(UNKNOWN_EXT_TYPE, UnknownPayload),
                    )
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for Dynamic {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct DynamicVisitor;

        impl<'de> Visitor<'de> for DynamicVisitor {
            type Value = Dynamic;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid Dynamic value")
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Null)
            }

            fn visit_none<E: de::Error>(self) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Dynamic, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                Dynamic::deserialize(deserializer)
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Bool(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Number(value as f64))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Number(value as f64))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Number(value))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Dynamic, E> {
                if value == UNKNOWN_SENTINEL {
                    Ok(Dynamic::Unknown)
                } else {
                    Ok(Dynamic::String(value.to_string()))
                }
            }

            fn visit_string<E: de::Error>(self, value: String) -> std::result::Result<Dynamic, E> {
                if value == UNKNOWN_SENTINEL {
                    Ok(Dynamic::Unknown)
                } else {
                    Ok(Dynamic::String(value))
                }
            }

            // msgpack extension values arrive as a newtype holding (type, data)
            fn visit_newtype_struct<D>(
                self,
                deserializer: D,
            ) -> std::result::Result<Dynamic, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let (_ext_type, _data): (i8, de::IgnoredAny) = Deserialize::deserialize(deserializer)?;
                Ok(Dynamic::Unknown)
            }

            fn visit_seq<V>(self, mut seq: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::SeqAccess<'de>,
            {
                let mut vec = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Dynamic::List(vec))
            }

            fn visit_map<V>(self, mut map: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let mut hashmap = HashMap::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry()? {
                    hashmap.insert(key, value);
                }
                Ok(Dynamic::Map(hashmap))
            }
        }

        deserializer.deserialize_any(DynamicVisitor)
    }
}

/// DynamicValue wraps Dynamic and provides encoding/decoding capabilities
/// This is what gets passed between Terraform and the provider
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicValue {
    pub value: Dynamic,
}

impl DynamicValue {
    pub fn new(value: Dynamic) -> Self {
        Self { value }
    }

    pub fn null() -> Self {
        Self {
            value: Dynamic::Null,
        }
    }

    pub fn unknown() -> Self {
        Self {
            value: Dynamic::Unknown,
        }
    }

    /// An object with no attributes set yet
    pub fn object() -> Self {
        Self {
            value: Dynamic::Map(HashMap::new()),
        }
    }

    pub fn encode_msgpack(&self) -> Result<Vec<u8>> {
        rmp_serde::encode::to_vec(&self.value)
            .map_err(|e| TfplugError::EncodingError(format!("msgpack encoding failed: {}", e)))
    }

    pub fn decode_msgpack(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::null());
        }

        let value = rmp_serde::decode::from_slice::<Dynamic>(data)
            .map_err(|e| TfplugError::DecodingError(format!("msgpack decoding failed: {}", e)))?;
        Ok(Self { value })
    }

    pub fn encode_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.value)
            .map_err(|e| TfplugError::EncodingError(format!("json encoding failed: {}", e)))
    }

    pub fn decode_json(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::null());
        }

        let value = serde_json::from_slice(data)
            .map_err(|e| TfplugError::DecodingError(format!("json decoding failed: {}", e)))?;
        Ok(Self { value })
    }

    /// Raw lookup, `None` when the path does not resolve
    pub fn get(&self, path: &AttributePath) -> Option<&Dynamic> {
        self.navigate_path(path).ok()
    }

    pub fn get_string(&self, path: &AttributePath) -> Result<String> {
        let value = self.navigate_path(path)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch("string", value))
    }

    pub fn get_number(&self, path: &AttributePath) -> Result<f64> {
        let value = self.navigate_path(path)?;
        value.as_f64().ok_or_else(|| mismatch("number", value))
    }

    pub fn get_i64(&self, path: &AttributePath) -> Result<i64> {
        self.get_number(path).map(|n| n as i64)
    }

    pub fn get_bool(&self, path: &AttributePath) -> Result<bool> {
        let value = self.navigate_path(path)?;
        value.as_bool().ok_or_else(|| mismatch("bool", value))
    }

    pub fn get_list(&self, path: &AttributePath) -> Result<Vec<Dynamic>> {
        let value = self.navigate_path(path)?;
        value
            .as_list()
            .map(<[Dynamic]>::to_vec)
            .ok_or_else(|| mismatch("list", value))
    }

    pub fn get_map(&self, path: &AttributePath) -> Result<HashMap<String, Dynamic>> {
        let value = self.navigate_path(path)?;
        value
            .as_map()
            .cloned()
            .ok_or_else(|| mismatch("map", value))
    }

    pub fn set_string(&mut self, path: &AttributePath, value: String) -> Result<()> {
        self.set_value(path, Dynamic::String(value))
    }

    pub fn set_number(&mut self, path: &AttributePath, value: f64) -> Result<()> {
        self.set_value(path, Dynamic::Number(value))
    }

    pub fn set_i64(&mut self, path: &AttributePath, value: i64) -> Result<()> {
        self.set_value(path, Dynamic::Number(value as f64))
    }

    pub fn set_bool(&mut self, path: &AttributePath, value: bool) -> Result<()> {
        self.set_value(path, Dynamic::Bool(value))
    }

    pub fn set_list(&mut self, path: &AttributePath, value: Vec<Dynamic>) -> Result<()> {
        self.set_value(path, Dynamic::List(value))
    }

    pub fn set_map(&mut self, path: &AttributePath, value: HashMap<String, Dynamic>) -> Result<()> {
        self.set_value(path, Dynamic::Map(value))
    }

    pub fn set_null(&mut self, path: &AttributePath) -> Result<()> {
        self.set_value(path, Dynamic::Null)
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn is_unknown(&self) -> bool {
        self.value.is_unknown()
    }

    /// Missing attributes count as null
    pub fn is_null_at(&self, path: &AttributePath) -> bool {
        self.get(path).map_or(true, Dynamic::is_null)
    }

    pub fn is_unknown_at(&self, path: &AttributePath) -> bool {
        self.get(path).is_some_and(Dynamic::is_unknown)
    }

    /// Mark computed values as unknown during planning
    pub fn mark_unknown(&mut self, path: &AttributePath) -> Result<()> {
        self.set_value(path, Dynamic::Unknown)
    }

    fn navigate_path<'a>(&'a self, path: &AttributePath) -> Result<&'a Dynamic> {
        let mut current = &self.value;

        for step in &path.steps {
            current = match (current, step) {
                (Dynamic::Map(m), AttributePathStep::AttributeName(name))
                | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => m
                    .get(name)
                    .ok_or_else(|| TfplugError::AttributeNotFound(name.clone()))?,
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => {
                    let idx = *idx as usize;
                    l.get(idx).ok_or_else(|| {
                        TfplugError::InvalidPath(format!("list index {} out of bounds", idx))
                    })?
                }
                (other, step) => {
                    return Err(TfplugError::InvalidPath(format!(
                        "cannot apply {:?} to {}",
                        step,
                        other.type_name()
                    )))
                }
            };
        }

        Ok(current)
    }

    /// Sets a value, creating intermediate objects along the way
    pub fn set_value(&mut self, path: &AttributePath, new_value: Dynamic) -> Result<()> {
        let Some((last, parents)) = path.steps.split_last() else {
            self.value = new_value;
            return Ok(());
        };

        let mut current = &mut self.value;
        for step in parents {
            if matches!(current, Dynamic::Null | Dynamic::Unknown) {
                *current = Dynamic::Map(HashMap::new());
            }
            current = match (current, step) {
                (Dynamic::Map(m), AttributePathStep::AttributeName(name))
                | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => m
                    .entry(name.clone())
                    .or_insert_with(|| Dynamic::Map(HashMap::new())),
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => {
                    let len = l.len();
                    l.get_mut(*idx as usize).ok_or_else(|| {
                        TfplugError::InvalidPath(format!("list index {} out of bounds ({})", idx, len))
                    })?
                }
                (other, step) => {
                    return Err(TfplugError::InvalidPath(format!(
                        "cannot apply {:?} to {}",
                        step,
                        other.type_name()
                    )))
                }
            };
        }

        if matches!(current, Dynamic::Null | Dynamic::Unknown) {
            *current = Dynamic::Map(HashMap::new());
        }
        match (current, last) {
            (Dynamic::Map(m), AttributePathStep::AttributeName(name))
            | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => {
                m.insert(name.clone(), new_value);
                Ok(())
            }
            (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => {
                let len = l.len();
                let slot = l.get_mut(*idx as usize).ok_or_else(|| {
                    TfplugError::InvalidPath(format!("list index {} out of bounds ({})", idx, len))
                })?;
                *slot = new_value;
                Ok(())
            }
            (other, step) => Err(TfplugError::InvalidPath(format!(
                "cannot apply {:?} to {}",
                step,
                other.type_name()
            ))),
        }
    }
}

fn mismatch(expected: &str, actual: &Dynamic) -> TfplugError {
    TfplugError::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
    }
}

/// AttributePath represents a path to an attribute within a DynamicValue
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePath {
    pub steps: Vec<AttributePathStep>,
}

impl AttributePath {
    pub fn new(name: &str) -> Self {
        Self {
            steps: vec![AttributePathStep::AttributeName(name.to_string())],
        }
    }

    pub fn root() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.steps
            .push(AttributePathStep::AttributeName(name.to_string()));
        self
    }

    pub fn index(mut self, idx: i64) -> Self {
        self.steps.push(AttributePathStep::ElementKeyInt(idx));
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.steps
            .push(AttributePathStep::ElementKeyString(key.to_string()));
        self
    }
}

impl std::fmt::Display for AttributePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                AttributePathStep::AttributeName(name) if i == 0 => write!(f, "{}", name)?,
                AttributePathStep::AttributeName(name) => write!(f, ".{}", name)?,
                AttributePathStep::ElementKeyString(key) => write!(f, "[{:?}]", key)?,
                AttributePathStep::ElementKeyInt(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

/// Individual step in an AttributePath
#[derive(Debug, Clone, PartialEq)]
pub enum AttributePathStep {
    /// Access attribute by name in object
    AttributeName(String),
    /// Access element by string key (for maps)
    ElementKeyString(String),
    /// Access element by integer index (for lists)
    ElementKeyInt(i64),
}

/// Diagnostic represents a warning or error from the provider
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    pub detail: String,
    pub attribute: Option<AttributePath>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, path: AttributePath) -> Self {
        self.attribute = Some(path);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// True when any diagnostic is an error
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_value_string_access() {
        let mut dv = DynamicValue::object();
        dv.set_string(&AttributePath::new("name"), "test".to_string())
            .unwrap();

        assert_eq!(dv.get_string(&AttributePath::new("name")).unwrap(), "test");
    }

    #[test]
    fn dynamic_value_nested_access_creates_objects() {
        let mut dv = DynamicValue::null();
        let path = AttributePath::new("authentication").attribute("method");
        dv.set_string(&path, "forms".to_string()).unwrap();

        assert_eq!(dv.get_string(&path).unwrap(), "forms");
        assert!(dv.get_map(&AttributePath::new("authentication")).is_ok());
    }

    #[test]
    fn missing_attribute_is_null() {
        let dv = DynamicValue::object();
        assert!(dv.is_null_at(&AttributePath::new("port")));
        assert!(!dv.is_unknown_at(&AttributePath::new("port")));
        assert!(matches!(
            dv.get_string(&AttributePath::new("port")),
            Err(TfplugError::AttributeNotFound(_))
        ));
    }

    #[test]
    fn type_mismatch_reports_actual_type() {
        let mut dv = DynamicValue::object();
        dv.set_bool(&AttributePath::new("enable"), true).unwrap();

        match dv.get_string(&AttributePath::new("enable")) {
            Err(TfplugError::TypeMismatch { expected, actual }) => {
                assert_eq!(expected, "string");
                assert_eq!(actual, "bool");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn whole_numbers_encode_as_integers() {
        let dv = DynamicValue::new(Dynamic::Number(9091.0));
        let encoded = dv.encode_msgpack().unwrap();
        // 0xcd = uint16 marker, rmp picks the smallest integer encoding
        assert_eq!(encoded, vec![0xcd, 0x23, 0x83]);

        let decoded = DynamicValue::decode_msgpack(&encoded).unwrap();
        assert_eq!(decoded.value, Dynamic::Number(9091.0));
    }

    #[test]
    fn null_encodes_as_msgpack_nil() {
        assert_eq!(DynamicValue::null().encode_msgpack().unwrap(), vec![0xc0]);
        assert!(DynamicValue::decode_msgpack(&[]).unwrap().is_null());
    }

    #[test]
    fn unknown_uses_extension_encoding() {
        let mut dv = DynamicValue::object();
        dv.mark_unknown(&AttributePath::new("id")).unwrap();

        let encoded = DynamicValue::new(Dynamic::Unknown).encode_msgpack().unwrap();
        assert_eq!(encoded, vec![0xd4, 0x00, 0x00]);

        let decoded = DynamicValue::decode_msgpack(&dv.encode_msgpack().unwrap()).unwrap();
        assert!(decoded.is_unknown_at(&AttributePath::new("id")));
    }

    #[test]
    fn json_decoding_of_objects() {
        let dv = DynamicValue::decode_json(br#"{"id":3,"label":"tv","tags":[1,2]}"#).unwrap();
        assert_eq!(dv.get_i64(&AttributePath::new("id")).unwrap(), 3);
        assert_eq!(dv.get_list(&AttributePath::new("tags")).unwrap().len(), 2);
    }

    #[test]
    fn attribute_path_display() {
        let path = AttributePath::new("fields").index(2).attribute("name");
        assert_eq!(path.to_string(), "fields[2].name");
    }
}
