use serde::{Serialize, Serializer};
use std::fmt;

use crate::templates::TemplateKind;

/// Key of a template field
///
/// Repeated descriptors are addressed by occurrence: the Nth `latitude` in
/// the expanded template is `#N#latitude`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub name: &'static str,
    pub occurrence: Option<usize>,
}

impl FieldKey {
    pub fn plain(name: &'static str) -> Self {
        Self {
            name,
            occurrence: None,
        }
    }

    pub fn nth(occurrence: usize, name: &'static str) -> Self {
        Self {
            name,
            occurrence: Some(occurrence),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.occurrence {
            Some(n) => write!(f, "#{}#{}", n, self.name),
            None => f.write_str(self.name),
        }
    }
}

impl Serialize for FieldKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "\"{}\"", v.replace('"', "'")),
            Value::Missing => f.write_str("MISSING"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub key: FieldKey,
    pub value: Value,
}

impl Assignment {
    pub fn new(key: FieldKey, value: Value) -> Self {
        Self { key, value }
    }
}

/// Everything a BUFR codec needs to pack one message
///
/// Replication factors must be applied before any indexed data key, since
/// they decide how many occurrences of each repeated group exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateMessage {
    pub template: TemplateKind,
    pub level_count: usize,
    pub header: Vec<Assignment>,
    pub replication_factors: Vec<usize>,
    pub unexpanded_descriptors: Vec<u32>,
    pub data: Vec<Assignment>,
}

impl TemplateMessage {
    /// First data value assigned to a key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.header
            .iter()
            .chain(self.data.iter())
            .find(|a| a.key.to_string() == key)
            .map(|a| &a.value)
    }

    /// Occurrence numbers used for a repeated field name, in assignment order
    pub fn occurrences(&self, name: &str) -> Vec<usize> {
        self.data
            .iter()
            .filter(|a| a.key.name == name)
            .filter_map(|a| a.key.occurrence)
            .collect()
    }

    pub fn assignment_count(&self) -> usize {
        self.header.len() + self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_key_display() {
        assert_eq!(FieldKey::plain("edition").to_string(), "edition");
        assert_eq!(
            FieldKey::nth(12, "QualifierForGTSPPQualityFlag").to_string(),
            "#12#QualifierForGTSPPQualityFlag"
        );
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Int(69).to_string(), "69");
        assert_eq!(Value::Float(303.35).to_string(), "303.35");
        assert_eq!(Value::Text("ZMFR".to_string()).to_string(), "\"ZMFR\"");
        assert_eq!(Value::Missing.to_string(), "MISSING");
    }

    #[test]
    fn test_assignment_serializes_key_as_string() {
        let assignment = Assignment::new(FieldKey::nth(2, "year"), Value::Int(2023));
        let json = serde_json::to_string(&assignment).unwrap();
        assert_eq!(json, r##"{"key":"#2#year","value":2023}"##);

        let missing = Assignment::new(FieldKey::plain("salinity"), Value::Missing);
        assert_eq!(
            serde_json::to_string(&missing).unwrap(),
            r#"{"key":"salinity","value":null}"#
        );
    }
}
