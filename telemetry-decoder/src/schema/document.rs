//! Schema document model and the identifier-keyed schema set
//!
//! One `MeasurementSchema` describes everything decodable from frames with
//! a given identifier. Measurement declaration order is an observable part
//! of the output contract, so the measurement map deserializes into an
//! ordered list of name/spec pairs rather than a hash map.

use crate::bitfield::{BitRange, PAYLOAD_BITS};
use crate::value::ValueType;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Bit location and type of a single measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Bit bounds into the payload bit sequence
    pub bits: BitRange,
    /// Type tag selecting the value decoder
    ///
    /// Kept as the document string and resolved per decode, so a bad tag
    /// in one entry surfaces as a per-frame failure, not a load failure.
    #[serde(rename = "type")]
    pub type_tag: String,
}

/// Schema entry for one frame identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSchema {
    /// Class label of the message (e.g., "BMS")
    pub name: String,
    /// Origin label attached to every measurement (e.g., "battery")
    pub source: String,
    /// Named measurement specs, in declaration order
    pub measurements: Measurements,
}

/// Ordered list of named measurement specs
///
/// Deserializes from a document map, preserving entry order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Measurements(Vec<(String, FieldSpec)>);

impl Measurements {
    /// Build from name/spec pairs, keeping the given order
    pub fn new(entries: Vec<(String, FieldSpec)>) -> Self {
        Self(entries)
    }

    /// Iterate entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &(String, FieldSpec)> {
        self.0.iter()
    }

    /// Number of declared measurements
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a spec by measurement name
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, spec)| spec)
    }
}

impl<'de> Deserialize<'de> for Measurements {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MeasurementsVisitor;

        impl<'de> Visitor<'de> for MeasurementsVisitor {
            type Value = Measurements;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of measurement name to field spec")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, spec)) = map.next_entry::<String, FieldSpec>()? {
                    entries.push((name, spec));
                }
                Ok(Measurements(entries))
            }
        }

        deserializer.deserialize_map(MeasurementsVisitor)
    }
}

impl Serialize for Measurements {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, spec) in &self.0 {
            map.serialize_entry(name, spec)?;
        }
        map.end()
    }
}

/// Canonical form of a schema identifier key
///
/// Frame lookup uses the `0x`-prefixed lowercase form without leading
/// zeros, so document keys like `"0x0100"` or `"0X100"` normalize to
/// `"0x100"`. Keys that don't parse as hex are lowercased as-is and will
/// simply never match a frame.
pub fn canonical_identifier(key: &str) -> String {
    let trimmed = key.trim().to_ascii_lowercase();
    let digits = trimmed.strip_prefix("0x").unwrap_or(&trimmed);
    match u16::from_str_radix(digits, 16) {
        Ok(value) => format!("{:#x}", value),
        Err(_) => trimmed,
    }
}

/// Schema table statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaStats {
    /// Total number of identifier entries
    pub num_schemas: usize,
    /// Total number of declared measurements
    pub num_measurements: usize,
}

/// The identifier-keyed schema table
///
/// Built once at startup; read-only afterwards, so it can be shared across
/// concurrently decoding frames without synchronization.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    schemas: HashMap<String, MeasurementSchema>,
}

impl SchemaSet {
    /// Create an empty schema set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema under its identifier key (canonicalized)
    ///
    /// A later entry for the same identifier replaces the earlier one.
    pub fn add_schema(&mut self, identifier: &str, schema: MeasurementSchema) {
        self.schemas
            .insert(canonical_identifier(identifier), schema);
    }

    /// Look up the schema for a canonical hex identifier
    pub fn get(&self, hex_identifier: &str) -> Option<&MeasurementSchema> {
        self.schemas.get(hex_identifier)
    }

    /// Number of identifier entries
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// All identifier keys, sorted
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Schema table statistics
    pub fn stats(&self) -> SchemaStats {
        SchemaStats {
            num_schemas: self.schemas.len(),
            num_measurements: self.schemas.values().map(|s| s.measurements.len()).sum(),
        }
    }

    /// Check every entry for authoring defects
    ///
    /// Reports type tags that don't resolve and bit ranges that fall
    /// outside the payload. Findings are returned for the caller to log;
    /// a defective entry still fails per-frame at decode time.
    pub fn validate(&self) -> Vec<String> {
        let mut findings = Vec::new();
        for id in self.identifiers() {
            let schema = &self.schemas[id];
            for (name, spec) in schema.measurements.iter() {
                if let Err(e) = ValueType::from_tag(&spec.type_tag) {
                    findings.push(format!("{}/{}: {}", id, name, e));
                }
                let (low, high) = (spec.bits.low(), spec.bits.high());
                if low > high || high >= PAYLOAD_BITS {
                    findings.push(format!(
                        "{}/{}: bit range {} outside payload of {} bits",
                        id, name, spec.bits, PAYLOAD_BITS
                    ));
                }
            }
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(low: usize, high: usize, tag: &str) -> FieldSpec {
        FieldSpec {
            bits: BitRange::Span(low, high),
            type_tag: tag.to_string(),
        }
    }

    fn bms_schema() -> MeasurementSchema {
        MeasurementSchema {
            name: "BMS".to_string(),
            source: "battery".to_string(),
            measurements: Measurements::new(vec![
                ("soc".to_string(), spec(0, 7, "unsigned")),
                ("temperature".to_string(), spec(8, 15, "signed_8")),
            ]),
        }
    }

    #[test]
    fn test_identifier_canonicalization() {
        assert_eq!(canonical_identifier("0x100"), "0x100");
        assert_eq!(canonical_identifier("0X0100"), "0x100");
        assert_eq!(canonical_identifier(" 0x7FF "), "0x7ff");
        assert_eq!(canonical_identifier("bogus"), "bogus");
    }

    #[test]
    fn test_schema_set_lookup() {
        let mut set = SchemaSet::new();
        set.add_schema("0x0100", bms_schema());

        assert!(set.get("0x100").is_some());
        assert!(set.get("0x999").is_none());

        let stats = set.stats();
        assert_eq!(stats.num_schemas, 1);
        assert_eq!(stats.num_measurements, 2);
    }

    #[test]
    fn test_measurements_preserve_declared_order() {
        let json = r#"{
            "voltage": {"bits": [0, 15], "type": "signed_16"},
            "current": {"bits": [16, 31], "type": "signed_16"},
            "fault": {"bits": [32], "type": "bool"}
        }"#;

        let measurements: Measurements = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = measurements.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["voltage", "current", "fault"]);
    }

    #[test]
    fn test_single_bit_spec_deserializes() {
        let json = r#"{"bits": [5], "type": "bool"}"#;
        let spec: FieldSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.bits, BitRange::Single(5));
        assert_eq!(spec.type_tag, "bool");
    }

    #[test]
    fn test_validate_flags_authoring_defects() {
        let mut set = SchemaSet::new();
        set.add_schema(
            "0x200",
            MeasurementSchema {
                name: "MC".to_string(),
                source: "motor".to_string(),
                measurements: Measurements::new(vec![
                    ("rpm".to_string(), spec(0, 70, "unsigned")),
                    ("mode".to_string(), spec(0, 3, "float32")),
                    ("ok".to_string(), FieldSpec {
                        bits: BitRange::Single(4),
                        type_tag: "bool".to_string(),
                    }),
                ]),
            },
        );

        let findings = set.validate();
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().any(|f| f.contains("rpm")));
        assert!(findings.iter().any(|f| f.contains("float32")));
    }
}
