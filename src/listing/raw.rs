use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key under which JSON sources nest transit distances as `{mode: meters}`.
pub const TRANSIT_MAP_KEY: &str = "transit_distance_by_mode";

/// A single raw value as delivered by a source adapter.
///
/// CSV input only ever produces `Text`; JSON input can carry any variant.
/// Arrays and objects land in `Compound`, which no field parser accepts.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Compound(serde_json::Value),
}

impl RawValue {
    /// `null` and blank text carry no information.
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Null,
            serde_json::Value::Bool(b) => RawValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => RawValue::Number(f),
                None => RawValue::Compound(serde_json::Value::Number(n)),
            },
            serde_json::Value::String(s) => RawValue::Text(s),
            other => RawValue::Compound(other),
        }
    }
}

/// One heterogeneous row: field name to raw value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(
    from = "BTreeMap<String, RawValue>",
    into = "BTreeMap<String, RawValue>"
)]
pub struct RawRecord {
    fields: BTreeMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for fixtures and adapters alike.
    pub fn with(mut self, key: &str, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a field. A `transit_distance_by_mode` object is spread into
    /// one `<mode>_distance` field per entry.
    pub fn insert(&mut self, key: &str, value: impl Into<RawValue>) {
        let key = key.trim().to_lowercase();
        match value.into() {
            RawValue::Compound(serde_json::Value::Object(modes)) if key == TRANSIT_MAP_KEY => {
                for (mode, meters) in modes {
                    let field = format!("{}_distance", mode.trim().to_lowercase());
                    self.fields.insert(field, RawValue::from(meters));
                }
            }
            value => {
                self.fields.insert(key, value);
            }
        }
    }

    /// Look up a field, treating `null` and blank text as absent.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.get(key).filter(|v| !v.is_blank())
    }

    /// First non-blank value among `keys`, in order.
    pub fn get_any(&self, keys: &[&str]) -> Option<&RawValue> {
        keys.iter().find_map(|k| self.get(k))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<BTreeMap<String, RawValue>> for RawRecord {
    fn from(map: BTreeMap<String, RawValue>) -> Self {
        map.into_iter().collect()
    }
}

impl From<RawRecord> for BTreeMap<String, RawValue> {
    fn from(record: RawRecord) -> Self {
        record.fields
    }
}

impl FromIterator<(String, RawValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (String, RawValue)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (k, v) in iter {
            record.insert(&k, v);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_absent() {
        let record = RawRecord::new()
            .with("address", "  ")
            .with("fee", RawValue::Null)
            .with("price", 100.0);

        assert!(record.get("address").is_none());
        assert!(record.get("fee").is_none());
        assert_eq!(record.get("price"), Some(&RawValue::Number(100.0)));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_keys_are_normalized() {
        let record = RawRecord::new().with(" Price ", "100");
        assert!(record.get("price").is_some());
    }

    #[test]
    fn test_get_any_prefers_first_key() {
        let record = RawRecord::new()
            .with("url", "https://a")
            .with("detail_url", "https://b");
        assert_eq!(
            record.get_any(&["detail_url", "url"]),
            Some(&RawValue::Text("https://b".to_string()))
        );
    }

    #[test]
    fn test_deserialize_json_object() {
        let json = r#"{"price": 2500000, "address": "Main 1", "has_elevator": true, "fee": null}"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.get("price"), Some(&RawValue::Number(2_500_000.0)));
        assert_eq!(record.get("has_elevator"), Some(&RawValue::Bool(true)));
        assert!(record.get("fee").is_none());
    }

    #[test]
    fn test_nested_values_become_compound() {
        let json = r#"{"price": [1, 2], "fee": {"amount": 3000}, "rooms": 2}"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert!(matches!(record.get("price"), Some(RawValue::Compound(_))));
        assert!(matches!(record.get("fee"), Some(RawValue::Compound(_))));
        assert_eq!(record.get("rooms"), Some(&RawValue::Number(2.0)));
    }

    #[test]
    fn test_transit_map_spreads_into_distance_fields() {
        let json = r#"{"transit_distance_by_mode": {"Metro": 400, "bus": "120 m"}}"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.get("metro_distance"), Some(&RawValue::Number(400.0)));
        assert_eq!(
            record.get("bus_distance"),
            Some(&RawValue::Text("120 m".to_string()))
        );
        assert!(record.get(TRANSIT_MAP_KEY).is_none());
    }

    #[test]
    fn test_deserialize_lowercases_keys() {
        let record: RawRecord = serde_json::from_str(r#"{"Price": "100"}"#).unwrap();
        assert!(record.get("price").is_some());
    }
}
