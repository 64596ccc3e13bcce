//! Serde integration.
//!
//! Serializing reads through getters and reactive slots, so serializing
//! while a subscriber is active records a dependency on every slot visited.
//! Containers that contain themselves cannot be serialized.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{List, Object, Value};

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Object(object) => object.serialize(serializer),
            Value::List(list) => list.serialize(serializer),
        }
    }
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let keys = self.keys();
        let mut map = serializer.serialize_map(Some(keys.len()))?;
        for key in keys {
            let value = self.get(&key).unwrap_or_default();
            map.serialize_entry(&key, &value)?;
        }
        map.end()
    }
}

impl Serialize for List {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let items = self.to_vec();
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in &items {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(map.into_iter().collect()),
        }
    }
}

impl Value {
    /// Snapshot as JSON. Non-finite numbers become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::Str(s) => serde_json::Value::String(s.to_string()),
            Value::Object(object) => serde_json::Value::Object(
                object
                    .keys()
                    .into_iter()
                    .map(|key| {
                        let value = object.get(&key).unwrap_or_default().to_json();
                        (key, value)
                    })
                    .collect(),
            ),
            Value::List(list) => {
                serde_json::Value::Array(list.to_vec().iter().map(Value::to_json).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_builds_nested_containers() {
        let value = Value::from(json!({ "user": { "name": "ada" }, "tags": ["a", "b"] }));

        let object = value.as_object().unwrap();
        // serde_json maps iterate in key order.
        assert_eq!(object.keys(), vec!["tags".to_string(), "user".to_string()]);

        let user = object.get("user").unwrap();
        assert_eq!(
            user.as_object().unwrap().get("name").unwrap().as_str(),
            Some("ada")
        );
        assert_eq!(object.get("tags").unwrap().as_list().unwrap().len(), 2);
    }

    #[test]
    fn serialize_matches_to_json() {
        let source = json!({ "count": 1.5, "items": [true, null, "x"] });
        let value = Value::from(source.clone());

        assert_eq!(value.to_json(), source);
        assert_eq!(serde_json::to_value(&value).unwrap(), source);
    }

    #[test]
    fn deserialize_from_text() {
        let value: Value = serde_json::from_str(r#"{"a":[1,2,3]}"#).unwrap();
        let list = value.as_object().unwrap().get("a").unwrap();
        assert_eq!(list.as_list().unwrap().len(), 3);
    }

    #[test]
    fn nan_serializes_as_null() {
        assert_eq!(Value::from(f64::NAN).to_json(), serde_json::Value::Null);
    }
}
