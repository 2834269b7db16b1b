//! Input documents and field access

use crate::value::{MapValue, Timestamp, Value};

use super::path::{DocumentKey, FieldPath};

/// A stored document as handed to the pipeline executor.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document identity
    pub key: DocumentKey,
    /// Last update time
    pub version: Timestamp,
    /// Creation time, when known
    pub create_time: Option<Timestamp>,
    /// Top-level fields
    pub fields: MapValue,
}

impl Document {
    pub fn new(key: DocumentKey, version: Timestamp, fields: MapValue) -> Self {
        Self {
            key,
            version,
            create_time: None,
            fields,
        }
    }

    pub fn with_create_time(mut self, create_time: Timestamp) -> Self {
        self.create_time = Some(create_time);
        self
    }

    /// Builds a document from a path and a JSON object body.
    ///
    /// Returns `None` when the path is not a document path or the body is not
    /// an object.
    pub fn from_json(path: &str, version: Timestamp, body: serde_json::Value) -> Option<Self> {
        let key = DocumentKey::parse(path)?;
        match Value::from_json(body) {
            Value::Map(fields) => Some(Self::new(key, version, fields)),
            _ => None,
        }
    }
}

/// Read access to the fields an expression can address.
///
/// Implemented by input documents and by the documents flowing between
/// stages, which may have lost their key after an aggregation.
pub trait DocumentBinding {
    fn key(&self) -> Option<&DocumentKey>;

    fn update_time(&self) -> Option<Timestamp>;

    fn create_time(&self) -> Option<Timestamp>;

    fn fields(&self) -> &MapValue;

    /// Resolves a field path, including the synthetic fields.
    /// Returns `None` when the field is absent.
    fn lookup(&self, path: &FieldPath) -> Option<Value> {
        match path.synthetic() {
            Some(FieldPath::KEY) => self.key().cloned().map(Value::Reference),
            Some(FieldPath::UPDATE_TIME) => self.update_time().map(Value::Timestamp),
            Some(FieldPath::CREATE_TIME) => self.create_time().map(Value::Timestamp),
            _ => get_field(self.fields(), path).cloned(),
        }
    }
}

impl DocumentBinding for Document {
    fn key(&self) -> Option<&DocumentKey> {
        Some(&self.key)
    }

    fn update_time(&self) -> Option<Timestamp> {
        Some(self.version)
    }

    fn create_time(&self) -> Option<Timestamp> {
        self.create_time
    }

    fn fields(&self) -> &MapValue {
        &self.fields
    }
}

/// Walks nested maps segment by segment. Any non-map intermediate means the
/// field is absent.
pub fn get_field<'a>(fields: &'a MapValue, path: &FieldPath) -> Option<&'a Value> {
    let (last, parents) = path.segments().split_last()?;
    let mut current = fields;
    for segment in parents {
        current = current.get(segment)?.as_map()?;
    }
    current.get(last)
}

/// Sets a field, creating intermediate maps and replacing any non-map value
/// standing in the way.
pub fn set_field(fields: &mut MapValue, path: &FieldPath, value: Value) {
    let Some((last, parents)) = path.segments().split_last() else {
        return;
    };

    let mut current = fields;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Map(MapValue::new()));
        if !matches!(slot, Value::Map(_)) {
            *slot = Value::Map(MapValue::new());
        }
        current = match slot {
            Value::Map(map) => map,
            _ => return,
        };
    }
    current.insert(last.clone(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts(seconds: i64) -> Timestamp {
        Timestamp::from_seconds(seconds).unwrap()
    }

    #[test]
    fn test_nested_lookup() {
        let doc = Document::from_json("users/a", ts(1), json!({"address": {"city": "Oslo"}, "n": 1}))
            .unwrap();
        assert_eq!(
            doc.lookup(&FieldPath::parse("address.city")),
            Some(Value::from("Oslo"))
        );
        assert_eq!(doc.lookup(&FieldPath::parse("address.zip")), None);
        assert_eq!(doc.lookup(&FieldPath::parse("n.x")), None);
    }

    #[test]
    fn test_synthetic_lookup() {
        let doc = Document::from_json("users/a", ts(5), json!({}))
            .unwrap()
            .with_create_time(ts(2));
        assert_eq!(
            doc.lookup(&FieldPath::key()),
            Some(Value::Reference(DocumentKey::parse("users/a").unwrap()))
        );
        assert_eq!(
            doc.lookup(&FieldPath::parse("__update_time__")),
            Some(Value::Timestamp(ts(5)))
        );
        assert_eq!(
            doc.lookup(&FieldPath::parse("__create_time__")),
            Some(Value::Timestamp(ts(2)))
        );
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(Document::from_json("users", ts(0), json!({})).is_none());
        assert!(Document::from_json("users/a", ts(0), json!([1])).is_none());
    }

    #[test]
    fn test_set_field_creates_nested_maps() {
        let mut fields = MapValue::new();
        fields.insert("a".into(), Value::Integer(1));

        set_field(&mut fields, &FieldPath::parse("a.b.c"), Value::Boolean(true));
        set_field(&mut fields, &FieldPath::parse("d"), Value::Null);

        assert_eq!(
            Value::Map(fields),
            Value::from_json(json!({"a": {"b": {"c": true}}, "d": null}))
        );
    }
}
