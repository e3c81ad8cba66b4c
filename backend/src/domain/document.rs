//! Wire-level document model shared with the remote store.
//!
//! The store speaks in flat documents: an opaque identifier plus a map of
//! field name to JSON value. Timestamps cross the wire as the provider's
//! `{seconds, nanos}` object and are converted to [`chrono::DateTime`] the
//! moment they enter the domain. Writes may carry a server-timestamp
//! sentinel which the store resolves against its own clock, so the
//! authoritative audit timestamps are never client-estimated.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use pagination::Cursor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire name of the creation timestamp field.
pub const FIELD_DATE_CREATED: &str = "date_created";
/// Wire name of the last-update timestamp field.
pub const FIELD_DATE_UPDATED: &str = "date_updated";
/// Wire name of the creation audit stub field.
pub const FIELD_CREATED_BY: &str = "created_by";
/// Wire name of the soft-delete flag field.
pub const FIELD_IS_DELETED: &str = "is_deleted";
/// Wire name of the soft-delete timestamp field.
pub const FIELD_DATE_DELETED: &str = "date_deleted";

/// Opaque record identity assigned by the store on creation.
///
/// Never reused and never mutated after assignment. A default-constructed
/// id is the "not yet stored" placeholder used by drafts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap a store-assigned identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether the store has assigned this identity yet.
    pub fn is_assigned(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for RecordId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for RecordId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// Provider timestamp representation: whole seconds plus nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTimestamp {
    /// Seconds since the Unix epoch.
    pub seconds: i64,
    /// Nanosecond remainder.
    pub nanos: u32,
}

impl StoreTimestamp {
    /// Capture a datetime as a provider timestamp.
    pub fn from_datetime(value: DateTime<Utc>) -> Self {
        Self {
            seconds: value.timestamp(),
            nanos: value.timestamp_subsec_nanos(),
        }
    }

    /// Convert back to the uniform domain date type.
    ///
    /// Returns `None` for values outside the representable range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanos)
    }

    /// The wire value form of this timestamp.
    pub fn to_value(self) -> Value {
        serde_json::json!({ "seconds": self.seconds, "nanos": self.nanos })
    }
}

/// Timestamp forms accepted when reading documents.
///
/// The provider writes `{seconds, nanos}` objects, but exported or seeded
/// data occasionally carries RFC 3339 strings; both convert to the uniform
/// date type.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireTimestamp {
    Object(StoreTimestamp),
    Text(DateTime<Utc>),
}

impl WireTimestamp {
    fn into_datetime<E: serde::de::Error>(self) -> Result<DateTime<Utc>, E> {
        match self {
            Self::Object(ts) => ts
                .to_datetime()
                .ok_or_else(|| E::custom("store timestamp out of range")),
            Self::Text(dt) => Ok(dt),
        }
    }
}

/// Serde helpers converting wire timestamps to [`DateTime<Utc>`].
pub mod wire_time {
    use super::{DateTime, Deserialize, StoreTimestamp, Utc, WireTimestamp};
    use serde::{Deserializer, Serialize, Serializer};

    /// Serialise a datetime as the provider `{seconds, nanos}` object.
    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        StoreTimestamp::from_datetime(*value).serialize(serializer)
    }

    /// Deserialise either timestamp wire form into a datetime.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        WireTimestamp::deserialize(deserializer)?.into_datetime()
    }

    /// Helpers for optional timestamp fields (`null` stays `None`).
    pub mod option {
        use super::{DateTime, Deserialize, StoreTimestamp, Utc, WireTimestamp};
        use serde::{Deserializer, Serialize, Serializer};

        /// Serialise `None` as `null`, `Some` as the provider object.
        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            value
                .as_ref()
                .map(|instant| StoreTimestamp::from_datetime(*instant))
                .serialize(serializer)
        }

        /// Deserialise `null` or a timestamp wire form.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<WireTimestamp>::deserialize(deserializer)?
                .map(WireTimestamp::into_datetime)
                .transpose()
        }
    }
}

/// One stored document: store-assigned identity plus its field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: RecordId,
    fields: Map<String, Value>,
}

impl Document {
    /// Assemble a document from its identity and fields.
    pub fn new(id: RecordId, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    /// Store-assigned identity.
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// The raw field map.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Look up a single field value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Deserialise the field map into a typed record.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.fields.clone()))
    }

    /// Cursor positioned after this document for the given order-by field.
    pub fn cursor_for(&self, order_field: &str) -> Cursor {
        let key = self.field(order_field).cloned().unwrap_or(Value::Null);
        Cursor::new(key, self.id.as_str())
    }
}

/// A value heading to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteValue {
    /// A concrete JSON value written as-is.
    Json(Value),
    /// Sentinel resolved to the store's clock at write time.
    ServerTimestamp,
}

/// Ordered field map for a create or merge write.
///
/// # Examples
/// ```
/// use backoffice::domain::document::{WriteFields, FIELD_DATE_UPDATED};
/// use serde_json::json;
///
/// let fields = WriteFields::new()
///     .with_json("clients_name", json!("Ahmed"))
///     .with_server_timestamp(FIELD_DATE_UPDATED);
/// assert_eq!(fields.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteFields(BTreeMap<String, WriteValue>);

impl WriteFields {
    /// An empty write payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lift a plain JSON object into a write payload.
    pub fn from_object(object: Map<String, Value>) -> Self {
        Self(
            object
                .into_iter()
                .map(|(name, value)| (name, WriteValue::Json(value)))
                .collect(),
        )
    }

    /// Set a concrete JSON value.
    #[must_use]
    pub fn with_json(mut self, field: impl Into<String>, value: Value) -> Self {
        self.0.insert(field.into(), WriteValue::Json(value));
        self
    }

    /// Set a field to the server clock at write time.
    #[must_use]
    pub fn with_server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.0.insert(field.into(), WriteValue::ServerTimestamp);
        self
    }

    /// Number of fields in the payload.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload carries no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &WriteValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl IntoIterator for WriteFields {
    type Item = (String, WriteValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, WriteValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Field-level merge payload for `update`.
///
/// Mirrors the original's partial-record updates: only the named fields are
/// merged onto the remote document. The repository inspects the soft-delete
/// flag to decide cache placement, so [`Patch::deleted_flag`] is part of the
/// contract, not a convenience.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch(Map<String, Value>);

impl Patch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field on the patch.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.0.insert(field.into(), value);
        self
    }

    /// The soft-delete flag carried by this patch, when present.
    pub fn deleted_flag(&self) -> Option<bool> {
        self.0.get(FIELD_IS_DELETED).and_then(Value::as_bool)
    }

    /// Whether the patch names any fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert into a store write payload.
    pub fn into_write_fields(self) -> WriteFields {
        WriteFields::from_object(self.0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn timestamps_round_trip_through_the_wire_object() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 45).unwrap();
        let wire = StoreTimestamp::from_datetime(instant);
        assert_eq!(wire.to_datetime(), Some(instant));
        assert_eq!(wire.to_value(), json!({ "seconds": instant.timestamp(), "nanos": 0 }));
    }

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Stamped {
        #[serde(with = "wire_time")]
        at: DateTime<Utc>,
    }

    #[rstest]
    #[case(json!({ "at": { "seconds": 1_700_000_000, "nanos": 0 } }))]
    #[case(json!({ "at": "2023-11-14T22:13:20Z" }))]
    fn both_wire_forms_decode_to_the_same_instant(#[case] payload: Value) {
        let decoded: Stamped = serde_json::from_value(payload).expect("decodes");
        assert_eq!(decoded.at.timestamp(), 1_700_000_000);
    }

    #[rstest]
    fn documents_decode_typed_records() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Row {
            clients_name: String,
        }

        let mut fields = Map::new();
        fields.insert("clients_name".to_owned(), json!("Ahmed"));
        let doc = Document::new(RecordId::new("c-1"), fields);
        assert_eq!(doc.decode::<Row>().expect("decodes").clients_name, "Ahmed");
        assert!(doc.id().is_assigned());
    }

    #[rstest]
    fn cursor_uses_null_for_missing_order_keys() {
        let doc = Document::new(RecordId::new("c-2"), Map::new());
        let cursor = doc.cursor_for(FIELD_DATE_DELETED);
        assert_eq!(cursor.order_key(), &Value::Null);
        assert_eq!(cursor.record_id(), "c-2");
    }

    #[rstest]
    fn patch_exposes_the_soft_delete_flag() {
        assert_eq!(Patch::new().deleted_flag(), None);
        let patch = Patch::new().with(FIELD_IS_DELETED, json!(true));
        assert_eq!(patch.deleted_flag(), Some(true));
    }

    #[rstest]
    fn write_fields_preserve_sentinels() {
        let fields = WriteFields::new()
            .with_json("clients_name", json!("Ahmed"))
            .with_server_timestamp(FIELD_DATE_UPDATED);
        let sentinel = fields
            .iter()
            .find(|(name, _)| *name == FIELD_DATE_UPDATED)
            .map(|(_, value)| value.clone());
        assert_eq!(sentinel, Some(WriteValue::ServerTimestamp));
    }
}
