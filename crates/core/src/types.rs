/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Monetary amounts in minor currency units (satang).
pub type Money = i64;

/// Deserialize a PATCH-style field that tells "absent" apart from `null`.
///
/// Use as `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>`. An absent field is `None` and keeps the stored
/// value, `null` is `Some(None)` and clears it.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}
