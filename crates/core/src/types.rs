/// Surrogate primary keys of persisted prediction rows are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Crew records are keyed by UUID.
pub type SubjectId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
