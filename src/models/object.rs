//! Represents an object (file) stored in the asset bucket.

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Suffix that marks an object as a label document readable by the gallery.
pub const JSON_SUFFIX: &str = ".json";

/// A single object held in the bucket, payload included.
///
/// `last_modified` is assigned by the storage service on write; callers never
/// choose it.
#[derive(Clone, Debug)]
pub struct StoredObject {
    /// Object key, unique within the bucket.
    pub key: String,

    /// Raw payload bytes.
    pub body: Bytes,

    /// Content type (MIME type) recorded at write time.
    pub content_type: String,

    /// Timestamp when the object was last written.
    pub last_modified: DateTime<Utc>,
}

/// One entry of a bucket listing: the key and when it was last written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub last_modified: DateTime<Utc>,
}

impl ObjectSummary {
    pub fn is_json(&self) -> bool {
        self.key.ends_with(JSON_SUFFIX)
    }
}

impl From<&StoredObject> for ObjectSummary {
    fn from(obj: &StoredObject) -> Self {
        Self {
            key: obj.key.clone(),
            last_modified: obj.last_modified,
        }
    }
}
