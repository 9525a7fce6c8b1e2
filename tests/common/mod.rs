#![allow(dead_code)]

use asset_gallery::{
    models::{analysis::LabelRecord, object::{ObjectSummary, StoredObject}},
    services::{
        recognition_service::{
            LabelDetector, NotificationTarget, RecognitionError, RecognitionResult,
        },
        storage_service::{ObjectStore, StorageError, StorageResult},
    },
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::{
    collections::{BTreeMap, HashSet},
    sync::Mutex,
};

pub const TEST_BUCKET: &str = "test-gallery";

pub fn test_target() -> NotificationTarget {
    NotificationTarget {
        topic_arn: "arn:aws:sns:us-east-1:123456789012:video-labels".into(),
        role_arn: "arn:aws:iam::123456789012:role/rekognition-sns".into(),
    }
}

/// Fixed base time for seeded objects.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 17, 14, 3, 9).unwrap() + Duration::microseconds(42_987)
}

/// In-memory bucket. Writes are recorded in order; reads and listings can be
/// forced to fail.
#[derive(Default)]
pub struct InMemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    puts: Mutex<Vec<String>>,
    failing_gets: Mutex<HashSet<String>>,
    fail_list: Mutex<bool>,
    fail_puts_after: Mutex<Option<usize>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object directly, bypassing write recording.
    pub fn seed(&self, key: &str, body: impl Into<Bytes>, last_modified: DateTime<Utc>) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                key: key.to_string(),
                body: body.into(),
                content_type: "application/json".into(),
                last_modified,
            },
        );
    }

    pub fn fail_get(&self, key: &str) {
        self.failing_gets.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_list(&self) {
        *self.fail_list.lock().unwrap() = true;
    }

    /// Let `n` writes succeed, then fail every later one.
    pub fn fail_puts_after(&self, n: usize) {
        *self.fail_puts_after.lock().unwrap() = Some(n);
    }

    pub fn put_keys(&self) -> Vec<String> {
        self.puts.lock().unwrap().clone()
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    fn bucket(&self) -> &str {
        TEST_BUCKET
    }

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> StorageResult<()> {
        let limit = *self.fail_puts_after.lock().unwrap();
        let mut puts = self.puts.lock().unwrap();
        if limit.is_some_and(|n| puts.len() >= n) {
            return Err(StorageError::Put {
                key: key.to_string(),
                message: "simulated outage".into(),
            });
        }
        puts.push(key.to_string());

        let mut objects = self.objects.lock().unwrap();
        let last_modified = base_time() + Duration::seconds(objects.len() as i64);
        objects.insert(
            key.to_string(),
            StoredObject {
                key: key.to_string(),
                body,
                content_type: content_type.to_string(),
                last_modified,
            },
        );
        Ok(())
    }

    async fn get_object(&self, key: &str) -> StorageResult<Bytes> {
        if self.failing_gets.lock().unwrap().contains(key) {
            return Err(StorageError::Get {
                key: key.to_string(),
                message: "access denied".into(),
            });
        }
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|obj| obj.body.clone())
            .ok_or_else(|| StorageError::Get {
                key: key.to_string(),
                message: "no such key".into(),
            })
    }

    async fn list_objects(&self) -> StorageResult<Vec<ObjectSummary>> {
        if *self.fail_list.lock().unwrap() {
            return Err(StorageError::List {
                bucket: TEST_BUCKET.to_string(),
                message: "listing unavailable".into(),
            });
        }
        Ok(self
            .objects
            .lock()
            .unwrap()
            .values()
            .map(ObjectSummary::from)
            .collect())
    }
}

/// Label detector double recording every call.
#[derive(Default)]
pub struct FakeDetector {
    pub image_labels: Vec<LabelRecord>,
    pub job_id: Option<String>,
    pub fail: bool,
    image_calls: Mutex<Vec<(String, usize)>>,
    video_calls: Mutex<Vec<(String, f32, NotificationTarget)>>,
}

impl FakeDetector {
    pub fn with_labels(labels: Vec<LabelRecord>) -> Self {
        Self {
            image_labels: labels,
            ..Self::default()
        }
    }

    pub fn with_job(job_id: &str) -> Self {
        Self {
            job_id: Some(job_id.to_string()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn image_calls(&self) -> Vec<(String, usize)> {
        self.image_calls.lock().unwrap().clone()
    }

    pub fn video_calls(&self) -> Vec<(String, f32, NotificationTarget)> {
        self.video_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LabelDetector for FakeDetector {
    async fn detect_image_labels(
        &self,
        key: &str,
        max_labels: usize,
    ) -> RecognitionResult<Vec<LabelRecord>> {
        self.image_calls
            .lock()
            .unwrap()
            .push((key.to_string(), max_labels));
        if self.fail {
            return Err(RecognitionError::DetectLabels {
                key: key.to_string(),
                message: "throttled".into(),
            });
        }
        Ok(self.image_labels.clone())
    }

    async fn start_video_label_detection(
        &self,
        key: &str,
        min_confidence: f32,
        notify: &NotificationTarget,
    ) -> RecognitionResult<String> {
        self.video_calls
            .lock()
            .unwrap()
            .push((key.to_string(), min_confidence, notify.clone()));
        if self.fail {
            return Err(RecognitionError::StartLabelDetection {
                key: key.to_string(),
                message: "video too long".into(),
            });
        }
        self.job_id
            .clone()
            .ok_or_else(|| RecognitionError::MissingJobId {
                key: key.to_string(),
            })
    }
}

pub fn label(name: &str, confidence: f64) -> LabelRecord {
    LabelRecord {
        name: name.to_string(),
        confidence,
    }
}
