//! Progress events pushed to a session listener while an upload runs.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::platform::PlatformName;

/// Per-unit-of-work callback handed to a stage collaborator.
///
/// Receives the stage's own completion in `[0, 100]`.
pub type ProgressFn<'a> = &'a mut (dyn FnMut(f64) + Send);

/// Machine-readable event codes.
pub mod codes {
    use super::PlatformName;

    pub const VIDEO_PROCESSING_START: &str = "video-processing-start";
    pub const VIDEO_PROCESSING_PROGRESS: &str = "video-processing-progress";
    pub const VIDEO_PROCESSING_FINISHED: &str = "video-processing-finished";
    pub const COMPLETED: &str = "completed";
    pub const ERROR: &str = "error";

    pub fn upload_start(platform: PlatformName) -> String {
        format!("upload-{}-start", platform.as_str())
    }

    pub fn upload_progress(platform: PlatformName) -> String {
        format!("upload-{}-progress", platform.as_str())
    }

    pub fn upload_finished(platform: PlatformName) -> String {
        format!("upload-{}-finished", platform.as_str())
    }

    pub fn upload_skipped(platform: PlatformName) -> String {
        format!("upload-{}-skipped", platform.as_str())
    }
}

/// Keys owned by the payload envelope; extras may not shadow them.
const RESERVED_KEYS: [&str; 2] = ["status", "progress"];

/// One overall progress notification.
///
/// Serializes to the push payload `{ status: { code, message }, progress, ...extra }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub code: String,
    pub message: String,
    pub progress: f64,
    pub extra: Map<String, Value>,
}

impl ProgressEvent {
    pub fn new(code: impl Into<String>, message: impl Into<String>, progress: f64) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            progress,
            extra: Map::new(),
        }
    }

    /// Attach an extra payload field. Reserved envelope keys are ignored.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        if !RESERVED_KEYS.contains(&key.as_str()) {
            self.extra.insert(key, value);
        }
        self
    }
}

#[derive(Serialize)]
struct StatusBody<'a> {
    code: &'a str,
    message: &'a str,
}

#[derive(Serialize)]
struct Payload<'a> {
    status: StatusBody<'a>,
    progress: f64,
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

impl Serialize for ProgressEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Payload {
            status: StatusBody {
                code: &self.code,
                message: &self.message,
            },
            progress: self.progress,
            extra: &self.extra,
        }
        .serialize(serializer)
    }
}
