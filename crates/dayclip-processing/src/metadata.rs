//! Media metadata extracted by ffprobe.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Duration in seconds
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub codec: String,
    pub framerate: Option<f32>,
    pub has_audio: bool,
}
