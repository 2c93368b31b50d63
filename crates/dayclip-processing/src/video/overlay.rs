//! "Day N" overlay and speed-up filter graph.

const FONT_SIZE: u32 = 240;
const TOP_Y: u32 = 50;
const MOVE_SECONDS: f64 = 1.0;
const MIN_OVERLAY_SECONDS: f64 = 3.5;
/// atempo accepts at most this factor per instance.
const MAX_ATEMPO: f64 = 100.0;

/// Timing of the overlay and speed factor derived from the source duration.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPlan {
    pub day_label: i64,
    pub source_duration: f64,
    /// Integer speed-up factor (1 = unchanged).
    pub speed: u32,
    /// Seconds (source timeline) the label stays centred before sliding up.
    pub hold_seconds: f64,
    /// Seconds (source timeline) the label is visible.
    pub visible_seconds: f64,
}

impl OverlayPlan {
    /// Clips longer than `target_seconds` are sped up by the rounded ratio so the
    /// result lands near the target length.
    pub fn new(day_label: i64, source_duration: f64, target_seconds: f64) -> Self {
        let speed = if source_duration > target_seconds {
            ((source_duration / target_seconds).round() as u32).max(1)
        } else {
            1
        };
        let speed_f = f64::from(speed);

        Self {
            day_label,
            source_duration,
            speed,
            hold_seconds: speed_f * 0.3,
            visible_seconds: MIN_OVERLAY_SECONDS.max(source_duration * speed_f * 0.1),
        }
    }

    /// Expected duration of the encoded output, in seconds.
    pub fn output_duration(&self) -> f64 {
        self.source_duration / f64::from(self.speed)
    }

    /// Video filter chain (`-vf`).
    pub fn video_filter(&self, font_path: &str) -> String {
        let center_y = "h/2-text_h/2";
        let hold = self.hold_seconds;
        let moved = hold + MOVE_SECONDS;
        let y = format!(
            "if(lt(t,{hold}), {center_y}, if(lt(t,{moved}), {center_y}-(t-{hold})*({center_y}-{top})/{mv}, {top}))",
            hold = hold,
            moved = moved,
            center_y = center_y,
            top = TOP_Y,
            mv = MOVE_SECONDS,
        );

        let drawtext = [
            format!("drawtext=text='Day {}'", self.day_label),
            format!("fontsize={}", FONT_SIZE),
            "fontcolor=white".to_string(),
            "x=(w-text_w)/2".to_string(),
            format!("y='{}'", y),
            "shadowcolor=black@0.7".to_string(),
            "shadowx=3".to_string(),
            "shadowy=3".to_string(),
            format!("fontfile={}", escape_filter_value(font_path)),
            format!("enable='lt(t,{})'", self.visible_seconds),
        ]
        .join(":");

        format!("{},setpts=PTS/{}", drawtext, self.speed)
    }

    /// Audio filter chain (`-af`), splitting large factors across several atempo stages.
    pub fn audio_filter(&self) -> String {
        let mut remaining = f64::from(self.speed);
        let mut stages = Vec::new();
        while remaining > MAX_ATEMPO {
            stages.push(format!("atempo={}", MAX_ATEMPO));
            remaining /= MAX_ATEMPO;
        }
        stages.push(format!("atempo={}", remaining));
        stages.join(",")
    }
}

/// Escape characters that are significant inside a filter option value.
fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}
