//! Parser for ffmpeg's `-progress pipe:1` key=value stream.

/// Converts `out_time_us` reports into a completion percentage of the expected output.
#[derive(Debug, Clone)]
pub struct FfmpegProgressParser {
    expected_duration_us: f64,
    finished: bool,
}

impl FfmpegProgressParser {
    pub fn new(expected_duration_secs: f64) -> Self {
        Self {
            expected_duration_us: expected_duration_secs * 1_000_000.0,
            finished: false,
        }
    }

    /// Feed one line; returns a percentage in `[0, 100]` when the line carries a timestamp.
    pub fn feed(&mut self, line: &str) -> Option<f64> {
        let (key, value) = line.trim().split_once('=')?;
        match key {
            // Older ffmpeg builds report microseconds under the `_ms` key as well.
            "out_time_us" | "out_time_ms" => {
                let micros: f64 = value.trim().parse().ok()?;
                if self.expected_duration_us <= 0.0 || micros < 0.0 {
                    return None;
                }
                Some((micros / self.expected_duration_us * 100.0).clamp(0.0, 100.0))
            }
            "progress" => {
                if value.trim() == "end" {
                    self.finished = true;
                }
                None
            }
            _ => None,
        }
    }

    /// Whether ffmpeg reported `progress=end`.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_out_time() {
        let mut parser = FfmpegProgressParser::new(10.0);
        assert_eq!(parser.feed("out_time_us=2500000"), Some(25.0));
        assert_eq!(parser.feed("out_time_ms=5000000"), Some(50.0));
        assert_eq!(parser.feed("out_time_us=20000000"), Some(100.0));
    }

    #[test]
    fn test_feed_ignores_other_keys() {
        let mut parser = FfmpegProgressParser::new(10.0);
        assert_eq!(parser.feed("frame=120"), None);
        assert_eq!(parser.feed("out_time=00:00:01.000000"), None);
        assert_eq!(parser.feed("out_time_us=N/A"), None);
        assert_eq!(parser.feed("garbage"), None);
    }

    #[test]
    fn test_progress_end() {
        let mut parser = FfmpegProgressParser::new(10.0);
        assert!(parser.feed("progress=continue").is_none());
        assert!(!parser.is_finished());
        parser.feed("progress=end");
        assert!(parser.is_finished());
    }

    #[test]
    fn test_zero_duration_reports_nothing() {
        let mut parser = FfmpegProgressParser::new(0.0);
        assert_eq!(parser.feed("out_time_us=1000"), None);
    }
}
