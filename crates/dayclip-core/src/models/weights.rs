//! Overall progress budget per pipeline stage.

use std::collections::HashMap;

use super::platform::PlatformName;

const START_PROGRESS: f64 = 10.0;
const TRANSFORM_END_PROGRESS: f64 = 50.0;
const DEFAULT_PLATFORM_WEIGHT: f64 = 15.0;

/// Reserved slices of the overall 0–100 range.
///
/// The run starts at `start`, the transform stage spans `[start, transform_end]`
/// and every known platform then owns `weight(platform)` points, whether or not
/// it was requested. The final `completed` event is always pinned to 100.
#[derive(Debug, Clone, PartialEq)]
pub struct StageWeights {
    pub start: f64,
    pub transform_end: f64,
    platforms: HashMap<PlatformName, f64>,
}

impl Default for StageWeights {
    fn default() -> Self {
        Self {
            start: START_PROGRESS,
            transform_end: TRANSFORM_END_PROGRESS,
            platforms: PlatformName::ALL
                .iter()
                .map(|p| (*p, DEFAULT_PLATFORM_WEIGHT))
                .collect(),
        }
    }
}

impl StageWeights {
    pub fn with_platform_weights(platforms: HashMap<PlatformName, f64>) -> Self {
        Self {
            platforms,
            ..Self::default()
        }
    }

    /// Parse `youtube=15,instagram=15,tiktok=15`. Platforms left out keep the default weight.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut weights = Self::default();
        for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (name, value) = entry
                .split_once('=')
                .ok_or_else(|| format!("Invalid platform weight '{}': expected name=value", entry))?;
            let platform: PlatformName = name.parse().map_err(|e| format!("{}", e))?;
            let weight: f64 = value
                .trim()
                .parse()
                .map_err(|_| format!("Invalid weight for {}: '{}'", platform, value.trim()))?;
            weights.platforms.insert(platform, weight);
        }
        Ok(weights)
    }

    pub fn weight(&self, platform: PlatformName) -> f64 {
        self.platforms
            .get(&platform)
            .copied()
            .unwrap_or(DEFAULT_PLATFORM_WEIGHT)
    }

    /// Progress reached once every platform slice has been consumed.
    pub fn publishing_end(&self) -> f64 {
        self.transform_end
            + PlatformName::ALL
                .iter()
                .map(|p| self.weight(*p))
                .sum::<f64>()
    }

    /// Map transform progress `p ∈ [0, 100]` into `[start, transform_end]`.
    pub fn transform_progress(&self, p: f64) -> f64 {
        self.start + clamp_percent(p) * (self.transform_end - self.start) / 100.0
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=self.transform_end).contains(&self.start) || self.transform_end > 100.0 {
            return Err(format!(
                "Invalid transform range [{}, {}]",
                self.start, self.transform_end
            ));
        }
        for platform in PlatformName::ALL {
            let weight = self
                .platforms
                .get(&platform)
                .ok_or_else(|| format!("Missing progress weight for {}", platform))?;
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(format!("Weight for {} must be positive", platform));
            }
        }
        if self.publishing_end() > 100.0 {
            return Err(format!(
                "Stage weights exceed 100 (publishing ends at {})",
                self.publishing_end()
            ));
        }
        Ok(())
    }
}

/// Clamp a stage-local percentage into `[0, 100]`; NaN counts as 0.
pub fn clamp_percent(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_slices() {
        let weights = StageWeights::default();
        assert_eq!(weights.transform_progress(0.0), 10.0);
        assert_eq!(weights.transform_progress(50.0), 30.0);
        assert_eq!(weights.transform_progress(100.0), 50.0);
        assert_eq!(weights.weight(PlatformName::Instagram), 15.0);
        assert_eq!(weights.publishing_end(), 95.0);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_transform_progress_is_clamped() {
        let weights = StageWeights::default();
        assert_eq!(weights.transform_progress(-5.0), 10.0);
        assert_eq!(weights.transform_progress(250.0), 50.0);
        assert_eq!(weights.transform_progress(f64::NAN), 10.0);
    }

    #[test]
    fn test_parse_overrides() {
        let weights = StageWeights::parse("youtube=30, tiktok=10").expect("parse");
        assert_eq!(weights.weight(PlatformName::Youtube), 30.0);
        assert_eq!(weights.weight(PlatformName::Instagram), 15.0);
        assert_eq!(weights.weight(PlatformName::Tiktok), 10.0);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(StageWeights::parse("youtube").is_err());
        assert!(StageWeights::parse("vimeo=10").is_err());
        assert!(StageWeights::parse("youtube=abc").is_err());
    }

    #[test]
    fn test_validate_rejects_overflow() {
        let weights = StageWeights::parse("youtube=40").expect("parse");
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        let weights = StageWeights::parse("instagram=0").expect("parse");
        assert!(weights.validate().is_err());
    }
}
