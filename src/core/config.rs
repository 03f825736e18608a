//! Engine configuration with documented constants
//!
//! All tunable values are collected here with explanations of their purpose.
//! Everything is fixed at construction time; nothing is hot-reloadable
//! mid-session.

use serde::{Deserialize, Serialize};

/// Configuration for the telemetry and analysis components
///
/// The window sizes mirror the values the engine was originally tuned
/// against. They are tunable, not load-bearing: treat them as defaults,
/// not as validated design constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    // === THROUGHPUT WINDOWS ===
    /// Trailing window for "current" DPS, in seconds
    ///
    /// Current DPS answers "how hard am I hitting right now". Five
    /// seconds is wide enough to smooth over cooldown gaps between
    /// ability uses.
    pub current_window_secs: f64,

    /// Subwindow for burst DPS, in seconds
    ///
    /// Burst DPS is the peak damage rate over any trailing window of
    /// this width. Three seconds captures a single cooldown-stacked
    /// opener without averaging it away.
    pub burst_window_secs: f64,

    /// Bucket width for trend analysis, in seconds
    ///
    /// Damage is bucketed into fixed slices of this width; trend
    /// direction compares the first third of buckets to the last third.
    pub trend_bucket_secs: f64,

    // === EFFICIENCY SCORING ===
    /// DPS value that counts as a "perfect" throughput contribution
    ///
    /// The DPS term of the efficiency score saturates at this ceiling.
    pub dps_ceiling: f64,

    /// XP-per-hour value that counts as a "perfect" progression contribution
    pub xp_ceiling: f64,

    /// Number of distinct abilities that counts as full rotation diversity
    pub ability_diversity_target: usize,

    // === ROTATION ANALYSIS ===
    /// Corpus-wide usage share below which an ability is a dead skill
    ///
    /// At the default (0.05), an ability used in fewer than 5% of all
    /// recorded ability invocations is flagged for review.
    pub dead_skill_threshold: f64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            current_window_secs: 5.0,
            burst_window_secs: 3.0,
            trend_bucket_secs: 10.0,
            dps_ceiling: 200.0,
            xp_ceiling: 5000.0,
            ability_diversity_target: 8,
            dead_skill_threshold: 0.05,
        }
    }
}

impl TelemetryConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text (missing fields fall back to defaults)
    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        let config: Self =
            toml::from_str(text).map_err(|e| format!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.current_window_secs <= 0.0 || self.burst_window_secs <= 0.0 {
            return Err("DPS windows must be positive".into());
        }

        // A burst wider than the current window stops measuring "burst"
        if self.burst_window_secs > self.current_window_secs {
            return Err(format!(
                "burst_window_secs ({}) should be <= current_window_secs ({})",
                self.burst_window_secs, self.current_window_secs
            ));
        }

        if self.trend_bucket_secs <= 0.0 {
            return Err("trend_bucket_secs must be positive".into());
        }

        if self.dps_ceiling <= 0.0 || self.xp_ceiling <= 0.0 {
            return Err("Efficiency ceilings must be positive".into());
        }

        if self.ability_diversity_target == 0 {
            return Err("ability_diversity_target must be at least 1".into());
        }

        if !(0.0..=1.0).contains(&self.dead_skill_threshold) {
            return Err(format!(
                "dead_skill_threshold ({}) must be within [0, 1]",
                self.dead_skill_threshold
            ));
        }

        Ok(())
    }
}
