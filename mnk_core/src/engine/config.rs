use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const K_MINUS_ONE_BONUS: i32 = 100;
pub const K_MINUS_TWO_BONUS: i32 = 30;
pub const K_MINUS_THREE_BONUS: i32 = 15;
pub const WIN_SCORE: i32 = 100_000_000;

// Keeps win scores clear of anything the evaluator can produce.
const MIN_WIN_SCORE: i32 = 1_000_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("safety fraction {0} is outside (0, 1]")]
    SafetyFraction(f64),
    #[error("spiral increment must be positive, got {0}")]
    SpiralIncrement(i32),
    #[error("run bonuses must satisfy k-1 >= k-2 >= k-3 >= 0")]
    BonusOrder,
    #[error("win score {0} is too small, need at least 1000000")]
    WinScore(i32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Time
    pub safety_fraction: f64,

    // Evaluation Parameters
    pub spiral_increment: i32,
    pub k_minus_one_bonus: i32,
    pub k_minus_two_bonus: i32,
    pub k_minus_three_bonus: i32,
    pub win_score: i32,

    // Search Parameters
    pub open_in_center: bool,
    pub tt_capacity: usize,
    pub max_depth: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            safety_fraction: 0.95,

            spiral_increment: 5,
            k_minus_one_bonus: K_MINUS_ONE_BONUS,
            k_minus_two_bonus: K_MINUS_TWO_BONUS,
            k_minus_three_bonus: K_MINUS_THREE_BONUS,
            win_score: WIN_SCORE,

            open_in_center: true,
            tt_capacity: 1 << 16,
            max_depth: None,
        }
    }
}

/// Tuning file format: bonuses are scale factors over the defaults, the
/// rest are absolute values.
#[derive(Deserialize)]
struct EngineConfigJson {
    safety_fraction: Option<f64>,

    spiral_increment: Option<i32>,
    k_minus_one_bonus: Option<f32>,
    k_minus_two_bonus: Option<f32>,
    k_minus_three_bonus: Option<f32>,
    win_score: Option<i32>,

    open_in_center: Option<bool>,
    tt_capacity: Option<usize>,
    max_depth: Option<u32>,
}

impl EngineConfig {
    pub fn load_from_json(json_str: &str) -> Result<Self, ConfigError> {
        let json_config: EngineConfigJson = serde_json::from_str(json_str)?;
        let default = Self::default();

        let config = Self {
            safety_fraction: json_config
                .safety_fraction
                .unwrap_or(default.safety_fraction),

            spiral_increment: json_config
                .spiral_increment
                .unwrap_or(default.spiral_increment),
            k_minus_one_bonus: apply_scale(
                default.k_minus_one_bonus,
                json_config.k_minus_one_bonus,
            ),
            k_minus_two_bonus: apply_scale(
                default.k_minus_two_bonus,
                json_config.k_minus_two_bonus,
            ),
            k_minus_three_bonus: apply_scale(
                default.k_minus_three_bonus,
                json_config.k_minus_three_bonus,
            ),
            win_score: json_config.win_score.unwrap_or(default.win_score),

            open_in_center: json_config
                .open_in_center
                .unwrap_or(default.open_in_center),
            tt_capacity: json_config.tt_capacity.unwrap_or(default.tt_capacity),
            max_depth: json_config.max_depth.or(default.max_depth),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.safety_fraction > 0.0 && self.safety_fraction <= 1.0) {
            return Err(ConfigError::SafetyFraction(self.safety_fraction));
        }
        if self.spiral_increment <= 0 {
            return Err(ConfigError::SpiralIncrement(self.spiral_increment));
        }
        if self.k_minus_three_bonus < 0
            || self.k_minus_two_bonus < self.k_minus_three_bonus
            || self.k_minus_one_bonus < self.k_minus_two_bonus
        {
            return Err(ConfigError::BonusOrder);
        }
        if self.win_score < MIN_WIN_SCORE {
            return Err(ConfigError::WinScore(self.win_score));
        }
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn apply_scale(default_val: i32, scale: Option<f32>) -> i32 {
    scale.map_or(default_val, |s| (default_val as f32 * s) as i32)
}
