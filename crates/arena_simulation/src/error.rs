//! Configuration errors.
//!
//! Only construction and configuration can fail. Per-tick operations are total:
//! rejected skills, missing components and degenerate geometry are ordinary
//! values (`Err(SkillRejected)`, `None`, zero vectors), never `ConfigError`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("AI ranges must satisfy retreat <= preferred <= chase (got retreat={retreat}, preferred={preferred}, chase={chase})")]
    RangeOrder {
        retreat: f32,
        preferred: f32,
        chase: f32,
    },

    #[error("`{field}` must be finite and non-negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("max health must be positive, got {0}")]
    NonPositiveMaxHealth(f32),

    #[error("skill `{0}` is registered twice on the same owner")]
    DuplicateSkill(String),

    #[error("steering smoothing must be in (0, 1], got {0}")]
    Smoothing(f32),

    #[error("failed to parse tuning: {0}")]
    Parse(#[from] ron::de::SpannedError),
}

/// Rejects NaN, infinities and negative values for a named field.
pub(crate) fn non_negative(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Negative { field, value })
    }
}
