//! Relative change of the mean log-return across the break.
use serde::{Deserialize, Serialize};

/// Baseline magnitude at or below which a percentage change is undefined.
pub const EFFECT_FLOOR: f64 = 1e-8;

/// Percentage change `(after − before) / |before| × 100`.
///
/// `NotComputable` replaces a NaN sentinel when the baseline mean is
/// (numerically) zero. Serializes as a nullable number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum EffectSize {
    Computable(f64),
    NotComputable,
}

impl EffectSize {
    pub fn percent_change(before: f64, after: f64) -> Self {
        if !before.is_finite() || !after.is_finite() || before.abs() <= EFFECT_FLOOR {
            return EffectSize::NotComputable;
        }
        EffectSize::Computable((after - before) / before.abs() * 100.0)
    }

    pub fn value(&self) -> Option<f64> {
        match *self {
            EffectSize::Computable(v) => Some(v),
            EffectSize::NotComputable => None,
        }
    }

    pub fn is_computable(&self) -> bool {
        matches!(self, EffectSize::Computable(_))
    }
}

impl From<EffectSize> for Option<f64> {
    fn from(effect: EffectSize) -> Self {
        effect.value()
    }
}

impl From<Option<f64>> for EffectSize {
    fn from(value: Option<f64>) -> Self {
        value.map_or(EffectSize::NotComputable, EffectSize::Computable)
    }
}

impl std::fmt::Display for EffectSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EffectSize::Computable(v) => write!(f, "{v:.2}%"),
            EffectSize::NotComputable => write!(f, "not computable"),
        }
    }
}
