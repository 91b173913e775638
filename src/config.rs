use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{CalcError, CalcResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub calculator: CalculatorOptions,
    #[serde(default)]
    pub conversation: ConversationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorOptions {
    pub height_unit: HeightUnit,
    pub validate_ranges: bool,
    pub max_weight_kg: f64,
    pub height_range_m: (f64, f64), // Accepted heights (min, max) in meters
}

impl Default for CalculatorOptions {
    fn default() -> Self {
        Self {
            height_unit: HeightUnit::Auto,
            validate_ranges: true,
            max_weight_kg: 150.0,
            height_range_m: (1.0, 2.5),
        }
    }
}

/// How a spoken height is read before the weight formulas run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    /// Values up to 3 are meters, anything larger is centimeters.
    Auto,
    Meters,
    Centimeters,
}

impl HeightUnit {
    pub const AUTO_THRESHOLD: f64 = 3.0;

    pub fn to_centimeters(self, height: f64) -> f64 {
        match self {
            HeightUnit::Auto => {
                if height > Self::AUTO_THRESHOLD { height } else { height * 100.0 }
            },
            HeightUnit::Meters => height * 100.0,
            HeightUnit::Centimeters => height,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    pub offer_details: bool, // Ask whether to show the formula after a result
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self { offer_details: true }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> CalcResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CalcResult<()> {
        self.calculator.validate()
    }
}

impl CalculatorOptions {
    pub fn validate(&self) -> CalcResult<()> {
        let (min, max) = self.height_range_m;
        if min <= 0.0 || max <= 0.0 {
            return Err(CalcError::InvalidConfig(
                "Height range bounds must be positive".to_string()
            ));
        }
        if min >= max {
            return Err(CalcError::InvalidConfig(
                format!("Height range is inverted: {} >= {}", min, max)
            ));
        }
        if self.max_weight_kg <= 0.0 {
            return Err(CalcError::InvalidConfig(
                "Maximum weight must be positive".to_string()
            ));
        }
        Ok(())
    }
}
