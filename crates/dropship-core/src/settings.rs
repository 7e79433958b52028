use std::ops::RangeInclusive;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::content::Platform;
use crate::ConfigError;

const POSTING_FREQUENCY_RANGE: RangeInclusive<u32> = 1..=20;
const ANALYSIS_INTERVAL_RANGE: RangeInclusive<u32> = 1..=24;
const BUDGET_LIMIT_RANGE: RangeInclusive<i64> = 100..=50_000;
const PROFIT_THRESHOLD_RANGE: RangeInclusive<i64> = 100..=10_000;

/// Knobs of the automation loop.
///
/// The engine applies partial updates without cross-field checks; range
/// validation happens at the edges ([`SettingsPatch::validate`] and
/// [`load_settings`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationSettings {
    /// Posts per day.
    pub content_posting_frequency: u32,
    /// Hours between trend-analysis refreshes.
    pub trend_analysis_interval_hours: u32,
    /// Aggregate spend across all campaigns that trips the pause breaker.
    pub budget_limit: Decimal,
    /// Per-campaign profit above which a milestone is reported.
    pub profit_threshold: Decimal,
    pub niches: Vec<String>,
    pub platforms: Vec<Platform>,
    pub auto_approve_content: bool,
    pub auto_create_products: bool,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            content_posting_frequency: 5,
            trend_analysis_interval_hours: 2,
            budget_limit: Decimal::from(10_000),
            profit_threshold: Decimal::from(1_000),
            niches: vec![
                "Korean Beauty & Skincare".to_string(),
                "Kitchen Problem Solvers".to_string(),
                "Phone & Tech Accessories".to_string(),
            ],
            platforms: vec![Platform::TikTok, Platform::Instagram],
            auto_approve_content: true,
            auto_create_products: true,
        }
    }
}

impl AutomationSettings {
    /// Shallow-merge the fields present in `patch`; absent fields are untouched.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.content_posting_frequency {
            self.content_posting_frequency = v;
        }
        if let Some(v) = patch.trend_analysis_interval_hours {
            self.trend_analysis_interval_hours = v;
        }
        if let Some(v) = patch.budget_limit {
            self.budget_limit = v;
        }
        if let Some(v) = patch.profit_threshold {
            self.profit_threshold = v;
        }
        if let Some(v) = patch.niches {
            self.niches = v;
        }
        if let Some(v) = patch.platforms {
            self.platforms = v;
        }
        if let Some(v) = patch.auto_approve_content {
            self.auto_approve_content = v;
        }
        if let Some(v) = patch.auto_create_products {
            self.auto_create_products = v;
        }
    }

    /// Check every numeric field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first out-of-range field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        SettingsPatch::from(self.clone()).validate()
    }
}

/// A partial update to [`AutomationSettings`]. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_posting_frequency: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_analysis_interval_hours: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_limit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_threshold: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub niches: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<Platform>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_approve_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_create_products: Option<bool>,
}

impl SettingsPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Range-check the fields present in the patch; absent fields pass.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first out-of-range field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(v) = self.content_posting_frequency {
            check_range("content_posting_frequency", v, &POSTING_FREQUENCY_RANGE)?;
        }
        if let Some(v) = self.trend_analysis_interval_hours {
            check_range("trend_analysis_interval_hours", v, &ANALYSIS_INTERVAL_RANGE)?;
        }
        if let Some(v) = self.budget_limit {
            check_decimal_range("budget_limit", v, &BUDGET_LIMIT_RANGE)?;
        }
        if let Some(v) = self.profit_threshold {
            check_decimal_range("profit_threshold", v, &PROFIT_THRESHOLD_RANGE)?;
        }
        Ok(())
    }
}

impl From<AutomationSettings> for SettingsPatch {
    fn from(s: AutomationSettings) -> Self {
        Self {
            content_posting_frequency: Some(s.content_posting_frequency),
            trend_analysis_interval_hours: Some(s.trend_analysis_interval_hours),
            budget_limit: Some(s.budget_limit),
            profit_threshold: Some(s.profit_threshold),
            niches: Some(s.niches),
            platforms: Some(s.platforms),
            auto_approve_content: Some(s.auto_approve_content),
            auto_create_products: Some(s.auto_create_products),
        }
    }
}

fn check_range(field: &str, value: u32, range: &RangeInclusive<u32>) -> Result<(), ConfigError> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(ConfigError::Validation(format!(
        "{field} must be between {} and {}, got {value}",
        range.start(),
        range.end()
    )))
}

fn check_decimal_range(
    field: &str,
    value: Decimal,
    range: &RangeInclusive<i64>,
) -> Result<(), ConfigError> {
    if value >= Decimal::from(*range.start()) && value <= Decimal::from(*range.end()) {
        return Ok(());
    }
    Err(ConfigError::Validation(format!(
        "{field} must be between {} and {}, got {value}",
        range.start(),
        range.end()
    )))
}

/// Load initial automation settings from a YAML file.
///
/// The file is read as a [`SettingsPatch`] layered over the defaults, so it
/// only needs to name the fields it changes. The merged result is validated.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_settings(path: &Path) -> Result<AutomationSettings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SettingsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let patch: SettingsPatch = serde_yaml::from_str(&content)?;

    let mut settings = AutomationSettings::default();
    settings.apply(patch);
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
