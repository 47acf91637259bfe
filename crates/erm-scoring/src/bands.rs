//! Qualitative risk bands

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ScoringError, ScoringResult};
use crate::grid::{MAX_CELL_VALUE, TWO_BY_TWO_VALUE};

/// Ordered qualitative band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskBand {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskBand {
    pub const ALL: [RiskBand; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scale a score is expressed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskScale {
    /// 0..=100, percentage of the maximum grid value
    PercentOfMax,
    /// 0..=25, raw `probability × impact`
    RawProduct,
}

impl RiskScale {
    pub fn max_score(&self) -> f64 {
        match self {
            Self::PercentOfMax => 100.0,
            Self::RawProduct => MAX_CELL_VALUE,
        }
    }

    /// Express a raw product score on this scale
    pub fn from_raw(&self, raw: f64) -> f64 {
        match self {
            Self::PercentOfMax => raw / MAX_CELL_VALUE * 100.0,
            Self::RawProduct => raw,
        }
    }
}

/// Display labels per band
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandLabels {
    pub low: String,
    pub medium: String,
    pub high: String,
    pub critical: String,
}

impl BandLabels {
    pub fn get(&self, band: RiskBand) -> &str {
        match band {
            RiskBand::Low => &self.low,
            RiskBand::Medium => &self.medium,
            RiskBand::High => &self.high,
            RiskBand::Critical => &self.critical,
        }
    }
}

/// Step function with inclusive upper bounds: `score <= low_max` is LOW,
/// `score <= medium_max` is MEDIUM, `score <= high_max` is HIGH, anything
/// above is CRITICAL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandTable {
    pub low_max: f64,
    pub medium_max: f64,
    pub high_max: f64,
    pub labels: BandLabels,
}

impl BandTable {
    pub fn percent_default() -> Self {
        Self {
            low_max: 25.0,
            medium_max: 50.0,
            high_max: 75.0,
            labels: BandLabels {
                low: "LOW".into(),
                medium: "MEDIUM".into(),
                high: "HIGH".into(),
                critical: "CRITICAL".into(),
            },
        }
    }

    pub fn raw_default() -> Self {
        Self {
            low_max: TWO_BY_TWO_VALUE,
            medium_max: 9.0,
            high_max: 19.99,
            labels: BandLabels {
                low: "LOW LEVEL".into(),
                medium: "MEDIUM LEVEL".into(),
                high: "HIGH LEVEL".into(),
                critical: "CRITICAL LEVEL".into(),
            },
        }
    }

    /// Total over every `f64`; NaN lands in the top band
    pub fn band_for(&self, score: f64) -> RiskBand {
        if score.is_nan() {
            RiskBand::Critical
        } else if score <= self.low_max {
            RiskBand::Low
        } else if score <= self.medium_max {
            RiskBand::Medium
        } else if score <= self.high_max {
            RiskBand::High
        } else {
            RiskBand::Critical
        }
    }

    pub fn label(&self, band: RiskBand) -> &str {
        self.labels.get(band)
    }

    pub fn validate(&self, scale: RiskScale) -> ScoringResult<()> {
        let bounds = [self.low_max, self.medium_max, self.high_max];
        if bounds.iter().any(|b| !b.is_finite() || *b < 0.0) {
            return Err(ScoringError::InvalidBandTable(
                "thresholds must be finite and non-negative".into(),
            ));
        }
        if !(self.low_max < self.medium_max && self.medium_max < self.high_max) {
            return Err(ScoringError::InvalidBandTable(format!(
                "thresholds must be strictly increasing, got {} / {} / {}",
                self.low_max, self.medium_max, self.high_max
            )));
        }
        if self.high_max >= scale.max_score() {
            return Err(ScoringError::InvalidBandTable(format!(
                "high threshold {} leaves no room for CRITICAL below {}",
                self.high_max,
                scale.max_score()
            )));
        }
        Ok(())
    }
}

/// One table per scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandTables {
    pub percent: BandTable,
    pub raw: BandTable,
}

impl BandTables {
    pub fn table(&self, scale: RiskScale) -> &BandTable {
        match scale {
            RiskScale::PercentOfMax => &self.percent,
            RiskScale::RawProduct => &self.raw,
        }
    }

    pub fn validate(&self) -> ScoringResult<()> {
        self.percent.validate(RiskScale::PercentOfMax)?;
        self.raw.validate(RiskScale::RawProduct)
    }
}

impl Default for BandTables {
    fn default() -> Self {
        Self {
            percent: BandTable::percent_default(),
            raw: BandTable::raw_default(),
        }
    }
}

/// Classify a score already expressed on `scale`
pub fn classify(score: f64, scale: RiskScale, tables: &BandTables) -> RiskBand {
    tables.table(scale).band_for(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_boundaries_are_inclusive() {
        let tables = BandTables::default();
        let pct = RiskScale::PercentOfMax;
        assert_eq!(classify(0.0, pct, &tables), RiskBand::Low);
        assert_eq!(classify(25.0, pct, &tables), RiskBand::Low);
        assert_eq!(classify(25.01, pct, &tables), RiskBand::Medium);
        assert_eq!(classify(50.0, pct, &tables), RiskBand::Medium);
        assert_eq!(classify(75.0, pct, &tables), RiskBand::High);
        assert_eq!(classify(75.5, pct, &tables), RiskBand::Critical);
        assert_eq!(classify(100.0, pct, &tables), RiskBand::Critical);
    }

    #[test]
    fn test_raw_defaults() {
        let tables = BandTables::default();
        let raw = RiskScale::RawProduct;
        assert_eq!(classify(3.0, raw, &tables), RiskBand::Low);
        // cell (2,2) stands for 3.99
        assert_eq!(classify(3.99, raw, &tables), RiskBand::Low);
        assert_eq!(classify(4.0, raw, &tables), RiskBand::Medium);
        assert_eq!(classify(9.0, raw, &tables), RiskBand::Medium);
        assert_eq!(classify(10.0, raw, &tables), RiskBand::High);
        assert_eq!(classify(12.5714, raw, &tables), RiskBand::High);
        assert_eq!(classify(18.0, raw, &tables), RiskBand::High);
        assert_eq!(classify(19.99, raw, &tables), RiskBand::High);
        assert_eq!(classify(20.0, raw, &tables), RiskBand::Critical);
        assert_eq!(classify(25.0, raw, &tables), RiskBand::Critical);
        assert_eq!(tables.raw.label(RiskBand::Critical), "CRITICAL LEVEL");
    }

    #[test]
    fn test_degenerate_scores_are_total() {
        let table = BandTable::percent_default();
        assert_eq!(table.band_for(f64::NAN), RiskBand::Critical);
        assert_eq!(table.band_for(f64::INFINITY), RiskBand::Critical);
        assert_eq!(table.band_for(-3.0), RiskBand::Low);
    }

    #[test]
    fn test_raw_to_percent() {
        assert_eq!(RiskScale::PercentOfMax.from_raw(25.0), 100.0);
        assert!((RiskScale::PercentOfMax.from_raw(20.0 / 3.0) - 26.666).abs() < 1e-2);
        assert_eq!(RiskScale::RawProduct.from_raw(7.5), 7.5);
    }

    #[test]
    fn test_validate_rejects_unordered_thresholds() {
        let mut table = BandTable::raw_default();
        table.medium_max = 2.0;
        assert!(matches!(
            table.validate(RiskScale::RawProduct),
            Err(ScoringError::InvalidBandTable(_))
        ));
        table.medium_max = 9.0;
        table.high_max = 25.0;
        assert!(table.validate(RiskScale::RawProduct).is_err());
    }
}
