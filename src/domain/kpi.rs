//! KPI domain types.
//!
//! A KPI is always derived: the aggregator builds fresh records on every
//! call and nothing here is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The seven indicators, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KpiCategory {
    /// First Response Time.
    Frt,
    /// Time To Resolve.
    Ttr,
    /// Share of tickets without an SLA breach.
    SlaCompliance,
    /// Mean SLA star rating.
    SlaAverage,
    /// First Contact Resolution.
    Fcr,
    /// Fast Reply Rate.
    Frrt,
    /// Share of escalated tickets.
    Escalations,
}

impl KpiCategory {
    /// Fixed output order of the aggregator.
    pub const ALL: [KpiCategory; 7] = [
        KpiCategory::Frt,
        KpiCategory::Ttr,
        KpiCategory::SlaCompliance,
        KpiCategory::SlaAverage,
        KpiCategory::Fcr,
        KpiCategory::Frrt,
        KpiCategory::Escalations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KpiCategory::Frt => "FRT",
            KpiCategory::Ttr => "TTR",
            KpiCategory::SlaCompliance => "SLA_COMPLIANCE",
            KpiCategory::SlaAverage => "SLA_AVERAGE",
            KpiCategory::Fcr => "FCR",
            KpiCategory::Frrt => "FRRT",
            KpiCategory::Escalations => "ESCALATIONS",
        }
    }

    /// Static name, unit, direction and thresholds of this indicator.
    pub fn definition(&self) -> KpiDefinition {
        use Direction::{HigherIsBetter, LowerIsBetter};

        match self {
            KpiCategory::Frt => KpiDefinition {
                name: "First Response Time",
                description: "Average time until the first reply to a ticket",
                unit: KpiUnit::Hours,
                direction: LowerIsBetter,
                thresholds: KpiThresholds::new(2.0, 3.0, 4.0, 48.0),
            },
            KpiCategory::Ttr => KpiDefinition {
                name: "Time to Resolve",
                description: "Average time to resolve a ticket",
                unit: KpiUnit::Hours,
                direction: LowerIsBetter,
                thresholds: KpiThresholds::new(24.0, 36.0, 48.0, 72.0),
            },
            KpiCategory::SlaCompliance => KpiDefinition {
                name: "SLA Compliance",
                description: "Percentage of tickets that met their SLA",
                unit: KpiUnit::Percentage,
                direction: HigherIsBetter,
                thresholds: KpiThresholds::new(95.0, 90.0, 80.0, 70.0),
            },
            KpiCategory::SlaAverage => KpiDefinition {
                name: "SLA Average",
                description: "Average SLA compliance rating",
                unit: KpiUnit::Stars,
                direction: HigherIsBetter,
                thresholds: KpiThresholds::new(4.5, 4.0, 3.5, 3.0),
            },
            KpiCategory::Fcr => KpiDefinition {
                name: "First Contact Resolution",
                description: "Percentage of tickets resolved on first contact",
                unit: KpiUnit::Percentage,
                direction: HigherIsBetter,
                thresholds: KpiThresholds::new(70.0, 60.0, 50.0, 45.0),
            },
            KpiCategory::Frrt => KpiDefinition {
                name: "Fast Reply Rate",
                description: "Percentage of tickets answered within the fast reply window",
                unit: KpiUnit::Percentage,
                direction: HigherIsBetter,
                thresholds: KpiThresholds::new(80.0, 70.0, 60.0, 50.0),
            },
            KpiCategory::Escalations => KpiDefinition {
                name: "Escalations",
                description: "Percentage of escalated tickets",
                unit: KpiUnit::Percentage,
                direction: LowerIsBetter,
                thresholds: KpiThresholds::new(10.0, 15.0, 20.0, 25.0),
            },
        }
    }
}

impl std::fmt::Display for KpiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health classification of a KPI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum KpiStatus {
    Excellent,
    Good,
    Warning,
    Critical,
}

impl std::fmt::Display for KpiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KpiStatus::Excellent => write!(f, "excellent"),
            KpiStatus::Good => write!(f, "good"),
            KpiStatus::Warning => write!(f, "warning"),
            KpiStatus::Critical => write!(f, "critical"),
        }
    }
}

/// Unit a KPI value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum KpiUnit {
    Hours,
    Minutes,
    Percentage,
    Stars,
    Count,
}

/// Which way a KPI improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

/// Threshold cutpoints for one indicator.
///
/// Only `excellent`, `good` and `warning` take part in classification;
/// `critical` is the display floor shown next to the value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct KpiThresholds {
    pub excellent: f64,
    pub good: f64,
    pub warning: f64,
    pub critical: f64,
}

impl KpiThresholds {
    pub const fn new(excellent: f64, good: f64, warning: f64, critical: f64) -> Self {
        Self {
            excellent,
            good,
            warning,
            critical,
        }
    }

    /// Map a value onto the four status bands.
    ///
    /// Comparisons are inclusive, so a value sitting exactly on a
    /// boundary lands in the better band.
    pub fn classify(&self, value: f64, direction: Direction) -> KpiStatus {
        let within = |cut: f64| match direction {
            Direction::LowerIsBetter => value <= cut,
            Direction::HigherIsBetter => value >= cut,
        };

        if within(self.excellent) {
            KpiStatus::Excellent
        } else if within(self.good) {
            KpiStatus::Good
        } else if within(self.warning) {
            KpiStatus::Warning
        } else {
            KpiStatus::Critical
        }
    }
}

/// Static description of one KPI category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub unit: KpiUnit,
    pub direction: Direction,
    pub thresholds: KpiThresholds,
}

/// Raw movement of a KPI versus a prior period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// Change versus the prior period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct KpiTrend {
    pub direction: TrendDirection,
    /// Absolute percentage change, two decimals.
    pub percentage: f64,
}

/// One computed indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Kpi {
    /// `kpi-<category>-<epoch millis>`.
    pub id: String,
    pub category: KpiCategory,
    pub name: String,
    pub description: String,
    /// Rounded to two decimals.
    pub value: f64,
    pub unit: KpiUnit,
    pub status: KpiStatus,
    pub thresholds: KpiThresholds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<KpiTrend>,
    /// Number of tickets behind the value.
    pub data_points: usize,
    pub calculated_at: DateTime<Utc>,
}

impl Kpi {
    /// Package a computed value for `category`.
    ///
    /// The value is rounded first and the status is classified from the
    /// rounded value, so status never disagrees with what is displayed.
    pub fn from_value(
        category: KpiCategory,
        raw_value: f64,
        data_points: usize,
        calculated_at: DateTime<Utc>,
    ) -> Self {
        let definition = category.definition();
        let value = round2(raw_value);

        Self {
            id: format!(
                "kpi-{}-{}",
                category.as_str().to_lowercase(),
                calculated_at.timestamp_millis()
            ),
            category,
            name: definition.name.to_string(),
            description: definition.description.to_string(),
            value,
            unit: definition.unit,
            status: definition.thresholds.classify(value, definition.direction),
            thresholds: definition.thresholds,
            trend: None,
            data_points,
            calculated_at,
        }
    }

    pub fn with_trend(mut self, trend: KpiTrend) -> Self {
        self.trend = Some(trend);
        self
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&KpiCategory::SlaCompliance).unwrap();
        assert_eq!(json, "\"SLA_COMPLIANCE\"");

        let parsed: KpiCategory = serde_json::from_str("\"FRRT\"").unwrap();
        assert_eq!(parsed, KpiCategory::Frrt);
    }

    #[test]
    fn test_lower_is_better_bands() {
        let t = KpiThresholds::new(2.0, 3.0, 4.0, 48.0);
        let d = Direction::LowerIsBetter;

        assert_eq!(t.classify(0.0, d), KpiStatus::Excellent);
        assert_eq!(t.classify(2.0, d), KpiStatus::Excellent);
        assert_eq!(t.classify(2.01, d), KpiStatus::Good);
        assert_eq!(t.classify(3.0, d), KpiStatus::Good);
        assert_eq!(t.classify(4.0, d), KpiStatus::Warning);
        assert_eq!(t.classify(4.01, d), KpiStatus::Critical);
    }

    #[test]
    fn test_higher_is_better_bands() {
        let t = KpiThresholds::new(70.0, 60.0, 50.0, 45.0);
        let d = Direction::HigherIsBetter;

        assert_eq!(t.classify(100.0, d), KpiStatus::Excellent);
        assert_eq!(t.classify(70.0, d), KpiStatus::Excellent);
        assert_eq!(t.classify(60.0, d), KpiStatus::Good);
        assert_eq!(t.classify(50.0, d), KpiStatus::Warning);
        assert_eq!(t.classify(49.99, d), KpiStatus::Critical);
    }

    #[test]
    fn test_from_value_rounds_then_classifies() {
        let at = Utc::now();
        // 2.004h rounds to 2.0, which sits on the excellent boundary.
        let kpi = Kpi::from_value(KpiCategory::Frt, 2.004, 3, at);

        assert_eq!(kpi.value, 2.0);
        assert_eq!(kpi.status, KpiStatus::Excellent);
        assert_eq!(kpi.unit, KpiUnit::Hours);
        assert_eq!(kpi.data_points, 3);
        assert_eq!(kpi.id, format!("kpi-frt-{}", at.timestamp_millis()));
        assert!(kpi.trend.is_none());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(34.033333), 34.03);
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(0.0), 0.0);
    }
}
