//! Statistics periods and report shapes

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::DomainError;

/// The fixed set of statistics views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Period {
    #[default]
    Total,
    Daily,
    Monthly,
    Yearly,
    Regionally,
}

impl Period {
    /// All supported periods, in display order
    pub const ALL: [Period; 5] = [
        Period::Total,
        Period::Daily,
        Period::Monthly,
        Period::Yearly,
        Period::Regionally,
    ];

    /// Literal token for this period
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Total => "total",
            Period::Daily => "daily",
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
            Period::Regionally => "regionally",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|period| period.as_str() == s)
            .ok_or_else(|| DomainError::invalid_period(s))
    }
}

/// Visit count and distinct-visitor count for one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisitStat {
    pub total: u64,
    pub unique: u64,
}

impl VisitStat {
    pub fn new(total: u64, unique: u64) -> Self {
        Self { total, unique }
    }
}

/// Result of a statistics query
///
/// Serialized untagged: `Total` renders as `{"total": n, "unique": m}`,
/// `Breakdown` as a map from bucket key or region label to such a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatsReport {
    Total(VisitStat),
    Breakdown(BTreeMap<String, VisitStat>),
}

impl StatsReport {
    /// Overall stat, if this is a total report
    pub fn as_total(&self) -> Option<VisitStat> {
        match self {
            StatsReport::Total(stat) => Some(*stat),
            StatsReport::Breakdown(_) => None,
        }
    }

    /// Per-key stats, if this is a breakdown report
    pub fn as_breakdown(&self) -> Option<&BTreeMap<String, VisitStat>> {
        match self {
            StatsReport::Total(_) => None,
            StatsReport::Breakdown(buckets) => Some(buckets),
        }
    }
}
