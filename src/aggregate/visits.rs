//! Visit Aggregate
//!
//! Running visit counters and unique-visitor sets across the total, daily,
//! monthly, yearly and regional dimensions.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::{BucketKeys, Period, StatsReport, VisitEvent, VisitStat};

use super::Aggregate;

type Counters = BTreeMap<String, u64>;
type VisitorSets = BTreeMap<String, BTreeSet<String>>;

/// Visit Aggregate
///
/// The serde field names are the storage file's top-level keys. Every field
/// defaults to empty so files written before a dimension existed still load,
/// and unknown keys from older layouts are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitAggregate {
    /// All visits ever recorded
    total: u64,

    /// Every distinct visitor key ever seen
    unique_total: BTreeSet<String>,

    daily: Counters,
    monthly: Counters,
    yearly: Counters,
    by_region: Counters,

    unique_daily: VisitorSets,
    unique_monthly: VisitorSets,
    unique_yearly: VisitorSets,
    unique_by_region: VisitorSets,
}

impl VisitAggregate {
    /// Create an empty aggregate (first run)
    pub fn new() -> Self {
        Self::default()
    }

    /// Total visits recorded
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Distinct visitors recorded
    pub fn unique_total(&self) -> &BTreeSet<String> {
        &self.unique_total
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.total == 0
            && self.unique_total.is_empty()
            && self.daily.is_empty()
            && self.monthly.is_empty()
            && self.yearly.is_empty()
            && self.by_region.is_empty()
    }

    /// Build the report for one statistics period
    ///
    /// Breakdowns cover every key ever counted for that dimension.
    pub fn stats(&self, period: Period) -> StatsReport {
        match period {
            Period::Total => StatsReport::Total(VisitStat::new(
                self.total,
                self.unique_total.len() as u64,
            )),
            Period::Daily => StatsReport::Breakdown(breakdown(&self.daily, &self.unique_daily)),
            Period::Monthly => {
                StatsReport::Breakdown(breakdown(&self.monthly, &self.unique_monthly))
            }
            Period::Yearly => StatsReport::Breakdown(breakdown(&self.yearly, &self.unique_yearly)),
            Period::Regionally => {
                StatsReport::Breakdown(breakdown(&self.by_region, &self.unique_by_region))
            }
        }
    }

    fn count(&mut self, buckets: &BucketKeys, region: &str, visitor_key: &str) {
        self.total += 1;
        self.unique_total.insert(visitor_key.to_string());

        bump(&mut self.daily, &mut self.unique_daily, &buckets.day, visitor_key);
        bump(&mut self.monthly, &mut self.unique_monthly, &buckets.month, visitor_key);
        bump(&mut self.yearly, &mut self.unique_yearly, &buckets.year, visitor_key);
        bump(&mut self.by_region, &mut self.unique_by_region, region, visitor_key);
    }
}

impl Aggregate for VisitAggregate {
    type Event = VisitEvent;

    fn aggregate_type() -> &'static str {
        "VisitAggregate"
    }

    fn apply(&mut self, event: &VisitEvent) {
        match event {
            VisitEvent::VisitRecorded {
                visitor_key,
                region,
                recorded_at,
            } => {
                let buckets = BucketKeys::at(*recorded_at);
                self.count(&buckets, region, visitor_key);
            }
        }
    }
}

fn bump(counters: &mut Counters, visitors: &mut VisitorSets, key: &str, visitor_key: &str) {
    *counters.entry(key.to_string()).or_insert(0) += 1;
    visitors
        .entry(key.to_string())
        .or_default()
        .insert(visitor_key.to_string());
}

fn breakdown(counters: &Counters, visitors: &VisitorSets) -> BTreeMap<String, VisitStat> {
    counters
        .iter()
        .map(|(key, &total)| {
            let unique = visitors.get(key).map_or(0, |set| set.len() as u64);
            (key.clone(), VisitStat::new(total, unique))
        })
        .collect()
}
