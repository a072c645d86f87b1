//! Pass/fail statistics: totals, per tag and per suite.
//!
//! Statistics are computed from the result tree alone and do not depend on
//! how (or whether) the log model is split.

mod suite;
mod tags;

use crate::config::BuildConfig;
use crate::criticality::Criticality;
use crate::errors::ConfigError;
use crate::result::{TestCase, TestSuite};
use serde::Serialize;

pub use tags::CombinedTag;

pub const CRITICAL_LABEL: &str = "Critical Tests";
pub const ALL_LABEL: &str = "All Tests";

/// Passed/failed test counters. Anything that did not pass counts as failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub passed: usize,
    pub failed: usize,
}

impl Counts {
    pub fn record(&mut self, test: &TestCase) {
        if test.passed() {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn merge(&mut self, other: Counts) {
        self.passed += other.passed;
        self.failed += other.failed;
    }
}

/// Critical and all-tests counters of one suite, descendants included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuiteCounts {
    pub critical: Counts,
    pub all: Counts,
}

impl SuiteCounts {
    pub fn record(&mut self, test: &TestCase, critical: bool) {
        self.all.record(test);
        if critical {
            self.critical.record(test);
        }
    }

    pub fn merge(&mut self, other: SuiteCounts) {
        self.critical.merge(other.critical);
        self.all.merge(other.all);
    }
}

/// One row of the statistics tables. Empty attributes are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatRecord {
    pub label: String,
    pub pass: usize,
    pub fail: usize,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub info: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub links: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub combined: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
}

impl StatRecord {
    pub fn new(label: impl Into<String>, counts: Counts) -> Self {
        Self {
            label: label.into(),
            pass: counts.passed,
            fail: counts.failed,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatisticsModel {
    pub total: Vec<StatRecord>,
    pub tag: Vec<StatRecord>,
    pub suite: Vec<StatRecord>,
}

/// Computes [`StatisticsModel`] for a result tree.
#[derive(Debug, Clone)]
pub struct StatisticsBuilder {
    criticality: Criticality,
    tags: tags::TagStatisticsBuilder,
    suite_stat_level: usize,
}

impl StatisticsBuilder {
    pub fn new(config: &BuildConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            criticality: config.criticality(),
            tags: tags::TagStatisticsBuilder::new(config),
            suite_stat_level: config.suite_stat_level,
        })
    }

    pub fn build(&self, root: &TestSuite) -> StatisticsModel {
        let model = StatisticsModel {
            total: self.total_stats(root),
            tag: self.tags.build(root, &self.criticality),
            suite: suite::suite_stats(root, self.suite_stat_level),
        };
        tracing::debug!(
            tags = model.tag.len(),
            suites = model.suite.len(),
            "built statistics"
        );
        model
    }

    fn total_stats(&self, root: &TestSuite) -> Vec<StatRecord> {
        let mut counts = SuiteCounts::default();
        for test in root.all_tests() {
            counts.record(test, self.criticality.test_is_critical(test));
        }
        vec![
            StatRecord::new(CRITICAL_LABEL, counts.critical),
            StatRecord::new(ALL_LABEL, counts.all),
        ]
    }
}
