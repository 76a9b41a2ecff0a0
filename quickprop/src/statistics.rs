//! Label statistics and coverage requirements collected over a run.

use std::collections::BTreeMap;

use crate::outcome::{Directives, Outcome};

/// How often one label occurred among the counted cases
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

/// Label frequencies, most frequent first
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabelTable {
    /// Successes plus failures; discarded cases are never counted
    pub counted: usize,
    pub rows: Vec<LabelCount>,
}

impl LabelTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn percentage(&self, label: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.percentage)
    }

    pub fn count(&self, label: &str) -> usize {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map_or(0, |row| row.count)
    }
}

impl std::fmt::Display for LabelTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.rows {
            writeln!(f, "{:5.1}% {}", row.percentage, row.label)?;
        }
        Ok(())
    }
}

/// A coverage requirement that the run did not meet
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverageShortfall {
    pub label: String,
    pub required: f64,
    pub actual: f64,
}

impl std::fmt::Display for CoverageShortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "only {:.1}% {}, but expected {:.1}%",
            self.actual, self.label, self.required
        )
    }
}

/// Tallies labels over counted cases and gathers coverage requirements
#[derive(Debug, Clone, Default)]
pub struct StatisticsCollector {
    counted: usize,
    counts: BTreeMap<String, usize>,
    requirements: BTreeMap<String, f64>,
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one evaluated case; discards are ignored
    pub fn record(&mut self, outcome: &Outcome, directives: &Directives) {
        let Some(labels) = outcome.labels() else {
            return;
        };
        self.counted += 1;
        for label in labels {
            *self.counts.entry(label.clone()).or_insert(0) += 1;
        }
        for (label, percent) in &directives.requirements {
            let entry = self.requirements.entry(label.clone()).or_insert(*percent);
            *entry = entry.max(*percent);
        }
    }

    pub fn counted(&self) -> usize {
        self.counted
    }

    fn percentage_of(&self, count: usize) -> f64 {
        if self.counted == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.counted as f64
        }
    }

    pub fn table(&self) -> LabelTable {
        let mut rows: Vec<LabelCount> = self
            .counts
            .iter()
            .map(|(label, count)| LabelCount {
                label: label.clone(),
                count: *count,
                percentage: self.percentage_of(*count),
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        LabelTable {
            counted: self.counted,
            rows,
        }
    }

    /// Requirements whose label occurred less often than demanded
    pub fn coverage_shortfalls(&self) -> Vec<CoverageShortfall> {
        self.requirements
            .iter()
            .filter_map(|(label, required)| {
                let actual = self.percentage_of(self.counts.get(label).copied().unwrap_or(0));
                (actual < *required).then(|| CoverageShortfall {
                    label: label.clone(),
                    required: *required,
                    actual,
                })
            })
            .collect()
    }
}
