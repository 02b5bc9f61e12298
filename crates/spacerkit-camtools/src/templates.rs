//! Template providers
//!
//! A template provider offers feeds and speeds borrowed from historical
//! programs for similar parts. Generators may consult one; a miss falls back
//! to the calculator, so correctness never depends on a provider.

use serde::{Deserialize, Serialize};

use crate::speeds_feeds::{CuttingParams, Operation};

/// What a generator asks a provider for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateQuery {
    /// Stock OD, inches
    pub round_size: f64,
    /// Nominal center bore, mm
    pub cb_mm: f64,
    /// Operation being set up
    pub operation: Operation,
}

/// Read-only source of proven feeds and speeds
pub trait TemplateProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Parameters for a matching template, if any
    fn lookup(&self, query: &TemplateQuery) -> Option<CuttingParams>;
}

/// Provider that never matches
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTemplates;

impl TemplateProvider for NoTemplates {
    fn name(&self) -> &str {
        "none"
    }

    fn lookup(&self, _query: &TemplateQuery) -> Option<CuttingParams> {
        None
    }
}

/// One stored template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEntry {
    /// Stock OD, inches
    pub round_size: f64,
    /// Nominal center bore, mm
    pub cb_mm: f64,
    /// Operation
    pub operation: Operation,
    /// Parameters to reuse
    pub params: CuttingParams,
}

/// Templates held in memory, matched by round size and nearest CB
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryTemplates {
    entries: Vec<TemplateEntry>,
    cb_tolerance_mm: f64,
}

impl InMemoryTemplates {
    /// Provider over the given entries; CBs within `cb_tolerance_mm` match
    pub fn new(entries: Vec<TemplateEntry>, cb_tolerance_mm: f64) -> Self {
        Self {
            entries,
            cb_tolerance_mm,
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TemplateProvider for InMemoryTemplates {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn lookup(&self, query: &TemplateQuery) -> Option<CuttingParams> {
        self.entries
            .iter()
            .filter(|e| e.operation == query.operation)
            .filter(|e| (e.round_size - query.round_size).abs() < 1e-3)
            .map(|e| (e, (e.cb_mm - query.cb_mm).abs()))
            .filter(|(_, gap)| *gap <= self.cb_tolerance_mm)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(e, _)| e.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speeds_feeds::{FeedRates, SpindleParams};

    fn params(rough: f64) -> CuttingParams {
        CuttingParams {
            spindle: SpindleParams {
                max_rpm: 1800,
                rpm: 700,
                css: Some(520),
            },
            feeds: FeedRates {
                rough,
                finish: 0.005,
                chamfer: 0.004,
            },
        }
    }

    #[test]
    fn test_nearest_cb_wins() {
        let provider = InMemoryTemplates::new(
            vec![
                TemplateEntry {
                    round_size: 7.0,
                    cb_mm: 87.1,
                    operation: Operation::Bore,
                    params: params(0.011),
                },
                TemplateEntry {
                    round_size: 7.0,
                    cb_mm: 88.0,
                    operation: Operation::Bore,
                    params: params(0.009),
                },
            ],
            1.0,
        );
        let query = TemplateQuery {
            round_size: 7.0,
            cb_mm: 87.3,
            operation: Operation::Bore,
        };
        assert_eq!(provider.lookup(&query).unwrap().feeds.rough, 0.011);

        let miss = TemplateQuery {
            operation: Operation::Drill,
            ..query
        };
        assert!(provider.lookup(&miss).is_none());
        assert!(NoTemplates.lookup(&query).is_none());
    }
}
