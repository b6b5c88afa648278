use serde::{Deserialize, Serialize};

use super::Transaction;
use crate::cache::CacheValue;

/// Inclusive `YYYY-MM-DD` bounds. A report covers everything unless both
/// ends are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl ReportRange {
    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    pub fn contains(&self, date: &str) -> bool {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => date >= start.as_str() && date <= end.as_str(),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default)]
    pub data: Vec<Transaction>,
    #[serde(default)]
    pub summary: ReportSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl CacheValue for Report {
    fn is_empty_result(&self) -> bool {
        self.data.is_empty()
    }
}
