//! Validated request structures
//!
//! Raw requests carry signed integers so that a boundary layer can hand over
//! whatever it parsed; validation happens here, before any file access.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::matcher::Pattern;

/// A pattern search, validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub pattern: Pattern,
    /// First digit position to consider
    pub start: u64,
    /// Requested match limit; `None` means a single match
    pub max_matches: Option<usize>,
}

impl SearchQuery {
    /// Search for `pattern` from the beginning, first match only
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Pattern::parse(pattern)?,
            start: 0,
            max_matches: None,
        })
    }

    pub fn start_at(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    pub fn with_max_matches(mut self, max_matches: usize) -> Self {
        self.max_matches = Some(max_matches);
        self
    }
}

/// A span of digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitRange {
    pub start: u64,
    pub count: u64,
}

impl DigitRange {
    /// Exclusive end position, `None` on overflow
    pub fn end(&self) -> Option<u64> {
        self.start.checked_add(self.count)
    }
}

/// Search request as received from an outer layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub pattern: String,
    #[serde(default)]
    pub start_position: i64,
    #[serde(default)]
    pub max_matches: Option<i64>,
}

impl SearchRequest {
    pub fn validate(&self) -> Result<SearchQuery> {
        let start = non_negative(self.start_position, "start_position")?;
        let mut query = SearchQuery::new(&self.pattern)?.start_at(start);
        if let Some(max) = self.max_matches {
            let max = non_negative(max, "max_matches")?;
            if max == 0 {
                return Err(StoreError::Validation("max_matches must be positive".to_string()));
            }
            query = query.with_max_matches(usize::try_from(max).unwrap_or(usize::MAX));
        }
        Ok(query)
    }
}

/// Range request as received from an outer layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeRequest {
    pub start: i64,
    pub count: i64,
}

impl RangeRequest {
    pub fn validate(&self) -> Result<DigitRange> {
        Ok(DigitRange {
            start: non_negative(self.start, "start")?,
            count: non_negative(self.count, "count")?,
        })
    }
}

fn non_negative(value: i64, name: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| StoreError::Validation(format!("{} must not be negative (got {})", name, value)))
}
