//! Core DigitStore implementation

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::codec::{self, Digit};
use crate::error::{Result, StoreError};
use crate::matcher;
use crate::query::{DigitRange, SearchQuery};
use crate::reader::{DigitReader, DigitStream};

/// Options for opening a store
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Bytes read per chunk when streaming
    pub chunk_size: usize,
    /// Upper bound on matches returned by one search
    pub max_matches: usize,
    /// Explicit total digit count, needed when the count is odd
    pub digit_count: Option<u64>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            chunk_size: crate::DEFAULT_CHUNK_SIZE,
            max_matches: crate::DEFAULT_MAX_MATCHES,
            digit_count: None,
        }
    }
}

/// Metadata computed once when the store is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreInfo {
    pub total_digit_count: u64,
    pub byte_length: u64,
    /// Whether every digit in the file decodes
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_invalid_position: Option<u64>,
}

/// Outcome of a search; not finding the pattern is not an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub found: bool,
    /// Ascending start positions of the matches
    pub positions: Vec<u64>,
}

impl SearchResult {
    pub fn not_found() -> Self {
        Self {
            found: false,
            positions: Vec::new(),
        }
    }

    pub fn first(&self) -> Option<u64> {
        self.positions.first().copied()
    }
}

impl From<Vec<u64>> for SearchResult {
    fn from(positions: Vec<u64>) -> Self {
        Self {
            found: !positions.is_empty(),
            positions,
        }
    }
}

/// Digits surrounding a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigitWindow {
    /// Position of the first digit in `digits`
    pub start: u64,
    pub digits: String,
    /// Offset of the match inside `digits`
    pub pattern_index: u64,
    pub pattern_length: u64,
}

/// Read-only store over one packed digit file
#[derive(Debug)]
pub struct DigitStore {
    reader: DigitReader,
    info: StoreInfo,
    chunk_size: usize,
    max_matches: usize,
    ready: bool,
}

impl DigitStore {
    /// Open a store and compute its metadata
    ///
    /// Reads the whole file once to check that every digit decodes. A file
    /// with bad nibbles still opens, marked invalid.
    pub fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        if options.chunk_size == 0 {
            return Err(StoreError::Validation("chunk size must be positive".to_string()));
        }
        if options.max_matches == 0 {
            return Err(StoreError::Validation("max matches must be positive".to_string()));
        }

        let reader = DigitReader::open(path)?;
        let total_digit_count = resolve_digit_count(&reader, options.digit_count)?;

        let started = Instant::now();
        let first_invalid_position = find_first_invalid(&reader, total_digit_count, options.chunk_size)?;

        let info = StoreInfo {
            total_digit_count,
            byte_length: reader.byte_len(),
            valid: first_invalid_position.is_none(),
            first_invalid_position,
        };

        if let Some(position) = first_invalid_position {
            warn!(path = ?reader.path(), position, "Digit file contains invalid nibbles, marking store invalid");
        }
        info!(
            path = ?reader.path(),
            total_digit_count,
            byte_length = info.byte_length,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Opened digit store"
        );

        Ok(Self {
            reader,
            info,
            chunk_size: options.chunk_size,
            max_matches: options.max_matches,
            ready: true,
        })
    }

    pub fn info(&self) -> StoreInfo {
        self.info
    }

    /// True once the initial load has completed
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn total_digits(&self) -> u64 {
        self.info.total_digit_count
    }

    pub fn path(&self) -> &Path {
        self.reader.path()
    }

    /// Get the digit at `position`
    pub fn get_digit(&self, position: u64) -> Result<Digit> {
        if position >= self.total_digits() {
            return Err(self.out_of_range(position));
        }
        self.reader.digit_at(position)
    }

    /// Get `count` digits starting at `start`
    pub fn get_range(&self, start: u64, count: u64) -> Result<Vec<Digit>> {
        let end = self.checked_end(DigitRange { start, count })?;
        self.reader.digits_from(start, self.chunk_size)?.limit(end).collect()
    }

    /// Lazily stream digits from `start` to the end of the store
    pub fn digits(&self, start: u64) -> Result<DigitStream> {
        if start > self.total_digits() {
            return Err(self.out_of_range(start));
        }
        Ok(self.reader.digits_from(start, self.chunk_size)?.limit(self.total_digits()))
    }

    /// Find matches of the query pattern at or after its start position
    ///
    /// The match limit defaults to one and is capped by the store's
    /// configured maximum.
    pub fn search(&self, query: &SearchQuery) -> Result<SearchResult> {
        let total = self.total_digits();
        if query.start > total {
            return Err(self.out_of_range(query.start));
        }

        let requested = query.max_matches.unwrap_or(1);
        if requested == 0 {
            return Err(StoreError::Validation("max matches must be positive".to_string()));
        }
        let max_matches = requested.min(self.max_matches);
        if max_matches < requested {
            debug!(requested, cap = self.max_matches, "Capping match limit");
        }

        let remaining = total - query.start;
        if query.pattern.len() as u64 > remaining {
            debug!(pattern = %query.pattern, start = query.start, remaining, "Pattern longer than remaining digits");
            return Ok(SearchResult::not_found());
        }

        let started = Instant::now();
        let stream = self.digits(query.start)?;
        let positions = matcher::scan(stream, query.start, &query.pattern, max_matches)?;

        debug!(
            pattern = %query.pattern,
            start = query.start,
            matches = positions.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Search complete"
        );
        Ok(SearchResult::from(positions))
    }

    /// Digits around a match at `position` of `length`, `radius` on each side
    pub fn window(&self, position: u64, length: u64, radius: u64) -> Result<DigitWindow> {
        let total = self.total_digits();
        if position >= total {
            return Err(self.out_of_range(position));
        }

        let start = position.saturating_sub(radius);
        let end = position.saturating_add(length).saturating_add(radius).min(total);
        let digits = self.get_range(start, end - start)?;

        Ok(DigitWindow {
            start,
            digits: codec::digits_to_string(&digits),
            pattern_index: position - start,
            pattern_length: length,
        })
    }

    /// Write `count` digits from `start` as ASCII text, returning the number written
    pub fn write_text<W: Write>(&self, writer: &mut W, start: u64, count: u64) -> Result<u64> {
        let end = self.checked_end(DigitRange { start, count })?;
        let stream = self.reader.digits_from(start, self.chunk_size)?.limit(end);

        let mut buf = Vec::with_capacity(self.chunk_size);
        let mut written = 0u64;
        for digit in stream {
            buf.push(b'0' + digit?);
            if buf.len() >= self.chunk_size {
                writer.write_all(&buf).map_err(|e| StoreError::io("<output>", e))?;
                written += buf.len() as u64;
                buf.clear();
            }
        }
        writer.write_all(&buf).map_err(|e| StoreError::io("<output>", e))?;
        written += buf.len() as u64;

        debug!(start, written, "Wrote digits as text");
        Ok(written)
    }

    fn checked_end(&self, range: DigitRange) -> Result<u64> {
        match range.end() {
            Some(end) if end <= self.total_digits() => Ok(end),
            _ => Err(self.out_of_range(range.start.saturating_add(range.count))),
        }
    }

    fn out_of_range(&self, position: u64) -> StoreError {
        StoreError::Range {
            position,
            total: self.total_digits(),
        }
    }
}

/// Pick the digit count: the file's nibble count, or one less when an odd
/// count is given explicitly
fn resolve_digit_count(reader: &DigitReader, explicit: Option<u64>) -> Result<u64> {
    let nibbles = reader.nibble_len();
    match explicit {
        None => Ok(nibbles),
        Some(count) if count == nibbles || count.checked_add(1) == Some(nibbles) => Ok(count),
        Some(count) => Err(StoreError::Validation(format!(
            "digit count {} does not fit a file of {} bytes (expected {} or {})",
            count,
            reader.byte_len(),
            nibbles - 1,
            nibbles
        ))),
    }
}

fn find_first_invalid(reader: &DigitReader, total: u64, chunk_size: usize) -> Result<Option<u64>> {
    for digit in reader.digits_from(0, chunk_size)?.limit(total) {
        match digit {
            Ok(_) => {}
            Err(StoreError::InvalidDigit { position, .. }) => return Ok(Some(position)),
            Err(e) => return Err(e),
        }
    }
    Ok(None)
}
