//! Exact digit pattern matching over a digit stream
//!
//! The scanner is fed one digit at a time, so a match is found the same way
//! whether or not it straddles two read chunks. Short patterns compare an
//! overlap window of the trailing digits directly; longer ones run
//! Knuth-Morris-Pratt so that adversarial patterns stay linear.

use std::collections::VecDeque;

use crate::codec::{self, Digit};
use crate::error::{Result, StoreError};

/// Longest pattern scanned with the naive window comparison
pub const NAIVE_PATTERN_MAX: usize = 8;

/// A validated, non-empty digit pattern with its failure function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    digits: Vec<Digit>,
    failure: Vec<usize>,
}

impl Pattern {
    pub fn new(digits: Vec<Digit>) -> Result<Self> {
        if digits.is_empty() {
            return Err(StoreError::Validation("pattern must not be empty".to_string()));
        }
        if let Some(&digit) = digits.iter().find(|&&d| d > 9) {
            return Err(StoreError::Validation(format!("pattern contains non-digit value {}", digit)));
        }

        let failure = failure_function(&digits);
        Ok(Self { digits, failure })
    }

    /// Parse a pattern from ASCII digits
    pub fn parse(text: &str) -> Result<Self> {
        let digits = text
            .chars()
            .map(|c| c.to_digit(10).map(|d| d as Digit))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| StoreError::Validation(format!("pattern must contain only digits: {:?}", text)))?;
        Self::new(digits)
    }

    pub fn digits(&self) -> &[Digit] {
        &self.digits
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// Always false, patterns are non-empty by construction
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Start a fresh scan, picking the strategy by pattern length
    pub fn scanner(&self) -> Scanner<'_> {
        if self.len() <= NAIVE_PATTERN_MAX {
            Scanner::window(self)
        } else {
            Scanner::prefix(self)
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&codec::digits_to_string(&self.digits))
    }
}

/// KMP failure function: `failure[i]` is the length of the longest proper
/// prefix of `pattern[..=i]` that is also its suffix
fn failure_function(pattern: &[Digit]) -> Vec<usize> {
    let mut failure = vec![0; pattern.len()];
    let mut k = 0;
    for i in 1..pattern.len() {
        while k > 0 && pattern[i] != pattern[k] {
            k = failure[k - 1];
        }
        if pattern[i] == pattern[k] {
            k += 1;
        }
        failure[i] = k;
    }
    failure
}

#[derive(Debug)]
enum ScanState {
    /// Last `len(pattern)` digits seen
    Window(VecDeque<Digit>),
    /// Length of the pattern prefix matched so far
    Prefix(usize),
}

/// Incremental matcher state for one pass over a digit stream
///
/// After a full match the state resets, so reported matches never overlap.
#[derive(Debug)]
pub struct Scanner<'a> {
    pattern: &'a Pattern,
    state: ScanState,
}

impl<'a> Scanner<'a> {
    pub(crate) fn window(pattern: &'a Pattern) -> Self {
        Self {
            pattern,
            state: ScanState::Window(VecDeque::with_capacity(pattern.len())),
        }
    }

    pub(crate) fn prefix(pattern: &'a Pattern) -> Self {
        Self {
            pattern,
            state: ScanState::Prefix(0),
        }
    }

    /// Feed the next digit; returns true when it completes a match
    pub fn push(&mut self, digit: Digit) -> bool {
        let pattern = &self.pattern.digits;
        match &mut self.state {
            ScanState::Window(window) => {
                window.push_back(digit);
                if window.len() > pattern.len() {
                    window.pop_front();
                }
                if window.len() == pattern.len() && window.iter().eq(pattern.iter()) {
                    window.clear();
                    return true;
                }
                false
            }
            ScanState::Prefix(matched) => {
                while *matched > 0 && pattern[*matched] != digit {
                    *matched = self.pattern.failure[*matched - 1];
                }
                if pattern[*matched] == digit {
                    *matched += 1;
                }
                if *matched == pattern.len() {
                    *matched = 0;
                    return true;
                }
                false
            }
        }
    }
}

/// Scan `digits` (whose first item sits at position `start`) for `pattern`
///
/// Returns the ascending start positions of up to `max_matches`
/// non-overlapping matches. Stops reading as soon as the cap is reached; the
/// first error from the stream aborts the scan.
pub fn scan<I>(digits: I, start: u64, pattern: &Pattern, max_matches: usize) -> Result<Vec<u64>>
where
    I: IntoIterator<Item = Result<Digit>>,
{
    scan_with(pattern.scanner(), digits, start, max_matches)
}

fn scan_with<I>(mut scanner: Scanner<'_>, digits: I, start: u64, max_matches: usize) -> Result<Vec<u64>>
where
    I: IntoIterator<Item = Result<Digit>>,
{
    let mut matches = Vec::new();
    if max_matches == 0 {
        return Ok(matches);
    }

    let len = scanner.pattern.len() as u64;
    for (index, digit) in (start..).zip(digits) {
        if scanner.push(digit?) {
            matches.push(index + 1 - len);
            if matches.len() >= max_matches {
                break;
            }
        }
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{SAMPLE, digits};
    use proptest::prelude::*;

    fn stream(text: &str) -> impl Iterator<Item = Result<Digit>> {
        digits(text).into_iter().map(Ok)
    }

    /// Leftmost non-overlapping matches, the slow way
    fn brute_force(text: &[Digit], pattern: &[Digit], max: usize) -> Vec<u64> {
        let mut out = Vec::new();
        let mut i = 0;
        while i + pattern.len() <= text.len() && out.len() < max {
            if &text[i..i + pattern.len()] == pattern {
                out.push(i as u64);
                i += pattern.len();
            } else {
                i += 1;
            }
        }
        out
    }

    #[test]
    fn test_pattern_validation() {
        assert!(Pattern::new(vec![]).is_err());
        assert!(Pattern::new(vec![1, 10]).is_err());
        assert!(Pattern::parse("").is_err());
        assert!(Pattern::parse("12a4").is_err());
        assert!(Pattern::parse("-1").is_err());
        assert!(Pattern::parse("١٢").is_err());

        let pattern = Pattern::parse("265358").unwrap();
        assert_eq!(pattern.digits(), &[2, 6, 5, 3, 5, 8]);
        assert_eq!(pattern.to_string(), "265358");
        assert!(!pattern.is_empty());
    }

    #[test]
    fn test_failure_function() {
        assert_eq!(failure_function(&[1, 2, 1, 2, 3]), vec![0, 0, 1, 2, 0]);
        assert_eq!(failure_function(&[0, 0, 0, 1]), vec![0, 1, 2, 0]);
        assert_eq!(failure_function(&[5]), vec![0]);
    }

    #[test]
    fn test_scan_sample() {
        let pattern = Pattern::parse("265358").unwrap();
        assert_eq!(scan(stream(SAMPLE), 0, &pattern, 1).unwrap(), vec![6]);

        let pattern = Pattern::parse("999999999999999999").unwrap();
        assert!(scan(stream(SAMPLE), 0, &pattern, 1).unwrap().is_empty());
    }

    #[test]
    fn test_scan_offsets_by_start() {
        let pattern = Pattern::parse("35").unwrap();
        assert_eq!(scan(stream(&SAMPLE[5..]), 5, &pattern, 10).unwrap(), vec![9]);
    }

    #[test]
    fn test_scan_non_overlapping() {
        let pattern = Pattern::parse("11").unwrap();
        assert_eq!(scan(stream("11111"), 0, &pattern, 10).unwrap(), vec![0, 2]);

        let pattern = Pattern::parse("1111111111").unwrap();
        assert_eq!(scan(stream(&"1".repeat(25)), 0, &pattern, 10).unwrap(), vec![0, 10]);
    }

    #[test]
    fn test_scan_respects_max_matches() {
        let pattern = Pattern::parse("1").unwrap();
        assert_eq!(scan(stream("1010101"), 0, &pattern, 2).unwrap(), vec![0, 2]);
        assert!(scan(stream("1010101"), 0, &pattern, 0).unwrap().is_empty());
    }

    #[test]
    fn test_scan_stops_reading_at_cap() {
        let pattern = Pattern::parse("1").unwrap();
        let mut pulled = 0;
        let digits = std::iter::repeat_with(|| {
            pulled += 1;
            Ok(1)
        })
        .take(1000);
        assert_eq!(scan(digits, 0, &pattern, 3).unwrap(), vec![0, 1, 2]);
        assert_eq!(pulled, 3);
    }

    #[test]
    fn test_scan_propagates_stream_error() {
        let pattern = Pattern::parse("99").unwrap();
        let digits = vec![Ok(1), Err(StoreError::InvalidDigit { position: 1, nibble: 0xC }), Ok(9)];
        let err = scan(digits, 0, &pattern, 1).unwrap_err();
        assert!(matches!(err, StoreError::InvalidDigit { position: 1, .. }));
    }

    #[test]
    fn test_long_adversarial_pattern_is_linear() {
        let mut pattern = vec![0; 2000];
        pattern.push(1);
        let pattern = Pattern::new(pattern).unwrap();

        let mut text = vec![0; 200_000];
        text.push(1);
        let found = scan(text.into_iter().map(Ok), 0, &pattern, 1).unwrap();
        assert_eq!(found, vec![200_000 - 2000]);
    }

    proptest! {
        #[test]
        fn prop_strategies_agree_with_brute_force(
            text in proptest::collection::vec(0u8..3, 0..300),
            pattern in proptest::collection::vec(0u8..3, 1..14),
            max in 1usize..8,
        ) {
            let pattern = Pattern::new(pattern).unwrap();
            let expected = brute_force(&text, pattern.digits(), max);

            let window = scan_with(Scanner::window(&pattern), text.iter().copied().map(Ok), 0, max).unwrap();
            let prefix = scan_with(Scanner::prefix(&pattern), text.iter().copied().map(Ok), 0, max).unwrap();

            prop_assert_eq!(&window, &expected);
            prop_assert_eq!(&prefix, &expected);
        }
    }
}
