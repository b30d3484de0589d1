//! pidigits - positional lookup and pattern search over packed digits of pi
//!
//! Digits are stored four bits each, two per byte, in a read-only file that
//! may be far larger than memory. Lookups seek straight to the byte holding a
//! digit; searches stream the file forward in bounded chunks and feed every
//! digit to an incremental matcher, so a match that spans two chunks is found
//! like any other.
//!
//! # File format
//!
//! ```text
//! byte:    0x31      0x41      0x59      0x26 ...
//! digits:  3  1      4  1      5  9      2  6 ...
//! index:   0  1      2  3      4  5      6  7
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pidigits::{DigitStore, SearchQuery, StoreOptions};
//!
//! let store = DigitStore::open("pi_digits.bin", StoreOptions::default())?;
//! let digit = store.get_digit(6)?;
//! let result = store.search(&SearchQuery::new("265358")?.with_max_matches(5))?;
//! ```

pub mod cli;
pub mod codec;
pub mod config;
mod error;
pub mod matcher;
mod query;
pub mod reader;
mod store;

#[cfg(test)]
mod testutil;

pub use codec::Digit;
pub use error::{ErrorKind, Result, StoreError};
pub use matcher::Pattern;
pub use query::{DigitRange, RangeRequest, SearchQuery, SearchRequest};
pub use reader::{DigitReader, DigitStream};
pub use store::{DigitStore, DigitWindow, SearchResult, StoreInfo, StoreOptions};

/// Default read chunk size (64KB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Default cap on matches returned by one search
pub const DEFAULT_MAX_MATCHES: usize = 1000;

/// Default number of digits shown on each side of a match
pub const DEFAULT_CONTEXT_RADIUS: u64 = 10;
