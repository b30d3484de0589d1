//! Shared helpers for unit tests

use std::fs;
use std::path::{Path, PathBuf};

use crate::codec::{self, Digit};

/// The first twenty digits of pi
pub(crate) const SAMPLE: &str = "31415926535897932384";

pub(crate) fn digits(text: &str) -> Vec<Digit> {
    text.bytes().map(|b| b - b'0').collect()
}

/// Write `text` in packed form to `pi.bin` inside `dir`
pub(crate) fn write_digits(dir: &Path, text: &str) -> PathBuf {
    let packed = codec::pack_digits(&digits(text)).unwrap();
    write_bytes(dir, &packed)
}

pub(crate) fn write_bytes(dir: &Path, bytes: &[u8]) -> PathBuf {
    let path = dir.join("pi.bin");
    fs::write(&path, bytes).unwrap();
    path
}
