//! Positional reader over a packed digit file
//!
//! Digit `p` lives in byte `p / 2`: the high nibble for even `p`, the low
//! nibble for odd `p`. Every stream and every single-digit read opens its own
//! file descriptor, so a seek is never interleaved with another caller's read.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::codec::{self, Digit};
use crate::error::{Result, StoreError};

/// Read-only handle on a packed digit file
#[derive(Debug, Clone)]
pub struct DigitReader {
    path: PathBuf,
    byte_len: u64,
}

impl DigitReader {
    /// Open a packed digit file, rejecting missing, unreadable and empty files
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let storage = |message: String| StoreError::Storage {
            path: path.clone(),
            message,
        };

        let file = File::open(&path).map_err(|e| storage(format!("cannot open file: {}", e)))?;
        let metadata = file
            .metadata()
            .map_err(|e| storage(format!("cannot read metadata: {}", e)))?;

        if !metadata.is_file() {
            return Err(storage("not a regular file".to_string()));
        }
        if metadata.len() == 0 {
            return Err(storage("file is empty".to_string()));
        }

        debug!(?path, byte_len = metadata.len(), "Opened digit file");
        Ok(Self {
            byte_len: metadata.len(),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Length of the file in bytes
    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    /// Number of nibbles in the file, two per byte
    pub fn nibble_len(&self) -> u64 {
        self.byte_len * 2
    }

    /// Read one digit directly, without going through a stream
    pub fn digit_at(&self, position: u64) -> Result<Digit> {
        let offset = position / 2;
        if offset >= self.byte_len {
            return Err(StoreError::Range {
                position,
                total: self.nibble_len(),
            });
        }

        let mut file = self.open_file()?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| StoreError::io(&self.path, e))?;
        let mut byte = [0u8; 1];
        file.read_exact(&mut byte).map_err(|e| StoreError::io(&self.path, e))?;

        let nibble = if position % 2 == 0 { byte[0] >> 4 } else { byte[0] & 0x0F };
        codec::decode_nibble(nibble).map_err(|e| StoreError::invalid_digit(position, e))
    }

    /// Stream digits forward from `start`, reading `chunk_size` bytes at a time
    pub fn digits_from(&self, start: u64, chunk_size: usize) -> Result<DigitStream> {
        if chunk_size == 0 {
            return Err(StoreError::Validation("chunk size must be positive".to_string()));
        }
        if start > self.nibble_len() {
            return Err(StoreError::Range {
                position: start,
                total: self.nibble_len(),
            });
        }

        let mut file = self.open_file()?;
        let offset = start / 2;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| StoreError::io(&self.path, e))?;

        Ok(DigitStream {
            path: self.path.clone(),
            file,
            chunk_size,
            buf: Vec::new(),
            filled: 0,
            cursor: 0,
            next_offset: offset,
            low_nibble: start % 2 == 1,
            position: start,
            end: self.nibble_len(),
            done: false,
        })
    }

    fn open_file(&self) -> Result<File> {
        File::open(&self.path).map_err(|e| StoreError::io(&self.path, e))
    }
}

/// Forward-only digit sequence produced by [`DigitReader::digits_from`]
///
/// Yields `Err` for a nibble that is not a digit and keeps going; an I/O
/// failure is yielded once and ends the stream. Dropping the stream stops
/// all further reads.
#[derive(Debug)]
pub struct DigitStream {
    path: PathBuf,
    file: File,
    chunk_size: usize,
    buf: Vec<u8>,
    filled: usize,
    cursor: usize,
    next_offset: u64,
    low_nibble: bool,
    position: u64,
    end: u64,
    done: bool,
}

impl DigitStream {
    /// Stop the stream before digit position `end`
    pub fn limit(mut self, end: u64) -> Self {
        self.end = self.end.min(end);
        self
    }

    /// Position of the next digit this stream will yield
    pub fn position(&self) -> u64 {
        self.position
    }

    fn refill(&mut self) -> Result<bool> {
        let end_byte = self.end.div_ceil(2);
        let want = end_byte.saturating_sub(self.next_offset).min(self.chunk_size as u64) as usize;
        if want == 0 {
            return Ok(false);
        }

        self.buf.resize(want, 0);
        let mut filled = 0;
        while filled < want {
            match self.file.read(&mut self.buf[filled..want]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(StoreError::io(&self.path, e)),
            }
        }

        if filled == 0 {
            return Err(StoreError::Storage {
                path: self.path.clone(),
                message: format!("unexpected end of file at byte {}", self.next_offset),
            });
        }

        trace!(offset = self.next_offset, bytes = filled, "Read chunk");
        self.filled = filled;
        self.cursor = 0;
        self.next_offset += filled as u64;
        Ok(true)
    }
}

impl Iterator for DigitStream {
    type Item = Result<Digit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.position >= self.end {
            return None;
        }

        if self.cursor >= self.filled {
            match self.refill() {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        let byte = self.buf[self.cursor];
        let nibble = if self.low_nibble {
            self.cursor += 1;
            byte & 0x0F
        } else {
            byte >> 4
        };
        self.low_nibble = !self.low_nibble;

        let position = self.position;
        self.position += 1;
        Some(codec::decode_nibble(nibble).map_err(|e| StoreError::invalid_digit(position, e)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let remaining = usize::try_from(self.end.saturating_sub(self.position)).ok();
        (0, remaining)
    }
}
