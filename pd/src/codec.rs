//! Packed decimal digit codec
//!
//! Each byte holds two digits: the high nibble is the digit at the even
//! index, the low nibble the digit at the odd index. Nibbles `0xA`..=`0xF`
//! are not digits and are rejected, never wrapped.

use thiserror::Error;

/// A single decimal digit in `0..=9`
pub type Digit = u8;

/// Nibble written after the last digit of an odd-length sequence
pub const PAD_NIBBLE: u8 = 0xF;

/// A nibble that does not encode a decimal digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("nibble {0:#x} is not a decimal digit")]
pub struct InvalidNibble(pub u8);

/// Decode a single nibble into a digit
#[inline]
pub fn decode_nibble(nibble: u8) -> Result<Digit, InvalidNibble> {
    if nibble <= 9 { Ok(nibble) } else { Err(InvalidNibble(nibble)) }
}

/// Decode a byte into its (high, low) digit pair
pub fn decode(byte: u8) -> Result<(Digit, Digit), InvalidNibble> {
    Ok((decode_nibble(byte >> 4)?, decode_nibble(byte & 0x0F)?))
}

/// Encode a digit pair into one byte
pub fn encode(high: Digit, low: Digit) -> Result<u8, InvalidNibble> {
    Ok((decode_nibble(high)? << 4) | decode_nibble(low)?)
}

/// Pack a digit sequence, padding an odd tail with [`PAD_NIBBLE`]
pub fn pack_digits(digits: &[Digit]) -> Result<Vec<u8>, InvalidNibble> {
    let mut out = Vec::with_capacity(digits.len().div_ceil(2));
    for pair in digits.chunks(2) {
        let high = decode_nibble(pair[0])?;
        let low = match pair.get(1) {
            Some(&low) => decode_nibble(low)?,
            None => PAD_NIBBLE,
        };
        out.push((high << 4) | low);
    }
    Ok(out)
}

/// Render digits as ASCII text
pub fn digits_to_string(digits: &[Digit]) -> String {
    digits.iter().map(|&d| char::from(b'0' + d)).collect()
}
