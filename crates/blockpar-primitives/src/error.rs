//! Hex decoding shared by the fixed-width primitives

use thiserror::Error;

/// Failure to read a fixed-width value out of a hex string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input is not valid hex
    #[error("invalid hex in {kind}: {reason}")]
    InvalidHex {
        /// Name of the value being parsed
        kind: &'static str,
        /// Decoder message
        reason: String,
    },
    /// Input decodes to the wrong number of bytes
    #[error("{kind} must be {expected} bytes, got {got}")]
    InvalidLength {
        /// Name of the value being parsed
        kind: &'static str,
        /// Required width
        expected: usize,
        /// Width supplied
        got: usize,
    },
}

/// Decode exactly `N` bytes, with or without a `0x` prefix.
///
/// With `pad` set, shorter input is left-padded with zeros, so `0x1`
/// reads as the last byte set to one.
pub(crate) fn decode_fixed<const N: usize>(
    input: &str,
    kind: &'static str,
    pad: bool,
) -> Result<[u8; N], ParseError> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    let got = digits.len().div_ceil(2);
    if got > N || (!pad && digits.len() != N * 2) {
        return Err(ParseError::InvalidLength {
            kind,
            expected: N,
            got,
        });
    }

    let padded = format!("{:0>width$}", digits, width = N * 2);
    let mut out = [0u8; N];
    hex::decode_to_slice(&padded, &mut out).map_err(|e| ParseError::InvalidHex {
        kind,
        reason: e.to_string(),
    })?;
    Ok(out)
}
