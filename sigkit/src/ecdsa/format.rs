//! Conversion between the ASN.1 DER and IEEE P1363 encodings of ECDSA
//! signatures.
//!
//! A DER signature is a `SEQUENCE` of two `INTEGER`s:
//!
//! ```text
//! 30 len 02 rlen r... 02 slen s...
//! ```
//!
//! where each integer is the minimal two's complement encoding of the
//! unsigned scalar, i.e. a `0x00` byte is prepended whenever the leading
//! value byte has its high bit set.
//!
//! The IEEE P1363 form is the plain concatenation `r || s`, with both
//! components left-padded with zeros to the same width.

use crate::{Error, Result};
use core::fmt;

/// ASN.1 tag of a constructed `SEQUENCE`.
const SEQUENCE: u8 = 0x30;

/// ASN.1 tag of an `INTEGER`.
const INTEGER: u8 = 0x02;

/// Largest length representable in the DER short form.
const SHORT_FORM_MAX: usize = 0x7F;

/// Long-form prefix announcing a single length byte.
const LONG_FORM_ONE_BYTE: u8 = 0x81;

/// Signature encodings produced and accepted by ECDSA signers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignatureFormat {
    /// ASN.1 DER `SEQUENCE { r INTEGER, s INTEGER }`.
    #[cfg_attr(feature = "serde", serde(rename = "der"))]
    Der,

    /// Fixed-width `r || s` concatenation.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "ieee-p1363"))]
    IeeeP1363,
}

impl SignatureFormat {
    /// Name of this format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Der => "der",
            Self::IeeeP1363 => "ieee-p1363",
        }
    }
}

impl fmt::Display for SignatureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a DER-encoded ECDSA signature into IEEE P1363 form.
///
/// The component width is inferred from the longer of the two integers once
/// their sign padding is stripped; the shorter one is left-padded with zeros.
pub fn der_to_p1363(der: &[u8]) -> Result<Vec<u8>> {
    der_to_p1363_with_width(der, 0)
}

/// Convert a DER-encoded ECDSA signature into IEEE P1363 form, padding both
/// components to at least `component_size` bytes.
///
/// Pass the curve's scalar size here to get output of exactly
/// `2 * component_size` bytes even when both `r` and `s` happen to be short.
pub fn der_to_p1363_with_width(der: &[u8], component_size: usize) -> Result<Vec<u8>> {
    let mut outer = Reader::new(der);
    let body = outer.tlv(SEQUENCE)?;

    if !outer.is_empty() {
        return Err(Error::invalid_signature("trailing data after SEQUENCE"));
    }

    let mut body = Reader::new(body);
    let r = strip_leading_zeros(body.tlv(INTEGER)?);
    let s = strip_leading_zeros(body.tlv(INTEGER)?);

    if !body.is_empty() {
        return Err(Error::invalid_signature("trailing data after INTEGER pair"));
    }

    let width = r.len().max(s.len()).max(component_size);
    let mut p1363 = vec![0u8; width * 2];
    p1363[width - r.len()..width].copy_from_slice(r);
    p1363[width * 2 - s.len()..].copy_from_slice(s);

    tracing::trace!(r_len = r.len(), s_len = s.len(), width, "converted DER signature to P1363");
    Ok(p1363)
}

/// Convert an IEEE P1363 ECDSA signature into DER form.
///
/// The input is split exactly in half into `r` and `s`. The outer length is
/// written in short form, or in long form with a single length byte when the
/// body exceeds 127 bytes; bodies over 255 bytes are rejected.
pub fn p1363_to_der(p1363: &[u8]) -> Result<Vec<u8>> {
    if p1363.is_empty() || p1363.len() % 2 != 0 {
        return Err(Error::invalid_signature("P1363 signature length must be even and non-zero")
            .with_context("length", p1363.len()));
    }

    let (r, s) = p1363.split_at(p1363.len() / 2);
    let r = Integer::recover(r);
    let s = Integer::recover(s);

    if r.len() > SHORT_FORM_MAX || s.len() > SHORT_FORM_MAX {
        return Err(Error::invalid_signature("component too long for DER short form"));
    }

    let body_len = 4 + r.len() + s.len();

    if body_len > u8::MAX as usize {
        return Err(Error::invalid_signature("DER body exceeds 255 bytes")
            .with_context("length", body_len));
    }

    let mut der = Vec::with_capacity(body_len + 3);
    der.push(SEQUENCE);

    if body_len > SHORT_FORM_MAX {
        der.push(LONG_FORM_ONE_BYTE);
    }

    // lengths were bounds-checked above
    der.push(body_len as u8);
    r.encode(&mut der);
    s.encode(&mut der);

    tracing::trace!(body_len, "converted P1363 signature to DER");
    Ok(der)
}

/// Strip zero padding down to the minimal unsigned form, keeping one byte.
fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let zeros = bytes
        .iter()
        .take_while(|&&b| b == 0)
        .count()
        .min(bytes.len().saturating_sub(1));

    &bytes[zeros..]
}

/// Minimal DER `INTEGER` content for an unsigned big endian value.
struct Integer<'a> {
    sign_byte: bool,
    magnitude: &'a [u8],
}

impl<'a> Integer<'a> {
    /// Strip leading zeros, then re-add a single `0x00` if the value's high
    /// bit is set. An all-zero input becomes a single `0x00`.
    fn recover(half: &'a [u8]) -> Self {
        match half.iter().position(|&b| b != 0) {
            None => Self {
                sign_byte: false,
                magnitude: &half[half.len() - 1..],
            },
            Some(start) if half[start] > 0x7F => match start.checked_sub(1) {
                Some(zero) => Self {
                    sign_byte: false,
                    magnitude: &half[zero..],
                },
                None => Self {
                    sign_byte: true,
                    magnitude: half,
                },
            },
            Some(start) => Self {
                sign_byte: false,
                magnitude: &half[start..],
            },
        }
    }

    fn len(&self) -> usize {
        usize::from(self.sign_byte) + self.magnitude.len()
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.push(INTEGER);
        out.push(self.len() as u8);

        if self.sign_byte {
            out.push(0);
        }

        out.extend_from_slice(self.magnitude);
    }
}

/// Bounds-checked cursor over DER input.
struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn byte(&mut self) -> Result<u8> {
        let (&first, rest) = self
            .bytes
            .split_first()
            .ok_or_else(|| Error::invalid_signature("unexpected end of input"))?;

        self.bytes = rest;
        Ok(first)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.bytes.len() {
            return Err(Error::invalid_signature("length exceeds input")
                .with_context("length", len)
                .with_context("remaining", self.bytes.len()));
        }

        let (value, rest) = self.bytes.split_at(len);
        self.bytes = rest;
        Ok(value)
    }

    /// Decode a short- or long-form DER length.
    fn length(&mut self) -> Result<usize> {
        let first = self.byte()?;

        if first & 0x80 == 0 {
            return Ok(usize::from(first));
        }

        let count = usize::from(first & 0x7F);

        if count == 0 || count > size_of::<usize>() {
            return Err(Error::invalid_signature("unsupported DER length encoding")
                .with_context("lengthOfLength", count));
        }

        Ok(self
            .take(count)?
            .iter()
            .fold(0usize, |len, &b| (len << 8) | usize::from(b)))
    }

    /// Read a tag-length-value triple with the given tag, returning the value.
    fn tlv(&mut self, tag: u8) -> Result<&'a [u8]> {
        let actual = self.byte()?;

        if actual != tag {
            return Err(Error::invalid_signature("unexpected ASN.1 tag")
                .with_context("expected", format_args!("{tag:#04x}"))
                .with_context("actual", format_args!("{actual:#04x}")));
        }

        let len = self.length()?;
        let value = self.take(len)?;

        if tag == INTEGER && value.is_empty() {
            return Err(Error::invalid_signature("empty INTEGER"));
        }

        Ok(value)
    }
}
