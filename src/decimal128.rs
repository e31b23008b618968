//! [BSON Decimal128](https://github.com/mongodb/specifications/blob/master/source/bson-decimal128/decimal128.md) data type representation

use std::{fmt, str::FromStr};

use crate::error::{Decimal128ErrorKind, Error, Result};

const EXPONENT_OFFSET: i64 = 6176;
const MIN_EXPONENT: i64 = -6176;
const MAX_EXPONENT: i64 = 6111;
const MAX_DIGITS_OF_PRECISION: usize = 34;

const SIGN_BIT_MASK: u64 = 1 << 63;
const INFINITY_MASK: u64 = 0x7800_0000_0000_0000;
const NAN_MASK: u64 = 0x7c00_0000_0000_0000;
// The two highest bits of the combination field; when both are set the
// exponent occupies bits 47..61 and the coefficient gains an implicit
// high bit.
const TWO_HIGHEST_BITS_SET: u64 = 3 << 61;

/// Struct representing a BSON Decimal128 value: a 128-bit IEEE 754-2008
/// decimal floating point value, stored as its raw high and low 64-bit
/// halves.
///
/// Two values are equal iff their bit patterns are equal; `-0` and the
/// various NaN encodings are all distinct values. Unlike a binary double,
/// the decimal coefficient preserves its significant-digit count, so
/// `"0.100"` renders back as `"0.100"` rather than `"0.1"`.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Decimal128 {
    high: u64,
    low: u64,
}

impl Decimal128 {
    /// Constructs a new `Decimal128` from its raw high and low 64-bit halves.
    pub const fn from_bits(high: u64, low: u64) -> Self {
        Self { high, low }
    }

    /// The raw (high, low) bit pattern of this value.
    pub const fn bits(&self) -> (u64, u64) {
        (self.high, self.low)
    }

    /// Constructs a new `Decimal128` from the provided raw byte representation
    /// as it appears on the wire: 16 bytes in little-endian order.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let mut low = [0u8; 8];
        let mut high = [0u8; 8];
        low.copy_from_slice(&bytes[..8]);
        high.copy_from_slice(&bytes[8..]);
        Self {
            high: u64::from_le_bytes(high),
            low: u64::from_le_bytes(low),
        }
    }

    /// Returns the raw byte representation of this `Decimal128` as it appears
    /// on the wire.
    pub fn bytes(&self) -> [u8; 16] {
        let mut raw = [0u8; 16];
        raw[..8].copy_from_slice(&self.low.to_le_bytes());
        raw[8..].copy_from_slice(&self.high.to_le_bytes());
        raw
    }

    fn is_nan(&self) -> bool {
        self.high & NAN_MASK == NAN_MASK
    }

    fn is_infinity(&self) -> bool {
        self.high & INFINITY_MASK == INFINITY_MASK
    }

    fn is_negative(&self) -> bool {
        self.high & SIGN_BIT_MASK == SIGN_BIT_MASK
    }

    // The unbiased exponent and coefficient digits of a finite value. A
    // coefficient that overflows the combination-field form is not a valid
    // canonical encoding and reads back as zero.
    fn finite_parts(&self) -> (i64, String) {
        if self.high & TWO_HIGHEST_BITS_SET == TWO_HIGHEST_BITS_SET {
            let exponent = ((self.high & 0x1fff_e000_0000_0000) >> 47) as i64 - EXPONENT_OFFSET;
            (exponent, "0".to_string())
        } else {
            let exponent = ((self.high & 0x7fff_8000_0000_0000) >> 49) as i64 - EXPONENT_OFFSET;
            let coefficient =
                (((self.high & 0x0001_ffff_ffff_ffff) as u128) << 64) | self.low as u128;
            (exponent, coefficient.to_string())
        }
    }
}

impl fmt::Display for Decimal128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nan() {
            return f.write_str("NaN");
        }

        if self.is_negative() {
            f.write_str("-")?;
        }

        if self.is_infinity() {
            return f.write_str("Infinity");
        }

        let (exponent, digits) = self.finite_parts();
        let scientific_exponent = digits.len() as i64 - 1 + exponent;

        if exponent > 0 || scientific_exponent < -6 {
            // exponential notation
            let exp_sign = if scientific_exponent < 0 { "" } else { "+" };
            if digits.len() > 1 {
                write!(
                    f,
                    "{}.{}E{}{}",
                    &digits[..1],
                    &digits[1..],
                    exp_sign,
                    scientific_exponent
                )
            } else {
                write!(f, "{digits}E{exp_sign}{scientific_exponent}")
            }
        } else if exponent < 0 {
            let fraction_len = exponent.unsigned_abs() as usize;
            if digits.len() > fraction_len {
                let point = digits.len() - fraction_len;
                write!(f, "{}.{}", &digits[..point], &digits[point..])
            } else {
                let pad = fraction_len - digits.len();
                write!(f, "0.{}{}", "0".repeat(pad), digits)
            }
        } else {
            f.write_str(&digits)
        }
    }
}

impl fmt::Debug for Decimal128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal128(\"{self}\")")
    }
}

impl FromStr for Decimal128 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_decimal_string(s)
    }
}

fn invalid(s: &str) -> Error {
    Error::decimal128_invalid_string(format!("\"{s}\" is not a valid Decimal128 string"))
}

fn parse_decimal_string(s: &str) -> Result<Decimal128> {
    if let Some(special) = parse_special(s) {
        return Ok(special);
    }

    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let (mantissa, scientific_exp) = match rest.find(['e', 'E']) {
        Some(at) => (&rest[..at], parse_exponent(&rest[at + 1..]).ok_or_else(|| invalid(s))?),
        None => (rest, 0),
    };

    let (integer_part, fraction_part) = match mantissa.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (mantissa, ""),
    };

    // grammar: digits[.digits*] or .digits
    if integer_part.is_empty() && fraction_part.is_empty() {
        return Err(invalid(s));
    }
    if !integer_part.bytes().all(|b| b.is_ascii_digit())
        || !fraction_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid(s));
    }

    let mut digits: Vec<u8> = integer_part
        .bytes()
        .chain(fraction_part.bytes())
        .skip_while(|&b| b == b'0')
        .collect();
    if digits.is_empty() {
        digits.push(b'0');
    }

    let mut exponent = scientific_exp - fraction_part.len() as i64;

    // round exactly: only trailing zeros may be dropped
    if exponent < MIN_EXPONENT {
        while exponent < MIN_EXPONENT && digits.len() > 1 && digits.last() == Some(&b'0') {
            digits.pop();
            exponent += 1;
        }
        if digits.as_slice() == b"0" {
            exponent = exponent.max(MIN_EXPONENT);
        }
    } else if digits.len() > MAX_DIGITS_OF_PRECISION {
        while digits.len() > MAX_DIGITS_OF_PRECISION
            && digits.last() == Some(&b'0')
            && exponent < MAX_EXPONENT
        {
            digits.pop();
            exponent += 1;
        }
    }

    // clamp an overlarge exponent by padding the coefficient
    if exponent > MAX_EXPONENT {
        if digits.as_slice() == b"0" {
            exponent = MAX_EXPONENT;
        } else {
            while exponent > MAX_EXPONENT && digits.len() < MAX_DIGITS_OF_PRECISION {
                digits.push(b'0');
                exponent -= 1;
            }
        }
    }

    if digits.len() > MAX_DIGITS_OF_PRECISION {
        return Err(Error::decimal128(
            Decimal128ErrorKind::UnrepresentablePrecision,
        ));
    }
    if !(MIN_EXPONENT..=MAX_EXPONENT).contains(&exponent) {
        return Err(Error::decimal128(Decimal128ErrorKind::InvalidRange));
    }

    let mut coefficient: u128 = 0;
    for digit in &digits {
        coefficient = coefficient * 10 + (digit - b'0') as u128;
    }

    Ok(parts_to_bits(coefficient, exponent, negative))
}

fn parse_special(s: &str) -> Option<Decimal128> {
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let mut high = if rest.eq_ignore_ascii_case("NaN") {
        NAN_MASK
    } else if rest.eq_ignore_ascii_case("Inf") || rest.eq_ignore_ascii_case("Infinity") {
        INFINITY_MASK
    } else {
        return None;
    };

    if negative {
        high |= SIGN_BIT_MASK;
    }
    Some(Decimal128::from_bits(high, 0))
}

// A decimal exponent, saturated well past the representable range so that an
// absurdly long digit string still reports InvalidRange rather than a parse
// failure.
fn parse_exponent(s: &str) -> Option<i64> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX / 4);
    Some(if negative { -magnitude } else { magnitude })
}

fn parts_to_bits(coefficient: u128, exponent: i64, negative: bool) -> Decimal128 {
    let biased_exponent = (exponent + EXPONENT_OFFSET) as u64;
    let mut high = (coefficient >> 64) as u64;
    let low = coefficient as u64;

    if high >> 49 == 1 {
        high = (high & 0x7fff_ffff_ffff) | TWO_HIGHEST_BITS_SET | ((biased_exponent & 0x3fff) << 47);
    } else {
        high |= biased_exponent << 49;
    }

    if negative {
        high |= SIGN_BIT_MASK;
    }

    Decimal128::from_bits(high, low)
}
