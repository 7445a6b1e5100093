//! Runtime scalar values handled by the codec.
//!
//! [`Integer`] is an unbounded signed integer backed either by a machine word or by a
//! [`BigInt`]; the two representations are interchangeable and every codec operation
//! produces identical wire output for both. [`BitSequence`] is a packed, fixed-length
//! sequence of bits.

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use std::fmt;
use std::str::FromStr;

/// Backing representation of a bound [`Integer`].
#[derive(Debug, Clone)]
pub enum Repr {
    Small(i64),
    Big(BigInt),
}

/// Arbitrary-width signed integer. Created unbound; bound on first assignment.
#[derive(Debug, Clone, Default)]
pub struct Integer {
    repr: Option<Repr>,
}

impl Integer {
    pub fn unbound() -> Self {
        Integer { repr: None }
    }

    /// Bind to a big representation without normalising, even if the value fits a word.
    pub fn big(value: BigInt) -> Self {
        Integer { repr: Some(Repr::Big(value)) }
    }

    pub fn is_bound(&self) -> bool {
        self.repr.is_some()
    }

    pub fn repr(&self) -> Option<&Repr> {
        self.repr.as_ref()
    }

    /// True when bound and backed by a machine word.
    pub fn is_native(&self) -> bool {
        matches!(self.repr, Some(Repr::Small(_)))
    }

    /// Same value, backed by a machine word whenever it fits.
    pub fn normalized(&self) -> Self {
        match &self.repr {
            Some(Repr::Big(b)) => Integer::from(b.clone()),
            _ => self.clone(),
        }
    }

    pub fn to_bigint(&self) -> Option<BigInt> {
        match &self.repr {
            Some(Repr::Small(v)) => Some(BigInt::from(*v)),
            Some(Repr::Big(b)) => Some(b.clone()),
            None => None,
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        match &self.repr {
            Some(Repr::Small(v)) => Some(*v),
            Some(Repr::Big(b)) => b.to_i64(),
            None => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        match &self.repr {
            Some(Repr::Small(v)) => *v == 0,
            Some(Repr::Big(b)) => b.is_zero(),
            None => false,
        }
    }
}

impl From<i64> for Integer {
    fn from(v: i64) -> Self {
        Integer { repr: Some(Repr::Small(v)) }
    }
}

impl From<i32> for Integer {
    fn from(v: i32) -> Self {
        Integer::from(v as i64)
    }
}

impl From<u64> for Integer {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(small) => Integer::from(small),
            Err(_) => Integer::big(BigInt::from(v)),
        }
    }
}

impl From<BigInt> for Integer {
    fn from(v: BigInt) -> Self {
        match v.to_i64() {
            Some(small) => Integer::from(small),
            None => Integer::big(v),
        }
    }
}

impl PartialEq for Integer {
    fn eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (None, None) => true,
            (Some(Repr::Small(a)), Some(Repr::Small(b))) => a == b,
            _ => self.to_bigint() == other.to_bigint(),
        }
    }
}

impl Eq for Integer {}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Some(Repr::Small(v)) => write!(f, "{}", v),
            Some(Repr::Big(b)) => write!(f, "{}", b),
            None => f.write_str("<unbound>"),
        }
    }
}

impl FromStr for Integer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (digits, radix, negative) = match s.strip_prefix('-') {
            Some(rest) => (rest, 10, true),
            None => (s, 10, false),
        };
        let (digits, radix) = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
            Some(hex) => (hex, 16),
            None => (digits, radix),
        };
        if digits.starts_with(['+', '-']) {
            return Err(format!("invalid integer literal '{}'", s));
        }
        let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix)
            .ok_or_else(|| format!("invalid integer literal '{}'", s))?;
        Ok(Integer::from(if negative { -magnitude } else { magnitude }))
    }
}

/// Ordered, packed bit sequence. Bit `i` lives in octet `i / 8` at bit position `i % 8`;
/// unused high bits of the last octet are always zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitSequence {
    n_bits: usize,
    data: Vec<u8>,
    bound: bool,
}

impl BitSequence {
    pub fn unbound() -> Self {
        BitSequence::default()
    }

    /// `n_bits` zero bits.
    pub fn new(n_bits: usize) -> Self {
        BitSequence { n_bits, data: vec![0; n_bits.div_ceil(8)], bound: true }
    }

    /// Build from packed storage. Missing octets read as zero; the second element is
    /// true when unused bits of the last octet were set and had to be cleared.
    pub fn from_octets(n_bits: usize, octets: &[u8]) -> (Self, bool) {
        let mut data = octets.to_vec();
        data.resize(n_bits.div_ceil(8), 0);
        let mut seq = BitSequence { n_bits, data, bound: true };
        let dirty = seq.clear_unused_bits();
        (seq, dirty)
    }

    /// Parse `"0110"` (or `'0110'B`); the first character is bit 0.
    pub fn from_bit_str(s: &str) -> Result<Self, String> {
        let body = s.trim();
        let body = body
            .strip_prefix('\'')
            .and_then(|b| b.strip_suffix("'B").or_else(|| b.strip_suffix("'b")))
            .unwrap_or(body);
        let mut seq = BitSequence::new(body.len());
        for (i, c) in body.chars().enumerate() {
            match c {
                '0' => {}
                '1' => seq.set_bit(i, true),
                other => return Err(format!("invalid bit '{}' in bit string", other)),
            }
        }
        Ok(seq)
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn len(&self) -> usize {
        self.n_bits
    }

    pub fn is_empty(&self) -> bool {
        self.n_bits == 0
    }

    pub fn octets(&self) -> &[u8] {
        &self.data
    }

    pub fn bit(&self, i: usize) -> Option<bool> {
        if i >= self.n_bits {
            return None;
        }
        Some((self.data[i / 8] >> (i % 8)) & 1 != 0)
    }

    /// Set bit `i`. Panics when `i` is out of range, like slice indexing.
    pub fn set_bit(&mut self, i: usize, value: bool) {
        assert!(i < self.n_bits, "bit index {} out of range for {} bits", i, self.n_bits);
        let mask = 1u8 << (i % 8);
        if value {
            self.data[i / 8] |= mask;
        } else {
            self.data[i / 8] &= !mask;
        }
    }

    pub fn push(&mut self, value: bool) {
        self.bound = true;
        self.n_bits += 1;
        if self.data.len() < self.n_bits.div_ceil(8) {
            self.data.push(0);
        }
        self.set_bit(self.n_bits - 1, value);
    }

    fn clear_unused_bits(&mut self) -> bool {
        let used = self.n_bits % 8;
        match self.data.last_mut() {
            Some(last) if used != 0 => {
                let mask = (1u8 << used) - 1;
                let dirty = *last & !mask != 0;
                *last &= mask;
                dirty
            }
            _ => false,
        }
    }
}

impl fmt::Display for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.bound {
            return f.write_str("<unbound>");
        }
        f.write_str("'")?;
        for i in 0..self.n_bits {
            f.write_str(if self.bit(i) == Some(true) { "1" } else { "0" })?;
        }
        f.write_str("'B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_octets_clears_unused_bits() {
        let (seq, dirty) = BitSequence::from_octets(3, &[0xFF]);
        assert!(dirty);
        assert_eq!(seq.octets(), &[0x07]);
        let (_, dirty) = BitSequence::from_octets(3, &[0x05]);
        assert!(!dirty);
    }

    #[test]
    fn push_keeps_packing() {
        let mut seq = BitSequence::new(0);
        for b in [true, false, true, true, false, false, false, false, true] {
            seq.push(b);
        }
        assert_eq!(seq.len(), 9);
        assert_eq!(seq.octets(), &[0x0D, 0x01]);
        assert_eq!(seq.to_string(), "'101100001'B");
    }

    #[test]
    fn integer_equality_across_representations() {
        assert_eq!(Integer::from(42i64), Integer::big(BigInt::from(42)));
        assert!(!Integer::big(BigInt::from(42)).is_native());
        assert!(Integer::big(BigInt::from(42)).normalized().is_native());
        assert_ne!(Integer::unbound(), Integer::from(0i64));
    }

    #[test]
    fn integer_parses_hex_and_negative() {
        assert_eq!("0x1234".parse::<Integer>(), Ok(Integer::from(0x1234i64)));
        assert_eq!("-17".parse::<Integer>(), Ok(Integer::from(-17i64)));
        let huge: Integer = "340282366920938463463374607431768211456".parse().expect("parse");
        assert!(!huge.is_native());
    }

    #[test]
    fn integer_rejects_doubled_signs() {
        assert!("--5".parse::<Integer>().is_err());
        assert!("0x-5".parse::<Integer>().is_err());
        assert!("-0x+5".parse::<Integer>().is_err());
        assert!("+5".parse::<Integer>().is_err());
        assert_eq!("-0x10".parse::<Integer>(), Ok(Integer::from(-16i64)));
    }
}
