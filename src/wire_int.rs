//! Integer representations as seen by the bit-layout algorithms.
//!
//! The fixed-length and IntX layouts are written once, generic over [`WireInt`], and run
//! either on a machine word (`i64`) or on a [`BigInt`]. A layout only ever sources or sinks
//! little-endian two's-complement octets, which is what makes the two paths produce the
//! same wire output.

use crate::descriptor::SignMode;
use crate::value::Integer;
use byteorder::{ByteOrder, LittleEndian};
use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, Zero};

pub(crate) trait WireInt: Clone + Sized {
    fn zero() -> Self;

    fn is_negative(&self) -> bool;

    fn is_zero(&self) -> bool;

    fn checked_neg(&self) -> Option<Self>;

    /// Bits needed for the value itself when non-negative, for `!v` when negative.
    fn significant_bits(&self) -> usize;

    /// `len` octets of the little-endian two's-complement form, sign-extended or truncated.
    fn le_octets(&self, len: usize) -> Vec<u8>;

    /// Unsigned value of little-endian `octets`; `None` when it does not fit.
    fn from_le_octets(octets: &[u8]) -> Option<Self>;

    /// `self - 2^bits`; `None` when the result does not fit.
    fn minus_pow2(&self, bits: usize) -> Option<Self>;

    fn into_integer(self) -> Integer;
}

impl WireInt for i64 {
    fn zero() -> Self {
        0
    }

    fn is_negative(&self) -> bool {
        *self < 0
    }

    fn is_zero(&self) -> bool {
        *self == 0
    }

    fn checked_neg(&self) -> Option<Self> {
        i64::checked_neg(*self)
    }

    fn significant_bits(&self) -> usize {
        let m = if *self < 0 { !*self } else { *self };
        (64 - m.leading_zeros()) as usize
    }

    fn le_octets(&self, len: usize) -> Vec<u8> {
        let mut word = [0u8; 8];
        LittleEndian::write_i64(&mut word, *self);
        let fill = if *self < 0 { 0xFF } else { 0x00 };
        (0..len).map(|i| word.get(i).copied().unwrap_or(fill)).collect()
    }

    fn from_le_octets(octets: &[u8]) -> Option<Self> {
        let used = octets.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        if used == 0 {
            return Some(0);
        }
        if used > 8 {
            return None;
        }
        i64::try_from(LittleEndian::read_uint(octets, used)).ok()
    }

    fn minus_pow2(&self, bits: usize) -> Option<Self> {
        if bits > 126 {
            return None;
        }
        i64::try_from(*self as i128 - (1i128 << bits)).ok()
    }

    fn into_integer(self) -> Integer {
        Integer::from(self)
    }
}

impl WireInt for BigInt {
    fn zero() -> Self {
        Zero::zero()
    }

    fn is_negative(&self) -> bool {
        Signed::is_negative(self)
    }

    fn is_zero(&self) -> bool {
        Zero::is_zero(self)
    }

    fn checked_neg(&self) -> Option<Self> {
        Some(-self)
    }

    fn significant_bits(&self) -> usize {
        if Signed::is_negative(self) {
            (-self - BigInt::one()).bits() as usize
        } else {
            self.bits() as usize
        }
    }

    fn le_octets(&self, len: usize) -> Vec<u8> {
        let mut octets = self.to_signed_bytes_le();
        let fill = if Signed::is_negative(self) { 0xFF } else { 0x00 };
        octets.resize(len, fill);
        octets
    }

    fn from_le_octets(octets: &[u8]) -> Option<Self> {
        Some(BigInt::from_bytes_le(Sign::Plus, octets))
    }

    fn minus_pow2(&self, bits: usize) -> Option<Self> {
        Some(self - (BigInt::one() << bits))
    }

    fn into_integer(self) -> Integer {
        Integer::from(self)
    }
}

/// Clear every bit at position `from` and above.
pub(crate) fn clear_from(octets: &mut [u8], from: usize) {
    for (i, octet) in octets.iter_mut().enumerate() {
        let low = i * 8;
        if low >= from {
            *octet = 0;
        } else if from - low < 8 {
            *octet &= (1u8 << (from - low)) - 1;
        }
    }
}

pub(crate) fn test_bit(octets: &[u8], bit: usize) -> bool {
    octets.get(bit / 8).is_some_and(|b| (b >> (bit % 8)) & 1 != 0)
}

pub(crate) fn set_bit(octets: &mut [u8], bit: usize) {
    if let Some(b) = octets.get_mut(bit / 8) {
        *b |= 1 << (bit % 8);
    }
}

/// Interpret the low `bits` of little-endian `octets` under `mode` with representation `R`.
fn interpret_as<R: WireInt>(octets: &[u8], bits: usize, mode: SignMode) -> Option<R> {
    if bits == 0 {
        return Some(R::zero());
    }
    let mut octets = octets.to_vec();
    clear_from(&mut octets, bits);
    let top = test_bit(&octets, bits - 1);
    match mode {
        SignMode::Unsigned => R::from_le_octets(&octets),
        SignMode::TwosComplement => {
            let v = R::from_le_octets(&octets)?;
            if top {
                v.minus_pow2(bits)
            } else {
                Some(v)
            }
        }
        SignMode::SignBit => {
            clear_from(&mut octets, bits - 1);
            let v = R::from_le_octets(&octets)?;
            if top {
                v.checked_neg()
            } else {
                Some(v)
            }
        }
    }
}

/// Decode the low `bits` of `octets`, on the native path when the result fits a word.
pub(crate) fn interpret(octets: &[u8], bits: usize, mode: SignMode) -> Integer {
    match interpret_as::<i64>(octets, bits, mode) {
        Some(v) => v.into_integer(),
        None => interpret_as::<BigInt>(octets, bits, mode)
            .map(WireInt::into_integer)
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn significant_bits_agree() {
        for v in [0i64, 1, 5, 127, 128, -1, -5, -128, -129, i64::MAX, i64::MIN] {
            assert_eq!(
                v.significant_bits(),
                BigInt::from(v).significant_bits(),
                "value {}",
                v
            );
        }
    }

    #[test]
    fn le_octets_agree() {
        for v in [0i64, 0x1234, -2, i64::MIN, i64::MAX] {
            for len in [0, 1, 3, 8, 11] {
                assert_eq!(v.le_octets(len), BigInt::from(v).le_octets(len), "{} / {}", v, len);
            }
        }
    }

    #[test]
    fn native_from_octets_overflow() {
        assert_eq!(<i64 as WireInt>::from_le_octets(&[0xFF; 8]), None);
        assert_eq!(<i64 as WireInt>::from_le_octets(&[0x01, 0x00, 0x00]), Some(1));
        assert_eq!(<i64 as WireInt>::from_le_octets(&[0; 12]), Some(0));
    }

    #[test]
    fn interpret_switches_to_big() {
        let v = interpret(&[0xFF; 8], 64, SignMode::Unsigned);
        assert!(!v.is_native());
        assert_eq!(v.to_bigint(), Some(BigInt::from(u64::MAX)));
        let v = interpret(&[0xFF; 8], 64, SignMode::TwosComplement);
        assert_eq!(v, Integer::from(-1i64));
        assert!(v.is_native());
    }

    #[test]
    fn clear_from_masks_partial_octet() {
        let mut o = [0xFF, 0xFF];
        clear_from(&mut o, 12);
        assert_eq!(o, [0xFF, 0x0F]);
    }
}
