//! Fixed-length integer fields.
//!
//! The layout runs on the native word when it can and on [`BigInt`] otherwise; the only
//! point where the native path can give up is the sign handling at the very start
//! (negating `i64::MIN`), before anything has been reported.

use crate::buffer::BitBuffer;
use crate::codec::{apply_restriction, recoverable, DecodeFlags};
use crate::context::{ErrorContext, ErrorKind};
use crate::descriptor::{FieldDescriptor, SignMode};
use crate::error::CodecError;
use crate::value::{Integer, Repr};
use crate::wire_int::{clear_from, interpret, set_bit, WireInt};
use num_bigint::BigInt;

/// Bits needed to hold `v` under `mode`; zero needs none.
pub(crate) fn min_bits<R: WireInt>(v: &R, mode: SignMode) -> usize {
    if v.is_zero() {
        0
    } else {
        v.significant_bits() + usize::from(mode.is_signed())
    }
}

pub(crate) fn encode_fixed(
    value: &Integer,
    bits: usize,
    mode: SignMode,
    ctx: &mut ErrorContext,
) -> Result<Vec<u8>, CodecError> {
    let repr = value
        .repr()
        .ok_or_else(|| ctx.fatal(ErrorKind::Unbound, "encoding an unbound integer value"))?;
    let octets = match repr {
        Repr::Small(v) => match fixed_layout(*v, bits, mode, ctx) {
            Some(octets) => Some(octets),
            None => fixed_layout(BigInt::from(*v), bits, mode, ctx),
        },
        Repr::Big(b) => fixed_layout(b.clone(), bits, mode, ctx),
    };
    Ok(octets.unwrap_or_else(|| vec![0; bits.div_ceil(8)]))
}

fn fixed_layout<R: WireInt>(v: R, bits: usize, mode: SignMode, ctx: &mut ErrorContext) -> Option<Vec<u8>> {
    let negative = v.is_negative();
    let magnitude = if negative && mode != SignMode::TwosComplement {
        v.checked_neg()?
    } else {
        v.clone()
    };
    let mut packed = match mode {
        SignMode::TwosComplement => v,
        _ => magnitude,
    };
    let mut sign_bit = negative && mode == SignMode::SignBit;

    if negative && mode == SignMode::Unsigned {
        ctx.report(ErrorKind::SignError, "unsigned encoding of a negative number");
    }
    let needed = min_bits(&packed, mode);
    if needed > bits {
        ctx.report(
            ErrorKind::LengthError,
            format!("there are insufficient bits to encode the value: {} needed, field length is {}", needed, bits),
        );
        packed = R::zero();
        sign_bit = false;
    }

    let len = bits.div_ceil(8);
    let mut octets = packed.le_octets(len);
    clear_from(&mut octets, bits);
    if sign_bit {
        set_bit(&mut octets, bits - 1);
    }
    Some(octets)
}

pub(crate) fn decode_fixed(
    buf: &mut BitBuffer,
    limit: usize,
    bits: usize,
    desc: &FieldDescriptor,
    flags: DecodeFlags,
    ctx: &mut ErrorContext,
) -> Result<(Integer, usize), CodecError> {
    let n = if bits > limit {
        recoverable(
            ctx,
            flags,
            ErrorKind::IncompleteMessage,
            format!("there are not enough bits in the buffer: needed {}, found {}", bits, limit),
        )?;
        limit
    } else {
        bits
    };
    let params = desc.coding_params();
    let octets = buf.read(n, &params)?;
    let (octets, kept) = apply_restriction(octets, n, desc, &params);
    Ok((interpret(&octets, kept, desc.sign_mode), n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(v: impl Into<Integer>, bits: usize, mode: SignMode) -> (Vec<u8>, ErrorContext) {
        let mut ctx = ErrorContext::new();
        let out = encode_fixed(&v.into(), bits, mode, &mut ctx).expect("encode");
        (out, ctx)
    }

    #[test]
    fn min_bits_counts_sign() {
        assert_eq!(min_bits(&0i64, SignMode::SignBit), 0);
        assert_eq!(min_bits(&5i64, SignMode::Unsigned), 3);
        assert_eq!(min_bits(&5i64, SignMode::TwosComplement), 4);
        assert_eq!(min_bits(&-1i64, SignMode::TwosComplement), 1);
        assert_eq!(min_bits(&-128i64, SignMode::TwosComplement), 8);
    }

    #[test]
    fn partial_octet_masked() {
        let (out, ctx) = encode(-1i64, 12, SignMode::TwosComplement);
        assert_eq!(out, vec![0xFF, 0x0F]);
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn sign_bit_in_partial_octet() {
        let (out, _) = encode(-3i64, 4, SignMode::SignBit);
        assert_eq!(out, vec![0b1011]);
    }

    #[test]
    fn overflow_substitutes_zero() {
        let (out, ctx) = encode(256i64, 8, SignMode::Unsigned);
        assert_eq!(out, vec![0]);
        assert_eq!(ctx.diagnostics()[0].kind, ErrorKind::LengthError);
        let (out, _) = encode(128i64, 8, SignMode::TwosComplement);
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn most_negative_word_takes_big_path() {
        let (native, _) = encode(i64::MIN, 72, SignMode::SignBit);
        let (big, _) = encode(Integer::big(BigInt::from(i64::MIN)), 72, SignMode::SignBit);
        assert_eq!(native, big);
        assert_eq!(native, vec![0, 0, 0, 0, 0, 0, 0, 0x80, 0x80]);
    }
}
