//! IntX: self-describing variable-length integers.
//!
//! An IntX field of `L` octets starts with `L - 1` one-bits and a terminating zero-bit,
//! most significant bit of the first octet first; the remaining `7 * L` bits carry the
//! value, most significant part right after the terminator. Fields are always written
//! prefix octet first so a decoder can discover the length octet by octet.
//!
//! Wire layout examples (unsigned):
//!
//! ```text
//! 0       -> 00
//! 127     -> 7F
//! 128     -> 80 80
//! 16383   -> BF FF
//! 16384   -> C0 40 00
//! ```

use crate::buffer::BitBuffer;
use crate::context::{ErrorContext, ErrorKind};
use crate::descriptor::{CodingParams, FieldDescriptor, Order, SignMode};
use crate::error::CodecError;
use crate::value::{Integer, Repr};
use crate::wire_int::{clear_from, interpret, set_bit, WireInt};
use num_bigint::BigInt;

/// Orientation for IntX octets: the descriptor's bit order, prefix octet first.
pub(crate) fn coding_params(desc: &FieldDescriptor) -> CodingParams {
    desc.coding_params().with_byte_order(Order::Msb)
}

/// Total octets for a value needing `val_bits` bits (sign included).
///
/// When the prefix would end exactly on an octet boundary while the value bits do not fill
/// whole octets, one more octet is used.
pub fn octet_count(val_bits: usize) -> usize {
    let mut len = val_bits.max(1).div_ceil(7);
    if len % 8 == 0 && val_bits % 8 != 0 {
        len += 1;
    }
    len
}

pub(crate) fn encode(value: &Integer, mode: SignMode, ctx: &mut ErrorContext) -> Result<Vec<u8>, CodecError> {
    let repr = value
        .repr()
        .ok_or_else(|| ctx.fatal(ErrorKind::Unbound, "encoding an unbound integer value"))?;
    let octets = match repr {
        Repr::Small(v) => match layout(*v, mode, ctx) {
            Some(octets) => Some(octets),
            None => layout(BigInt::from(*v), mode, ctx),
        },
        Repr::Big(b) => layout(b.clone(), mode, ctx),
    };
    Ok(octets.unwrap_or_else(|| vec![0]))
}

/// Little-endian octets of the whole field, prefix in the top bits.
fn layout<R: WireInt>(v: R, mode: SignMode, ctx: &mut ErrorContext) -> Option<Vec<u8>> {
    let negative = v.is_negative();
    let magnitude = if negative && mode != SignMode::TwosComplement {
        v.checked_neg()?
    } else {
        v.clone()
    };
    if negative && mode == SignMode::Unsigned {
        ctx.report(ErrorKind::SignError, "unsigned encoding of a negative number");
    }
    let packed = match mode {
        SignMode::TwosComplement => v,
        _ => magnitude,
    };

    let val_bits = packed.significant_bits().max(1) + usize::from(mode.is_signed());
    let len = octet_count(val_bits);
    let payload_bits = 7 * len;

    let mut octets = packed.le_octets(len);
    clear_from(&mut octets, payload_bits);
    if negative && mode == SignMode::SignBit {
        set_bit(&mut octets, payload_bits - 1);
    }
    // prefix: bit `payload_bits` stays zero, everything above it is one
    for bit in payload_bits + 1..8 * len {
        set_bit(&mut octets, bit);
    }
    Some(octets)
}

/// Decode an IntX field. Running out of bits is fatal: there is no substitute length.
pub(crate) fn decode(
    buf: &mut BitBuffer,
    limit: usize,
    desc: &FieldDescriptor,
    ctx: &mut ErrorContext,
) -> Result<(Integer, usize), CodecError> {
    let params = coding_params(desc);
    let mut wire = Vec::new();
    let mut ones = 0usize;
    let mut terminated = false;
    while !terminated {
        if limit - 8 * wire.len() < 8 {
            return Err(ctx.fatal(
                ErrorKind::IncompleteMessage,
                format!("buffer exhausted in IntX length prefix after {} octets", wire.len()),
            ));
        }
        let octet = buf.read(8, &params)?[0];
        wire.push(octet);
        for bit in (0..8).rev() {
            if (octet >> bit) & 1 == 1 {
                ones += 1;
            } else {
                terminated = true;
                break;
            }
        }
    }

    let total = ones + 1;
    let rest = total - wire.len();
    let available = (limit - 8 * wire.len()) / 8;
    if rest > available {
        return Err(ctx.fatal(
            ErrorKind::IncompleteMessage,
            format!("IntX value needs {} more octets, {} available", rest, available),
        ));
    }
    for _ in 0..rest {
        wire.push(buf.read(8, &params)?[0]);
    }
    tracing::trace!(octets = total, "IntX length prefix decoded");

    let mut octets: Vec<u8> = wire.into_iter().rev().collect();
    let payload_bits = 7 * total;
    clear_from(&mut octets, payload_bits);
    Ok((interpret(&octets, payload_bits, desc.sign_mode), 8 * total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(v: i64, mode: SignMode) -> Vec<u8> {
        let mut ctx = ErrorContext::new();
        let mut le = encode(&Integer::from(v), mode, &mut ctx).expect("encode");
        le.reverse();
        le
    }

    #[test]
    fn unsigned_layouts() {
        assert_eq!(wire(0, SignMode::Unsigned), vec![0x00]);
        assert_eq!(wire(127, SignMode::Unsigned), vec![0x7F]);
        assert_eq!(wire(128, SignMode::Unsigned), vec![0x80, 0x80]);
        assert_eq!(wire(16383, SignMode::Unsigned), vec![0xBF, 0xFF]);
        assert_eq!(wire(16384, SignMode::Unsigned), vec![0xC0, 0x40, 0x00]);
    }

    #[test]
    fn signed_layouts() {
        assert_eq!(wire(-1, SignMode::TwosComplement), vec![0x7F]);
        assert_eq!(wire(-64, SignMode::TwosComplement), vec![0x40]);
        assert_eq!(wire(-65, SignMode::TwosComplement), vec![0xBF, 0xBF]);
        assert_eq!(wire(63, SignMode::TwosComplement), vec![0x3F]);
        assert_eq!(wire(-5, SignMode::SignBit), vec![0x45]);
    }

    #[test]
    fn octet_count_boundary() {
        assert_eq!(octet_count(49), 7);
        // minimal length 8 puts the terminator on the octet boundary
        assert_eq!(octet_count(50), 9);
        assert_eq!(octet_count(55), 9);
        assert_eq!(octet_count(56), 8);
        assert_eq!(octet_count(57), 9);
        assert_eq!(octet_count(106), 17);
        assert_eq!(octet_count(112), 16);
    }
}
