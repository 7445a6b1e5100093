//! Field codec entry points.
//!
//! [`encode_field`] turns a value and its [`FieldDescriptor`] into an [`EncodedField`]
//! (octets, bit length, signed alignment) for the composite assembler to place;
//! [`decode_field`] consumes exactly the bits belonging to one field from a [`BitBuffer`].
//! Both open an error-context frame named after the descriptor's type for the duration of
//! the call.
//!
//! Recoverable errors are reported through the [`ErrorContext`] and a substitute is used,
//! unless the decode is [`silent`](DecodeFlags::silent): speculative decoders want a failure
//! they can back out of rather than a best-effort value.

use crate::buffer::BitBuffer;
use crate::context::{ErrorBehavior, ErrorContext, ErrorKind};
use crate::descriptor::{CodingParams, FieldDescriptor, FieldLength, Order};
use crate::error::CodecError;
use crate::value::{BitSequence, Integer};
use crate::{bitstring, integer, intx};

/// Codec output for one leaf field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedField {
    /// Little-endian octets; bits above `bit_length` are zero.
    pub octets: Vec<u8>,
    pub bit_length: usize,
    /// Trailing filler bits; negative when they belong at the low end of the following field.
    pub alignment: isize,
    /// Effective orientation to write the octets with.
    pub params: CodingParams,
}

/// Flags for [`decode_field`]. `target_field` and `is_first_call` belong to composite
/// callers and are handed back unchanged in [`DecodedField::flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeFlags {
    pub silent: bool,
    pub target_field: Option<usize>,
    pub is_first_call: bool,
}

impl DecodeFlags {
    pub fn silent() -> Self {
        DecodeFlags { silent: true, ..Self::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedField<T> {
    pub value: T,
    /// Every bit consumed, prepadding and padding included.
    pub consumed_bits: usize,
    pub prepadding_bits: usize,
    pub padding_bits: usize,
    pub flags: DecodeFlags,
}

/// Leaf value kinds the codec can encode and decode.
pub trait RawField: Sized {
    /// Payload only: octets, bit length and orientation. Alignment is added by [`encode_field`].
    fn encode_raw(&self, desc: &FieldDescriptor, ctx: &mut ErrorContext) -> Result<EncodedField, CodecError>;

    /// Decode from at most `limit` bits; returns the value and the bits read.
    fn decode_raw(
        buf: &mut BitBuffer,
        limit: usize,
        desc: &FieldDescriptor,
        flags: DecodeFlags,
        ctx: &mut ErrorContext,
    ) -> Result<(Self, usize), CodecError>;
}

impl RawField for Integer {
    fn encode_raw(&self, desc: &FieldDescriptor, ctx: &mut ErrorContext) -> Result<EncodedField, CodecError> {
        match desc.field_length {
            FieldLength::Fixed(bits) => Ok(EncodedField {
                octets: integer::encode_fixed(self, bits, desc.sign_mode, ctx)?,
                bit_length: bits,
                alignment: 0,
                params: desc.coding_params(),
            }),
            FieldLength::Variable => {
                let octets = intx::encode(self, desc.sign_mode, ctx)?;
                Ok(EncodedField {
                    bit_length: octets.len() * 8,
                    octets,
                    alignment: 0,
                    params: intx::coding_params(desc),
                })
            }
        }
    }

    fn decode_raw(
        buf: &mut BitBuffer,
        limit: usize,
        desc: &FieldDescriptor,
        flags: DecodeFlags,
        ctx: &mut ErrorContext,
    ) -> Result<(Self, usize), CodecError> {
        match desc.field_length {
            FieldLength::Fixed(bits) => integer::decode_fixed(buf, limit, bits, desc, flags, ctx),
            FieldLength::Variable => intx::decode(buf, limit, desc, ctx),
        }
    }
}

impl RawField for BitSequence {
    fn encode_raw(&self, desc: &FieldDescriptor, ctx: &mut ErrorContext) -> Result<EncodedField, CodecError> {
        let (octets, bit_length) = bitstring::encode(self, desc, ctx)?;
        Ok(EncodedField { octets, bit_length, alignment: 0, params: desc.coding_params() })
    }

    fn decode_raw(
        buf: &mut BitBuffer,
        limit: usize,
        desc: &FieldDescriptor,
        flags: DecodeFlags,
        ctx: &mut ErrorContext,
    ) -> Result<(Self, usize), CodecError> {
        bitstring::decode(buf, limit, desc, flags, ctx)
    }
}

/// Encode one leaf field.
pub fn encode_field<T: RawField>(
    value: &T,
    desc: &FieldDescriptor,
    ctx: &mut ErrorContext,
) -> Result<EncodedField, CodecError> {
    ctx.scoped(&desc.name, |ctx| {
        let mut field = value.encode_raw(desc, ctx)?;
        field.alignment = desc.alignment_sign() * desc.padding as isize;
        tracing::trace!(
            field = %desc.name,
            bit_length = field.bit_length,
            alignment = field.alignment,
            "encoded field"
        );
        Ok(field)
    })
}

/// Decode one leaf field from at most `limit` bits of `buf`.
///
/// On error the buffer cursor is restored to where it was on entry.
pub fn decode_field<T: RawField>(
    buf: &mut BitBuffer,
    limit: usize,
    desc: &FieldDescriptor,
    flags: DecodeFlags,
    ctx: &mut ErrorContext,
) -> Result<DecodedField<T>, CodecError> {
    let start = buf.position();
    let result = ctx.scoped_silent(&desc.name, flags.silent, |ctx| {
        let limit = limit.min(buf.remaining_bits());
        let prepadding_bits = buf.skip(desc.prepadding.min(limit));
        let limit = limit - prepadding_bits;
        let (value, field_bits) = T::decode_raw(buf, limit, desc, flags, ctx)?;
        let padding_bits = buf.skip(desc.padding.min(limit - field_bits));
        Ok(DecodedField {
            value,
            consumed_bits: prepadding_bits + field_bits + padding_bits,
            prepadding_bits,
            padding_bits,
            flags,
        })
    });
    if result.is_err() {
        buf.set_position(start);
    }
    result
}

/// Report a recoverable decode error, or fail with it when decoding silently and the
/// configured behaviour makes it an error.
pub(crate) fn recoverable(
    ctx: &mut ErrorContext,
    flags: DecodeFlags,
    kind: ErrorKind,
    message: String,
) -> Result<(), CodecError> {
    if flags.silent && ctx.config().behavior(kind) == ErrorBehavior::Error {
        return Err(ctx.fatal(kind, message));
    }
    ctx.report(kind, message);
    Ok(())
}

/// Keep `restriction` of the `bits` little-endian bits in `octets`: the low end for
/// `Lsb` byte order, the high end (shifted down into alignment) for `Msb`.
pub(crate) fn restrict_bits(octets: &[u8], bits: usize, restriction: usize, byte_order: Order) -> Vec<u8> {
    let kept = restriction.min(bits);
    let shift = match byte_order {
        Order::Lsb => 0,
        Order::Msb => bits - kept,
    };
    let (byte_shift, bit_shift) = (shift / 8, shift % 8);
    let mut out = vec![0u8; kept.div_ceil(8)];
    for (i, o) in out.iter_mut().enumerate() {
        let lo = octets.get(i + byte_shift).copied().unwrap_or(0);
        let hi = octets.get(i + byte_shift + 1).copied().unwrap_or(0);
        *o = if bit_shift == 0 { lo } else { (lo >> bit_shift) | (hi << (8 - bit_shift)) };
    }
    crate::wire_int::clear_from(&mut out, kept);
    out
}

/// Apply the descriptor's length restriction to freshly read bits.
pub(crate) fn apply_restriction(octets: Vec<u8>, bits: usize, desc: &FieldDescriptor, params: &CodingParams) -> (Vec<u8>, usize) {
    match desc.length_restriction {
        Some(r) if bits > r => (restrict_bits(&octets, bits, r, params.byte_order), r),
        _ => (octets, bits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restrict_low_end() {
        // 10 bits 0b11_0110_1001
        let octets = [0b0110_1001, 0b11];
        assert_eq!(restrict_bits(&octets, 10, 3, Order::Lsb), vec![0b001]);
        assert_eq!(restrict_bits(&octets, 10, 9, Order::Lsb), vec![0b0110_1001, 0b1]);
    }

    #[test]
    fn restrict_high_end_shifts_into_alignment() {
        let octets = [0b0110_1001, 0b11];
        assert_eq!(restrict_bits(&octets, 10, 3, Order::Msb), vec![0b110]);
        assert_eq!(restrict_bits(&octets, 10, 8, Order::Msb), vec![0b1101_1010]);
        assert_eq!(restrict_bits(&[0x34, 0x12], 16, 8, Order::Msb), vec![0x12]);
    }
}
