//! Bit-sequence fields: raw packed bits, no sign handling.

use crate::buffer::BitBuffer;
use crate::codec::{apply_restriction, recoverable, DecodeFlags};
use crate::context::{ErrorContext, ErrorKind};
use crate::descriptor::{FieldDescriptor, FieldLength};
use crate::error::CodecError;
use crate::value::BitSequence;
use crate::wire_int::clear_from;

/// Packed octets and bit length of `value` laid out for `desc`.
pub(crate) fn encode(
    value: &BitSequence,
    desc: &FieldDescriptor,
    ctx: &mut ErrorContext,
) -> Result<(Vec<u8>, usize), CodecError> {
    if !value.is_bound() {
        return Err(ctx.fatal(ErrorKind::Unbound, "encoding an unbound bitstring value"));
    }
    let n = value.len();
    let bits = match desc.field_length {
        FieldLength::Variable => n,
        FieldLength::Fixed(fl) => {
            if n > fl {
                ctx.report(
                    ErrorKind::LengthError,
                    format!("bitstring of {} bits does not fit a {}-bit field, truncated", n, fl),
                );
            }
            fl
        }
    };
    let mut octets = value.octets().to_vec();
    octets.resize(bits.div_ceil(8), 0);
    clear_from(&mut octets, bits);
    Ok((octets, bits))
}

pub(crate) fn decode(
    buf: &mut BitBuffer,
    limit: usize,
    desc: &FieldDescriptor,
    flags: DecodeFlags,
    ctx: &mut ErrorContext,
) -> Result<(BitSequence, usize), CodecError> {
    let n = match desc.field_length {
        FieldLength::Variable => limit,
        FieldLength::Fixed(fl) if fl > limit => {
            recoverable(
                ctx,
                flags,
                ErrorKind::IncompleteMessage,
                format!("there are not enough bits in the buffer: needed {}, found {}", fl, limit),
            )?;
            limit
        }
        FieldLength::Fixed(fl) => fl,
    };
    let params = desc.coding_params();
    let octets = buf.read(n, &params)?;
    if buf.remaining_bits() == 0 && buf.dirty_tail() {
        recoverable(
            ctx,
            flags,
            ErrorKind::Superfluous,
            "unused bits of the last octet are not zero".to_string(),
        )?;
    }
    let (octets, kept) = apply_restriction(octets, n, desc, &params);
    let (value, _) = BitSequence::from_octets(kept, &octets);
    Ok((value, n))
}
