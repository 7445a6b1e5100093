//! Decode fuzz target: the first byte picks a descriptor, the rest is the bit stream.
//! Decoding must not panic; it returns a value (maybe with diagnostics) or a CodecError.
//! Build with: cargo fuzz run decode_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    use rawcodec::{
        decode_field, BitBuffer, BitSequence, DecodeFlags, ErrorContext, FieldDescriptor, Integer, Order, SignMode,
    };

    let Some((&selector, stream)) = data.split_first() else {
        return;
    };
    let mode = match selector & 3 {
        0 => SignMode::Unsigned,
        1 => SignMode::TwosComplement,
        _ => SignMode::SignBit,
    };
    let order = if selector & 4 != 0 { Order::Msb } else { Order::Lsb };
    let width = (selector >> 3) as usize * 4;
    let base = if width == 0 {
        FieldDescriptor::variable("F")
    } else {
        FieldDescriptor::fixed("F", width).with_length_restriction(width / 2 + 1)
    };
    let desc = base
        .with_sign_mode(mode)
        .with_byte_order(order)
        .with_prepadding(usize::from(selector & 1));

    let flags = DecodeFlags { silent: selector & 2 != 0, ..DecodeFlags::default() };
    let mut ctx = ErrorContext::new();
    let mut buf = BitBuffer::from_octets(stream);
    while buf.remaining_bits() > 0 {
        let limit = buf.remaining_bits();
        match decode_field::<Integer>(&mut buf, limit, &desc, flags, &mut ctx) {
            Ok(out) if out.consumed_bits > 0 => {}
            _ => break,
        }
    }
    buf.rewind();
    let limit = buf.remaining_bits();
    let _ = decode_field::<BitSequence>(&mut buf, limit, &desc, flags, &mut ctx);
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run decode_fuzz");
}
