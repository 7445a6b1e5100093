//! # rawcodec: Bit-level Binary Field Codec
//!
//! Encodes and decodes leaf values (arbitrary-width integers and bit sequences) to and from
//! bit streams under a per-field binary encoding configuration, bit-for-bit compatible with
//! the conventional test-notation wire encodings.
//!
//! ## Pieces
//!
//! - **Descriptor**: field length (fixed or variable), sign mode, byte/bit orders, padding,
//!   length restriction ([`FieldDescriptor`])
//! - **Values**: [`Integer`] (machine word or `BigInt`, interchangeable) and [`BitSequence`]
//! - **Codec**: [`encode_field`] / [`decode_field`] over a [`BitBuffer`]
//! - **Error context**: nested diagnostic path, per-kind error behaviours ([`ErrorContext`])
//! - **Variants**: attribute notation for descriptors ([`parse_variant`])
//!
//! ## Integer layouts
//!
//! - Fixed length: `ceil(n / 8)` octets, unsigned, two's complement or sign bit
//! - Variable length: IntX, a unary length prefix followed by the value, always whole octets
//!
//! ## Example
//!
//! ```
//! use rawcodec::{decode_field, encode_field, parse_variant, BitBuffer, DecodeFlags, ErrorContext, Integer};
//!
//! let desc = parse_variant("Delta", "FIELDLENGTH(8), COMP(signbit)").unwrap();
//! let mut ctx = ErrorContext::new();
//! let field = encode_field(&Integer::from(-5i64), &desc, &mut ctx).unwrap();
//! assert_eq!(field.octets, vec![0x85]);
//!
//! let mut buf = BitBuffer::new();
//! buf.put_field(&field).unwrap();
//! let back = decode_field::<Integer>(&mut buf, 8, &desc, DecodeFlags::default(), &mut ctx).unwrap();
//! assert_eq!(back.value, Integer::from(-5i64));
//! ```

mod bitstring;
pub mod buffer;
pub mod codec;
pub mod context;
pub mod descriptor;
pub mod dump;
pub mod error;
mod integer;
pub mod intx;
pub mod value;
pub mod variant;
mod wire_int;

pub use buffer::BitBuffer;
pub use codec::{decode_field, encode_field, DecodeFlags, DecodedField, EncodedField, RawField};
pub use context::{CodecConfig, Diagnostic, ErrorBehavior, ErrorContext, ErrorKind, Severity};
pub use descriptor::{CodingParams, FieldDescriptor, FieldLength, Order, SignMode};
pub use error::{BufferError, CodecError};
pub use value::{BitSequence, Integer};
pub use variant::{load_descriptor_file, parse_descriptor_set, parse_error_behaviors, parse_variant};
