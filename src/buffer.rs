//! Bit buffer: byte-addressable storage with a bit-granular write end and read cursor.
//!
//! Stream bit `p` lives in octet `p / 8` at bit position `p % 8`. A field is written as a
//! sequence of octet chunks (chunk `i` holds value bits `8i..8i+7`, the last chunk may be
//! partial):
//!
//! - `byte_order == Lsb` emits chunks low to high, `Msb` high to low;
//! - `bit_order == Lsb` emits a chunk's bits low to high, `Msb` mirrors them.
//!
//! Reads apply the exact inverse, so a field read with the parameters it was written with
//! yields the same octets.

use crate::codec::EncodedField;
use crate::descriptor::{CodingParams, Order};
use crate::error::BufferError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    data: Vec<u8>,
    len_bits: usize,
    pos: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_octets(octets: &[u8]) -> Self {
        BitBuffer { data: octets.to_vec(), len_bits: octets.len() * 8, pos: 0 }
    }

    /// Buffer holding only the first `n_bits` of `octets`.
    pub fn from_bits(octets: &[u8], n_bits: usize) -> Result<Self, BufferError> {
        if octets.len() * 8 < n_bits {
            return Err(BufferError::ShortInput { octets: octets.len(), bits: n_bits });
        }
        let mut data = octets.to_vec();
        data.truncate(n_bits.div_ceil(8));
        Ok(BitBuffer { data, len_bits: n_bits, pos: 0 })
    }

    pub fn len_bits(&self) -> usize {
        self.len_bits
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining_bits(&self) -> usize {
        self.len_bits - self.pos
    }

    pub fn as_octets(&self) -> &[u8] {
        &self.data
    }

    /// True when storage bits past the logical end of the last octet are set.
    pub fn dirty_tail(&self) -> bool {
        let used = self.len_bits % 8;
        match self.data.last() {
            Some(last) if used != 0 => last >> used != 0,
            _ => false,
        }
    }

    fn push_bit(&mut self, bit: bool) {
        let p = self.len_bits;
        if p / 8 == self.data.len() {
            self.data.push(0);
        }
        if bit {
            self.data[p / 8] |= 1 << (p % 8);
        }
        self.len_bits += 1;
    }

    fn next_bit(&mut self) -> bool {
        let p = self.pos;
        self.pos += 1;
        (self.data[p / 8] >> (p % 8)) & 1 != 0
    }

    /// Append the low `n_bits` of the little-endian `octets`.
    pub fn write(&mut self, octets: &[u8], n_bits: usize, params: &CodingParams) -> Result<(), BufferError> {
        if octets.len() * 8 < n_bits {
            return Err(BufferError::ShortInput { octets: octets.len(), bits: n_bits });
        }
        for (chunk, width) in chunk_layout(n_bits, params.byte_order) {
            let byte = octets[chunk];
            for j in 0..width {
                let shift = match params.bit_order {
                    Order::Lsb => j,
                    Order::Msb => width - 1 - j,
                };
                self.push_bit((byte >> shift) & 1 != 0);
            }
        }
        Ok(())
    }

    pub fn write_zeros(&mut self, n_bits: usize) {
        for _ in 0..n_bits {
            self.push_bit(false);
        }
    }

    /// Place an encoded field: payload, then `|alignment|` zero filler bits.
    pub fn put_field(&mut self, field: &EncodedField) -> Result<(), BufferError> {
        self.write(&field.octets, field.bit_length, &field.params)?;
        self.write_zeros(field.alignment.unsigned_abs());
        Ok(())
    }

    /// Read `n_bits` into `ceil(n_bits / 8)` little-endian octets; unused high bits are zero.
    pub fn read(&mut self, n_bits: usize, params: &CodingParams) -> Result<Vec<u8>, BufferError> {
        if n_bits > self.remaining_bits() {
            return Err(BufferError::InsufficientBits {
                requested: n_bits,
                available: self.remaining_bits(),
            });
        }
        let mut out = vec![0u8; n_bits.div_ceil(8)];
        for (chunk, width) in chunk_layout(n_bits, params.byte_order) {
            for j in 0..width {
                let shift = match params.bit_order {
                    Order::Lsb => j,
                    Order::Msb => width - 1 - j,
                };
                if self.next_bit() {
                    out[chunk] |= 1 << shift;
                }
            }
        }
        Ok(out)
    }

    /// Skip up to `n_bits`; returns how many were actually consumed.
    pub fn skip(&mut self, n_bits: usize) -> usize {
        let consumed = n_bits.min(self.remaining_bits());
        self.pos += consumed;
        consumed
    }

    /// Move the read cursor, clamped to the written length.
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.len_bits);
    }

    pub fn rewind(&mut self) {
        self.pos = 0;
    }
}

/// `(chunk index, chunk width)` in emission order.
fn chunk_layout(n_bits: usize, byte_order: Order) -> Vec<(usize, usize)> {
    let chunks = n_bits.div_ceil(8);
    let width = |c: usize| if c + 1 == chunks && n_bits % 8 != 0 { n_bits % 8 } else { 8 };
    match byte_order {
        Order::Lsb => (0..chunks).map(|c| (c, width(c))).collect(),
        Order::Msb => (0..chunks).rev().map(|c| (c, width(c))).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(byte_order: Order, bit_order: Order) -> CodingParams {
        CodingParams { byte_order, bit_order, ..CodingParams::default() }
    }

    #[test]
    fn whole_octets_follow_byte_order() {
        let mut b = BitBuffer::new();
        b.write(&[0x34, 0x12], 16, &params(Order::Lsb, Order::Lsb)).expect("write");
        b.write(&[0x34, 0x12], 16, &params(Order::Msb, Order::Lsb)).expect("write");
        assert_eq!(b.as_octets(), &[0x34, 0x12, 0x12, 0x34]);
    }

    #[test]
    fn msb_bit_order_mirrors_octets() {
        let mut b = BitBuffer::new();
        b.write(&[0x01], 8, &params(Order::Lsb, Order::Msb)).expect("write");
        assert_eq!(b.as_octets(), &[0x80]);
        let back = b.read(8, &params(Order::Lsb, Order::Msb)).expect("read");
        assert_eq!(back, vec![0x01]);
    }

    #[test]
    fn partial_fields_pack_contiguously() {
        let p = params(Order::Lsb, Order::Lsb);
        let mut b = BitBuffer::new();
        b.write(&[0b101], 3, &p).expect("write");
        b.write(&[0b11111], 5, &p).expect("write");
        assert_eq!(b.as_octets(), &[0b1111_1101]);
        assert_eq!(b.read(3, &p).expect("read"), vec![0b101]);
        assert_eq!(b.read(5, &p).expect("read"), vec![0b11111]);
        assert_eq!(b.remaining_bits(), 0);
    }

    #[test]
    fn read_past_end_fails() {
        let mut b = BitBuffer::from_octets(&[0xAA]);
        assert_eq!(b.skip(3), 3);
        let err = b.read(6, &CodingParams::default()).expect_err("short");
        assert_eq!(err, BufferError::InsufficientBits { requested: 6, available: 5 });
        assert_eq!(b.skip(10), 5);
    }

    #[test]
    fn dirty_tail_detection() {
        assert!(BitBuffer::from_bits(&[0xF0], 4).expect("bits").dirty_tail());
        assert!(!BitBuffer::from_bits(&[0x0F], 4).expect("bits").dirty_tail());
        assert!(BitBuffer::from_bits(&[0x0F], 9).is_err());
    }
}
