//! Field descriptors: the static, per-type configuration that maps a scalar to bits.
//!
//! Descriptors are owned by the type system and never mutated by the codec; they are
//! `Clone + Send + Sync` so they can be cached and shared across threads. The only derived
//! data is the pair of *effective* orders returned by [`FieldDescriptor::coding_params`].

use std::fmt;

/// Orientation flag (`first`/`lsb` vs `last`/`msb` in the attribute notation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Order {
    #[default]
    Lsb,
    Msb,
}

impl Order {
    pub fn flipped(self) -> Order {
        match self {
            Order::Lsb => Order::Msb,
            Order::Msb => Order::Lsb,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignMode {
    #[default]
    Unsigned,
    TwosComplement,
    /// Sign stored as one explicit bit above the magnitude.
    SignBit,
}

impl SignMode {
    pub fn is_signed(self) -> bool {
        self != SignMode::Unsigned
    }
}

/// Fixed bit width, or the self-describing variable length (IntX for integers,
/// "rest of the limit" for bit sequences).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldLength {
    Fixed(usize),
    Variable,
}

impl FieldLength {
    /// Marker used by the numeric notation for the variable length.
    pub const VARIABLE_MARKER: i64 = -1;

    /// Convert a numeric length: `-1` is the only legal variable marker.
    pub fn from_raw(raw: i64) -> Result<FieldLength, String> {
        match raw {
            Self::VARIABLE_MARKER => Ok(FieldLength::Variable),
            n if n < 0 => Err(format!("invalid field length {}", n)),
            n => usize::try_from(n)
                .map(FieldLength::Fixed)
                .map_err(|_| format!("field length {} too large", n)),
        }
    }

    pub fn to_raw(self) -> i64 {
        match self {
            FieldLength::Fixed(n) => n as i64,
            FieldLength::Variable => Self::VARIABLE_MARKER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TopBitOrder {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExtensionBit {
    #[default]
    No,
    Yes,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HexOrder {
    #[default]
    Low,
    High,
}

/// Per-type binary encoding configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Type name, used as the error-context frame.
    pub name: String,
    pub field_length: FieldLength,
    pub sign_mode: SignMode,
    pub byte_order: Order,
    pub bit_order_in_field: Order,
    pub bit_order_in_octet: Order,
    pub hex_order: HexOrder,
    pub field_order: Order,
    pub top_bit_order: TopBitOrder,
    pub extension_bit: ExtensionBit,
    /// Bits skipped before the field.
    pub prepadding: usize,
    /// Filler bits after the field.
    pub padding: usize,
    /// Cap on the number of decoded bits.
    pub length_restriction: Option<usize>,
    /// Compatibility switch for an alternate decoding heuristic; carried, not interpreted.
    pub legacy_decode: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_length: FieldLength) -> Self {
        FieldDescriptor {
            name: name.into(),
            field_length,
            sign_mode: SignMode::default(),
            byte_order: Order::Lsb,
            bit_order_in_field: Order::Lsb,
            bit_order_in_octet: Order::Lsb,
            hex_order: HexOrder::default(),
            field_order: Order::Lsb,
            top_bit_order: TopBitOrder::default(),
            extension_bit: ExtensionBit::default(),
            prepadding: 0,
            padding: 0,
            length_restriction: None,
            legacy_decode: false,
        }
    }

    pub fn fixed(name: impl Into<String>, bits: usize) -> Self {
        Self::new(name, FieldLength::Fixed(bits))
    }

    /// Self-describing variable length (IntX for integers).
    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(name, FieldLength::Variable)
    }

    pub fn with_sign_mode(mut self, sign_mode: SignMode) -> Self {
        self.sign_mode = sign_mode;
        self
    }

    pub fn with_byte_order(mut self, order: Order) -> Self {
        self.byte_order = order;
        self
    }

    pub fn with_bit_order_in_field(mut self, order: Order) -> Self {
        self.bit_order_in_field = order;
        self
    }

    pub fn with_bit_order_in_octet(mut self, order: Order) -> Self {
        self.bit_order_in_octet = order;
        self
    }

    pub fn with_field_order(mut self, order: Order) -> Self {
        self.field_order = order;
        self
    }

    pub fn with_hex_order(mut self, order: HexOrder) -> Self {
        self.hex_order = order;
        self
    }

    pub fn with_top_bit_order(mut self, order: TopBitOrder) -> Self {
        self.top_bit_order = order;
        self
    }

    pub fn with_extension_bit(mut self, ext: ExtensionBit) -> Self {
        self.extension_bit = ext;
        self
    }

    pub fn with_prepadding(mut self, bits: usize) -> Self {
        self.prepadding = bits;
        self
    }

    pub fn with_padding(mut self, bits: usize) -> Self {
        self.padding = bits;
        self
    }

    pub fn with_length_restriction(mut self, bits: usize) -> Self {
        self.length_restriction = Some(bits);
        self
    }

    pub fn with_legacy_decode(mut self, on: bool) -> Self {
        self.legacy_decode = on;
        self
    }

    pub fn is_variable(&self) -> bool {
        self.field_length == FieldLength::Variable
    }

    /// Orientation actually applied to buffer I/O for this field.
    pub fn coding_params(&self) -> CodingParams {
        let (byte_order, bit_order) =
            resolve_orientation(self.byte_order, self.bit_order_in_field, self.bit_order_in_octet);
        CodingParams {
            byte_order,
            bit_order,
            field_order: self.field_order,
            hex_order: self.hex_order,
            top_bit_order: self.top_bit_order,
            extension_bit: self.extension_bit,
        }
    }

    /// `-1` when the trailing filler belongs at the low end of the next field (MSB-oriented
    /// fields), `+1` otherwise.
    pub fn alignment_sign(&self) -> isize {
        match self.coding_params().byte_order {
            Order::Msb => -1,
            Order::Lsb => 1,
        }
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [length {}, {:?}]", self.name, self.field_length.to_raw(), self.sign_mode)
    }
}

/// Effective `(byte_order, bit_order_in_octet)`: both flip when the field's bit order is
/// the non-default `Msb`.
pub fn resolve_orientation(
    byte_order: Order,
    bit_order_in_field: Order,
    bit_order_in_octet: Order,
) -> (Order, Order) {
    match bit_order_in_field {
        Order::Lsb => (byte_order, bit_order_in_octet),
        Order::Msb => (byte_order.flipped(), bit_order_in_octet.flipped()),
    }
}

/// Orientation parameters handed to the bit buffer with every read/write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CodingParams {
    pub byte_order: Order,
    pub bit_order: Order,
    /// Forwarded for composite assembly.
    pub field_order: Order,
    pub hex_order: HexOrder,
    pub top_bit_order: TopBitOrder,
    pub extension_bit: ExtensionBit,
}

impl CodingParams {
    pub fn with_byte_order(mut self, order: Order) -> Self {
        self.byte_order = order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_length_marker() {
        assert_eq!(FieldLength::from_raw(-1), Ok(FieldLength::Variable));
        assert_eq!(FieldLength::from_raw(0), Ok(FieldLength::Fixed(0)));
        assert_eq!(FieldLength::from_raw(12), Ok(FieldLength::Fixed(12)));
        assert!(FieldLength::from_raw(-2).is_err());
        assert_eq!(FieldLength::Variable.to_raw(), -1);
    }

    #[test]
    fn orientation_flips_with_msb_field_order() {
        assert_eq!(resolve_orientation(Order::Lsb, Order::Lsb, Order::Msb), (Order::Lsb, Order::Msb));
        assert_eq!(resolve_orientation(Order::Lsb, Order::Msb, Order::Msb), (Order::Msb, Order::Lsb));
    }

    #[test]
    fn alignment_sign_follows_effective_byte_order() {
        let d = FieldDescriptor::fixed("t", 8);
        assert_eq!(d.alignment_sign(), 1);
        assert_eq!(d.clone().with_byte_order(Order::Msb).alignment_sign(), -1);
        assert_eq!(
            d.with_byte_order(Order::Msb).with_bit_order_in_field(Order::Msb).alignment_sign(),
            1
        );
    }
}
