//! Descriptor notation tests: attribute parsing, descriptor sets and error-behaviour lists.

use rawcodec::descriptor::{ExtensionBit, HexOrder, TopBitOrder};
use rawcodec::{
    encode_field, load_descriptor_file, parse_descriptor_set, parse_error_behaviors, parse_variant, ErrorBehavior,
    ErrorContext, ErrorKind, FieldLength, Integer, Order, SignMode,
};
use std::io::Write;

// ==================== Attributes ====================

#[test]
fn parse_fixed_signed_big_endian() {
    let d = parse_variant("S16", "FIELDLENGTH(16), COMP(2scompl), BYTEORDER(last)").expect("parse");
    assert_eq!(d.name, "S16");
    assert_eq!(d.field_length, FieldLength::Fixed(16));
    assert_eq!(d.sign_mode, SignMode::TwosComplement);
    assert_eq!(d.byte_order, Order::Msb);
}

#[test]
fn parse_is_case_insensitive() {
    let d = parse_variant("T", "fieldLength(4), comp(SIGNBIT), BitOrderInField(msb)").expect("parse");
    assert_eq!(d.field_length, FieldLength::Fixed(4));
    assert_eq!(d.sign_mode, SignMode::SignBit);
    assert_eq!(d.bit_order_in_field, Order::Msb);
}

#[test]
fn parse_intx_and_variable() {
    assert!(parse_variant("X", "IntX").expect("parse").is_variable());
    assert!(parse_variant("X", "FIELDLENGTH(variable)").expect("parse").is_variable());
}

#[test]
fn parse_padding_and_restriction() {
    let d = parse_variant("P", "FIELDLENGTH(10), PREPADDING(3), PADDING(5), LENGTHRESTRICTION(4)").expect("parse");
    assert_eq!(d.prepadding, 3);
    assert_eq!(d.padding, 5);
    assert_eq!(d.length_restriction, Some(4));
}

#[test]
fn parse_carried_attributes() {
    let d = parse_variant(
        "C",
        "HEXORDER(high), TOPBIT(right), EXTENSION_BIT(reverse), FIELDORDER(msb), LEGACYDECODE",
    )
    .expect("parse");
    assert_eq!(d.hex_order, HexOrder::High);
    assert_eq!(d.top_bit_order, TopBitOrder::Right);
    assert_eq!(d.extension_bit, ExtensionBit::Reverse);
    assert_eq!(d.field_order, Order::Msb);
    assert!(d.legacy_decode);
    let params = d.coding_params();
    assert_eq!(params.hex_order, HexOrder::High);
    assert_eq!(params.extension_bit, ExtensionBit::Reverse);
}

#[test]
fn later_attributes_win() {
    let d = parse_variant("T", "FIELDLENGTH(8), IntX, BYTEORDER(last), BYTEORDER(first)").expect("parse");
    assert!(d.is_variable());
    assert_eq!(d.byte_order, Order::Lsb);
}

#[test]
fn parsed_variant_drives_encoding() {
    let d = parse_variant("S8", "FIELDLENGTH(8), COMP(signbit)").expect("parse");
    let mut ctx = ErrorContext::new();
    let field = encode_field(&Integer::from(-5i64), &d, &mut ctx).expect("encode");
    assert_eq!(field.octets, vec![0x85]);
}

// ==================== Syntax errors ====================

#[test]
fn reject_unknown_attribute() {
    assert!(parse_variant("T", "FIELDLENGTH(8), WIDGET(3)").is_err());
}

#[test]
fn reject_bad_arguments() {
    assert!(parse_variant("T", "COMP(ones)").is_err());
    assert!(parse_variant("T", "FIELDLENGTH()").is_err());
    assert!(parse_variant("T", "PADDING(-1)").is_err());
    assert!(parse_variant("T", "FIELDLENGTH(8),").is_err());
}

// ==================== Descriptor sets ====================

const SET: &str = r#"
// counters
Counter: FIELDLENGTH(8);
Delta:   IntX, COMP(2scompl);   // signed, self-delimiting
Flags:   FIELDLENGTH(variable), BITORDER(msb);
"#;

#[test]
fn parse_set_entries_in_order() {
    let set = parse_descriptor_set(SET).expect("parse");
    let names: Vec<&str> = set.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Counter", "Delta", "Flags"]);
    assert_eq!(set[1].sign_mode, SignMode::TwosComplement);
    assert_eq!(set[2].bit_order_in_octet, Order::Msb);
}

#[test]
fn reject_duplicate_names() {
    let err = parse_descriptor_set("A: IntX;\nA: FIELDLENGTH(4);").expect_err("duplicate");
    assert!(err.contains("duplicate"));
}

#[test]
fn reject_missing_semicolon() {
    assert!(parse_descriptor_set("A: IntX").is_err());
}

#[test]
fn load_set_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(SET.as_bytes()).expect("write");
    let set = load_descriptor_file(file.path()).expect("load");
    assert_eq!(set.len(), 3);
    assert!(set[1].is_variable());
}

#[test]
fn load_reports_path_on_error() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(b"Broken: FIELDLENGTH(").expect("write");
    let err = load_descriptor_file(file.path()).expect_err("broken");
    assert!(err.to_string().contains(&file.path().display().to_string()));

    let dir = tempfile::tempdir().expect("tempdir");
    assert!(load_descriptor_file(dir.path().join("missing.var")).is_err());
}

// ==================== Error behaviours ====================

#[test]
fn parse_behaviour_list() {
    let config = parse_error_behaviors("LEN_ERR:WARNING, sign_err:ignore").expect("parse");
    assert_eq!(config.behavior(ErrorKind::LengthError), ErrorBehavior::Warning);
    assert_eq!(config.behavior(ErrorKind::SignError), ErrorBehavior::Ignore);
    assert_eq!(config.behavior(ErrorKind::Unbound), ErrorBehavior::Error);
    assert_eq!(config.behavior(ErrorKind::Superfluous), ErrorBehavior::Warning);
}

#[test]
fn reject_unknown_error_kind() {
    assert!(parse_error_behaviors("FOO_ERR:WARNING").is_err());
    assert!(parse_error_behaviors("LEN_ERR:LOUD").is_err());
    assert!(parse_error_behaviors("").is_ok());
}
