//! Textual descriptor notation, parsed with PEST.
//!
//! A variant is a comma-separated list of encoding attributes:
//!
//! ```text
//! FIELDLENGTH(16), COMP(signbit), BYTEORDER(last)
//! IntX, COMP(2scompl)
//! FIELDLENGTH(variable), LENGTHRESTRICTION(12)
//! ```
//!
//! A descriptor set names several variants, one per entry, with `//` comments allowed:
//!
//! ```text
//! Counter: FIELDLENGTH(8);
//! Delta:   IntX, COMP(2scompl);   // signed, self-delimiting
//! ```
//!
//! Attributes are applied left to right, so later ones win.

use crate::context::{CodecConfig, ErrorBehavior, ErrorKind};
use crate::descriptor::{ExtensionBit, FieldDescriptor, FieldLength, HexOrder, Order, SignMode, TopBitOrder};
use anyhow::Context;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser as PestParser;
use std::path::Path;

#[derive(PestParser)]
#[grammar = "variant.pest"]
struct VariantParser;

/// Parse an attribute list into a descriptor named `name`. An empty list gives the defaults
/// (unsigned, 8 bits, all orders `Lsb`).
pub fn parse_variant(name: &str, text: &str) -> Result<FieldDescriptor, String> {
    let pairs = VariantParser::parse(Rule::variant, text).map_err(|e| format!("Parse error: {}", e))?;
    let variant = pairs.into_iter().next().ok_or("Empty parse")?;
    let mut desc = FieldDescriptor::fixed(name, 8);
    for inner in variant.into_inner() {
        if inner.as_rule() == Rule::attributes {
            apply_attributes(&mut desc, inner)?;
        }
    }
    Ok(desc)
}

/// Parse `name: attributes;` entries.
pub fn parse_descriptor_set(text: &str) -> Result<Vec<FieldDescriptor>, String> {
    let pairs = VariantParser::parse(Rule::descriptor_set, text).map_err(|e| format!("Parse error: {}", e))?;
    let set = pairs.into_iter().next().ok_or("Empty parse")?;
    let mut out: Vec<FieldDescriptor> = Vec::new();
    for entry in set.into_inner() {
        if entry.as_rule() != Rule::entry {
            continue;
        }
        let mut it = entry.into_inner();
        let name = it.next().ok_or("entry: missing name")?.as_str();
        if out.iter().any(|d| d.name == name) {
            return Err(format!("duplicate descriptor '{}'", name));
        }
        let mut desc = FieldDescriptor::fixed(name, 8);
        let attrs = it.next().ok_or("entry: missing attributes")?;
        apply_attributes(&mut desc, attrs)?;
        out.push(desc);
    }
    Ok(out)
}

/// Read and parse a descriptor set file.
pub fn load_descriptor_file(path: impl AsRef<Path>) -> anyhow::Result<Vec<FieldDescriptor>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let set = parse_descriptor_set(&text).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), descriptors = set.len(), "loaded descriptor set");
    Ok(set)
}

/// Parse `LEN_ERR:WARNING, SIGN_ERR:IGNORE` on top of the default configuration.
pub fn parse_error_behaviors(text: &str) -> Result<CodecConfig, String> {
    let pairs = VariantParser::parse(Rule::behavior_list, text).map_err(|e| format!("Parse error: {}", e))?;
    let list = pairs.into_iter().next().ok_or("Empty parse")?;
    let mut config = CodecConfig::default();
    for behavior in list.into_inner() {
        if behavior.as_rule() != Rule::behavior {
            continue;
        }
        let mut it = behavior.into_inner();
        let kind_str = it.next().ok_or("behavior: missing error kind")?.as_str();
        let kind = ErrorKind::from_short_name(kind_str).ok_or_else(|| format!("unknown error kind '{}'", kind_str))?;
        let value = it.next().ok_or("behavior: missing value")?.as_str();
        let value = ErrorBehavior::from_name(value).ok_or_else(|| format!("unknown error behavior '{}'", value))?;
        config.set_behavior(kind, value);
    }
    Ok(config)
}

fn apply_attributes(desc: &mut FieldDescriptor, pair: Pair<Rule>) -> Result<(), String> {
    for attr in pair.into_inner() {
        let rule = attr.as_rule();
        if rule == Rule::intx {
            desc.field_length = FieldLength::Variable;
            continue;
        }
        if rule == Rule::legacy_decode {
            desc.legacy_decode = true;
            continue;
        }
        let arg = attr.into_inner().next().ok_or_else(|| format!("{:?}: missing argument", rule))?;
        let word = arg.as_str().to_ascii_lowercase();
        match rule {
            Rule::field_length => {
                desc.field_length = match arg.as_rule() {
                    Rule::variable => FieldLength::Variable,
                    _ => {
                        let raw: i64 = word.parse().map_err(|_| format!("invalid field length '{}'", word))?;
                        FieldLength::from_raw(raw)?
                    }
                }
            }
            Rule::comp => {
                desc.sign_mode = match word.as_str() {
                    "2scompl" => SignMode::TwosComplement,
                    "signbit" => SignMode::SignBit,
                    _ => SignMode::Unsigned,
                }
            }
            Rule::byte_order => desc.byte_order = if word == "last" { Order::Msb } else { Order::Lsb },
            Rule::bit_order_in_field => desc.bit_order_in_field = order(&word),
            Rule::bit_order_in_octet => desc.bit_order_in_octet = order(&word),
            Rule::bit_order => {
                desc.bit_order_in_field = order(&word);
                desc.bit_order_in_octet = order(&word);
            }
            Rule::field_order => desc.field_order = order(&word),
            Rule::hex_order => desc.hex_order = if word == "high" { HexOrder::High } else { HexOrder::Low },
            Rule::top_bit => {
                desc.top_bit_order = if word == "right" { TopBitOrder::Right } else { TopBitOrder::Left }
            }
            Rule::extension_bit => {
                desc.extension_bit = match word.as_str() {
                    "yes" => ExtensionBit::Yes,
                    "reverse" => ExtensionBit::Reverse,
                    _ => ExtensionBit::No,
                }
            }
            Rule::prepadding => desc.prepadding = count(&word)?,
            Rule::padding => desc.padding = count(&word)?,
            Rule::length_restriction => desc.length_restriction = Some(count(&word)?),
            other => return Err(format!("unexpected attribute {:?}", other)),
        }
    }
    Ok(())
}

fn order(word: &str) -> Order {
    if word == "msb" {
        Order::Msb
    } else {
        Order::Lsb
    }
}

fn count(word: &str) -> Result<usize, String> {
    word.parse().map_err(|_| format!("invalid bit count '{}'", word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_for_empty_variant() {
        let d = parse_variant("T", "").expect("parse");
        assert_eq!(d, FieldDescriptor::fixed("T", 8));
    }

    #[test]
    fn bit_order_sets_both() {
        let d = parse_variant("T", "bitorder(MSB)").expect("parse");
        assert_eq!(d.bit_order_in_field, Order::Msb);
        assert_eq!(d.bit_order_in_octet, Order::Msb);
    }

    #[test]
    fn negative_field_length_other_than_marker_rejected() {
        assert!(parse_variant("T", "FIELDLENGTH(-1)").expect("parse").is_variable());
        assert!(parse_variant("T", "FIELDLENGTH(-2)").is_err());
    }
}
