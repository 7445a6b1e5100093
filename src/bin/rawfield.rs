//! Encode or decode a single field from the command line.
//!
//! Usage:
//!   rawfield encode-int  [OPTIONS] VALUE        (decimal or 0x hex, may be negative)
//!   rawfield encode-bits [OPTIONS] BITS         ('0101'B or 0101, first character is bit 0)
//!   rawfield decode-int  [OPTIONS] HEX
//!   rawfield decode-bits [OPTIONS] HEX
//!
//! Options:
//!   --variant, -v ATTRS    Encoding attributes, e.g. "FIELDLENGTH(16), BYTEORDER(last)"
//!   --file FILE --type T   Take descriptor T from a descriptor set file instead
//!   --errors LIST          Error behaviours, e.g. "LEN_ERR:WARNING, SIGN_ERR:IGNORE"
//!   --bits N               Decode: only the first N bits of HEX are stream data
//!
//! Diagnostics go to stderr (set RUST_LOG=rawcodec=trace for codec tracing). Exits with 1
//! when an error-severity diagnostic was recorded.

use anyhow::{anyhow, bail, Context};
use rawcodec::dump::{bits_msb_first, hex, parse_hex};
use rawcodec::{
    decode_field, encode_field, load_descriptor_file, parse_error_behaviors, parse_variant, BitBuffer,
    BitSequence, CodecConfig, DecodeFlags, EncodedField, ErrorContext, FieldDescriptor, Integer,
};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy)]
enum Command {
    EncodeInt,
    EncodeBits,
    DecodeInt,
    DecodeBits,
}

fn take_option(args: &mut Vec<String>, long: &str, short: Option<&str>) -> anyhow::Result<Option<String>> {
    let Some(pos) = args.iter().position(|a| a == long || Some(a.as_str()) == short) else {
        return Ok(None);
    };
    args.remove(pos);
    if pos >= args.len() {
        bail!("{} needs a value", long);
    }
    Ok(Some(args.remove(pos)))
}

fn descriptor(args: &mut Vec<String>) -> anyhow::Result<FieldDescriptor> {
    let variant = take_option(args, "--variant", Some("-v"))?;
    let file = take_option(args, "--file", None)?;
    let type_name = take_option(args, "--type", None)?;
    match (variant, file) {
        (Some(_), Some(_)) => bail!("--variant and --file are mutually exclusive"),
        (Some(text), None) => parse_variant(type_name.as_deref().unwrap_or("Field"), &text).map_err(|e| anyhow!(e)),
        (None, Some(path)) => {
            let name = type_name.context("--file needs --type")?;
            load_descriptor_file(&path)?
                .into_iter()
                .find(|d| d.name == name)
                .ok_or_else(|| anyhow!("{}: no descriptor named '{}'", path, name))
        }
        (None, None) => parse_variant(type_name.as_deref().unwrap_or("Field"), "").map_err(|e| anyhow!(e)),
    }
}

fn print_encoded(field: &EncodedField) -> anyhow::Result<()> {
    let mut buf = BitBuffer::new();
    buf.put_field(field)?;
    println!("hex: {}", hex(buf.as_octets()));
    println!("bits: {}", field.bit_length);
    println!("alignment: {}", field.alignment);
    println!("stream: {}", bits_msb_first(buf.as_octets(), buf.len_bits()));
    Ok(())
}

fn input_buffer(text: &str, bits: Option<String>) -> anyhow::Result<BitBuffer> {
    let octets = parse_hex(text).map_err(|e| anyhow!(e))?;
    Ok(match bits {
        Some(n) => {
            let n: usize = n.parse().with_context(|| format!("invalid bit count '{}'", n))?;
            BitBuffer::from_bits(&octets, n)?
        }
        None => BitBuffer::from_octets(&octets),
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        bail!("usage: rawfield encode-int|encode-bits|decode-int|decode-bits [OPTIONS] INPUT");
    }
    let command = match args.remove(0).as_str() {
        "encode-int" => Command::EncodeInt,
        "encode-bits" => Command::EncodeBits,
        "decode-int" => Command::DecodeInt,
        "decode-bits" => Command::DecodeBits,
        other => bail!("unknown command '{}'", other),
    };
    let desc = descriptor(&mut args)?;
    let config = match take_option(&mut args, "--errors", None)? {
        Some(list) => parse_error_behaviors(&list).map_err(|e| anyhow!(e))?,
        None => CodecConfig::default(),
    };
    let bits = take_option(&mut args, "--bits", None)?;
    let input = match args.as_slice() {
        [one] => one.clone(),
        [] => bail!("missing input"),
        _ => bail!("unexpected arguments: {}", args.join(" ")),
    };

    let mut ctx = ErrorContext::with_config(config);
    match command {
        Command::EncodeInt => {
            let value: Integer = input.parse().map_err(|e: String| anyhow!(e))?;
            print_encoded(&encode_field(&value, &desc, &mut ctx)?)?;
        }
        Command::EncodeBits => {
            let value = BitSequence::from_bit_str(&input).map_err(|e| anyhow!(e))?;
            print_encoded(&encode_field(&value, &desc, &mut ctx)?)?;
        }
        Command::DecodeInt => {
            let mut buf = input_buffer(&input, bits)?;
            let limit = buf.remaining_bits();
            let out = decode_field::<Integer>(&mut buf, limit, &desc, DecodeFlags::default(), &mut ctx)?;
            println!("value: {}", out.value);
            println!("consumed: {}", out.consumed_bits);
        }
        Command::DecodeBits => {
            let mut buf = input_buffer(&input, bits)?;
            let limit = buf.remaining_bits();
            let out = decode_field::<BitSequence>(&mut buf, limit, &desc, DecodeFlags::default(), &mut ctx)?;
            println!("value: {}", out.value);
            println!("consumed: {}", out.consumed_bits);
        }
    }

    for d in ctx.diagnostics() {
        eprintln!("{}", d);
    }
    if ctx.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
