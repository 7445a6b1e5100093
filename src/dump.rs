//! Human-readable renderings of encoded fields and hex input parsing.

/// Upper-case hex, no separators: `[0x12, 0xAB]` -> `"12AB"`.
pub fn hex(octets: &[u8]) -> String {
    octets.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Parse hex text; whitespace, `_` and an optional `0x` prefix are ignored.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, String> {
    let t = text.trim();
    let t = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")).unwrap_or(t);
    let digits: Vec<u8> = t
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .map(|c| c.to_digit(16).map(|d| d as u8).ok_or_else(|| format!("invalid hex digit '{}'", c)))
        .collect::<Result<_, _>>()?;
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", digits.len()));
    }
    Ok(digits.chunks(2).map(|p| (p[0] << 4) | p[1]).collect())
}

/// The first `n_bits` stream bits of `octets`, each octet rendered most significant bit first
/// and groups separated by a space. A trailing partial octet shows only its low bits.
pub fn bits_msb_first(octets: &[u8], n_bits: usize) -> String {
    let mut groups = Vec::new();
    for (i, octet) in octets.iter().enumerate() {
        let start = i * 8;
        if start >= n_bits {
            break;
        }
        let width = (n_bits - start).min(8);
        groups.push((0..width).rev().map(|b| if (octet >> b) & 1 != 0 { '1' } else { '0' }).collect::<String>());
    }
    groups.join(" ")
}
