//! Canonical JSON byte writer.
//!
//! Deliberately not built on `serde_json::to_vec`: the escaping rules here
//! (uppercase `\uXXXX`, no `ensure_ascii` expansion) and the fixed-point
//! number encoding diverge from serde_json's defaults, and the whole point
//! of a canonical form is that nobody can reach for the convenient default
//! and silently change the hashed bytes.

use std::fmt::Write as _;

/// A JSON-shaped value restricted to what the canonical encoder is allowed
/// to emit. There is no floating-point variant — callers pre-quantize any
/// float into [`CanonValue::FixedPoint`] using [`crate::quantize`].
#[derive(Debug, Clone, PartialEq)]
pub enum CanonValue {
    Int(i64),
    /// A decimal value already scaled to an integer, paired with the number
    /// of fractional digits the scale represents (e.g. `(1_000_000_000, 9)`
    /// for a value produced by `round(v * 1e9)`).
    FixedPoint(i64, u32),
    String(String),
    Array(Vec<CanonValue>),
    /// Object fields in the exact order they should be written. Callers are
    /// responsible for sorting (map keys ascending by UTF-8 byte order;
    /// manifest top-level fields in schema order).
    Object(Vec<(String, CanonValue)>),
}

impl CanonValue {
    pub fn str(s: impl Into<String>) -> Self {
        CanonValue::String(s.into())
    }

    pub fn object(fields: Vec<(String, CanonValue)>) -> Self {
        CanonValue::Object(fields)
    }
}

/// Writes [`CanonValue`] trees to the canonical byte form: no whitespace,
/// ascending-sorted map keys (caller's responsibility), UTF-8 byte
/// lexicographic array sort (caller's responsibility), uppercase `\uXXXX`
/// escapes for control characters, and fixed-point decimals with trailing
/// fractional zeros trimmed.
pub struct CanonWriter;

impl CanonWriter {
    pub fn encode(value: &CanonValue) -> Vec<u8> {
        let mut out = String::new();
        Self::write_value(value, &mut out);
        out.into_bytes()
    }

    fn write_value(value: &CanonValue, out: &mut String) {
        match value {
            CanonValue::Int(i) => {
                let _ = write!(out, "{}", i);
            }
            CanonValue::FixedPoint(scaled, frac_digits) => {
                out.push_str(&encode_fixed_point(*scaled, *frac_digits));
            }
            CanonValue::String(s) => write_escaped_string(s, out),
            CanonValue::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    Self::write_value(item, out);
                }
                out.push(']');
            }
            CanonValue::Object(fields) => {
                out.push('{');
                for (i, (key, val)) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_escaped_string(key, out);
                    out.push(':');
                    Self::write_value(val, out);
                }
                out.push('}');
            }
        }
    }
}

fn write_escaped_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Encodes `scaled / 10^frac_digits` as a decimal literal with up to
/// `frac_digits` fractional digits, trimming trailing fractional zeros and
/// never emitting a bare trailing `.`.
pub fn encode_fixed_point(scaled: i64, frac_digits: u32) -> String {
    let scale = 10i64.pow(frac_digits);
    let sign = if scaled < 0 { "-" } else { "" };
    let magnitude = scaled.unsigned_abs();
    let int_part = magnitude / scale as u64;
    let frac_part = magnitude % scale as u64;

    if frac_part == 0 {
        return format!("{sign}{int_part}");
    }

    let mut frac_str = format!("{:0width$}", frac_part, width = frac_digits as usize);
    while frac_str.ends_with('0') {
        frac_str.pop();
    }
    format!("{sign}{int_part}.{frac_str}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_has_no_leading_zeros() {
        let v = CanonValue::Int(0);
        assert_eq!(CanonWriter::encode(&v), b"0");
        let v = CanonValue::Int(-7);
        assert_eq!(CanonWriter::encode(&v), b"-7");
    }

    #[test]
    fn test_fixed_point_trims_trailing_zeros() {
        // unit_scale = 1.0 -> round(1.0 * 1e9) = 1_000_000_000
        assert_eq!(encode_fixed_point(1_000_000_000, 9), "1");
        // 0.5 -> 500_000_000
        assert_eq!(encode_fixed_point(500_000_000, 9), "0.5");
        // 1.000000001
        assert_eq!(encode_fixed_point(1_000_000_001, 9), "1.000000001");
        assert_eq!(encode_fixed_point(0, 9), "0");
        assert_eq!(encode_fixed_point(-500_000_000, 9), "-0.5");
    }

    #[test]
    fn test_string_escaping_uses_uppercase_hex() {
        let v = CanonValue::str("a\u{1}b\"\\c");
        let bytes = CanonWriter::encode(&v);
        let s = String::from_utf8(bytes).unwrap();
        assert_eq!(s, "\"a\\u0001b\\\"\\\\c\"");
    }

    #[test]
    fn test_no_whitespace_in_objects_or_arrays() {
        let v = CanonValue::object(vec![
            ("a".to_string(), CanonValue::Int(1)),
            ("b".to_string(), CanonValue::Array(vec![CanonValue::Int(2), CanonValue::Int(3)])),
        ]);
        let s = String::from_utf8(CanonWriter::encode(&v)).unwrap();
        assert_eq!(s, r#"{"a":1,"b":[2,3]}"#);
        assert!(!s.contains(' '));
    }

    #[test]
    fn test_higher_plane_codepoints_are_not_escaped() {
        let v = CanonValue::str("caf\u{e9} \u{1F600}");
        let s = String::from_utf8(CanonWriter::encode(&v)).unwrap();
        assert!(s.contains('\u{e9}'));
        assert!(s.contains('\u{1F600}'));
    }
}
