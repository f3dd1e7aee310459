//! Wire-type-aware value parsing from CLI strings.

use multisynq_idl_core::types::WireType;
use multisynq_idl_core::value::Value;

use crate::hex::{hex_decode, parse_pubkey, strip_0x};

/// Parse a CLI string value according to its wire type.
pub fn parse_value(raw: &str, ty: &WireType) -> Result<Value, String> {
    match ty {
        WireType::Unsigned(width) => parse_unsigned(raw, *width),
        WireType::Bool => parse_bool(raw),
        WireType::FixedBytes(len) => parse_fixed_bytes(raw, *len),
        WireType::Pubkey => parse_pubkey(raw).map(Value::Pubkey),
        WireType::Struct { .. } => {
            let json: serde_json::Value = serde_json::from_str(raw)
                .map_err(|e| format!("Invalid JSON object '{}': {}", raw, e))?;
            value_from_json(&json, ty)
        }
        WireType::Text | WireType::Named(_) => Err(format!(
            "Type '{}' has no fixed wire width and cannot be passed positionally",
            ty
        )),
    }
}

fn parse_unsigned(raw: &str, width: usize) -> Result<Value, String> {
    let v = raw
        .parse::<u128>()
        .map_err(|e| format!("Invalid u{} '{}': {}", width * 8, raw, e))?;
    if width < 16 && v >> (width * 8) != 0 {
        return Err(format!("Value {} does not fit in u{}", v, width * 8));
    }
    Ok(Value::Unsigned(v))
}

fn parse_bool(raw: &str) -> Result<Value, String> {
    match raw {
        "true" | "1" | "yes" => Ok(Value::Bool(true)),
        "false" | "0" | "no" => Ok(Value::Bool(false)),
        _ => Err(format!("Invalid bool '{}': expected true/false", raw)),
    }
}

/// `[u8; N]`: exactly 2N hex chars, `0x`-prefixed hex, or text of at most N bytes.
fn parse_fixed_bytes(raw: &str, len: usize) -> Result<Value, String> {
    let is_hex = |s: &str| s.chars().all(|c| c.is_ascii_hexdigit());
    if raw.len() == len * 2 && is_hex(raw) {
        return Ok(Value::Bytes(hex_decode(raw)?));
    }
    if raw.starts_with("0x") || raw.starts_with("0X") {
        let bytes = hex_decode(strip_0x(raw))?;
        if bytes.len() > len {
            return Err(format!("Expected at most {} bytes from hex, got {}", len, bytes.len()));
        }
        return Ok(Value::Bytes(bytes));
    }
    if raw.len() > len {
        return Err(format!(
            "String '{}' is {} bytes, max {} for [u8; {}]",
            raw,
            raw.len(),
            len,
            len
        ));
    }
    Ok(Value::Text(raw.to_string()))
}

/// Convert a JSON value into a typed [`Value`]; used for nested structs.
pub fn value_from_json(json: &serde_json::Value, ty: &WireType) -> Result<Value, String> {
    match (ty, json) {
        (WireType::Struct { name, fields }, serde_json::Value::Object(map)) => {
            let mut out = Vec::with_capacity(fields.len());
            for field in fields {
                let v = map
                    .get(&field.name)
                    .ok_or_else(|| format!("{} is missing field '{}'", name, field.name))?;
                out.push((field.name.clone(), value_from_json(v, &field.wire_type)?));
            }
            Ok(Value::Struct(out))
        }
        (WireType::Unsigned(width), serde_json::Value::Number(n)) => parse_unsigned(&n.to_string(), *width),
        (WireType::Bool, serde_json::Value::Bool(b)) => Ok(Value::Bool(*b)),
        (_, serde_json::Value::String(s)) => parse_value(s, ty),
        (_, other) => Err(format!("Cannot read {} from JSON {}", ty, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multisynq_idl_core::pubkey::Pubkey;
    use multisynq_idl_core::types::FieldSpec;

    #[test]
    fn unsigned_respects_width() {
        assert_eq!(parse_value("255", &WireType::Unsigned(1)).unwrap(), Value::Unsigned(255));
        assert!(parse_value("256", &WireType::Unsigned(1)).is_err());
        assert!(parse_value("-1", &WireType::Unsigned(8)).is_err());
    }

    #[test]
    fn fixed_bytes_accepts_text_and_hex() {
        let ty = WireType::FixedBytes(4);
        assert_eq!(parse_value("NY", &ty).unwrap(), Value::Text("NY".into()));
        assert_eq!(parse_value("0a0b0c0d", &ty).unwrap(), Value::Bytes(vec![10, 11, 12, 13]));
        assert_eq!(parse_value("0x0a", &ty).unwrap(), Value::Bytes(vec![10]));
        assert!(parse_value("Paris", &ty).is_err());
    }

    #[test]
    fn pubkey_and_bool() {
        assert_eq!(
            parse_value("11111111111111111111111111111111", &WireType::Pubkey).unwrap(),
            Value::Pubkey(Pubkey::default())
        );
        assert_eq!(parse_value("yes", &WireType::Bool).unwrap(), Value::Bool(true));
        assert!(parse_value("maybe", &WireType::Bool).is_err());
    }

    #[test]
    fn struct_from_json_object() {
        let ty = WireType::Struct {
            name: "Fees".into(),
            fields: vec![
                FieldSpec { name: "bps".into(), wire_type: WireType::Unsigned(2), byte_width: Some(2) },
                FieldSpec { name: "enabled".into(), wire_type: WireType::Bool, byte_width: Some(1) },
            ],
        };
        let v = parse_value(r#"{"bps": 30, "enabled": true}"#, &ty).unwrap();
        assert_eq!(
            v,
            Value::Struct(vec![("bps".into(), Value::Unsigned(30)), ("enabled".into(), Value::Bool(true))])
        );
        assert!(parse_value(r#"{"bps": 30}"#, &ty).is_err());
    }

    #[test]
    fn variable_string_rejected() {
        assert!(parse_value("session1", &WireType::Text).is_err());
    }
}
