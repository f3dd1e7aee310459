//! Hex and public-key text helpers.

use multisynq_idl_core::pubkey::Pubkey;

pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Decode hex, with or without a `0x` prefix.
pub fn hex_decode(input: &str) -> Result<Vec<u8>, String> {
    let hex = strip_0x(input);
    if !hex.is_ascii() {
        return Err(format!("Not a hex string: '{}'", input));
    }
    if hex.len() % 2 != 0 {
        return Err(format!("Hex string has odd length: {}", hex.len()));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| format!("Invalid hex at position {}: {}", i, e))
        })
        .collect()
}

pub fn strip_0x(input: &str) -> &str {
    input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input)
}

/// Parse a public key from base58 or 64 hex chars.
pub fn parse_pubkey(input: &str) -> Result<Pubkey, String> {
    if let Ok(key) = input.parse::<Pubkey>() {
        return Ok(key);
    }
    let bytes = hex_decode(input).map_err(|_| {
        format!("Invalid public key '{}': expected base58 or 64 hex chars", input)
    })?;
    Pubkey::try_from_slice(&bytes).ok_or_else(|| {
        format!(
            "Expected 32 bytes, got {} (provide base58 or 64 hex chars)",
            bytes.len()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip_with_prefix() {
        assert_eq!(hex_decode("0xdeadBEEF").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(hex_encode(&[0, 255]), "00ff");
        assert!(hex_decode("abc").is_err());
    }

    #[test]
    fn pubkey_from_base58_or_hex() {
        let zero = parse_pubkey("11111111111111111111111111111111").unwrap();
        assert_eq!(zero, Pubkey::default());
        let hex = "07".repeat(32);
        assert_eq!(parse_pubkey(&hex).unwrap(), Pubkey::new([7u8; 32]));
        assert!(parse_pubkey("0x0707").is_err());
    }
}
