//! Typed values carried in and out of the wire codec.

use crate::pubkey::Pubkey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Unsigned(u128),
    Bool(bool),
    Bytes(Vec<u8>),
    /// UTF-8 text destined for a fixed-capacity byte field.
    Text(String),
    Pubkey(Pubkey),
    Struct(Vec<(String, Value)>),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Unsigned(_) => "unsigned integer",
            Value::Bool(_) => "bool",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
            Value::Pubkey(_) => "pubkey",
            Value::Struct(_) => "struct",
        }
    }

    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Value::Unsigned(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_pubkey(&self) -> Option<&Pubkey> {
        match self {
            Value::Pubkey(k) => Some(k),
            _ => None,
        }
    }

    /// Byte content of a `Bytes` or `Text` value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::Text(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Interpret `Bytes` as UTF-8, for fixed text fields such as a location.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Unsigned(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "\"{}\"", s),
            Value::Bytes(bytes) => {
                if let Ok(s) = std::str::from_utf8(bytes) {
                    if !s.is_empty() && s.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
                        return write!(f, "\"{}\"", s);
                    }
                }
                write!(f, "0x")?;
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            Value::Pubkey(k) => write!(f, "{}", k),
            Value::Struct(fields) => {
                let parts: Vec<String> = fields.iter().map(|(n, v)| format!("{}: {}", n, v)).collect();
                write!(f, "{{ {} }}", parts.join(", "))
            }
        }
    }
}

impl From<Pubkey> for Value {
    fn from(k: Pubkey) -> Self {
        Value::Pubkey(k)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Unsigned(v as u128)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}
