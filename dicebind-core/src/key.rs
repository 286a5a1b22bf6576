use std::fmt;
use std::str::FromStr;

/// Blake3 hash of an encoded snapshot, used as its storage address.
///
/// Rendered and parsed as 64 lowercase hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key([u8; 32]);

/// Error returned when parsing a [`Key`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("expected 64 hex digits, got {0}")]
    Length(usize),
    #[error("invalid hex digit {0:?}")]
    Digit(char),
}

impl Key {
    /// Computes the key of the given snapshot bytes.
    pub fn from_data(data: &[u8]) -> Self {
        Key(*blake3::hash(data).as_bytes())
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Key(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 {
            return Err(KeyParseError::Length(s.len()));
        }
        let mut bytes = [0u8; 32];
        let mut digits = s.chars();
        for byte in &mut bytes {
            let mut next = || {
                let c = digits.next().ok_or(KeyParseError::Length(s.len()))?;
                c.to_digit(16).map(|d| d as u8).ok_or(KeyParseError::Digit(c))
            };
            *byte = (next()? << 4) | next()?;
        }
        Ok(Key(bytes))
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
