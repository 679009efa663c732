//! Fixed-capacity, null-terminated name fields.
//!
//! Package records store names inline in fixed byte arrays. A name must leave
//! room for its terminator; anything longer is rejected rather than truncated.

use crate::errors::{EsfError, Result};

/// Capacity in bytes (terminator included) of every name field in a package.
pub const NAME_CAPACITY: usize = 64;

/// A name encoded into a zero-padded byte array of capacity `N`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundedName<const N: usize = NAME_CAPACITY>([u8; N]);

impl<const N: usize> BoundedName<N> {
    /// Encodes `name`. Fails when the name plus terminator exceeds `N` bytes
    /// or when it contains an interior NUL.
    pub fn new(name: &str) -> Result<Self> {
        let bytes = name.as_bytes();
        if bytes.len() >= N {
            return Err(EsfError::Format(format!(
                "name '{name}' is {} bytes, capacity is {} including terminator",
                bytes.len(),
                N
            )));
        }
        if bytes.contains(&0) {
            return Err(EsfError::Format(format!(
                "name '{}' contains a NUL byte",
                name.escape_debug()
            )));
        }
        let mut buf = [0u8; N];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Decodes a raw field read from disk.
    pub fn from_bytes(raw: [u8; N]) -> Result<Self> {
        let name = Self(raw);
        name.decode()?;
        Ok(name)
    }

    #[inline]
    #[must_use]
    pub fn to_bytes(self) -> [u8; N] {
        self.0
    }

    /// The encoded name without terminator and padding.
    pub fn decode(&self) -> Result<&str> {
        let end = self
            .0
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| EsfError::Format("name field is not null-terminated".into()))?;
        std::str::from_utf8(&self.0[..end])
            .map_err(|e| EsfError::Format(format!("name field is not valid UTF-8: {e}")))
    }
}

impl<const N: usize> std::fmt::Debug for BoundedName<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.decode() {
            Ok(name) => write!(f, "BoundedName({name:?})"),
            Err(_) => write!(f, "BoundedName(<invalid>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_and_pads() {
        let name = BoundedName::<8>::new("abc").unwrap();
        assert_eq!(name.to_bytes(), *b"abc\0\0\0\0\0");
        assert_eq!(name.decode().unwrap(), "abc");
    }

    #[test]
    fn longest_name_keeps_terminator() {
        assert!(BoundedName::<8>::new("1234567").is_ok());
        let err = BoundedName::<8>::new("12345678").unwrap_err();
        assert!(matches!(err, EsfError::Format(_)));
    }

    #[test]
    fn rejects_interior_nul() {
        assert!(matches!(
            BoundedName::<8>::new("a\0b"),
            Err(EsfError::Format(_))
        ));
    }

    #[test]
    fn from_bytes_requires_terminator() {
        assert!(BoundedName::<4>::from_bytes(*b"abcd").is_err());
        assert_eq!(
            BoundedName::<4>::from_bytes(*b"ab\0\0").unwrap().decode().unwrap(),
            "ab"
        );
    }
}
