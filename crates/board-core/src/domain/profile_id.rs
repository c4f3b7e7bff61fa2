use std::fmt;

use rand::Rng;

const MAX_LEN: usize = 64;

/// Names one caller's profile, the server-side stand-in for a browser's
/// local storage.
///
/// Restricted to ASCII letters, digits, `-` and `_` so it can be used as a
/// file name or key segment as is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfileId(String);

impl ProfileId {
    /// Accept a caller-supplied id, or `None` if it is empty, too long or
    /// carries other characters.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        valid.then(|| Self(raw.to_string()))
    }

    /// Draw a fresh 128-bit id, hex encoded.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(format!("{:032x}", rng.r#gen::<u128>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
