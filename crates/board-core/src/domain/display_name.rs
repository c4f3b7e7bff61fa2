use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Pseudo-anonymous name shown next to posts and replies.
///
/// Names are not unique: two profiles can draw the same number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    /// Draw a fresh `User #NNNN` name.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let number: u16 = rng.gen_range(1000..10000);
        Self(format!("User #{number}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for DisplayName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
