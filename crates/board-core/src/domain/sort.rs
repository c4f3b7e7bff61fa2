use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Listing order for posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Creation time, newest first.
    #[default]
    Newest,
    /// Reply count, highest first.
    Most,
    /// Client-side shuffle.
    Random,
}

impl FromStr for SortOrder {
    type Err = Infallible;

    /// Anything other than `newest` or `most` is a random listing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "newest" => SortOrder::Newest,
            "most" => SortOrder::Most,
            _ => SortOrder::Random,
        })
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortOrder::Newest => "newest",
            SortOrder::Most => "most",
            SortOrder::Random => "random",
        };
        f.write_str(name)
    }
}
