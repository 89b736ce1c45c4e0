use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the three upstream product catalogs.
///
/// The serialized key (`"oksid"`, `"penta"`, `"denge"`) is also the primary
/// sort key when results from several marketplaces are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marketplace {
    Oksid,
    Penta,
    Denge,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown marketplace: {0:?}")]
pub struct UnknownMarketplace(pub String);

impl Marketplace {
    /// Every marketplace, in fan-out order.
    pub const ALL: [Marketplace; 3] = [Marketplace::Penta, Marketplace::Denge, Marketplace::Oksid];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Marketplace::Oksid => "oksid",
            Marketplace::Penta => "penta",
            Marketplace::Denge => "denge",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Marketplace::Oksid => "Oksid",
            Marketplace::Penta => "Penta/Bayinet",
            Marketplace::Denge => "Denge",
        }
    }

    /// Resolves an optional store filter as passed by callers.
    ///
    /// `None` and blank strings mean "all marketplaces".
    ///
    /// # Errors
    ///
    /// Returns [`UnknownMarketplace`] when a non-blank value names no marketplace.
    pub fn parse_filter(store: Option<&str>) -> Result<Option<Marketplace>, UnknownMarketplace> {
        match store.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some),
        }
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Marketplace {
    type Err = UnknownMarketplace;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oksid" => Ok(Marketplace::Oksid),
            // The Penta catalog is stored in the `bayinet_products` table.
            "penta" | "bayinet" => Ok(Marketplace::Penta),
            "denge" => Ok(Marketplace::Denge),
            _ => Err(UnknownMarketplace(s.to_string())),
        }
    }
}
