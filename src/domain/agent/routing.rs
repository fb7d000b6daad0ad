//! Query domains and the domain-to-store mapping

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::vector_store::StoreId;

/// Fixed category a query or document belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Domain {
    Healthcare,
    Engineering,
}

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::Healthcare, Domain::Engineering];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthcare => "HEALTHCARE",
            Self::Engineering => "ENGINEERING",
        }
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    /// Case-insensitive; surrounding whitespace and quotes are ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().trim_matches('"').trim();

        Domain::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| format!("'{}' is not one of HEALTHCARE, ENGINEERING", label))
    }
}

/// Total mapping from domain to store slot
///
/// Domains missing from the table go to the fallback slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRouter {
    table: HashMap<Domain, StoreId>,
    fallback: StoreId,
}

impl StoreRouter {
    pub fn new(fallback: StoreId) -> Self {
        Self {
            table: HashMap::new(),
            fallback,
        }
    }

    pub fn with_route(mut self, domain: Domain, store: StoreId) -> Self {
        self.table.insert(domain, store);
        self
    }

    pub fn route(&self, domain: Domain) -> StoreId {
        self.table.get(&domain).copied().unwrap_or(self.fallback)
    }
}

impl Default for StoreRouter {
    /// HEALTHCARE reads store A, everything else store B
    fn default() -> Self {
        Self::new(StoreId::B).with_route(Domain::Healthcare, StoreId::A)
    }
}
