use serde::{Deserialize, Serialize};

use crate::holdings::Holding;

/// Family that sees every portfolio.
pub const LOCAL_FAMILY: &str = "local";

/// One line of `portfolios.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PortfolioEntry {
    pub id: String,
    pub name: String,
    pub family: String,
    pub color: String,
    /// Holdings file relative to the fixtures directory. Defaults to `<id>.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl PortfolioEntry {
    pub fn holdings_file(&self) -> String {
        self.file
            .clone()
            .unwrap_or_else(|| format!("{}.json", self.id))
    }
}

/// A named person's portfolio.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub id: String,
    pub name: String,
    pub family: String,
    pub color: String,
    pub holdings: Vec<Holding>,
}

impl Portfolio {
    /// Listing view without holdings.
    pub fn info(&self) -> PortfolioInfo {
        PortfolioInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            family: self.family.clone(),
            color: self.color.clone(),
            holdings_count: self.holdings.len(),
        }
    }

    pub fn is_visible_to(&self, family: &str) -> bool {
        family.eq_ignore_ascii_case(LOCAL_FAMILY) || self.family.eq_ignore_ascii_case(family)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioInfo {
    pub id: String,
    pub name: String,
    pub family: String,
    pub color: String,
    pub holdings_count: usize,
}
