//! Portfolio registry backed by a fixtures directory.
//!
//! Layout:
//!
//! ```text
//! fixtures/
//!   portfolios.json     [{ "id", "name", "family", "color", "file"? }, ...]
//!   reagan.json         [Holding, ...]
//!   ...
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{debug, info};

use super::portfolio_model::{Portfolio, PortfolioEntry};
use crate::errors::{Error, Result};
use crate::holdings::Holding;

pub const MANIFEST_FILE: &str = "portfolios.json";

#[derive(Debug, Clone, Default)]
pub struct PortfolioRegistry {
    portfolios: Vec<Portfolio>,
}

impl PortfolioRegistry {
    /// Build a registry from already loaded portfolios. Ids must be unique.
    pub fn new(portfolios: Vec<Portfolio>) -> Result<Self> {
        {
            let mut seen = HashSet::new();
            for portfolio in &portfolios {
                if portfolio.id.trim().is_empty() {
                    return Err(Error::InvalidManifest("portfolio with empty id".to_string()));
                }
                if !seen.insert(portfolio.id.as_str()) {
                    return Err(Error::DuplicatePortfolio(portfolio.id.clone()));
                }
            }
        }
        Ok(Self { portfolios })
    }

    /// Load the manifest and every holdings file it names.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries: Vec<PortfolioEntry> = read_json(&dir.join(MANIFEST_FILE))?;

        let portfolios = entries
            .into_iter()
            .map(|entry| {
                let holdings: Vec<Holding> = read_json(&dir.join(entry.holdings_file()))?;
                debug!("Loaded {} holdings for portfolio {}", holdings.len(), entry.id);
                Ok(Portfolio {
                    id: entry.id,
                    name: entry.name,
                    family: entry.family,
                    color: entry.color,
                    holdings,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Loaded {} portfolios from {}",
            portfolios.len(),
            dir.display()
        );
        Self::new(portfolios)
    }

    pub fn get(&self, id: &str) -> Option<&Portfolio> {
        self.portfolios.iter().find(|p| p.id == id)
    }

    pub fn all(&self) -> &[Portfolio] {
        &self.portfolios
    }

    /// Portfolios visible to a site family. The `local` family sees all.
    pub fn for_family(&self, family: &str) -> Vec<&Portfolio> {
        self.portfolios
            .iter()
            .filter(|p| p.is_visible_to(family))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.portfolios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portfolios.is_empty()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| Error::json(path, e))
}
