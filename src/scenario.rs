//! Scenario files: facade data, search results and request options in one JSON document

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::api::RouteParameters;
use crate::facade::InMemoryFacade;
use crate::path::{ManyRoutes, RawRoute};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub facade: InMemoryFacade,
    /// Main route first, alternatives after it
    pub routes: Vec<RawRoute>,
    #[serde(default)]
    pub parameters: Option<RouteParameters>,
}

impl Scenario {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open scenario {}", path.display()))?;
        let scenario: Scenario = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse scenario {}", path.display()))?;
        Ok(scenario)
    }

    pub fn many_routes(&self) -> ManyRoutes {
        ManyRoutes {
            routes: self.routes.clone(),
        }
    }

    /// Parameters from the file, or the defaults
    pub fn parameters(&self) -> RouteParameters {
        self.parameters.clone().unwrap_or_default()
    }
}
