use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::SourceShape;
use crate::error::{AggregatorError, Result};

/// Where a dataset's bytes come from.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceEndpoint {
    File { path: String },
    Http { url: String },
}

/// One dataset source: identifier, declared shape, and endpoint. The shape
/// declared here is what tags every raw record at fetch time.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourceDescriptor {
    pub source_id: String,
    pub shape: SourceShape,
    pub endpoint: SourceEndpoint,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Registry of every dataset source the pipeline can consult.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: HashMap<String, SourceDescriptor>,
}

impl SourceRegistry {
    pub fn from_descriptors(descriptors: Vec<SourceDescriptor>) -> Self {
        let sources = descriptors
            .into_iter()
            .map(|d| (d.source_id.clone(), d))
            .collect();
        Self { sources }
    }

    /// Load all source descriptors from a directory of JSON files.
    pub fn load_from_directory<P: AsRef<Path>>(registry_dir: P) -> Result<Self> {
        let dir_path = registry_dir.as_ref();
        if !dir_path.exists() {
            return Err(AggregatorError::Source {
                message: format!("Registry directory does not exist: {}", dir_path.display()),
            });
        }

        let mut sources = HashMap::new();
        for entry in fs::read_dir(dir_path)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                let content = fs::read_to_string(&path)?;
                let descriptor: SourceDescriptor =
                    serde_json::from_str(&content).map_err(|e| AggregatorError::Source {
                        message: format!(
                            "Failed to parse source descriptor {}: {}",
                            path.display(),
                            e
                        ),
                    })?;
                sources.insert(descriptor.source_id.clone(), descriptor);
            }
        }

        Ok(Self { sources })
    }

    /// Descriptors for the sample datasets shipped under `data/`, matching
    /// the builtin catalog's routing table.
    pub fn builtin() -> Self {
        const FILES: &[(&str, SourceShape)] = &[
            ("miami_commercial", SourceShape::Commercial),
            ("miami_beach_commercial", SourceShape::Commercial),
            ("fort_lauderdale_commercial", SourceShape::Commercial),
            ("boca_raton_commercial", SourceShape::Commercial),
            ("palm_beach_commercial", SourceShape::Commercial),
            ("west_palm_beach_commercial", SourceShape::Commercial),
            ("delray_beach_commercial", SourceShape::Commercial),
            ("naples_commercial", SourceShape::Commercial),
            ("combined_commercial", SourceShape::Commercial),
            ("aggregator_sale", SourceShape::AggregatorSale),
            ("aggregator_lease", SourceShape::AggregatorLease),
            ("south_florida_residential", SourceShape::Residential),
        ];

        Self::from_descriptors(
            FILES
                .iter()
                .map(|(id, shape)| SourceDescriptor {
                    source_id: (*id).to_string(),
                    shape: *shape,
                    endpoint: SourceEndpoint::File {
                        path: format!("data/{id}.json"),
                    },
                    enabled: true,
                })
                .collect(),
        )
    }

    pub fn get(&self, source_id: &str) -> Option<&SourceDescriptor> {
        self.sources.get(source_id)
    }

    pub fn is_enabled(&self, source_id: &str) -> bool {
        self.sources.get(source_id).map_or(false, |s| s.enabled)
    }

    /// All enabled source ids, sorted for stable listing output.
    pub fn enabled_sources(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .sources
            .values()
            .filter(|s| s.enabled)
            .map(|s| s.source_id.clone())
            .collect();
        ids.sort();
        ids
    }
}
