//! Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocols::capture;
use crate::protocols::v5008::layout as v5008_layout;
use crate::protocols::v6800::schema as v6800_schema;

/// Topic namespaces owned by each parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Namespace of the binary V5008 family (default: `V5008Upload`)
    pub v5008_namespace: String,
    /// Namespace of the JSON V6800 family (default: `V6800Upload`)
    pub v6800_namespace: String,
    /// Namespaces kept by the capture parser (default: `["G6000Upload"]`)
    pub capture_namespaces: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            v5008_namespace: v5008_layout::NAMESPACE.to_string(),
            v6800_namespace: v6800_schema::NAMESPACE.to_string(),
            capture_namespaces: vec![capture::DEFAULT_NAMESPACE.to_string()],
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Every namespace must be a single non-empty topic segment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let namespaces = [&self.v5008_namespace, &self.v6800_namespace]
            .into_iter()
            .chain(self.capture_namespaces.iter());
        for namespace in namespaces {
            if namespace.is_empty() || namespace.contains('/') {
                return Err(ConfigError::InvalidNamespace {
                    namespace: namespace.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid namespace '{namespace}': must be one non-empty topic segment")]
    InvalidNamespace { namespace: String },
}
