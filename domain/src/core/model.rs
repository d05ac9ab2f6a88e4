//! Model value object naming a model served by the endpoint

use serde::{Deserialize, Serialize};

/// Model used when the endpoint cannot list its models.
pub const FALLBACK_MODEL: &str = "llama2";

/// Name of a model served by the local endpoint (Value Object)
///
/// Ollama model names are free-form tags such as `llama3:8b`, so this is a
/// thin wrapper rather than a closed enum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model(String);

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The single known-good model used when listing fails.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_MODEL)
    }

    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty name means "not chosen yet".
    pub fn is_unset(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Model::new(s))
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        Model::new(s)
    }
}

impl From<String> for Model {
    fn from(s: String) -> Self {
        Model(s)
    }
}

/// One entry of the endpoint's model listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn model(&self) -> Model {
        Model::new(self.name.clone())
    }
}
