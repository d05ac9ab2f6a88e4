//! List Models use case

use crate::ports::llm_gateway::LlmGateway;
use chat_domain::{FALLBACK_MODEL, ModelInfo};
use std::sync::Arc;
use tracing::{debug, warn};

/// Lists the models the endpoint can serve.
///
/// Never fails: when the endpoint cannot be asked, the answer is the
/// single fallback model so the picker always has something to show.
pub struct ListModelsUseCase {
    gateway: Arc<dyn LlmGateway>,
}

impl ListModelsUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }

    pub async fn execute(&self) -> Vec<ModelInfo> {
        match self.gateway.list_models().await {
            Ok(models) => {
                debug!("Endpoint reports {} model(s)", models.len());
                models
            }
            Err(e) => {
                warn!("Failed to list models, using {}: {}", FALLBACK_MODEL, e);
                vec![ModelInfo::new(FALLBACK_MODEL)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::{ByteStream, GatewayError};
    use async_trait::async_trait;
    use chat_domain::{ChatRequest, ContentRecord};

    struct ModelsGateway {
        models: Option<Vec<&'static str>>,
    }

    #[async_trait]
    impl LlmGateway for ModelsGateway {
        async fn chat_stream(&self, _request: &ChatRequest) -> Result<ByteStream, GatewayError> {
            Err(GatewayError::RequestFailed("unused".to_string()))
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ContentRecord, GatewayError> {
            Err(GatewayError::RequestFailed("unused".to_string()))
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>, GatewayError> {
            match &self.models {
                Some(names) => Ok(names.iter().map(|n| ModelInfo::new(*n)).collect()),
                None => Err(GatewayError::Timeout),
            }
        }
    }

    fn names(models: Vec<ModelInfo>) -> Vec<String> {
        models.into_iter().map(|m| m.name).collect()
    }

    #[tokio::test]
    async fn returns_endpoint_models() {
        let gateway = Arc::new(ModelsGateway {
            models: Some(vec!["llama3", "mistral"]),
        });
        let models = ListModelsUseCase::new(gateway).execute().await;
        assert_eq!(names(models), vec!["llama3", "mistral"]);
    }

    #[tokio::test]
    async fn falls_back_on_failure() {
        let gateway = Arc::new(ModelsGateway { models: None });
        let models = ListModelsUseCase::new(gateway).execute().await;
        assert_eq!(names(models), vec!["llama2"]);
    }

    #[tokio::test]
    async fn keeps_empty_list() {
        let gateway = Arc::new(ModelsGateway {
            models: Some(vec![]),
        });
        assert!(ListModelsUseCase::new(gateway).execute().await.is_empty());
    }
}
