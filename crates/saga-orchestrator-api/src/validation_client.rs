//! HTTP implementation of [`ValidationClient`] against the query aggregator (§4.7, C7).

use async_trait::async_trait;
use saga_orchestrator_core::{ConditionInput, SagaError, SagaResult, ValidationClient, ValidationResult};
use serde::Serialize;

pub struct HttpValidationClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpValidationClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationRequest<'a> {
    character_id: u32,
    conditions: &'a [ConditionInput],
}

#[async_trait]
impl ValidationClient for HttpValidationClient {
    async fn validate_character_state(
        &self,
        character_id: u32,
        conditions: &[ConditionInput],
    ) -> SagaResult<ValidationResult> {
        let url = format!("{}/api/validations", self.base_url.trim_end_matches('/'));
        let request = ValidationRequest {
            character_id,
            conditions,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SagaError::ValidationCallFailed {
                message: format!("request to {url} failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(SagaError::ValidationCallFailed {
                message: format!("{url} returned status {}", response.status()),
            });
        }

        response
            .json::<ValidationResult>()
            .await
            .map_err(|e| SagaError::ValidationCallFailed {
                message: format!("malformed response body from {url}: {e}"),
            })
    }
}
