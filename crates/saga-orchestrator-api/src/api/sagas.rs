//! Read-only REST surface over the saga store (§6.3).
//!
//! Responses are shaped JSON:API-style (`data`/`attributes`) since that's the
//! convention the rest of the platform's HTTP surface uses for read endpoints.

use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use saga_orchestrator_core::{Saga, SagaStore, Step, StepStatus};
use serde::Serialize;
use uuid::Uuid;

use crate::tenant::RequestContext;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StepAttributes {
    step_id: String,
    status: StepStatus,
    action: &'static str,
}

impl From<&Step> for StepAttributes {
    fn from(step: &Step) -> Self {
        Self {
            step_id: step.step_id.clone(),
            status: step.status,
            action: step.action_name(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SagaAttributes {
    saga_type: saga_orchestrator_core::SagaType,
    initiated_by: String,
    tenant_id: String,
    steps: Vec<StepAttributes>,
}

#[derive(Debug, Serialize)]
struct SagaResource {
    #[serde(rename = "type")]
    kind: &'static str,
    id: Uuid,
    attributes: SagaAttributes,
}

impl From<&Saga> for SagaResource {
    fn from(saga: &Saga) -> Self {
        Self {
            kind: "saga",
            id: saga.transaction_id,
            attributes: SagaAttributes {
                saga_type: saga.saga_type,
                initiated_by: saga.initiated_by.clone(),
                tenant_id: saga.tenant_id.clone(),
                steps: saga.steps.iter().map(StepAttributes::from).collect(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ManyResponse {
    data: Vec<SagaResource>,
}

#[derive(Debug, Serialize)]
struct OneResponse {
    data: SagaResource,
}

pub async fn list_sagas(req: HttpRequest, store: web::Data<SagaStore>) -> ActixResult<HttpResponse> {
    let context = RequestContext::from_request(&req);
    tracing::debug!(tenant_id = %context.tenant_id, "listing sagas");

    let sagas = store.get_all(&context.tenant_id).await;
    let data = sagas.iter().map(SagaResource::from).collect();
    Ok(HttpResponse::Ok().json(ManyResponse { data }))
}

pub async fn get_saga(
    req: HttpRequest,
    store: web::Data<SagaStore>,
    path: web::Path<Uuid>,
) -> ActixResult<HttpResponse> {
    let context = RequestContext::from_request(&req);
    let transaction_id = path.into_inner();

    match store.get_by_id(transaction_id).await {
        Ok(saga) if saga.tenant_id == context.tenant_id => {
            Ok(HttpResponse::Ok().json(OneResponse {
                data: SagaResource::from(&saga),
            }))
        }
        Ok(_) => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": "saga_not_found",
            "message": format!("no saga {transaction_id} for this tenant"),
        }))),
        Err(error) => {
            tracing::warn!(%error, %transaction_id, "saga lookup failed");
            Ok(HttpResponse::NotFound().json(serde_json::json!({
                "error": "saga_not_found",
                "message": error.to_string(),
            })))
        }
    }
}
