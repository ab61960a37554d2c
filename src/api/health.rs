use actix_web::{HttpResponse, Responder, get, web};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::api::job::JobService;

/// Health check response
#[derive(Serialize, Deserialize, Debug)]
struct HealthResponse {
    status: String,
    storage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Probe the job store and build the response for a healthy/unhealthy pair
async fn probe(service: &JobService, ok: &str, failed: &str) -> HttpResponse {
    match service.health().await {
        Ok(()) => HttpResponse::Ok().json(HealthResponse {
            status: ok.to_string(),
            storage: "connected".to_string(),
            error: None,
        }),
        Err(e) => {
            error!("{} check failed: {}", ok, e);
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: failed.to_string(),
                storage: "disconnected".to_string(),
                error: Some("Storage unavailable".to_string()),
            })
        }
    }
}

/// Health check endpoint
///
/// General health check including storage connectivity.
/// Use for load balancers and uptime monitors.
#[get("/health")]
async fn health_check(service: web::Data<JobService>) -> impl Responder {
    probe(&service, "healthy", "unhealthy").await
}

/// Readiness check endpoint
///
/// Returns 503 while the store is unreachable; recovers on its own when it returns.
#[get("/ready")]
async fn readiness_check(service: web::Data<JobService>) -> impl Responder {
    probe(&service, "ready", "not_ready").await
}

/// Liveness check endpoint
///
/// Simple check that the process is alive. Does not check dependencies.
#[get("/live")]
async fn liveness_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "alive".to_string(),
        storage: "not_checked".to_string(),
        error: None,
    })
}

pub fn health_config(config: &mut web::ServiceConfig) {
    config
        .service(health_check)
        .service(readiness_check)
        .service(liveness_check);
}
