use actix_web::{
    delete, get, post, put,
    web::{Data, Path, Query, ServiceConfig, scope},
    HttpResponse,
};
use actix_web_validator::Json;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use super::dto::MessageResponse;
use super::models::{JobPatch, JobQuery, NewJob};
use super::service::{JobService, ServiceError};

/// Ids that are not UUIDs cannot name any record
fn parse_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::NotFound)
}

#[post("")]
async fn create_job(
    service: Data<JobService>,
    user: AuthenticatedUser,
    job: Json<NewJob>,
) -> Result<HttpResponse, ServiceError> {
    let record = service.create(&user.0, job.into_inner()).await?;
    Ok(HttpResponse::Created().json(record))
}

#[get("")]
async fn list_jobs(
    service: Data<JobService>,
    user: AuthenticatedUser,
    query: Query<JobQuery>,
) -> Result<HttpResponse, ServiceError> {
    let jobs = service.list(&user.0, &query).await?;
    Ok(HttpResponse::Ok().json(jobs))
}

#[get("/stats")]
async fn job_stats(
    service: Data<JobService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ServiceError> {
    let summary = service.summary(&user.0).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[get("/{id}")]
async fn get_job(
    service: Data<JobService>,
    user: AuthenticatedUser,
    id: Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let record = service.get_one(&user.0, parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(record))
}

#[put("/{id}")]
async fn update_job(
    service: Data<JobService>,
    user: AuthenticatedUser,
    id: Path<String>,
    patch: Json<JobPatch>,
) -> Result<HttpResponse, ServiceError> {
    let record = service
        .update(&user.0, parse_id(&id)?, patch.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(record))
}

#[delete("/{id}")]
async fn delete_job(
    service: Data<JobService>,
    user: AuthenticatedUser,
    id: Path<String>,
) -> Result<HttpResponse, ServiceError> {
    service.delete(&user.0, parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Job deleted successfully".to_string(),
    }))
}

pub fn job_config(config: &mut ServiceConfig) {
    // /stats must be registered ahead of /{id}
    config.service(
        scope("/api/jobs")
            .service(create_job)
            .service(list_jobs)
            .service(job_stats)
            .service(get_job)
            .service(update_job)
            .service(delete_job),
    );
}
