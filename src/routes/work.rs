use actix_web::{get, post, put, web, HttpResponse};
use serde_json::json;

use super::AppState;
use crate::{
    database::WorkQuery,
    error::AppError,
    messages,
    models::{
        id,
        work::{Work, WorkRequest},
        work_update::WorkPatch,
    },
};

fn parse_work_id(raw: &str) -> Result<mongodb::bson::oid::ObjectId, AppError> {
    id::parse(raw).ok_or_else(|| AppError::input(messages::WORK_INVALID_ID, "Invalid ID format"))
}

#[post("/work")]
pub async fn create_work(
    state: web::Data<AppState>,
    payload: web::Json<WorkRequest>,
) -> Result<HttpResponse, AppError> {
    let work = Work::create(state.store.as_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(work))
}
#[put("/work/{work_id}")]
pub async fn update_work(
    state: web::Data<AppState>,
    work_id: web::Path<String>,
    payload: web::Json<WorkPatch>,
) -> Result<HttpResponse, AppError> {
    let work_id = parse_work_id(&work_id)?;
    Work::update(
        state.store.as_ref(),
        state.clock.as_ref(),
        &work_id,
        &payload,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Work updated successfully" })))
}
#[get("/works")]
pub async fn get_works(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let works = Work::find_many(state.store.as_ref(), &WorkQuery::default()).await?;
    Ok(HttpResponse::Ok().json(works))
}
#[get("/work/{work_id}")]
pub async fn get_work(
    state: web::Data<AppState>,
    work_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let work_id = parse_work_id(&work_id)?;
    match Work::find_by_id(state.store.as_ref(), &work_id).await? {
        Some(work) => Ok(HttpResponse::Ok().json(work)),
        None => Err(AppError::not_found(messages::WORK_NOT_FOUND, "Work not found")),
    }
}
