use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

use super::AppState;
use crate::{
    calendar,
    error::AppError,
    messages,
    models::{envelope::Envelope, work::Work},
};

#[derive(Deserialize)]
pub struct CompletedVideoQuery {
    pub date: Option<String>,
}

#[get("/approved-videos")]
pub async fn get_approved_videos(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let videos = Work::find_approved_videos(state.store.as_ref()).await?;
    Ok(HttpResponse::Ok().json(Envelope::list(videos, messages::APPROVED_VIDEOS_EMPTY)))
}
#[get("/completed-videos")]
pub async fn get_completed_videos(
    state: web::Data<AppState>,
    query: web::Query<CompletedVideoQuery>,
) -> Result<HttpResponse, AppError> {
    let date = match query.date.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => Some(calendar::parse_date(raw).ok_or_else(|| {
            AppError::input(messages::INVALID_DATE, format!("Invalid date `{raw}`"))
        })?),
        None => None,
    };

    let videos = Work::find_awaiting_review(state.store.as_ref(), date).await?;
    Ok(HttpResponse::Ok().json(Envelope::list(videos, messages::COMPLETED_VIDEOS_EMPTY)))
}
#[get("/reviewed-videos")]
pub async fn get_reviewed_videos(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let videos = Work::find_reviewed_videos(state.store.as_ref()).await?;
    Ok(HttpResponse::Ok().json(Envelope::list(videos, messages::REVIEWED_VIDEOS_EMPTY)))
}
