use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

use super::AppState;
use crate::{
    calendar,
    error::AppError,
    messages,
    models::{
        envelope::Envelope,
        id,
        stats::WorkStats,
        timeline::{self, TimelineSlot},
    },
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineQuery {
    pub employee_id: Option<String>,
    pub date: Option<String>,
}

#[get("/work-stats/{employee_id}")]
pub async fn get_work_stats(
    state: web::Data<AppState>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee_id = id::parse(&employee_id).ok_or_else(|| {
        AppError::input(messages::EMPLOYEE_INVALID_ID, "Invalid employee ID format")
    })?;

    let stats = WorkStats::for_employee(state.store.as_ref(), &employee_id).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[get("/daily-timeline")]
pub async fn get_daily_timeline(
    state: web::Data<AppState>,
    query: web::Query<TimelineQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let Some(employee_id) = query.employee_id.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(HttpResponse::Ok().json(Envelope::with_message(
            messages::EMPLOYEE_NOT_SELECTED,
            Vec::<TimelineSlot>::new(),
        )));
    };

    let date = match query.date.filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => calendar::parse_date(&raw).ok_or_else(|| {
            AppError::input(messages::INVALID_DATE, format!("Invalid date `{raw}`"))
        })?,
        None => calendar::today(state.clock.as_ref()),
    };
    let employee_id = id::parse(&employee_id).ok_or_else(|| {
        AppError::input(messages::EMPLOYEE_INVALID_ID, "Invalid employee ID format")
    })?;

    let slots = timeline::daily_timeline(state.store.as_ref(), &employee_id, date).await?;
    Ok(HttpResponse::Ok().json(Envelope::success(slots)))
}
