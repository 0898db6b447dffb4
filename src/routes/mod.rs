use actix_web::{get, web, HttpResponse};
use mime_guess::from_path;
use std::{fs, path::PathBuf, sync::Arc};

use crate::{calendar::Clock, database::Store, error::AppError, messages};

/// Builds the full route set over `$state` for HTTP tests.
#[cfg(test)]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state)
                .app_data($crate::routes::json_config())
                .app_data($crate::routes::query_config())
                .configure($crate::routes::configure),
        )
        .await
    };
}

pub mod employee;
pub mod report;
pub mod video;
pub mod work;

/// Shared by every handler through `web::Data`.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub clock: Arc<dyn Clock>,
    pub static_dir: PathBuf,
    pub template_dir: PathBuf,
}

/// Malformed bodies get the same localized dialog as any other bad input.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::input(messages::INVALID_REQUEST, err.to_string()).into()
    })
}
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::input(messages::INVALID_REQUEST, err.to_string()).into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_index)
        .service(get_employee_page)
        .service(get_admin_page)
        .service(get_static_file)
        .service(
            web::scope("/api")
                .service(employee::create_employee)
                .service(employee::get_employees)
                .service(employee::delete_employee)
                .service(work::create_work)
                .service(work::update_work)
                .service(work::get_works)
                .service(work::get_work)
                .service(report::get_work_stats)
                .service(report::get_daily_timeline)
                .service(video::get_approved_videos)
                .service(video::get_completed_videos)
                .service(video::get_reviewed_videos),
        );
}

fn render_page(state: &AppState, name: &str) -> Result<HttpResponse, AppError> {
    let path = state.template_dir.join(name);
    match fs::read(&path) {
        Ok(page) => Ok(HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(page)),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "template unavailable");
            Err(AppError::not_found(
                messages::PAGE_NOT_FOUND,
                format!("Template {name} not found"),
            ))
        }
    }
}

#[get("/")]
pub async fn get_index(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    render_page(&state, "index.html")
}
#[get("/employee")]
pub async fn get_employee_page(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    render_page(&state, "employee.html")
}
#[get("/admin")]
pub async fn get_admin_page(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    render_page(&state, "admin.html")
}

#[get("/static/{path:.*}")]
pub async fn get_static_file(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let requested = path.into_inner();
    if requested.is_empty() || requested.split(['/', '\\']).any(|part| part == "..") {
        return Err(AppError::input(
            messages::INVALID_REQUEST,
            "Static path must stay inside the asset directory",
        ));
    }

    let path = state.static_dir.join(&requested);
    if let Ok(file) = fs::read(&path) {
        let mime = from_path(&path).first_or_octet_stream();
        Ok(HttpResponse::Ok().content_type(mime).body(file))
    } else {
        Err(AppError::not_found(
            messages::PAGE_NOT_FOUND,
            format!("Static file {requested} not found"),
        ))
    }
}
