use actix_web::{delete, get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::{
    error::AppError,
    messages,
    models::{
        employee::{Employee, EmployeeRequest},
        envelope::Envelope,
        id,
    },
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeListQuery {
    pub include_deleted: Option<String>,
}

#[post("/employees")]
pub async fn create_employee(
    state: web::Data<AppState>,
    payload: web::Json<EmployeeRequest>,
) -> Result<HttpResponse, AppError> {
    let employee = Employee::create(state.store.as_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(Envelope::with_message(messages::EMPLOYEE_CREATED, employee)))
}
#[get("/employees")]
pub async fn get_employees(
    state: web::Data<AppState>,
    query: web::Query<EmployeeListQuery>,
) -> Result<HttpResponse, AppError> {
    let include_deleted = query.include_deleted.as_deref() == Some("true");
    let employees = Employee::find_many(state.store.as_ref(), include_deleted).await?;
    Ok(HttpResponse::Ok().json(Envelope::list(employees, messages::EMPLOYEES_EMPTY)))
}
#[delete("/employees/{employee_id}")]
pub async fn delete_employee(
    state: web::Data<AppState>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee_id = id::parse(&employee_id).ok_or_else(|| {
        AppError::input(messages::EMPLOYEE_INVALID_ID, "Invalid ID format")
    })?;

    Employee::soft_delete(state.store.as_ref(), state.clock.as_ref(), &employee_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Employee deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use crate::calendar::testing::local;
    use crate::database::memory::MemoryStore;
    use crate::routes::testing::state;
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[actix_web::test]
    async fn create_list_delete_round_trip() {
        let store = Arc::new(MemoryStore::default());
        let app = test_app!(state(store.clone(), local(2024, 6, 3, 10, 0)));

        let created = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/employees")
                .set_json(json!({ "name": "Zeynep", "type": "intern" }))
                .to_request(),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(created).await;
        assert_eq!(created["type"], "success");
        assert_eq!(created["text"], "Personel/stajyer başarıyla eklendi.");
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let listed: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/employees").to_request(),
        )
        .await;
        assert_eq!(listed["type"], "success");
        assert_eq!(listed["data"][0]["id"], id.as_str());
        assert_eq!(listed["data"][0]["type"], "intern");

        let deleted = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/employees/{id}"))
                .to_request(),
        )
        .await;
        assert_eq!(deleted.status(), StatusCode::OK);

        let listed: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/employees").to_request(),
        )
        .await;
        assert_eq!(listed["type"], "info");
        assert_eq!(listed["text"], "Henüz personel tanımlı değil.");
        assert_eq!(listed["data"], json!([]));

        let listed: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/employees?includeDeleted=true")
                .to_request(),
        )
        .await;
        assert_eq!(listed["data"][0]["id"], id.as_str());
        assert!(listed["data"][0]["deletedAt"].is_string());
    }

    #[actix_web::test]
    async fn rejects_unknown_type_with_dialog() {
        let app = test_app!(state(Arc::new(MemoryStore::default()), local(2024, 6, 3, 10, 0)));
        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/employees")
                .set_json(json!({ "name": "Mert" }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["type"], "warning");
        assert_eq!(
            body["text"],
            "Geçersiz personel tipi. Personel veya Stajyer seçiniz."
        );
        assert!(body["error"].as_str().unwrap().contains("staff"));
    }

    #[actix_web::test]
    async fn delete_reports_bad_and_unknown_ids() {
        let app = test_app!(state(Arc::new(MemoryStore::default()), local(2024, 6, 3, 10, 0)));

        let malformed = test::call_service(
            &app,
            test::TestRequest::delete().uri("/api/employees/42").to_request(),
        )
        .await;
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

        let unknown = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri("/api/employees/665d9f1c2a4b3c0012345678")
                .to_request(),
        )
        .await;
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    }
}
