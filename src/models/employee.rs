use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{
    calendar::{self, Clock},
    database::Store,
    error::AppError,
    messages,
};

use super::id::hex;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeType {
    Staff,
    Intern,
}

impl EmployeeType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "staff" => Some(EmployeeType::Staff),
            "intern" => Some(EmployeeType::Intern),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(with = "hex")]
    pub id: ObjectId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EmployeeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// The type arrives as free text so an unknown value gets the localized
/// warning instead of a body parse error.
#[derive(Debug, Deserialize)]
pub struct EmployeeRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl Employee {
    pub async fn create(store: &dyn Store, request: EmployeeRequest) -> Result<Employee, AppError> {
        let kind = EmployeeType::parse(request.kind.trim()).ok_or_else(|| {
            AppError::input(
                messages::EMPLOYEE_INVALID_TYPE,
                "Invalid employee type. Must be either 'staff' or 'intern'",
            )
        })?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::input(
                messages::EMPLOYEE_NAME_REQUIRED,
                "Employee name must not be empty",
            ));
        }

        let employee = Employee {
            id: ObjectId::new(),
            name: name.to_string(),
            kind,
            deleted_at: None,
        };
        store
            .insert_employee(&employee)
            .await
            .map_err(|error| AppError::from(error).on_store(messages::EMPLOYEE_CREATE_FAILED))?;

        tracing::info!(employee_id = %employee.id, kind = ?employee.kind, "employee created");
        Ok(employee)
    }
    pub async fn find_many(
        store: &dyn Store,
        include_deleted: bool,
    ) -> Result<Vec<Employee>, AppError> {
        store
            .find_employees(include_deleted)
            .await
            .map_err(|error| AppError::from(error).on_store(messages::EMPLOYEES_LOAD_FAILED))
    }
    pub async fn find_by_id(store: &dyn Store, id: &ObjectId) -> Result<Employee, AppError> {
        store
            .find_employee(id)
            .await
            .map_err(|error| AppError::from(error).on_store(messages::EMPLOYEE_LOAD_FAILED))?
            .ok_or_else(|| AppError::not_found(messages::EMPLOYEE_NOT_FOUND, "Employee not found"))
    }
    pub async fn soft_delete(
        store: &dyn Store,
        clock: &dyn Clock,
        id: &ObjectId,
    ) -> Result<(), AppError> {
        let matched = store
            .soft_delete_employee(id, clock.now())
            .await
            .map_err(|error| AppError::from(error).on_store(messages::EMPLOYEE_DELETE_FAILED))?;
        if !matched {
            return Err(AppError::not_found(
                messages::EMPLOYEE_NOT_FOUND,
                "Employee not found",
            ));
        }
        tracing::info!(employee_id = %id, "employee soft-deleted");
        Ok(())
    }

    /// Whether the employee no longer shows up on `date`. The deletion day
    /// itself stays visible.
    pub fn is_hidden_on(&self, date: NaiveDate) -> bool {
        self.deleted_at
            .map_or(false, |at| date > calendar::to_local(at).date())
    }
}
