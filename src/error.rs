use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

use crate::{
    database::StoreError,
    messages::{self, Message, MessageKind},
};

/// Failure of an API operation. Each variant carries the localized dialog
/// for the consoles and an English technical detail.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{detail}")]
    Input { message: Message, detail: String },

    #[error("{detail}")]
    NotFound { message: Message, detail: String },

    #[error("{detail}")]
    Precondition { message: Message, detail: String },

    #[error("{detail}")]
    Forbidden { message: Message, detail: String },

    #[error("{detail}")]
    Conflict { message: Message, detail: String },

    #[error("{source}")]
    Store {
        message: Message,
        #[source]
        source: StoreError,
    },
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(rename = "type")]
    kind: MessageKind,
    title: &'a str,
    text: &'a str,
}

impl AppError {
    pub fn input(message: Message, detail: impl Into<String>) -> Self {
        AppError::Input {
            message,
            detail: detail.into(),
        }
    }
    pub fn not_found(message: Message, detail: impl Into<String>) -> Self {
        AppError::NotFound {
            message,
            detail: detail.into(),
        }
    }
    pub fn precondition(message: Message, detail: impl Into<String>) -> Self {
        AppError::Precondition {
            message,
            detail: detail.into(),
        }
    }
    pub fn forbidden(message: Message, detail: impl Into<String>) -> Self {
        AppError::Forbidden {
            message,
            detail: detail.into(),
        }
    }
    pub fn conflict(message: Message, detail: impl Into<String>) -> Self {
        AppError::Conflict {
            message,
            detail: detail.into(),
        }
    }

    /// Replaces the generic dialog of a store failure with the one the
    /// calling endpoint shows. Other kinds keep their own dialog.
    pub fn on_store(self, message: Message) -> Self {
        match self {
            AppError::Store { source, .. } => AppError::Store { message, source },
            other => other,
        }
    }

    pub fn message(&self) -> &Message {
        match self {
            AppError::Input { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Precondition { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Store { message, .. } => message,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(source: StoreError) -> Self {
        AppError::Store {
            message: messages::STORE_FAILED,
            source,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Input { .. } | AppError::Precondition { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Store { .. } => tracing::error!(error = %self, "store operation failed"),
            AppError::Conflict { .. } => tracing::warn!(error = %self, "concurrent update"),
            _ => tracing::debug!(error = %self, "request rejected"),
        }

        let message = self.message();
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            kind: message.kind,
            title: message.title,
            text: message.text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn renders_localized_envelope() {
        let error = AppError::precondition(
            messages::REVISION_NOT_REQUESTED,
            "revision has not been requested for this video",
        );
        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["type"], "warning");
        assert_eq!(json["title"], "Uyarı");
        assert_eq!(
            json["text"],
            "Bu video için henüz revizyon talebi oluşturulmamış."
        );
        assert_eq!(json["error"], "revision has not been requested for this video");
    }

    #[test]
    fn store_failures_take_the_endpoint_dialog() {
        let error = AppError::from(StoreError::Timeout).on_store(messages::WORKS_LOAD_FAILED);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message().text, messages::WORKS_LOAD_FAILED.text);

        let untouched =
            AppError::not_found(messages::WORK_NOT_FOUND, "work not found")
                .on_store(messages::WORKS_LOAD_FAILED);
        assert_eq!(untouched.message().text, messages::WORK_NOT_FOUND.text);
    }
}
