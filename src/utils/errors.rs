//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Mensaje localizado cuando la ruta no existe
pub const ROUTE_NOT_FOUND_MESSAGE: &str = "Маршрут не найден";

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid value for '{field}': {message}")]
    InvalidInput { field: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: String,
}

impl ErrorResponse {
    fn new(error: &str, message: String, code: &str) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            message,
            details: None,
            code: code.to_string(),
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::InvalidInput { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Prefijar el mensaje de los errores inesperados con el contexto de la operación.
    ///
    /// Los errores 404/422 se devuelven tal cual.
    pub fn in_context(self, context: &str) -> AppError {
        match self {
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                AppError::Internal(format!("{}: {}", context, self.detail()))
            }
            other => other,
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::Database(e) => e.to_string(),
            AppError::Storage(e) => e.to_string(),
            AppError::Internal(msg) | AppError::NotFound(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            AppError::NotFound(msg) => {
                warn!("🔍 Recurso no encontrado: {}", msg);
                ErrorResponse::new("Not Found", msg, "NOT_FOUND")
            }

            AppError::Validation(e) => {
                warn!("⚠️ Error de validación: {}", e);
                ErrorResponse::new(
                    "Validation Error",
                    "The provided data is invalid".to_string(),
                    "VALIDATION_ERROR",
                )
                .with_details(json!(e))
            }

            AppError::InvalidInput { field, message } => {
                warn!("⚠️ Valor inválido en '{}': {}", field, message);
                ErrorResponse::new(
                    "Validation Error",
                    format!("{}: {}", field, message),
                    "VALIDATION_ERROR",
                )
                .with_details(json!({ field: [message] }))
            }

            AppError::Database(e) => {
                error!("❌ Error de base de datos: {}", e);
                ErrorResponse::new("Database Error", e.to_string(), "DB_ERROR")
            }

            AppError::Storage(e) => {
                error!("❌ Error de almacenamiento: {}", e);
                ErrorResponse::new("Storage Error", e.to_string(), "STORAGE_ERROR")
            }

            AppError::Internal(msg) => {
                error!("❌ Error interno: {}", msg);
                ErrorResponse::new("Internal Server Error", msg, "INTERNAL_ERROR")
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación de un solo campo
pub fn invalid_input(field: &str, message: impl Into<String>) -> AppError {
    AppError::InvalidInput {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Función helper para el 404 de ruta inexistente
pub fn route_not_found() -> AppError {
    AppError::NotFound(ROUTE_NOT_FOUND_MESSAGE.to_string())
}
