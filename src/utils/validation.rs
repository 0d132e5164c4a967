//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de tipos de los parámetros que llegan sin tipar
//! (query string, formularios, JSON libre).

use serde_json::Value;
use validator::ValidationError;

use crate::utils::errors::{invalid_input, AppResult};

/// Validar que un string no esté vacío (ni solo espacios)
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}

/// ¿El valor cuenta como "presente" para un filtro?
///
/// Falsos: null, false, "", "0", 0 y colecciones vacías.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Interpretar un número JSON o un string numérico.
pub fn parse_number(field: &str, value: &Value) -> AppResult<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(invalid_input(field, format!("must be numeric, got {}", value))),
    }
}

/// Interpretar un valor como texto; los números se convierten a su forma decimal.
pub fn parse_text(field: &str, value: &Value) -> AppResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(invalid_input(field, format!("must be a string, got {}", value))),
    }
}
