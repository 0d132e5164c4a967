//! Extractor de campos del body
//!
//! Los clientes envían JSON o formularios `x-www-form-urlencoded`; ambos se
//! normalizan a un mapa de valores JSON.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde_json::{Map, Value};

use crate::utils::errors::{invalid_input, AppResult};

/// Campos del body, sin tipar
#[derive(Debug, Default)]
pub struct FieldsPayload(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for FieldsPayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase().starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        if is_form {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Self(form_fields(fields)));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        json_fields(&body)
            .map(Self)
            .map_err(IntoResponse::into_response)
    }
}

fn form_fields(fields: HashMap<String, String>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}

/// Un body vacío equivale a no enviar campos
pub fn json_fields(body: &[u8]) -> AppResult<Map<String, Value>> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(invalid_input("body", "must be a JSON object")),
        Err(e) => Err(invalid_input("body", format!("invalid JSON: {}", e))),
    }
}

/// Parámetros del query string como valores JSON
pub fn query_fields(query: HashMap<String, String>) -> Map<String, Value> {
    form_fields(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_fields() {
        assert!(json_fields(b"").unwrap().is_empty());
        assert!(json_fields(b"  \n").unwrap().is_empty());
        assert_eq!(json_fields(br#"{"lon": 1}"#).unwrap()["lon"], json!(1));
        assert!(json_fields(b"[1, 2]").is_err());
        assert!(json_fields(b"{oops").is_err());
    }

    #[test]
    fn test_query_fields_are_strings() {
        let mut query = HashMap::new();
        query.insert("min_distance".to_string(), "5".to_string());
        assert_eq!(query_fields(query)["min_distance"], json!("5"));
    }
}
