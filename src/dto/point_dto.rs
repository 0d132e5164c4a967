use serde::Serialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::Point;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::{parse_number, parse_text, validate_not_blank};

// Request para crear un punto (JSON o formulario, ya normalizado)
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct CreatePointRequest {
    #[validate(custom = "validate_not_blank")]
    pub name: String,
    #[validate(custom = "validate_not_blank")]
    pub address: String,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    pub description: Option<String>,
    pub url: Option<String>,
    pub point_name: Option<String>,
    /// Elementos crudos del array `images`, en el orden recibido
    pub images: Vec<Value>,
}

impl CreatePointRequest {
    /// Construir y validar la petición desde los campos del body.
    ///
    /// Todos los errores de campos se acumulan en un único `Validation`.
    pub fn from_fields(fields: &Map<String, Value>) -> AppResult<Self> {
        let mut errors = ValidationErrors::new();

        let name = required_text(fields, "name", &mut errors);
        let address = required_text(fields, "address", &mut errors);
        let lon = required_number(fields, "lon", &mut errors);
        let lat = required_number(fields, "lat", &mut errors);

        let description = optional_text(fields, "description", &mut errors);
        let url = optional_text(fields, "url", &mut errors);
        let point_name = optional_text(fields, "point_name", &mut errors);

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let request = Self {
            name: name.unwrap_or_default(),
            address: address.unwrap_or_default(),
            lon: lon.unwrap_or_default(),
            lat: lat.unwrap_or_default(),
            description,
            url,
            point_name,
            images: parse_images(fields.get("images")),
        };
        request.validate()?;
        Ok(request)
    }
}

/// El campo `images` puede llegar como string con un array JSON o como el
/// propio array. Cualquier otra cosa equivale a "sin imágenes".
pub fn parse_images(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

fn field_error(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn present<'a>(fields: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    fields.get(field).filter(|v| !v.is_null())
}

fn required_text(
    fields: &Map<String, Value>,
    field: &'static str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let Some(value) = present(fields, field) else {
        errors.add(field, field_error("required", format!("{} is required", field)));
        return None;
    };
    match parse_text(field, value) {
        Ok(text) => Some(text),
        Err(e) => {
            errors.add(field, field_error("string", e.to_string()));
            None
        }
    }
}

fn required_number(
    fields: &Map<String, Value>,
    field: &'static str,
    errors: &mut ValidationErrors,
) -> Option<f64> {
    let Some(value) = present(fields, field) else {
        errors.add(field, field_error("required", format!("{} is required", field)));
        return None;
    };
    match parse_number(field, value) {
        Ok(number) => Some(number),
        Err(e) => {
            errors.add(field, field_error("numeric", e.to_string()));
            None
        }
    }
}

fn optional_text(
    fields: &Map<String, Value>,
    field: &'static str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let value = present(fields, field)?;
    match parse_text(field, value) {
        Ok(text) => Some(text),
        Err(e) => {
            errors.add(field, field_error("string", e.to_string()));
            None
        }
    }
}

// Response del punto creado
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedPointResponse {
    pub lon: f64,
    pub lat: f64,
    pub name: String,
    pub address: String,
    pub url: Option<String>,
    pub point_name: Option<String>,
    pub description: Option<String>,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_images: Option<Vec<usize>>,
}

impl CreatedPointResponse {
    pub fn new(point: Point, images: Vec<String>, rejected_images: Option<Vec<usize>>) -> Self {
        Self {
            lon: point.lon,
            lat: point.lat,
            name: point.name,
            address: point.address,
            url: point.url,
            point_name: point.point_name,
            description: point.description,
            images,
            rejected_images,
        }
    }
}
