//! Modelo de Point
//!
//! Punto geolocalizado de una ruta. Las imágenes se guardan como texto JSON
//! con la lista de URLs públicas.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Point {
    pub id: i64,
    pub route_id: i64,
    pub lon: f64,
    pub lat: f64,
    pub name: String,
    #[sqlx(rename = "pointName")]
    pub point_name: Option<String>,
    pub address: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub images: Option<String>,
}

pub const POINT_COLUMNS: &str =
    r#"id, route_id, lon, lat, name, "pointName", address, url, description, images"#;

/// Datos de un punto todavía no persistido
#[derive(Debug, Clone, PartialEq)]
pub struct NewPoint {
    pub route_id: i64,
    pub lon: f64,
    pub lat: f64,
    pub name: String,
    pub point_name: Option<String>,
    pub address: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub images: Vec<String>,
}

impl NewPoint {
    /// Texto que se guarda en la columna `images`
    pub fn images_column(&self) -> String {
        serde_json::to_string(&self.images).unwrap_or_else(|_| "[]".to_string())
    }
}

impl Point {
    /// Lista de URLs de imágenes.
    ///
    /// Nunca falla: null, JSON inválido o un valor que no sea array dan `[]`,
    /// y los elementos que no son strings se descartan.
    pub fn image_urls(&self) -> Vec<String> {
        decode_images(self.images.as_deref())
    }
}

pub fn decode_images(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(url) => Some(url),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
