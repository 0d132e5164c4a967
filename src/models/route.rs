//! Modelo de Route
//!
//! Mapea la tabla `route`. Las rutas se crean por un proceso administrativo
//! externo; aquí solo se leen.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Route principal - mapea exactamente a la tabla `route`.
///
/// También es el registro "crudo" que devuelve el endpoint de filtrado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Route {
    pub id: i64,
    pub title: String,
    pub map_color: Option<String>,
    pub description: Option<String>,
    pub distance: Option<f64>,
    pub duration: Option<i32>,
    pub participants: Option<i32>,
    pub audience: Option<String>,
    pub slug: Option<String>,
}

/// Columnas seleccionadas en todas las consultas de rutas
pub const ROUTE_COLUMNS: &str =
    "id, title, map_color, description, distance, duration, participants, audience, slug";

/// Identificador de ruta tal como llega en la URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteLookup {
    Id(i64),
    Slug(String),
}

impl RouteLookup {
    /// Un segmento puramente numérico es un id; cualquier otro, un slug.
    pub fn parse(segment: &str) -> Self {
        let trimmed = segment.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = trimmed.parse::<i64>() {
                return Self::Id(id);
            }
        }
        Self::Slug(trimmed.to_string())
    }
}

impl std::fmt::Display for RouteLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id={}", id),
            Self::Slug(slug) => write!(f, "slug='{}'", slug),
        }
    }
}
