use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Atributo etiquetado de una ruta (tabla `"RouteInfo"`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RouteInfo {
    pub id: i64,
    pub route_id: i64,
    pub key: String,
    pub label: String,
    pub value: String,
}

pub const ROUTE_INFO_COLUMNS: &str = "id, route_id, key, label, value";
