//! DTOs de rutas
//!
//! Forma de salida v1 de una ruta con sus puntos e info items. Es el único
//! contrato de serialización de rutas; cualquier cambio de campos requiere
//! una nueva versión.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Point, Route, RouteInfo};

/// Etiqueta y valor de un info item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoItem {
    pub label: String,
    pub value: String,
}

/// Punto tal como se muestra dentro de una ruta
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointResponse {
    pub lon: f64,
    pub lat: f64,
    pub name: String,
    pub address: String,
    pub url: Option<String>,
    pub point_name: Option<String>,
    pub description: Option<String>,
    pub images: Vec<String>,
}

impl From<&Point> for PointResponse {
    fn from(point: &Point) -> Self {
        Self {
            lon: point.lon,
            lat: point.lat,
            name: point.name.clone(),
            address: point.address.clone(),
            url: point.url.clone(),
            point_name: point.point_name.clone(),
            description: point.description.clone(),
            images: point.image_urls(),
        }
    }
}

/// Ruta v1: campos descriptivos, atributos opcionales solo si existen,
/// `info_items` indexado por clave y `point` en orden.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResponse {
    pub id: i64,
    pub title: String,
    pub map_color: Option<String>,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<i32>,
    pub slug: Option<String>,
    pub info_items: BTreeMap<String, InfoItem>,
    pub point: Vec<PointResponse>,
}

impl RouteResponse {
    /// Construir la respuesta a partir de la ruta y sus relaciones.
    ///
    /// Si dos info items comparten clave gana el último.
    pub fn from_parts(route: Route, infos: &[RouteInfo], points: &[Point]) -> Self {
        let info_items = infos
            .iter()
            .map(|info| {
                (
                    info.key.clone(),
                    InfoItem {
                        label: info.label.clone(),
                        value: info.value.clone(),
                    },
                )
            })
            .collect();

        Self {
            id: route.id,
            title: route.title,
            map_color: route.map_color,
            description: route.description,
            distance: route.distance,
            duration: route.duration,
            audience: route.audience,
            participants: route.participants,
            slug: route.slug,
            info_items,
            point: points.iter().map(PointResponse::from).collect(),
        }
    }
}

/// Respuesta del endpoint de filtrado
#[derive(Debug, Serialize)]
pub struct FilterResponse {
    pub success: bool,
    pub routes: Vec<Route>,
    pub total: usize,
}

impl FilterResponse {
    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            success: true,
            total: routes.len(),
            routes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn route() -> Route {
        Route {
            id: 7,
            title: "Old town".to_string(),
            map_color: Some("#ff0000".to_string()),
            description: Some("Walk".to_string()),
            distance: None,
            duration: Some(90),
            participants: None,
            audience: Some("family".to_string()),
            slug: Some("old-town".to_string()),
        }
    }

    fn info(id: i64, key: &str, value: &str) -> RouteInfo {
        RouteInfo {
            id,
            route_id: 7,
            key: key.to_string(),
            label: key.to_uppercase(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_empty_relations_serialize_as_empty_collections() {
        let value = serde_json::to_value(RouteResponse::from_parts(route(), &[], &[])).unwrap();
        assert_eq!(value["info_items"], json!({}));
        assert_eq!(value["point"], json!([]));
    }

    #[test]
    fn test_absent_attributes_are_omitted() {
        let value = serde_json::to_value(RouteResponse::from_parts(route(), &[], &[])).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("distance"));
        assert!(!object.contains_key("participants"));
        assert_eq!(value["duration"], json!(90));
        assert_eq!(value["audience"], json!("family"));
        // los campos descriptivos siempre están, aunque sean null
        assert!(object.contains_key("map_color"));
        assert!(object.contains_key("slug"));
    }

    #[test]
    fn test_info_items_keyed_and_last_wins() {
        let infos = vec![
            info(1, "season", "summer"),
            info(2, "level", "easy"),
            info(3, "season", "winter"),
        ];
        let response = RouteResponse::from_parts(route(), &infos, &[]);
        assert_eq!(response.info_items.len(), 2);
        assert_eq!(response.info_items["season"].value, "winter");
        assert_eq!(response.info_items["level"].label, "LEVEL");
    }

    #[test]
    fn test_points_keep_order_and_decode_images() {
        let points = vec![
            Point {
                id: 2,
                route_id: 7,
                lon: 30.31,
                lat: 59.93,
                name: "Bridge".to_string(),
                point_name: Some("B".to_string()),
                address: "Embankment".to_string(),
                url: None,
                description: None,
                images: Some("not json".to_string()),
            },
            Point {
                id: 1,
                route_id: 7,
                lon: 30.0,
                lat: 59.0,
                name: "Gate".to_string(),
                point_name: None,
                address: "Square".to_string(),
                url: Some("https://example.org".to_string()),
                description: Some("Start".to_string()),
                images: Some(r#"["/storage/points/point_7_1_0.png"]"#.to_string()),
            },
        ];
        let value = serde_json::to_value(RouteResponse::from_parts(route(), &[], &points)).unwrap();
        assert_eq!(value["point"][0]["name"], json!("Bridge"));
        assert_eq!(value["point"][0]["images"], json!([]));
        assert_eq!(value["point"][0]["point_name"], json!("B"));
        assert_eq!(value["point"][1]["images"], json!(["/storage/points/point_7_1_0.png"]));
        assert_eq!(value["point"][1]["lon"], json!(30.0));
    }

    #[test]
    fn test_filter_response_counts_routes() {
        let response = FilterResponse::new(vec![route(), route()]);
        assert_eq!(response.total, 2);
        assert!(response.success);
    }
}
