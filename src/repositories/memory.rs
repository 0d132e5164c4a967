//! Repositorio en memoria
//!
//! Se usa cuando no hay `DATABASE_URL` (desarrollo local) y en los tests.
//! Reproduce la semántica de las consultas PostgreSQL: orden por id,
//! comparaciones con NULL falsas y clave foránea de `point.route_id`.

use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::models::{NewPoint, Point, Route, RouteInfo, RouteLookup};
use crate::repositories::point_repository::PointRepository;
use crate::repositories::route_repository::RouteRepository;
use crate::services::route_filter::{matches_all, RoutePredicate};
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, Default)]
struct Tables {
    routes: Vec<Route>,
    points: Vec<Point>,
    infos: Vec<RouteInfo>,
    next_point_id: i64,
    next_info_id: i64,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

/// Info item en el archivo de seed
#[derive(Debug, Deserialize)]
pub struct SeedInfo {
    pub key: String,
    pub label: String,
    pub value: String,
}

/// Ruta en el archivo de seed
#[derive(Debug, Deserialize)]
pub struct SeedRoute {
    #[serde(flatten)]
    pub route: Route,
    #[serde(default)]
    pub info_items: Vec<SeedInfo>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cargar rutas desde un archivo JSON (`[{ id, title, ..., info_items: [...] }]`)
    pub async fn from_seed_file(path: &Path) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("No se pudo leer el seed {}", path.display()))?;
        let seed: Vec<SeedRoute> = serde_json::from_str(&raw)
            .with_context(|| format!("Seed inválido en {}", path.display()))?;

        let store = Self::new();
        for entry in seed {
            let route_id = entry.route.id;
            store.add_route(entry.route).await;
            for item in entry.info_items {
                store.add_route_info(route_id, &item.key, &item.label, &item.value).await;
            }
        }
        info!("🌱 Seed cargado desde {}", path.display());
        Ok(store)
    }

    /// Insertar o reemplazar una ruta (proceso administrativo)
    pub async fn add_route(&self, route: Route) {
        let mut tables = self.tables.write().await;
        tables.routes.retain(|r| r.id != route.id);
        tables.routes.push(route);
        tables.routes.sort_by_key(|r| r.id);
    }

    /// Insertar un info item; la clave es única por ruta
    pub async fn add_route_info(&self, route_id: i64, key: &str, label: &str, value: &str) {
        let mut tables = self.tables.write().await;
        tables.infos.retain(|i| !(i.route_id == route_id && i.key == key));
        tables.next_info_id += 1;
        let id = tables.next_info_id;
        tables.infos.push(RouteInfo {
            id,
            route_id,
            key: key.to_string(),
            label: label.to_string(),
            value: value.to_string(),
        });
    }

    pub async fn route_count(&self) -> usize {
        self.tables.read().await.routes.len()
    }

    pub async fn points(&self) -> Vec<Point> {
        self.tables.read().await.points.clone()
    }
}

#[async_trait]
impl RouteRepository for InMemoryStore {
    async fn list(&self) -> AppResult<Vec<Route>> {
        Ok(self.tables.read().await.routes.clone())
    }

    async fn find(&self, lookup: &RouteLookup) -> AppResult<Option<Route>> {
        let tables = self.tables.read().await;
        let route = tables.routes.iter().find(|r| match lookup {
            RouteLookup::Id(id) => r.id == *id,
            RouteLookup::Slug(slug) => r.slug.as_deref() == Some(slug.as_str()),
        });
        Ok(route.cloned())
    }

    async fn filter(&self, predicates: &[RoutePredicate]) -> AppResult<Vec<Route>> {
        let tables = self.tables.read().await;
        Ok(tables
            .routes
            .iter()
            .filter(|r| matches_all(predicates, r))
            .cloned()
            .collect())
    }

    async fn points_for(&self, route_ids: &[i64]) -> AppResult<Vec<Point>> {
        let tables = self.tables.read().await;
        Ok(tables
            .points
            .iter()
            .filter(|p| route_ids.contains(&p.route_id))
            .cloned()
            .collect())
    }

    async fn infos_for(&self, route_ids: &[i64]) -> AppResult<Vec<RouteInfo>> {
        let tables = self.tables.read().await;
        Ok(tables
            .infos
            .iter()
            .filter(|i| route_ids.contains(&i.route_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PointRepository for InMemoryStore {
    async fn insert(&self, point: NewPoint) -> AppResult<Point> {
        let mut tables = self.tables.write().await;
        if !tables.routes.iter().any(|r| r.id == point.route_id) {
            return Err(AppError::Internal(format!(
                "foreign key violation: route {} does not exist",
                point.route_id
            )));
        }

        tables.next_point_id += 1;
        let images = point.images_column();
        let created = Point {
            id: tables.next_point_id,
            route_id: point.route_id,
            lon: point.lon,
            lat: point.lat,
            name: point.name,
            point_name: point.point_name,
            address: point.address,
            url: point.url,
            description: point.description,
            images: Some(images),
        };
        tables.points.push(created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::route_filter::NumericField;

    fn route(id: i64, slug: &str, distance: f64) -> Route {
        Route {
            id,
            title: format!("Route {}", id),
            map_color: None,
            description: None,
            distance: Some(distance),
            duration: None,
            participants: None,
            audience: None,
            slug: Some(slug.to_string()),
        }
    }

    fn new_point(route_id: i64) -> NewPoint {
        NewPoint {
            route_id,
            lon: 30.0,
            lat: 59.0,
            name: "Gate".to_string(),
            point_name: None,
            address: "Square".to_string(),
            url: None,
            description: None,
            images: vec!["/storage/points/x.png".to_string()],
        }
    }

    #[tokio::test]
    async fn test_routes_sorted_and_found_by_id_or_slug() {
        let store = InMemoryStore::new();
        store.add_route(route(2, "b", 3.0)).await;
        store.add_route(route(1, "a", 7.0)).await;

        let ids: Vec<i64> = store.list().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(store.find(&RouteLookup::Slug("b".to_string())).await.unwrap().unwrap().id, 2);
        assert!(store.find(&RouteLookup::Id(9)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_filter_applies_predicates() {
        let store = InMemoryStore::new();
        store.add_route(route(1, "a", 7.0)).await;
        store.add_route(route(2, "b", 3.0)).await;

        let routes = store
            .filter(&[RoutePredicate::AtLeast(NumericField::Distance, 5.0)])
            .await
            .unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].id, 1);
    }

    #[tokio::test]
    async fn test_insert_point_requires_route() {
        let store = InMemoryStore::new();
        assert!(store.insert(new_point(1)).await.is_err());
        assert!(store.points().await.is_empty());

        store.add_route(route(1, "a", 1.0)).await;
        let created = store.insert(new_point(1)).await.unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.image_urls(), vec!["/storage/points/x.png"]);
        assert_eq!(store.points_for(&[1]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_route_info_key_unique_per_route() {
        let store = InMemoryStore::new();
        store.add_route(route(1, "a", 1.0)).await;
        store.add_route_info(1, "season", "Season", "summer").await;
        store.add_route_info(1, "season", "Season", "winter").await;

        let infos = store.infos_for(&[1]).await.unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].value, "winter");
    }

    #[tokio::test]
    async fn test_from_seed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(
            &path,
            r##"[{"id": 1, "title": "Old town", "map_color": "#f00", "description": null,
                 "distance": 4.5, "duration": 60, "participants": 10, "audience": "family",
                 "slug": "old-town",
                 "info_items": [{"key": "level", "label": "Level", "value": "easy"}]}]"##,
        )
        .unwrap();

        let store = InMemoryStore::from_seed_file(&path).await.unwrap();
        assert_eq!(store.route_count().await, 1);
        assert_eq!(store.infos_for(&[1]).await.unwrap()[0].key, "level");
    }
}
