use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::dto::{FilterResponse, RouteResponse};
use crate::models::{Route, RouteLookup};
use crate::repositories::route_repository::group_by_route;
use crate::repositories::RouteRepository;
use crate::services::route_filter::RouteFilter;
use crate::utils::errors::{route_not_found, AppResult};

pub struct RouteController {
    repository: Arc<dyn RouteRepository>,
}

impl RouteController {
    pub fn new(repository: Arc<dyn RouteRepository>) -> Self {
        Self { repository }
    }

    /// Todas las rutas con sus puntos e info items
    pub async fn list(&self) -> AppResult<Vec<RouteResponse>> {
        let routes = self.repository.list().await?;
        let response = self.with_relations(routes).await?;
        info!("📋 {} rutas listadas", response.len());
        Ok(response)
    }

    /// Una ruta por id; un id no numérico tampoco existe
    pub async fn get_by_id(&self, raw_id: &str) -> AppResult<RouteResponse> {
        let RouteLookup::Id(id) = RouteLookup::parse(raw_id) else {
            return Err(route_not_found());
        };

        let route = self
            .repository
            .find(&RouteLookup::Id(id))
            .await?
            .ok_or_else(route_not_found)?;

        self.with_relations(vec![route])
            .await?
            .pop()
            .ok_or_else(route_not_found)
    }

    /// Rutas filtradas (registro crudo, sin relaciones)
    pub async fn filter(&self, params: &Map<String, Value>) -> AppResult<FilterResponse> {
        let filter = RouteFilter::from_params(params)?;
        let predicates = filter.predicates();
        debug!("🔎 Filtrando rutas con {:?}", predicates);

        let routes = self.repository.filter(&predicates).await?;
        info!("🔎 {} rutas cumplen el filtro", routes.len());
        Ok(FilterResponse::new(routes))
    }

    async fn with_relations(&self, routes: Vec<Route>) -> AppResult<Vec<RouteResponse>> {
        let ids: Vec<i64> = routes.iter().map(|r| r.id).collect();
        let mut points = group_by_route(self.repository.points_for(&ids).await?, |p| p.route_id);
        let mut infos = group_by_route(self.repository.infos_for(&ids).await?, |i| i.route_id);

        Ok(routes
            .into_iter()
            .map(|route| {
                let route_points = points.remove(&route.id).unwrap_or_default();
                let route_infos = infos.remove(&route.id).unwrap_or_default();
                RouteResponse::from_parts(route, &route_infos, &route_points)
            })
            .collect())
    }
}
