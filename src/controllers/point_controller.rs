use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::config::environment::InvalidImagePolicy;
use crate::dto::{CreatePointRequest, CreatedPointResponse};
use crate::models::{NewPoint, RouteLookup};
use crate::repositories::{PointRepository, RouteRepository};
use crate::services::image_service::{self, ImageStorage};
use crate::utils::errors::{invalid_input, route_not_found, AppResult};

/// Mensaje de éxito al crear un punto
pub const POINT_CREATED_MESSAGE: &str = "Точка успешно создана";
/// Prefijo de los errores inesperados al crear un punto
pub const POINT_CREATE_FAILED: &str = "Ошибка при создании точки";

pub struct PointController {
    routes: Arc<dyn RouteRepository>,
    points: Arc<dyn PointRepository>,
    images: ImageStorage,
    policy: InvalidImagePolicy,
}

impl PointController {
    pub fn new(
        routes: Arc<dyn RouteRepository>,
        points: Arc<dyn PointRepository>,
        images: ImageStorage,
        policy: InvalidImagePolicy,
    ) -> Self {
        Self {
            routes,
            points,
            images,
            policy,
        }
    }

    /// Crear un punto en la ruta `target` (id numérico o slug)
    pub async fn create(
        &self,
        target: &str,
        fields: &Map<String, Value>,
    ) -> AppResult<CreatedPointResponse> {
        self.create_inner(target, fields)
            .await
            .map_err(|e| e.in_context(POINT_CREATE_FAILED))
    }

    async fn create_inner(
        &self,
        target: &str,
        fields: &Map<String, Value>,
    ) -> AppResult<CreatedPointResponse> {
        let lookup = RouteLookup::parse(target);
        debug!("📍 Creando punto en la ruta {}", lookup);
        let route = self
            .routes
            .find(&lookup)
            .await?
            .ok_or_else(route_not_found)?;

        let request = CreatePointRequest::from_fields(fields)?;

        let decoded = image_service::decode_all(&request.images);
        if !decoded.rejected.is_empty() && self.policy == InvalidImagePolicy::Reject {
            let (index, reason) = &decoded.rejected[0];
            return Err(invalid_input(&format!("images.{}", index), reason.to_string()));
        }

        let timestamp = chrono::Utc::now().timestamp();
        let stored = self.images.store(route.id, timestamp, &decoded.images).await?;
        let urls: Vec<String> = stored.iter().map(|s| s.url.clone()).collect();

        let new_point = NewPoint {
            route_id: route.id,
            lon: request.lon,
            lat: request.lat,
            name: request.name,
            point_name: request.point_name,
            address: request.address,
            url: request.url,
            description: request.description,
            images: urls.clone(),
        };

        let point = match self.points.insert(new_point).await {
            Ok(point) => point,
            Err(e) => {
                error!("❌ No se pudo guardar el punto en la ruta {}: {}", route.id, e);
                if !stored.is_empty() {
                    warn!("🧹 Borrando {} imágenes huérfanas", stored.len());
                    self.images.remove(&stored).await;
                }
                return Err(e);
            }
        };

        info!(
            "📍 Punto {} creado en la ruta {} ({} imágenes, {} descartadas)",
            point.id,
            route.id,
            urls.len(),
            decoded.rejected.len()
        );

        let rejected = match self.policy {
            InvalidImagePolicy::Report => Some(decoded.rejected_indices()),
            _ => None,
        };
        Ok(CreatedPointResponse::new(point, urls, rejected))
    }
}

impl From<&crate::state::AppState> for PointController {
    fn from(state: &crate::state::AppState) -> Self {
        Self::new(
            state.routes.clone(),
            state.points.clone(),
            state.images.clone(),
            state.config.image_decode_policy,
        )
    }
}

