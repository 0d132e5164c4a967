use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::point::POINT_COLUMNS;
use crate::models::{NewPoint, Point};
use crate::utils::errors::AppResult;

/// Escritura de puntos
#[async_trait]
pub trait PointRepository: Send + Sync {
    async fn insert(&self, point: NewPoint) -> AppResult<Point>;
}

pub struct PgPointRepository {
    pool: PgPool,
}

impl PgPointRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PointRepository for PgPointRepository {
    async fn insert(&self, point: NewPoint) -> AppResult<Point> {
        let images = point.images_column();
        let query = format!(
            r#"
            INSERT INTO point
                (route_id, lon, lat, name, "pointName", address, url, description, images)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            POINT_COLUMNS
        );

        let created = sqlx::query_as::<_, Point>(&query)
            .bind(point.route_id)
            .bind(point.lon)
            .bind(point.lat)
            .bind(point.name)
            .bind(point.point_name)
            .bind(point.address)
            .bind(point.url)
            .bind(point.description)
            .bind(images)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }
}
