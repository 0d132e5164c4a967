use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::point::POINT_COLUMNS;
use crate::models::route::ROUTE_COLUMNS;
use crate::models::route_info::ROUTE_INFO_COLUMNS;
use crate::models::{Point, Route, RouteInfo, RouteLookup};
use crate::services::route_filter::RoutePredicate;
use crate::utils::errors::AppResult;

/// Acceso de lectura a rutas y sus relaciones
#[async_trait]
pub trait RouteRepository: Send + Sync {
    /// Todas las rutas, ordenadas por id
    async fn list(&self) -> AppResult<Vec<Route>>;

    async fn find(&self, lookup: &RouteLookup) -> AppResult<Option<Route>>;

    /// Rutas que cumplen todos los predicados, ordenadas por id
    async fn filter(&self, predicates: &[RoutePredicate]) -> AppResult<Vec<Route>>;

    /// Puntos de las rutas dadas, ordenados por id
    async fn points_for(&self, route_ids: &[i64]) -> AppResult<Vec<Point>>;

    /// Info items de las rutas dadas, ordenados por id
    async fn infos_for(&self, route_ids: &[i64]) -> AppResult<Vec<RouteInfo>>;
}

/// Agrupar filas hijas por `route_id`, manteniendo el orden
pub fn group_by_route<T>(rows: Vec<T>, route_id: impl Fn(&T) -> i64) -> HashMap<i64, Vec<T>> {
    let mut grouped: HashMap<i64, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(route_id(&row)).or_default().push(row);
    }
    grouped
}

pub struct PgRouteRepository {
    pool: PgPool,
}

impl PgRouteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Añadir un predicado al WHERE
fn push_predicate(builder: &mut QueryBuilder<'_, Postgres>, predicate: &RoutePredicate) {
    match predicate {
        RoutePredicate::AtLeast(field, bound) => {
            builder.push(field.column()).push(" >= ").push_bind(*bound);
        }
        RoutePredicate::AtMost(field, bound) => {
            builder.push(field.column()).push(" <= ").push_bind(*bound);
        }
        RoutePredicate::AudienceIs(audience) => {
            builder.push("audience = ").push_bind(audience.clone());
        }
    }
}

pub fn build_filter_query(predicates: &[RoutePredicate]) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM route", ROUTE_COLUMNS));
    for (i, predicate) in predicates.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        push_predicate(&mut builder, predicate);
    }
    builder.push(" ORDER BY id");
    builder
}

#[async_trait]
impl RouteRepository for PgRouteRepository {
    async fn list(&self) -> AppResult<Vec<Route>> {
        let routes = sqlx::query_as::<_, Route>(&format!(
            "SELECT {} FROM route ORDER BY id",
            ROUTE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(routes)
    }

    async fn find(&self, lookup: &RouteLookup) -> AppResult<Option<Route>> {
        let route = match lookup {
            RouteLookup::Id(id) => {
                sqlx::query_as::<_, Route>(&format!(
                    "SELECT {} FROM route WHERE id = $1",
                    ROUTE_COLUMNS
                ))
                .bind(*id)
                .fetch_optional(&self.pool)
                .await?
            }
            RouteLookup::Slug(slug) => {
                sqlx::query_as::<_, Route>(&format!(
                    "SELECT {} FROM route WHERE slug = $1 ORDER BY id LIMIT 1",
                    ROUTE_COLUMNS
                ))
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?
            }
        };
        Ok(route)
    }

    async fn filter(&self, predicates: &[RoutePredicate]) -> AppResult<Vec<Route>> {
        let mut builder = build_filter_query(predicates);
        let routes = builder
            .build_query_as::<Route>()
            .fetch_all(&self.pool)
            .await?;
        Ok(routes)
    }

    async fn points_for(&self, route_ids: &[i64]) -> AppResult<Vec<Point>> {
        if route_ids.is_empty() {
            return Ok(Vec::new());
        }
        let points = sqlx::query_as::<_, Point>(&format!(
            "SELECT {} FROM point WHERE route_id = ANY($1) ORDER BY id",
            POINT_COLUMNS
        ))
        .bind(route_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(points)
    }

    async fn infos_for(&self, route_ids: &[i64]) -> AppResult<Vec<RouteInfo>> {
        if route_ids.is_empty() {
            return Ok(Vec::new());
        }
        let infos = sqlx::query_as::<_, RouteInfo>(&format!(
            r#"SELECT {} FROM "RouteInfo" WHERE route_id = ANY($1) ORDER BY id"#,
            ROUTE_INFO_COLUMNS
        ))
        .bind(route_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(infos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::route_filter::NumericField;

    #[test]
    fn test_build_filter_query_without_predicates() {
        let builder = build_filter_query(&[]);
        assert_eq!(
            builder.sql(),
            format!("SELECT {} FROM route ORDER BY id", ROUTE_COLUMNS)
        );
    }

    #[test]
    fn test_build_filter_query_ands_predicates() {
        let builder = build_filter_query(&[
            RoutePredicate::AtLeast(NumericField::Distance, 5.0),
            RoutePredicate::AtMost(NumericField::Distance, 10.0),
            RoutePredicate::AudienceIs("kids".to_string()),
        ]);
        assert_eq!(
            builder.sql(),
            format!(
                "SELECT {} FROM route WHERE {} ORDER BY id",
                ROUTE_COLUMNS, "distance >= $1 AND distance <= $2 AND audience = $3"
            )
        );
    }

    #[test]
    fn test_group_by_route_keeps_order() {
        let grouped = group_by_route(vec![(1, "a"), (2, "b"), (1, "c")], |row| row.0);
        assert_eq!(grouped[&1], vec![(1, "a"), (1, "c")]);
        assert_eq!(grouped[&2], vec![(2, "b")]);
    }
}
