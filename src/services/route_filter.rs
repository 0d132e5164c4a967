//! Filtros de rutas
//!
//! Convierte los parámetros opcionales de filtrado en una lista explícita de
//! predicados tipados. Los predicados se combinan con AND en la capa de
//! repositorio; aquí no hay estado de query mutable.

use serde_json::{Map, Value};

use crate::models::Route;
use crate::utils::errors::AppResult;
use crate::utils::validation::{is_truthy, parse_number, parse_text};

/// Parámetros de filtrado ya validados
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteFilter {
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
    pub max_participants: Option<f64>,
    pub target_audience: Option<String>,
    pub min_duration: Option<f64>,
    pub max_duration: Option<f64>,
}

/// Atributo numérico de la ruta sobre el que se compara
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Distance,
    Duration,
    Participants,
}

impl NumericField {
    pub fn column(self) -> &'static str {
        match self {
            NumericField::Distance => "distance",
            NumericField::Duration => "duration",
            NumericField::Participants => "participants",
        }
    }

    fn value_of(self, route: &Route) -> Option<f64> {
        match self {
            NumericField::Distance => route.distance,
            NumericField::Duration => route.duration.map(f64::from),
            NumericField::Participants => route.participants.map(f64::from),
        }
    }
}

/// Un predicado sobre una ruta
#[derive(Debug, Clone, PartialEq)]
pub enum RoutePredicate {
    AtLeast(NumericField, f64),
    AtMost(NumericField, f64),
    AudienceIs(String),
}

impl RoutePredicate {
    /// Evaluar en memoria. Un atributo null nunca cumple el predicado,
    /// igual que una comparación SQL con NULL.
    pub fn matches(&self, route: &Route) -> bool {
        match self {
            RoutePredicate::AtLeast(field, bound) => {
                field.value_of(route).map(|v| v >= *bound).unwrap_or(false)
            }
            RoutePredicate::AtMost(field, bound) => {
                field.value_of(route).map(|v| v <= *bound).unwrap_or(false)
            }
            RoutePredicate::AudienceIs(audience) => {
                route.audience.as_deref() == Some(audience.as_str())
            }
        }
    }
}

impl RouteFilter {
    /// Validar los parámetros crudos.
    ///
    /// Los valores "falsos" (null, "", 0, "0", false) se ignoran; un valor
    /// no numérico en un parámetro numérico es un error de validación.
    pub fn from_params(params: &Map<String, Value>) -> AppResult<Self> {
        Ok(Self {
            min_distance: numeric_param(params, "min_distance")?,
            max_distance: numeric_param(params, "max_distance")?,
            max_participants: numeric_param(params, "max_participants")?,
            target_audience: text_param(params, "target_audience")?,
            min_duration: numeric_param(params, "min_duration")?,
            max_duration: numeric_param(params, "max_duration")?,
        })
    }

    /// Lista de predicados, uno por parámetro presente.
    pub fn predicates(&self) -> Vec<RoutePredicate> {
        use NumericField::*;
        use RoutePredicate::*;

        let mut predicates = Vec::new();
        if let Some(v) = self.min_distance {
            predicates.push(AtLeast(Distance, v));
        }
        if let Some(v) = self.max_distance {
            predicates.push(AtMost(Distance, v));
        }
        if let Some(v) = self.max_participants {
            predicates.push(AtMost(Participants, v));
        }
        if let Some(audience) = &self.target_audience {
            predicates.push(AudienceIs(audience.clone()));
        }
        if let Some(v) = self.min_duration {
            predicates.push(AtLeast(Duration, v));
        }
        if let Some(v) = self.max_duration {
            predicates.push(AtMost(Duration, v));
        }
        predicates
    }
}

/// ¿La ruta cumple todos los predicados?
pub fn matches_all(predicates: &[RoutePredicate], route: &Route) -> bool {
    predicates.iter().all(|p| p.matches(route))
}

fn numeric_param(params: &Map<String, Value>, name: &str) -> AppResult<Option<f64>> {
    match params.get(name) {
        Some(value) if is_truthy(value) => parse_number(name, value).map(Some),
        _ => Ok(None),
    }
}

fn text_param(params: &Map<String, Value>, name: &str) -> AppResult<Option<String>> {
    match params.get(name) {
        Some(value) if is_truthy(value) => parse_text(name, value).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::AppError;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn route(
        id: i64,
        distance: Option<f64>,
        duration: Option<i32>,
        audience: Option<&str>,
    ) -> Route {
        Route {
            id,
            title: format!("Route {}", id),
            map_color: None,
            description: None,
            distance,
            duration,
            participants: Some(10),
            audience: audience.map(str::to_string),
            slug: None,
        }
    }

    #[test]
    fn test_no_params_no_predicates() {
        let filter = RouteFilter::from_params(&Map::new()).unwrap();
        assert!(filter.predicates().is_empty());
        assert!(matches_all(&filter.predicates(), &route(1, None, None, None)));
    }

    #[test]
    fn test_falsy_params_are_ignored() {
        let filter = RouteFilter::from_params(&params(json!({
            "min_distance": 0,
            "max_distance": "",
            "max_participants": null,
            "target_audience": "0",
            "min_duration": false,
            "max_duration": "0"
        })))
        .unwrap();
        assert_eq!(filter, RouteFilter::default());
    }

    #[test]
    fn test_predicates_in_parameter_order() {
        let filter = RouteFilter::from_params(&params(json!({
            "max_duration": 120,
            "min_distance": "5",
            "target_audience": "kids",
            "max_participants": 12
        })))
        .unwrap();
        assert_eq!(
            filter.predicates(),
            vec![
                RoutePredicate::AtLeast(NumericField::Distance, 5.0),
                RoutePredicate::AtMost(NumericField::Participants, 12.0),
                RoutePredicate::AudienceIs("kids".to_string()),
                RoutePredicate::AtMost(NumericField::Duration, 120.0),
            ]
        );
    }

    #[test]
    fn test_distance_range_is_inclusive() {
        let raw = params(json!({ "min_distance": 5, "max_distance": 10 }));
        let filter = RouteFilter::from_params(&raw).unwrap();
        let predicates = filter.predicates();
        assert!(matches_all(&predicates, &route(1, Some(5.0), None, None)));
        assert!(matches_all(&predicates, &route(2, Some(10.0), None, None)));
        assert!(!matches_all(&predicates, &route(3, Some(10.5), None, None)));
        assert!(!matches_all(&predicates, &route(4, Some(4.9), None, None)));
        assert!(!matches_all(&predicates, &route(5, None, None, None)));
    }

    #[test]
    fn test_audience_is_exact_match() {
        let predicate = RoutePredicate::AudienceIs("kids".to_string());
        assert!(predicate.matches(&route(1, None, None, Some("kids"))));
        assert!(!predicate.matches(&route(2, None, None, Some("Kids"))));
        assert!(!predicate.matches(&route(3, None, None, None)));
    }

    #[test]
    fn test_duration_compares_integers_as_numbers() {
        let predicate = RoutePredicate::AtLeast(NumericField::Duration, 60.0);
        assert!(predicate.matches(&route(1, None, Some(60), None)));
        assert!(!predicate.matches(&route(2, None, Some(59), None)));
    }

    #[test]
    fn test_non_numeric_value_is_validation_error() {
        let err = RouteFilter::from_params(&params(json!({ "min_distance": "far" }))).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { ref field, .. } if field == "min_distance"));

        let err = RouteFilter::from_params(&params(json!({ "max_duration": true }))).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { ref field, .. } if field == "max_duration"));

        let raw = params(json!({ "target_audience": ["kids"] }));
        let err = RouteFilter::from_params(&raw).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidInput { ref field, .. } if field == "target_audience"
        ));
    }
}
