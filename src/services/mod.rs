//! Services module
//!
//! Este módulo contiene la lógica de negocio sin dependencias de HTTP:
//! construcción de filtros de rutas y decodificación/almacenamiento de imágenes.

pub mod image_service;
pub mod route_filter;

pub use image_service::ImageStorage;
pub use route_filter::{RouteFilter, RoutePredicate};
