//! Repositorios
//!
//! Acceso a datos detrás de traits, con implementación PostgreSQL y en memoria.

pub mod memory;
pub mod point_repository;
pub mod route_repository;

pub use memory::InMemoryStore;
pub use point_repository::{PgPointRepository, PointRepository};
pub use route_repository::{PgRouteRepository, RouteRepository};
