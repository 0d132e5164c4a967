//! Controladores
//!
//! Orquestan repositorios y servicios para cada operación de la API.

pub mod point_controller;
pub mod route_controller;

pub use point_controller::PointController;
pub use route_controller::RouteController;
