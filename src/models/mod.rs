//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean exactamente
//! a las tablas `route`, `point` y `"RouteInfo"`.

pub mod point;
pub mod route;
pub mod route_info;

pub use point::{NewPoint, Point};
pub use route::{Route, RouteLookup};
pub use route_info::RouteInfo;
