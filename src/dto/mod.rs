//! DTOs de la API
//!
//! Formas de entrada y salida de los endpoints. Cada entidad tiene su propia
//! función de serialización explícita.

pub mod api_response;
pub mod point_dto;
pub mod route_dto;

pub use api_response::ApiResponse;
pub use point_dto::{CreatePointRequest, CreatedPointResponse};
pub use route_dto::{FilterResponse, InfoItem, PointResponse, RouteResponse};
