pub mod payload;
pub mod route_routes;
