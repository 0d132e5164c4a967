use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::controllers::point_controller::POINT_CREATED_MESSAGE;
use crate::controllers::{PointController, RouteController};
use crate::dto::{ApiResponse, CreatedPointResponse, FilterResponse, RouteResponse};
use crate::routes::payload::{query_fields, FieldsPayload};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_route_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_routes))
        .route("/filter", post(filter_routes))
        .route("/:id", get(get_route))
        .route("/:id/points", post(add_point))
}

async fn list_routes(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RouteResponse>>>, AppError> {
    let controller = RouteController::new(state.routes.clone());
    let response = controller.list().await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RouteResponse>>, AppError> {
    let controller = RouteController::new(state.routes.clone());
    let response = controller.get_by_id(&id).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn filter_routes(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    FieldsPayload(body): FieldsPayload,
) -> Result<Json<FilterResponse>, AppError> {
    // El body tiene prioridad sobre el query string
    let mut params = query_fields(query);
    params.extend(body);

    let controller = RouteController::new(state.routes.clone());
    let response = controller.filter(&params).await?;
    Ok(Json(response))
}

async fn add_point(
    State(state): State<AppState>,
    Path(target): Path<String>,
    FieldsPayload(fields): FieldsPayload,
) -> Result<(StatusCode, Json<ApiResponse<CreatedPointResponse>>), AppError> {
    let controller = PointController::from(&state);
    let response = controller.create(&target, &fields).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(response, POINT_CREATED_MESSAGE)),
    ))
}
