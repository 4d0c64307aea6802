use crate::api::{Outcome, TemperatureApi};
use crate::model::TemperatureRequest;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Clone)]
struct AppState {
    api: TemperatureApi,
}

/// Query-string form of a create/update, the id comes from the path.
#[derive(Debug, Deserialize)]
struct TemperatureForm {
    value: Option<i32>,
    unit: Option<i64>,
}

#[derive(Debug, Serialize)]
struct ProblemDetails {
    title: String,
    status: u16,
    detail: String,
}

pub fn create_router(api: TemperatureApi) -> Router {
    let state = AppState { api };

    Router::new()
        .route(
            "/temperature",
            get(list).post(create_by_json).put(upsert_by_json),
        )
        .route(
            "/temperature/:id",
            get(get_by_id)
                .post(create_by_form)
                .put(upsert_by_form)
                .delete(delete_by_id),
        )
        .with_state(state)
}

pub fn location(id: i32) -> String {
    format!("/temperature/{}", id)
}

async fn list(State(state): State<AppState>) -> Response {
    state.api.list().await.into_response()
}

async fn get_by_id(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Response {
    match id {
        Ok(Path(id)) => state.api.get_by_id(id).await.into_response(),
        Err(rejection) => bad_input(rejection.body_text()),
    }
}

async fn create_by_json(
    State(state): State<AppState>,
    body: Result<Json<TemperatureRequest>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(request)) => state.api.create(&request).await.into_response(),
        Err(rejection) => bad_input(rejection.body_text()),
    }
}

async fn create_by_form(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    form: Result<Query<TemperatureForm>, QueryRejection>,
) -> Response {
    match form_request(id, form) {
        Ok(request) => state.api.create(&request).await.into_response(),
        Err(response) => response,
    }
}

async fn upsert_by_json(
    State(state): State<AppState>,
    body: Result<Json<TemperatureRequest>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(request)) => state.api.upsert(&request).await.into_response(),
        Err(rejection) => bad_input(rejection.body_text()),
    }
}

async fn upsert_by_form(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    form: Result<Query<TemperatureForm>, QueryRejection>,
) -> Response {
    match form_request(id, form) {
        Ok(request) => state.api.upsert(&request).await.into_response(),
        Err(response) => response,
    }
}

async fn delete_by_id(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Response {
    match id {
        Ok(Path(id)) => state.api.delete(id).await.into_response(),
        Err(rejection) => bad_input(rejection.body_text()),
    }
}

fn form_request(
    id: Result<Path<i32>, PathRejection>,
    form: Result<Query<TemperatureForm>, QueryRejection>,
) -> Result<TemperatureRequest, Response> {
    let Path(id) = id.map_err(|rejection| bad_input(rejection.body_text()))?;
    let Query(form) = form.map_err(|rejection| bad_input(rejection.body_text()))?;

    Ok(TemperatureRequest {
        id: Some(id),
        value: form.value,
        unit: form.unit,
    })
}

fn bad_input(detail: String) -> Response {
    problem(StatusCode::BAD_REQUEST, detail)
}

fn problem(status: StatusCode, detail: String) -> Response {
    let body = ProblemDetails {
        title: status.canonical_reason().unwrap_or("Error").to_string(),
        status: status.as_u16(),
        detail,
    };
    (status, Json(body)).into_response()
}

impl<T: Serialize> IntoResponse for Outcome<T> {
    fn into_response(self) -> Response {
        match self {
            Outcome::Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Outcome::Created {
                record,
                location_id,
            } => (
                StatusCode::CREATED,
                [(header::LOCATION, location(location_id))],
                Json(record),
            )
                .into_response(),
            Outcome::BadInput(detail) => problem(StatusCode::BAD_REQUEST, detail),
            Outcome::NotFound(detail) => problem(StatusCode::NOT_FOUND, detail),
            Outcome::Conflict(detail) => problem(StatusCode::CONFLICT, detail),
            Outcome::InternalError(detail) => problem(StatusCode::INTERNAL_SERVER_ERROR, detail),
        }
    }
}
