use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde_json::Value;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::serializer::{Graph, Relation, Rules, ToDict};
use crate::store;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants", get(list_restaurants))
        .route(
            "/restaurants/{id}",
            get(get_restaurant).delete(delete_restaurant),
        )
}

// Non-numeric ids can never name a restaurant.
fn parse_restaurant_id(id: &str) -> Result<i32, ApiError> {
    id.parse().map_err(|_| ApiError::RestaurantNotFound)
}

#[utoipa::path(
    get,
    path = "/restaurants",
    responses(
        (status = 200, description = "All restaurants, without their pizzas", body = [crate::models::Restaurant]),
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn list_restaurants(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let restaurants = state
        .with_conn(|conn| Ok(store::list_restaurants(conn)?))
        .await?;

    let graph = Graph::new();
    let rules = Rules::new().exclude(&[Relation::RestaurantPizzas]);
    Ok(Json(Value::Array(
        restaurants
            .iter()
            .map(|r| r.to_dict(&graph, &rules))
            .collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/restaurants/{id}",
    responses(
        (status = 200, description = "Restaurant with its pizzas", body = crate::payloads::RestaurantDetails),
        (status = 404, description = "Restaurant not found", body = crate::payloads::ErrorResponse),
    ),
    params(
        ("id" = i32, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_restaurant_id(&id)?;

    let graph = state
        .with_conn(move |conn| Ok(store::load_restaurant(conn, id)?))
        .await?
        .ok_or(ApiError::RestaurantNotFound)?;
    let restaurant = graph.restaurant(id).ok_or(ApiError::RestaurantNotFound)?;

    Ok(Json(restaurant.to_dict(&graph, &Rules::new())))
}

#[utoipa::path(
    delete,
    path = "/restaurants/{id}",
    responses(
        (status = 204, description = "Restaurant and its pizza prices deleted"),
        (status = 404, description = "Restaurant not found", body = crate::payloads::ErrorResponse),
    ),
    params(
        ("id" = i32, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn delete_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_restaurant_id(&id)?;

    let deleted = state
        .with_conn(move |conn| Ok(store::delete_restaurant(conn, id)?))
        .await?;
    if !deleted {
        return Err(ApiError::RestaurantNotFound);
    }

    info!(restaurant_id = id, "deleted restaurant");
    Ok(StatusCode::NO_CONTENT)
}
