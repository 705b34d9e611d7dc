use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::Value;
use tracing::instrument;

use crate::error::ApiError;
use crate::serializer::{Graph, Relation, Rules, ToDict};
use crate::store;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/pizzas", get(list_pizzas))
}

#[utoipa::path(
    get,
    path = "/pizzas",
    responses(
        (status = 200, description = "All pizzas, without their restaurants", body = [crate::models::Pizza]),
    ),
    tag = "pizzas"
)]
#[instrument(skip(state))]
pub async fn list_pizzas(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let pizzas = state
        .with_conn(|conn| Ok(store::list_pizzas(conn)?))
        .await?;

    let graph = Graph::new();
    let rules = Rules::new().exclude(&[Relation::RestaurantPizzas]);
    Ok(Json(Value::Array(
        pizzas.iter().map(|p| p.to_dict(&graph, &rules)).collect(),
    )))
}
