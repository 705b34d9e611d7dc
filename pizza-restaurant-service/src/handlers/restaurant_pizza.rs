use axum::{
    body::Bytes, extract::State, http::StatusCode, response::Json, routing::post, Router,
};
use serde_json::{Number, Value};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::models::whole_number;
use crate::payloads::CreateRestaurantPizzaRequest;
use crate::serializer::{Rules, ToDict};
use crate::store;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/restaurant_pizzas", post(create_restaurant_pizza))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

// Numbers that cannot be a row id are looked up as absent, not rejected.
fn reference_id(number: &Number) -> Option<i32> {
    whole_number(number).and_then(|id| i32::try_from(id).ok())
}

fn parse_request(body: &[u8]) -> Result<CreateRestaurantPizzaRequest, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::InvalidInput)?;
    if is_blank(&value) || !value.is_object() {
        return Err(ApiError::InvalidInput);
    }
    serde_json::from_value(value).map_err(|_| ApiError::InvalidInput)
}

#[utoipa::path(
    post,
    path = "/restaurant_pizzas",
    request_body = CreateRestaurantPizzaRequest,
    responses(
        (status = 201, description = "Price created", body = crate::payloads::RestaurantPizzaCreated),
        (status = 400, description = "Invalid body or price out of range", body = crate::payloads::ErrorsResponse),
        (status = 404, description = "Pizza or restaurant not found", body = crate::payloads::ErrorsResponse),
        (status = 500, description = "Unexpected error", body = crate::payloads::ErrorsResponse),
    ),
    tag = "restaurant_pizzas"
)]
#[instrument(skip(state, body))]
pub async fn create_restaurant_pizza(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let payload = parse_request(&body)?;
    let pizza_id = payload.pizza_id.as_ref().and_then(reference_id);
    let restaurant_id = payload.restaurant_id.as_ref().and_then(reference_id);

    let (created, graph) = state
        .with_conn(move |conn| {
            Ok(store::create_restaurant_pizza(
                conn,
                pizza_id,
                restaurant_id,
                payload.price.as_ref(),
            )?)
        })
        .await?;

    info!(
        id = created.id,
        pizza_id = created.pizza_id,
        restaurant_id = created.restaurant_id,
        "created restaurant pizza"
    );
    Ok((
        StatusCode::CREATED,
        Json(created.to_dict(&graph, &Rules::new())),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use diesel::{connection::SimpleConnection, prelude::*, SqliteConnection};
    use serde_json::json;

    use crate::handlers::testing::{send_json, test_app};
    use crate::payloads::RestaurantPizzaCreated;
    use crate::schema::restaurant_pizzas;

    fn count_rows(state: &AppState) -> i64 {
        let conn: &mut SqliteConnection = &mut state.pool.get().unwrap();
        restaurant_pizzas::table.count().get_result(conn).unwrap()
    }

    #[tokio::test]
    async fn test_create_restaurant_pizza() {
        let (app, state) = test_app();
        let before = count_rows(&state);

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/restaurant_pizzas",
            Some(r#"{"price": 15, "pizza_id": 3, "restaurant_id": 1}"#),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        let created: RestaurantPizzaCreated = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(created.price, 15);
        assert_eq!(created.pizza_id, 3);
        assert_eq!(created.restaurant_id, 1);
        assert_eq!(created.pizza.name, "Melanie");
        assert_eq!(created.restaurant.name, "Karen's Pizza Shack");
        assert!(body["pizza"].get("restaurant_pizzas").is_none());
        assert!(body["restaurant"].get("restaurant_pizzas").is_none());
        assert_eq!(count_rows(&state), before + 1);

        let (_, restaurant) = send_json(&app, Method::GET, "/restaurants/1", None).await;
        let ids: Vec<_> = restaurant["restaurant_pizzas"]
            .as_array()
            .unwrap()
            .iter()
            .map(|rp| rp["id"].clone())
            .collect();
        assert!(ids.contains(&json!(created.id)));
    }

    #[tokio::test]
    async fn test_create_restaurant_pizza_whole_valued_float_price() {
        let (app, state) = test_app();
        let before = count_rows(&state);

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/restaurant_pizzas",
            Some(r#"{"price": 15.0, "pizza_id": 1, "restaurant_id": 1}"#),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["price"], json!(15));
        assert_eq!(count_rows(&state), before + 1);
    }

    #[tokio::test]
    async fn test_create_restaurant_pizza_price_out_of_range() {
        let (app, state) = test_app();
        let before = count_rows(&state);

        for price in [0, 31] {
            let body = json!({"price": price, "pizza_id": 1, "restaurant_id": 2}).to_string();
            let (status, body) =
                send_json(&app, Method::POST, "/restaurant_pizzas", Some(&body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({"errors": ["validation errors"]}));
        }

        assert_eq!(count_rows(&state), before);
    }

    #[tokio::test]
    async fn test_create_restaurant_pizza_price_not_an_integer() {
        let (app, state) = test_app();
        let before = count_rows(&state);

        for body in [
            r#"{"price": 12.5, "pizza_id": 1, "restaurant_id": 2}"#,
            r#"{"pizza_id": 1, "restaurant_id": 2}"#,
        ] {
            let (status, body) =
                send_json(&app, Method::POST, "/restaurant_pizzas", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({"errors": ["validation errors"]}));
        }

        assert_eq!(count_rows(&state), before);
    }

    #[tokio::test]
    async fn test_create_restaurant_pizza_missing_reference() {
        let (app, state) = test_app();
        let before = count_rows(&state);

        for body in [
            r#"{"price": 10, "pizza_id": 999, "restaurant_id": 1}"#,
            r#"{"price": 10, "pizza_id": 1, "restaurant_id": 999}"#,
            r#"{"price": 10, "restaurant_id": 1}"#,
            r#"{"price": 15, "pizza_id": 4294967296, "restaurant_id": 1}"#,
            r#"{"price": 15, "pizza_id": 1, "restaurant_id": -1}"#,
            r#"{"price": 15, "pizza_id": 1.5, "restaurant_id": 1}"#,
            // lookups happen before price validation
            r#"{"price": 0, "pizza_id": 999, "restaurant_id": 1}"#,
        ] {
            let (status, body) =
                send_json(&app, Method::POST, "/restaurant_pizzas", Some(body)).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, json!({"errors": ["Pizza or Restaurant not found"]}));
        }

        assert_eq!(count_rows(&state), before);
    }

    #[tokio::test]
    async fn test_create_restaurant_pizza_invalid_body() {
        let (app, state) = test_app();
        let before = count_rows(&state);

        for body in [
            "",
            "not json",
            "{}",
            "null",
            "[]",
            "[1, 2]",
            r#"{"price": 10, "pizza_id": 1, "restaurant_id": "1"}"#,
            r#"{"price": 10, "pizza_id": "one", "restaurant_id": 1}"#,
        ] {
            let (status, response) =
                send_json(&app, Method::POST, "/restaurant_pizzas", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(response, json!({"errors": ["Invalid JSON body"]}));
        }

        assert_eq!(count_rows(&state), before);
    }

    #[tokio::test]
    async fn test_create_restaurant_pizza_unexpected_error() {
        let (app, state) = test_app();
        {
            let conn: &mut SqliteConnection = &mut state.pool.get().unwrap();
            conn.batch_execute("DROP TABLE restaurant_pizzas;").unwrap();
        }

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/restaurant_pizzas",
            Some(r#"{"price": 5, "pizza_id": 1, "restaurant_id": 1}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"errors": ["An unexpected error occurred."]}));
    }

    #[test]
    fn test_reference_id() {
        assert_eq!(reference_id(&Number::from(7)), Some(7));
        assert_eq!(reference_id(&Number::from_f64(7.0).unwrap()), Some(7));
        assert_eq!(reference_id(&Number::from(4_294_967_296_i64)), None);
        assert_eq!(reference_id(&Number::from_f64(7.5).unwrap()), None);
    }

    #[test]
    fn test_is_blank() {
        for value in [json!(null), json!(false), json!(0), json!(""), json!([]), json!({})] {
            assert!(is_blank(&value), "{value}");
        }
        for value in [json!(true), json!(1), json!("x"), json!([0]), json!({"a": 1})] {
            assert!(!is_blank(&value), "{value}");
        }
    }
}
