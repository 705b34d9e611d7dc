use serde::{Deserialize, Serialize};
use serde_json::Number;
use utoipa::ToSchema;

use crate::models::{Pizza, Restaurant};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRestaurantPizzaRequest {
    /// Price of the pizza at the restaurant, from 1 to 30
    #[schema(value_type = Option<i32>)]
    pub price: Option<Number>,
    /// Pizza being priced
    #[schema(value_type = Option<i32>)]
    pub pizza_id: Option<Number>,
    /// Restaurant selling the pizza
    #[schema(value_type = Option<i32>)]
    pub restaurant_id: Option<Number>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RestaurantPizzaEntry {
    pub id: i32,
    pub price: i32,
    pub pizza_id: i32,
    pub restaurant_id: i32,
    pub pizza: Pizza,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RestaurantDetails {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub restaurant_pizzas: Vec<RestaurantPizzaEntry>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RestaurantPizzaCreated {
    pub id: i32,
    pub price: i32,
    pub pizza_id: i32,
    pub restaurant_id: i32,
    pub pizza: Pizza,
    pub restaurant: Restaurant,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorsResponse {
    /// Error messages
    pub errors: Vec<String>,
}
