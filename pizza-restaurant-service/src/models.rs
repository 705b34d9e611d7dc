use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use utoipa::ToSchema;

use crate::schema::{pizzas, restaurant_pizzas, restaurants};

pub const MIN_PRICE: i32 = 1;
pub const MAX_PRICE: i32 = 30;

#[derive(
    Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq,
)]
#[diesel(table_name = restaurants)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Restaurant {
    pub id: i32,
    pub name: String,
    pub address: String,
}

#[derive(Insertable, Debug, PartialEq)]
#[diesel(table_name = restaurants)]
pub struct NewRestaurant<'a> {
    pub name: &'a str,
    pub address: &'a str,
}

#[derive(
    Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq,
)]
#[diesel(table_name = pizzas)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Pizza {
    pub id: i32,
    pub name: String,
    pub ingredients: String,
}

#[derive(Insertable, Debug, PartialEq)]
#[diesel(table_name = pizzas)]
pub struct NewPizza<'a> {
    pub name: &'a str,
    pub ingredients: &'a str,
}

#[derive(
    Queryable,
    Selectable,
    Identifiable,
    Associations,
    Serialize,
    Deserialize,
    ToSchema,
    Clone,
    Debug,
    PartialEq,
)]
#[diesel(belongs_to(Restaurant))]
#[diesel(belongs_to(Pizza))]
#[diesel(table_name = restaurant_pizzas)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RestaurantPizza {
    pub id: i32,
    pub price: i32,
    pub restaurant_id: i32,
    pub pizza_id: i32,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("price is required")]
    MissingPrice,
    #[error("price must be a whole number, got {0}")]
    NonIntegerPrice(Number),
    #[error("price must be between 1 and 30, got {0}")]
    PriceOutOfRange(i64),
}

/// The integer a JSON number spells, if it has no fractional part. Values
/// beyond `i64` saturate, which any range check then rejects.
pub fn whole_number(number: &Number) -> Option<i64> {
    if let Some(n) = number.as_i64() {
        return Some(n);
    }
    if number.is_u64() {
        return Some(i64::MAX);
    }
    number
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

/// A price row that has passed validation and is ready to insert.
///
/// The fields are private so the only way to obtain one is through
/// [`NewRestaurantPizza::new`].
#[derive(Insertable, Debug, PartialEq)]
#[diesel(table_name = restaurant_pizzas)]
pub struct NewRestaurantPizza {
    price: i32,
    restaurant_id: i32,
    pizza_id: i32,
}

impl NewRestaurantPizza {
    pub fn new(price: i64, pizza_id: i32, restaurant_id: i32) -> Result<Self, ValidationError> {
        if !(i64::from(MIN_PRICE)..=i64::from(MAX_PRICE)).contains(&price) {
            return Err(ValidationError::PriceOutOfRange(price));
        }
        Ok(Self {
            price: price as i32,
            restaurant_id,
            pizza_id,
        })
    }

    /// Validates a price as it arrives in a JSON request body. Whole-valued
    /// floats such as `15.0` are accepted as the integer they spell.
    pub fn from_json(
        price: Option<&Number>,
        pizza_id: i32,
        restaurant_id: i32,
    ) -> Result<Self, ValidationError> {
        let price = price.ok_or(ValidationError::MissingPrice)?;
        let whole = whole_number(price)
            .ok_or_else(|| ValidationError::NonIntegerPrice(price.clone()))?;
        Self::new(whole, pizza_id, restaurant_id)
    }

    pub fn price(&self) -> i32 {
        self.price
    }

    pub fn pizza_id(&self) -> i32 {
        self.pizza_id
    }

    pub fn restaurant_id(&self) -> i32 {
        self.restaurant_id
    }
}
