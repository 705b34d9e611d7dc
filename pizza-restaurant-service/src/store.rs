use diesel::{insert_into, prelude::*, SqliteConnection};
use serde_json::Number;

use crate::models::{
    NewRestaurantPizza, Pizza, Restaurant, RestaurantPizza, ValidationError,
};
use crate::schema::{pizzas, restaurant_pizzas, restaurants};
use crate::serializer::Graph;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("pizza or restaurant not found")]
    MissingReference,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

pub fn list_restaurants(conn: &mut SqliteConnection) -> QueryResult<Vec<Restaurant>> {
    restaurants::table
        .order(restaurants::id)
        .select(Restaurant::as_select())
        .load(conn)
}

pub fn find_restaurant(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<Restaurant>> {
    restaurants::table
        .find(id)
        .select(Restaurant::as_select())
        .first(conn)
        .optional()
}

/// Loads a restaurant together with its price rows and their pizzas.
pub fn load_restaurant(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<Graph>> {
    let Some(restaurant) = find_restaurant(conn, id)? else {
        return Ok(None);
    };

    let rows = RestaurantPizza::belonging_to(&restaurant)
        .inner_join(pizzas::table)
        .order(restaurant_pizzas::id)
        .select((RestaurantPizza::as_select(), Pizza::as_select()))
        .load::<(RestaurantPizza, Pizza)>(conn)?;

    let mut graph = Graph::new();
    graph.add_restaurant(restaurant);
    for (restaurant_pizza, pizza) in rows {
        graph.add_pizza(pizza);
        graph.add_restaurant_pizza(restaurant_pizza);
    }
    Ok(Some(graph))
}

/// Deletes a restaurant and its price rows. Returns `false` if there was no
/// such restaurant.
pub fn delete_restaurant(conn: &mut SqliteConnection, id: i32) -> QueryResult<bool> {
    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let Some(restaurant) = find_restaurant(conn, id)? else {
            return Ok(false);
        };

        diesel::delete(
            restaurant_pizzas::table.filter(restaurant_pizzas::restaurant_id.eq(restaurant.id)),
        )
        .execute(conn)?;
        diesel::delete(restaurants::table.find(restaurant.id)).execute(conn)?;

        Ok(true)
    })
}

pub fn list_pizzas(conn: &mut SqliteConnection) -> QueryResult<Vec<Pizza>> {
    pizzas::table
        .order(pizzas::id)
        .select(Pizza::as_select())
        .load(conn)
}

pub fn find_pizza(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<Pizza>> {
    pizzas::table
        .find(id)
        .select(Pizza::as_select())
        .first(conn)
        .optional()
}

pub fn insert_restaurant_pizza(
    conn: &mut SqliteConnection,
    new_restaurant_pizza: &NewRestaurantPizza,
) -> QueryResult<RestaurantPizza> {
    insert_into(restaurant_pizzas::table)
        .values(new_restaurant_pizza)
        .returning(RestaurantPizza::as_returning())
        .get_result(conn)
}

/// Resolves both parents, validates the price and inserts the row, all in one
/// transaction. The returned graph holds the new row and both parents.
pub fn create_restaurant_pizza(
    conn: &mut SqliteConnection,
    pizza_id: Option<i32>,
    restaurant_id: Option<i32>,
    price: Option<&Number>,
) -> Result<(RestaurantPizza, Graph), StoreError> {
    conn.transaction::<_, StoreError, _>(|conn| {
        let pizza = match pizza_id {
            Some(id) => find_pizza(conn, id)?,
            None => None,
        };
        let restaurant = match restaurant_id {
            Some(id) => find_restaurant(conn, id)?,
            None => None,
        };
        let (Some(pizza), Some(restaurant)) = (pizza, restaurant) else {
            return Err(StoreError::MissingReference);
        };

        let new_restaurant_pizza = NewRestaurantPizza::from_json(price, pizza.id, restaurant.id)?;
        let created = insert_restaurant_pizza(conn, &new_restaurant_pizza)?;

        let mut graph = Graph::new();
        graph.add_pizza(pizza);
        graph.add_restaurant(restaurant);
        graph.add_restaurant_pizza(created.clone());
        Ok((created, graph))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connect, seed};

    fn setup_database() -> crate::DbPool {
        let pool = connect(":memory:").unwrap();
        {
            let mut conn = pool.get().unwrap();
            seed::seed(&mut conn).unwrap();
        }
        pool
    }

    fn count_restaurant_pizzas(conn: &mut SqliteConnection) -> i64 {
        restaurant_pizzas::table.count().get_result(conn).unwrap()
    }

    #[test]
    fn test_load_restaurant_with_pizzas() {
        let pool = setup_database();
        let conn = &mut pool.get().unwrap();

        let graph = load_restaurant(conn, 1).unwrap().unwrap();

        let restaurant = graph.restaurant(1).unwrap();
        assert_eq!(restaurant.name, "Karen's Pizza Shack");
        assert_eq!(graph.pizza(1).unwrap().name, "Emma");
        assert!(load_restaurant(conn, 999).unwrap().is_none());
    }

    #[test]
    fn test_delete_restaurant_cascades() {
        let pool = setup_database();
        let conn = &mut pool.get().unwrap();
        let before = count_restaurant_pizzas(conn);

        assert!(delete_restaurant(conn, 1).unwrap());

        assert!(find_restaurant(conn, 1).unwrap().is_none());
        let orphans: i64 = restaurant_pizzas::table
            .filter(restaurant_pizzas::restaurant_id.eq(1))
            .count()
            .get_result(conn)
            .unwrap();
        assert_eq!(orphans, 0);
        assert_eq!(count_restaurant_pizzas(conn), before - 1);
        assert!(!delete_restaurant(conn, 1).unwrap());
    }

    #[test]
    fn test_create_restaurant_pizza() {
        let pool = setup_database();
        let conn = &mut pool.get().unwrap();
        let price = Number::from(15);

        let (created, graph) = create_restaurant_pizza(conn, Some(2), Some(3), Some(&price)).unwrap();

        assert_eq!(created.price, 15);
        assert_eq!(created.pizza_id, 2);
        assert_eq!(created.restaurant_id, 3);
        assert_eq!(graph.restaurant_pizza(created.id), Some(&created));
        assert!(graph.pizza(2).is_some());
        assert!(graph.restaurant(3).is_some());
    }

    #[test]
    fn test_create_restaurant_pizza_leaves_no_row_on_failure() {
        let pool = setup_database();
        let conn = &mut pool.get().unwrap();
        let before = count_restaurant_pizzas(conn);

        let too_cheap = Number::from(0);
        let err = create_restaurant_pizza(conn, Some(1), Some(1), Some(&too_cheap)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::PriceOutOfRange(0))
        ));

        let price = Number::from(10);
        let err = create_restaurant_pizza(conn, Some(999), Some(1), Some(&price)).unwrap_err();
        assert!(matches!(err, StoreError::MissingReference));

        let err = create_restaurant_pizza(conn, Some(1), None, Some(&price)).unwrap_err();
        assert!(matches!(err, StoreError::MissingReference));

        assert_eq!(count_restaurant_pizzas(conn), before);
    }
}
