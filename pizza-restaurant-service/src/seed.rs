use diesel::{connection::SimpleConnection, insert_into, prelude::*, SqliteConnection};
use tracing::info;

use crate::models::{NewPizza, NewRestaurant, NewRestaurantPizza, Pizza, Restaurant};
use crate::schema::{pizzas, restaurant_pizzas, restaurants};
use crate::store::{insert_restaurant_pizza, StoreError};

const RESTAURANTS: [NewRestaurant<'static>; 3] = [
    NewRestaurant {
        name: "Karen's Pizza Shack",
        address: "address1",
    },
    NewRestaurant {
        name: "Sanjay's Pizza",
        address: "address2",
    },
    NewRestaurant {
        name: "Kiki's Pizza",
        address: "address3",
    },
];

const PIZZAS: [NewPizza<'static>; 3] = [
    NewPizza {
        name: "Emma",
        ingredients: "Dough, Tomato Sauce, Cheese",
    },
    NewPizza {
        name: "Geri",
        ingredients: "Dough, Tomato Sauce, Cheese, Pepperoni",
    },
    NewPizza {
        name: "Melanie",
        ingredients: "Dough, Sauce, Ricotta, Red peppers, Mustard",
    },
];

/// Replaces every row with the sample data set: three restaurants, three
/// pizzas, and each restaurant selling the pizza at the same position for 1.
pub fn seed(conn: &mut SqliteConnection) -> Result<(), StoreError> {
    conn.transaction::<_, StoreError, _>(|conn| {
        diesel::delete(restaurant_pizzas::table).execute(conn)?;
        diesel::delete(pizzas::table).execute(conn)?;
        diesel::delete(restaurants::table).execute(conn)?;
        conn.batch_execute(
            "DELETE FROM sqlite_sequence \
             WHERE name IN ('restaurants', 'pizzas', 'restaurant_pizzas');",
        )?;

        let mut created = Vec::with_capacity(RESTAURANTS.len());
        for (new_restaurant, new_pizza) in RESTAURANTS.iter().zip(PIZZAS.iter()) {
            let restaurant = insert_into(restaurants::table)
                .values(new_restaurant)
                .returning(Restaurant::as_returning())
                .get_result(conn)?;
            let pizza = insert_into(pizzas::table)
                .values(new_pizza)
                .returning(Pizza::as_returning())
                .get_result(conn)?;
            created.push((restaurant, pizza));
        }

        for (restaurant, pizza) in &created {
            let new_restaurant_pizza = NewRestaurantPizza::new(1, pizza.id, restaurant.id)?;
            insert_restaurant_pizza(conn, &new_restaurant_pizza)?;
        }

        info!(
            restaurants = created.len(),
            pizzas = created.len(),
            "seeded database"
        );
        Ok(())
    })
}
