//! Entity to JSON conversion with explicit relationship exclusion.
//!
//! Restaurant, RestaurantPizza and Pizza reference each other in a cycle, so
//! nothing here expands a relation implicitly. Every conversion receives a
//! [`Rules`] naming the relationship paths to leave out, and every entity
//! adds its own rules cutting the back-reference to itself.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::models::{Pizza, Restaurant, RestaurantPizza};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    RestaurantPizzas,
    Restaurant,
    Pizza,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::RestaurantPizzas => "restaurant_pizzas",
            Relation::Restaurant => "restaurant",
            Relation::Pizza => "pizza",
        }
    }
}

/// Relationship paths to omit, e.g. `[RestaurantPizzas]` or
/// `[RestaurantPizzas, Restaurant]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rules {
    excluded: Vec<Vec<Relation>>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude(mut self, path: &[Relation]) -> Self {
        if !path.is_empty() && !self.excluded.iter().any(|p| p == path) {
            self.excluded.push(path.to_vec());
        }
        self
    }

    pub fn excludes(&self, relation: Relation) -> bool {
        self.excluded.iter().any(|p| p.as_slice() == [relation])
    }

    /// The rules that apply one level down, inside `relation`.
    pub fn nested(&self, relation: Relation) -> Rules {
        let excluded = self
            .excluded
            .iter()
            .filter_map(|path| match path.split_first() {
                Some((first, rest)) if *first == relation && !rest.is_empty() => {
                    Some(rest.to_vec())
                }
                _ => None,
            })
            .collect();
        Rules { excluded }
    }

    pub fn merge(&self, other: &Rules) -> Rules {
        other
            .excluded
            .iter()
            .fold(self.clone(), |rules, path| rules.exclude(path))
    }
}

/// Rows loaded for one request, keyed by id, through which relations are
/// resolved during serialization.
#[derive(Debug, Default)]
pub struct Graph {
    restaurants: BTreeMap<i32, Restaurant>,
    pizzas: BTreeMap<i32, Pizza>,
    restaurant_pizzas: BTreeMap<i32, RestaurantPizza>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_restaurant(&mut self, restaurant: Restaurant) {
        self.restaurants.insert(restaurant.id, restaurant);
    }

    pub fn add_pizza(&mut self, pizza: Pizza) {
        self.pizzas.insert(pizza.id, pizza);
    }

    pub fn add_restaurant_pizza(&mut self, restaurant_pizza: RestaurantPizza) {
        self.restaurant_pizzas
            .insert(restaurant_pizza.id, restaurant_pizza);
    }

    pub fn restaurant(&self, id: i32) -> Option<&Restaurant> {
        self.restaurants.get(&id)
    }

    pub fn pizza(&self, id: i32) -> Option<&Pizza> {
        self.pizzas.get(&id)
    }

    pub fn restaurant_pizza(&self, id: i32) -> Option<&RestaurantPizza> {
        self.restaurant_pizzas.get(&id)
    }

    fn restaurant_pizzas_where<'a>(
        &'a self,
        predicate: impl Fn(&RestaurantPizza) -> bool + 'a,
    ) -> impl Iterator<Item = &'a RestaurantPizza> + 'a {
        self.restaurant_pizzas.values().filter(move |rp| predicate(rp))
    }
}

pub trait ToDict {
    /// Exclusions the entity always applies on top of the caller's.
    fn serialize_rules() -> Rules
    where
        Self: Sized;

    fn dict(&self, graph: &Graph, rules: &Rules) -> Map<String, Value>;

    fn to_dict(&self, graph: &Graph, rules: &Rules) -> Value
    where
        Self: Sized,
    {
        Value::Object(self.dict(graph, &rules.merge(&Self::serialize_rules())))
    }
}

fn restaurant_pizzas_dict<'a>(
    restaurant_pizzas: impl Iterator<Item = &'a RestaurantPizza>,
    graph: &Graph,
    rules: &Rules,
) -> Value {
    let rules = rules.nested(Relation::RestaurantPizzas);
    Value::Array(
        restaurant_pizzas
            .map(|rp| rp.to_dict(graph, &rules))
            .collect(),
    )
}

impl ToDict for Restaurant {
    fn serialize_rules() -> Rules {
        Rules::new().exclude(&[Relation::RestaurantPizzas, Relation::Restaurant])
    }

    fn dict(&self, graph: &Graph, rules: &Rules) -> Map<String, Value> {
        let mut dict = Map::new();
        dict.insert("id".to_string(), json!(self.id));
        dict.insert("name".to_string(), json!(self.name));
        dict.insert("address".to_string(), json!(self.address));
        if !rules.excludes(Relation::RestaurantPizzas) {
            let id = self.id;
            let related = graph.restaurant_pizzas_where(move |rp| rp.restaurant_id == id);
            dict.insert(
                Relation::RestaurantPizzas.as_str().to_string(),
                restaurant_pizzas_dict(related, graph, rules),
            );
        }
        dict
    }
}

impl ToDict for Pizza {
    fn serialize_rules() -> Rules {
        Rules::new().exclude(&[Relation::RestaurantPizzas, Relation::Pizza])
    }

    fn dict(&self, graph: &Graph, rules: &Rules) -> Map<String, Value> {
        let mut dict = Map::new();
        dict.insert("id".to_string(), json!(self.id));
        dict.insert("name".to_string(), json!(self.name));
        dict.insert("ingredients".to_string(), json!(self.ingredients));
        if !rules.excludes(Relation::RestaurantPizzas) {
            let id = self.id;
            let related = graph.restaurant_pizzas_where(move |rp| rp.pizza_id == id);
            dict.insert(
                Relation::RestaurantPizzas.as_str().to_string(),
                restaurant_pizzas_dict(related, graph, rules),
            );
        }
        dict
    }
}

impl ToDict for RestaurantPizza {
    fn serialize_rules() -> Rules {
        Rules::new()
            .exclude(&[Relation::Restaurant, Relation::RestaurantPizzas])
            .exclude(&[Relation::Pizza, Relation::RestaurantPizzas])
    }

    fn dict(&self, graph: &Graph, rules: &Rules) -> Map<String, Value> {
        let mut dict = Map::new();
        dict.insert("id".to_string(), json!(self.id));
        dict.insert("price".to_string(), json!(self.price));
        dict.insert("pizza_id".to_string(), json!(self.pizza_id));
        dict.insert("restaurant_id".to_string(), json!(self.restaurant_id));
        if !rules.excludes(Relation::Pizza) {
            let pizza = graph.pizza(self.pizza_id).map_or(Value::Null, |p| {
                p.to_dict(graph, &rules.nested(Relation::Pizza))
            });
            dict.insert(Relation::Pizza.as_str().to_string(), pizza);
        }
        if !rules.excludes(Relation::Restaurant) {
            let restaurant = graph.restaurant(self.restaurant_id).map_or(Value::Null, |r| {
                r.to_dict(graph, &rules.nested(Relation::Restaurant))
            });
            dict.insert(Relation::Restaurant.as_str().to_string(), restaurant);
        }
        dict
    }
}
