//! 每個實體固定的 JSON 輸出形狀
//!
//! 巢狀輸出時，內層只會包含指向「更深處」的關係，不會回頭包含外層實體：
//! Restaurant → restaurant_pizzas → pizza，RestaurantPizza 內不會出現 `restaurant`。

pub use crate::domain::model::MenuEntry;

use crate::domain::model::{Pizza, Restaurant, RestaurantPizza};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationName {
    /// Restaurant 擁有的 RestaurantPizza 清單
    RestaurantPizzas,
    /// RestaurantPizza 指向的 Pizza
    Pizza,
}

#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Restaurant {
        restaurant: &'a Restaurant,
        menu: &'a [MenuEntry],
    },
    Pizza(&'a Pizza),
    RestaurantPizza {
        restaurant_pizza: &'a RestaurantPizza,
        pizza: Option<&'a Pizza>,
    },
}

pub fn serialize(entity: Entity<'_>, includes: &[RelationName]) -> Map<String, Value> {
    match entity {
        Entity::Restaurant { restaurant, menu } => {
            let mut out = restaurant_fields(restaurant);
            if includes.contains(&RelationName::RestaurantPizzas) {
                let nested: Vec<Value> = menu
                    .iter()
                    .map(|entry| {
                        // 內層只展開 pizza，不回頭展開 restaurant
                        Value::Object(serialize(
                            Entity::RestaurantPizza {
                                restaurant_pizza: &entry.restaurant_pizza,
                                pizza: Some(&entry.pizza),
                            },
                            &[RelationName::Pizza],
                        ))
                    })
                    .collect();
                out.insert("restaurant_pizzas".to_string(), Value::Array(nested));
            }
            out
        }
        // Pizza 的 restaurant_pizzas 不對外輸出
        Entity::Pizza(pizza) => pizza_fields(pizza),
        Entity::RestaurantPizza {
            restaurant_pizza,
            pizza,
        } => {
            let mut out = restaurant_pizza_fields(restaurant_pizza);
            if includes.contains(&RelationName::Pizza) {
                if let Some(pizza) = pizza {
                    out.insert("pizza".to_string(), Value::Object(pizza_fields(pizza)));
                }
            }
            out
        }
    }
}

pub fn restaurant_summary(restaurant: &Restaurant) -> Map<String, Value> {
    serialize(
        Entity::Restaurant {
            restaurant,
            menu: &[],
        },
        &[],
    )
}

pub fn restaurant_detail(restaurant: &Restaurant, menu: &[MenuEntry]) -> Map<String, Value> {
    serialize(
        Entity::Restaurant { restaurant, menu },
        &[RelationName::RestaurantPizzas],
    )
}

pub fn pizza_summary(pizza: &Pizza) -> Map<String, Value> {
    serialize(Entity::Pizza(pizza), &[])
}

/// 建立成功時回傳的扁平形狀
pub fn restaurant_pizza_created(restaurant_pizza: &RestaurantPizza) -> Map<String, Value> {
    serialize(
        Entity::RestaurantPizza {
            restaurant_pizza,
            pizza: None,
        },
        &[],
    )
}

pub fn restaurant_pizza_nested(restaurant_pizza: &RestaurantPizza, pizza: &Pizza) -> Map<String, Value> {
    serialize(
        Entity::RestaurantPizza {
            restaurant_pizza,
            pizza: Some(pizza),
        },
        &[RelationName::Pizza],
    )
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn restaurant_fields(restaurant: &Restaurant) -> Map<String, Value> {
    into_map(json!({
        "id": restaurant.id,
        "name": restaurant.name,
        "address": restaurant.address,
    }))
}

fn pizza_fields(pizza: &Pizza) -> Map<String, Value> {
    into_map(json!({
        "id": pizza.id,
        "name": pizza.name,
        "ingredients": pizza.ingredients,
    }))
}

fn restaurant_pizza_fields(restaurant_pizza: &RestaurantPizza) -> Map<String, Value> {
    into_map(json!({
        "id": restaurant_pizza.id,
        "price": restaurant_pizza.price,
        "pizza_id": restaurant_pizza.pizza_id,
        "restaurant_id": restaurant_pizza.restaurant_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (Restaurant, Vec<MenuEntry>) {
        let restaurant = Restaurant {
            id: 1,
            name: "A".to_string(),
            address: "1 St".to_string(),
        };
        let margherita = Pizza {
            id: 1,
            name: "Margherita".to_string(),
            ingredients: "Tomato,Cheese".to_string(),
        };
        let pepperoni = Pizza {
            id: 2,
            name: "Pepperoni".to_string(),
            ingredients: "Tomato,Cheese,Pepperoni".to_string(),
        };
        let menu = vec![
            MenuEntry {
                restaurant_pizza: RestaurantPizza {
                    id: 7,
                    price: 12,
                    restaurant_id: 1,
                    pizza_id: 1,
                },
                pizza: margherita,
            },
            MenuEntry {
                restaurant_pizza: RestaurantPizza {
                    id: 3,
                    price: 15,
                    restaurant_id: 1,
                    pizza_id: 2,
                },
                pizza: pepperoni,
            },
        ];
        (restaurant, menu)
    }

    #[test]
    fn test_restaurant_summary_has_no_relations() {
        let (restaurant, _) = fixtures();
        let out = Value::Object(restaurant_summary(&restaurant));
        assert_eq!(out, json!({"id": 1, "name": "A", "address": "1 St"}));
    }

    #[test]
    fn test_restaurant_detail_nests_pizza_but_not_restaurant() {
        let (restaurant, menu) = fixtures();
        let out = restaurant_detail(&restaurant, &menu);

        let nested = out["restaurant_pizzas"].as_array().unwrap();
        assert_eq!(nested.len(), 2);
        for entry in nested {
            let entry = entry.as_object().unwrap();
            assert!(!entry.contains_key("restaurant"));
            assert!(entry.contains_key("pizza"));
            assert!(!entry["pizza"].as_object().unwrap().contains_key("restaurant_pizzas"));
        }

        assert_eq!(
            nested[0],
            json!({
                "id": 7,
                "price": 12,
                "pizza_id": 1,
                "restaurant_id": 1,
                "pizza": {"id": 1, "name": "Margherita", "ingredients": "Tomato,Cheese"}
            })
        );
    }

    #[test]
    fn test_restaurant_detail_keeps_gateway_order() {
        let (restaurant, menu) = fixtures();
        let out = restaurant_detail(&restaurant, &menu);
        let ids: Vec<i64> = out["restaurant_pizzas"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![7, 3]);
    }

    #[test]
    fn test_empty_menu_still_emits_key() {
        let (restaurant, _) = fixtures();
        let out = restaurant_detail(&restaurant, &[]);
        assert_eq!(out["restaurant_pizzas"], json!([]));
    }

    #[test]
    fn test_created_shape_is_flat() {
        let (_, menu) = fixtures();
        let out = Value::Object(restaurant_pizza_created(&menu[0].restaurant_pizza));
        assert_eq!(
            out,
            json!({"id": 7, "price": 12, "pizza_id": 1, "restaurant_id": 1})
        );
    }

    #[test]
    fn test_pizza_summary_ignores_includes() {
        let (_, menu) = fixtures();
        let out = serialize(
            Entity::Pizza(&menu[0].pizza),
            &[RelationName::RestaurantPizzas, RelationName::Pizza],
        );
        assert_eq!(
            Value::Object(out),
            json!({"id": 1, "name": "Margherita", "ingredients": "Tomato,Cheese"})
        );
        assert_eq!(
            Value::Object(pizza_summary(&menu[1].pizza))["name"],
            json!("Pepperoni")
        );
    }

    #[test]
    fn test_nested_view_matches_detail_entries() {
        let (_, menu) = fixtures();
        let nested = restaurant_pizza_nested(&menu[1].restaurant_pizza, &menu[1].pizza);
        assert_eq!(nested["pizza"]["id"], json!(2));
        assert_eq!(nested["price"], json!(15));
    }
}
