use crate::domain::model::{
    EntityKind, MenuEntry, NewPizza, NewRestaurant, NewRestaurantPizza, Pizza, Restaurant,
    RestaurantPizza,
};
use crate::domain::ports::Gateway;
use crate::domain::schema::{declare_schema, OnDelete};
use crate::utils::error::{Result, ServiceError};
use crate::utils::validation::{PRICE_MAX, PRICE_MIN};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Tables {
    restaurants: BTreeMap<i64, Restaurant>,
    pizzas: BTreeMap<i64, Pizza>,
    restaurant_pizzas: BTreeMap<i64, RestaurantPizza>,
    // AUTOINCREMENT 語意：刪除後的 id 不會重複使用
    next_restaurant_id: i64,
    next_pizza_id: i64,
    next_restaurant_pizza_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn owner_exists(&self, kind: EntityKind, id: i64) -> bool {
        match kind {
            EntityKind::Restaurant => self.restaurants.contains_key(&id),
            EntityKind::Pizza => self.pizzas.contains_key(&id),
            EntityKind::RestaurantPizza => self.restaurant_pizzas.contains_key(&id),
        }
    }

    /// 依 schema 的關係刪除子資料，回傳刪除筆數
    fn cascade(&mut self, parent: EntityKind, id: i64) -> usize {
        let mut removed = 0;
        for relation in declare_schema().dependents_of(parent) {
            match relation.on_delete {
                OnDelete::Cascade => {
                    let before = self.restaurant_pizzas.len();
                    self.restaurant_pizzas
                        .retain(|_, rp| foreign_key(rp, relation.foreign_key) != Some(id));
                    removed += before - self.restaurant_pizzas.len();
                }
            }
        }
        removed
    }
}

fn foreign_key(rp: &RestaurantPizza, column: &str) -> Option<i64> {
    match column {
        "restaurant_id" => Some(rp.restaurant_id),
        "pizza_id" => Some(rp.pizza_id),
        _ => None,
    }
}

/// 以記憶體保存資料的 Gateway，單一 mutex 讓每個操作都是原子的
#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: Mutex<Tables>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn find_restaurant(&self, id: i64) -> Result<Option<Restaurant>> {
        let tables = self.tables.lock().await;
        Ok(tables.restaurants.get(&id).cloned())
    }

    async fn find_pizza(&self, id: i64) -> Result<Option<Pizza>> {
        let tables = self.tables.lock().await;
        Ok(tables.pizzas.get(&id).cloned())
    }

    async fn find_restaurant_pizza(&self, id: i64) -> Result<Option<RestaurantPizza>> {
        let tables = self.tables.lock().await;
        Ok(tables.restaurant_pizzas.get(&id).cloned())
    }

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>> {
        let tables = self.tables.lock().await;
        Ok(tables.restaurants.values().cloned().collect())
    }

    async fn list_pizzas(&self) -> Result<Vec<Pizza>> {
        let tables = self.tables.lock().await;
        Ok(tables.pizzas.values().cloned().collect())
    }

    async fn find_related(&self, owner: EntityKind, id: i64) -> Result<Vec<RestaurantPizza>> {
        let relation = declare_schema()
            .dependents_of(owner)
            .next()
            .ok_or_else(|| {
                ServiceError::integrity(format!("{} owns no related rows", owner.display_name()))
            })?;

        let tables = self.tables.lock().await;
        Ok(tables
            .restaurant_pizzas
            .values()
            .filter(|rp| foreign_key(rp, relation.foreign_key) == Some(id))
            .cloned()
            .collect())
    }

    async fn find_restaurant_with_menu(
        &self,
        id: i64,
    ) -> Result<Option<(Restaurant, Vec<MenuEntry>)>> {
        let tables = self.tables.lock().await;
        let Some(restaurant) = tables.restaurants.get(&id).cloned() else {
            return Ok(None);
        };

        let menu = tables
            .restaurant_pizzas
            .values()
            .filter(|rp| rp.restaurant_id == id)
            .map(|rp| -> Result<MenuEntry> {
                let pizza = tables.pizzas.get(&rp.pizza_id).cloned().ok_or_else(|| {
                    ServiceError::InconsistentData {
                        message: format!(
                            "restaurant_pizza {} references missing pizza {}",
                            rp.id, rp.pizza_id
                        ),
                    }
                })?;
                Ok(MenuEntry {
                    restaurant_pizza: rp.clone(),
                    pizza,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some((restaurant, menu)))
    }

    async fn insert_restaurant(&self, new: NewRestaurant) -> Result<Restaurant> {
        let mut tables = self.tables.lock().await;
        let id = Tables::next_id(&mut tables.next_restaurant_id);
        let restaurant = new.into_restaurant(id);
        tables.restaurants.insert(id, restaurant.clone());
        Ok(restaurant)
    }

    async fn insert_pizza(&self, new: NewPizza) -> Result<Pizza> {
        let mut tables = self.tables.lock().await;
        let id = Tables::next_id(&mut tables.next_pizza_id);
        let pizza = new.into_pizza(id);
        tables.pizzas.insert(id, pizza.clone());
        Ok(pizza)
    }

    async fn insert_restaurant_pizza(&self, new: NewRestaurantPizza) -> Result<RestaurantPizza> {
        // 對應資料庫層的 CHECK 約束
        if new.price < PRICE_MIN || new.price > PRICE_MAX {
            return Err(ServiceError::integrity(format!(
                "price {} violates check constraint",
                new.price
            )));
        }

        let mut tables = self.tables.lock().await;
        if !tables.owner_exists(EntityKind::Restaurant, new.restaurant_id) {
            return Err(ServiceError::integrity(format!(
                "restaurant_id {} does not reference an existing restaurant",
                new.restaurant_id
            )));
        }
        if !tables.owner_exists(EntityKind::Pizza, new.pizza_id) {
            return Err(ServiceError::integrity(format!(
                "pizza_id {} does not reference an existing pizza",
                new.pizza_id
            )));
        }

        let id = Tables::next_id(&mut tables.next_restaurant_pizza_id);
        let restaurant_pizza = new.into_restaurant_pizza(id);
        tables.restaurant_pizzas.insert(id, restaurant_pizza.clone());
        Ok(restaurant_pizza)
    }

    async fn delete_restaurant(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        if tables.restaurants.remove(&id).is_none() {
            return Ok(false);
        }
        let removed = tables.cascade(EntityKind::Restaurant, id);
        tracing::debug!("Deleted restaurant {} and {} restaurant_pizzas", id, removed);
        Ok(true)
    }

    async fn delete_pizza(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        if tables.pizzas.remove(&id).is_none() {
            return Ok(false);
        }
        let removed = tables.cascade(EntityKind::Pizza, id);
        tracing::debug!("Deleted pizza {} and {} restaurant_pizzas", id, removed);
        Ok(true)
    }

    async fn count(&self, kind: EntityKind) -> Result<usize> {
        let tables = self.tables.lock().await;
        Ok(match kind {
            EntityKind::Restaurant => tables.restaurants.len(),
            EntityKind::Pizza => tables.pizzas.len(),
            EntityKind::RestaurantPizza => tables.restaurant_pizzas.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryGateway, Restaurant, Pizza) {
        let gateway = MemoryGateway::new();
        let restaurant = gateway
            .insert_restaurant(NewRestaurant {
                name: "A".to_string(),
                address: "1 St".to_string(),
            })
            .await
            .unwrap();
        let pizza = gateway
            .insert_pizza(NewPizza {
                name: "Margherita".to_string(),
                ingredients: "Tomato,Cheese".to_string(),
            })
            .await
            .unwrap();
        (gateway, restaurant, pizza)
    }

    fn offer(restaurant: &Restaurant, pizza: &Pizza, price: i64) -> NewRestaurantPizza {
        NewRestaurantPizza {
            price,
            restaurant_id: restaurant.id,
            pizza_id: pizza.id,
        }
    }

    #[tokio::test]
    async fn test_ids_are_assigned_sequentially() {
        let (gateway, restaurant, pizza) = seeded().await;
        assert_eq!(restaurant.id, 1);
        assert_eq!(pizza.id, 1);

        let rp = gateway
            .insert_restaurant_pizza(offer(&restaurant, &pizza, 12))
            .await
            .unwrap();
        assert_eq!(rp.id, 1);
        assert_eq!(rp.price, 12);
    }

    #[tokio::test]
    async fn test_delete_restaurant_cascades_but_keeps_pizzas() {
        let (gateway, restaurant, pizza) = seeded().await;
        let other = gateway
            .insert_restaurant(NewRestaurant {
                name: "B".to_string(),
                address: "2 St".to_string(),
            })
            .await
            .unwrap();

        gateway.insert_restaurant_pizza(offer(&restaurant, &pizza, 10)).await.unwrap();
        gateway.insert_restaurant_pizza(offer(&restaurant, &pizza, 11)).await.unwrap();
        gateway.insert_restaurant_pizza(offer(&other, &pizza, 9)).await.unwrap();

        assert!(gateway.delete_restaurant(restaurant.id).await.unwrap());

        let remaining = gateway.find_related(EntityKind::Restaurant, restaurant.id).await.unwrap();
        assert!(remaining.is_empty());
        assert_eq!(gateway.count(EntityKind::RestaurantPizza).await.unwrap(), 1);
        assert_eq!(gateway.count(EntityKind::Pizza).await.unwrap(), 1);
        assert!(gateway.find_restaurant(restaurant.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_pizza_cascades() {
        let (gateway, restaurant, pizza) = seeded().await;
        gateway.insert_restaurant_pizza(offer(&restaurant, &pizza, 10)).await.unwrap();

        assert!(gateway.delete_pizza(pizza.id).await.unwrap());
        assert_eq!(gateway.count(EntityKind::RestaurantPizza).await.unwrap(), 0);
        assert_eq!(gateway.count(EntityKind::Restaurant).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_returns_false() {
        let gateway = MemoryGateway::new();
        assert!(!gateway.delete_restaurant(999).await.unwrap());
        assert!(!gateway.delete_pizza(999).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_rejects_dangling_references() {
        let (gateway, restaurant, pizza) = seeded().await;

        let bad_pizza = NewRestaurantPizza {
            price: 10,
            restaurant_id: restaurant.id,
            pizza_id: 42,
        };
        assert!(matches!(
            gateway.insert_restaurant_pizza(bad_pizza).await,
            Err(ServiceError::IntegrityError { .. })
        ));

        let bad_restaurant = NewRestaurantPizza {
            price: 10,
            restaurant_id: 42,
            pizza_id: pizza.id,
        };
        assert!(gateway.insert_restaurant_pizza(bad_restaurant).await.is_err());
        assert_eq!(gateway.count(EntityKind::RestaurantPizza).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_enforces_price_check() {
        let (gateway, restaurant, pizza) = seeded().await;
        let result = gateway.insert_restaurant_pizza(offer(&restaurant, &pizza, 31)).await;
        assert!(matches!(result, Err(ServiceError::IntegrityError { .. })));
        assert_eq!(gateway.count(EntityKind::RestaurantPizza).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_related_keeps_insertion_order() {
        let (gateway, restaurant, pizza) = seeded().await;
        for price in [5, 25, 15] {
            gateway.insert_restaurant_pizza(offer(&restaurant, &pizza, price)).await.unwrap();
        }

        let prices: Vec<i64> = gateway
            .find_related(EntityKind::Pizza, pizza.id)
            .await
            .unwrap()
            .iter()
            .map(|rp| rp.price)
            .collect();
        assert_eq!(prices, vec![5, 25, 15]);
    }

    #[tokio::test]
    async fn test_find_restaurant_with_menu_embeds_pizzas() {
        let (gateway, restaurant, pizza) = seeded().await;
        let rp = gateway
            .insert_restaurant_pizza(offer(&restaurant, &pizza, 12))
            .await
            .unwrap();

        let (found, menu) = gateway
            .find_restaurant_with_menu(restaurant.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, restaurant);
        assert_eq!(
            menu,
            vec![MenuEntry {
                restaurant_pizza: rp,
                pizza
            }]
        );
        assert!(gateway.find_restaurant_with_menu(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dangling_menu_row_is_inconsistent_data() {
        let (gateway, restaurant, pizza) = seeded().await;
        gateway.insert_restaurant_pizza(offer(&restaurant, &pizza, 12)).await.unwrap();

        // 繞過 cascade 直接移除 pizza，留下懸空的關聯
        gateway.tables.lock().await.pizzas.remove(&pizza.id);

        let result = gateway.find_restaurant_with_menu(restaurant.id).await;
        assert!(matches!(result, Err(ServiceError::InconsistentData { .. })));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let (gateway, restaurant, _) = seeded().await;
        gateway.delete_restaurant(restaurant.id).await.unwrap();
        let next = gateway
            .insert_restaurant(NewRestaurant {
                name: "C".to_string(),
                address: "3 St".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(next.id, 2);
    }
}
