use crate::config::toml_config::SeedConfig;
use crate::domain::model::{EntityKind, NewPizza, NewRestaurant, NewRestaurantPizza};
use crate::domain::ports::Gateway;
use crate::domain::views;
use crate::utils::error::{Result, ServiceError};
use crate::utils::validation::{validate_foreign_id, validate_price, Validate};
use serde_json::{Map, Value};
use std::sync::Arc;

pub type View = Map<String, Value>;

/// 請求層級的操作：讀寫經過 Gateway，回傳已序列化的 view 或型別化錯誤
#[derive(Clone)]
pub struct Catalog {
    gateway: Arc<dyn Gateway>,
}

impl Catalog {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    pub async fn list_restaurants(&self) -> Result<Vec<View>> {
        let restaurants = self.gateway.list_restaurants().await?;
        Ok(restaurants.iter().map(views::restaurant_summary).collect())
    }

    /// 餐廳與菜單由 Gateway 一次讀出；懸空的關聯以 `InconsistentData` 往上傳
    pub async fn restaurant_detail(&self, id: i64) -> Result<View> {
        let (restaurant, menu) = self
            .gateway
            .find_restaurant_with_menu(id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: EntityKind::Restaurant.display_name(),
            })?;
        Ok(views::restaurant_detail(&restaurant, &menu))
    }

    pub async fn delete_restaurant(&self, id: i64) -> Result<()> {
        if !self.gateway.delete_restaurant(id).await? {
            return Err(ServiceError::NotFound {
                entity: EntityKind::Restaurant.display_name(),
            });
        }
        tracing::info!("Deleted restaurant {}", id);
        Ok(())
    }

    pub async fn list_pizzas(&self) -> Result<Vec<View>> {
        let pizzas = self.gateway.list_pizzas().await?;
        Ok(pizzas.iter().map(views::pizza_summary).collect())
    }

    pub async fn delete_pizza(&self, id: i64) -> Result<()> {
        if !self.gateway.delete_pizza(id).await? {
            return Err(ServiceError::NotFound {
                entity: EntityKind::Pizza.display_name(),
            });
        }
        tracing::info!("Deleted pizza {}", id);
        Ok(())
    }

    pub async fn create_restaurant(&self, new: NewRestaurant) -> Result<View> {
        new.validate()?;
        let restaurant = self.gateway.insert_restaurant(new).await?;
        tracing::info!("Created restaurant {} ({})", restaurant.id, restaurant.name);
        Ok(views::restaurant_summary(&restaurant))
    }

    pub async fn create_pizza(&self, new: NewPizza) -> Result<View> {
        new.validate()?;
        let pizza = self.gateway.insert_pizza(new).await?;
        tracing::info!("Created pizza {} ({})", pizza.id, pizza.name);
        Ok(views::pizza_summary(&pizza))
    }

    /// 先檢查 price / pizza_id / restaurant_id，通過後才寫入
    pub async fn create_restaurant_pizza(&self, payload: &Value) -> Result<View> {
        let new = parse_restaurant_pizza(payload)?;
        let restaurant_pizza = self.gateway.insert_restaurant_pizza(new).await?;
        tracing::info!(
            "Created restaurant_pizza {} (restaurant {}, pizza {}, price {})",
            restaurant_pizza.id,
            restaurant_pizza.restaurant_id,
            restaurant_pizza.pizza_id,
            restaurant_pizza.price
        );
        Ok(views::restaurant_pizza_created(&restaurant_pizza))
    }

    /// 只在資料庫為空時寫入種子資料；seed 中的 restaurant / pizza 以 1 起算的位置互相參照
    pub async fn seed(&self, seed: &SeedConfig) -> Result<usize> {
        if self.gateway.count(EntityKind::Restaurant).await? > 0
            || self.gateway.count(EntityKind::Pizza).await? > 0
        {
            tracing::info!("Store already has data, skipping seed");
            return Ok(0);
        }

        let mut restaurant_ids = Vec::with_capacity(seed.restaurants.len());
        for restaurant in &seed.restaurants {
            restaurant.validate()?;
            let stored = self.gateway.insert_restaurant(restaurant.clone()).await?;
            restaurant_ids.push(stored.id);
        }

        let mut pizza_ids = Vec::with_capacity(seed.pizzas.len());
        for pizza in &seed.pizzas {
            pizza.validate()?;
            let stored = self.gateway.insert_pizza(pizza.clone()).await?;
            pizza_ids.push(stored.id);
        }

        for entry in &seed.restaurant_pizzas {
            let restaurant_id = resolve_seed_ref("restaurant", &restaurant_ids, entry.restaurant)?;
            let pizza_id = resolve_seed_ref("pizza", &pizza_ids, entry.pizza)?;
            let price = validate_price(Some(&Value::from(entry.price)))?;
            self.gateway
                .insert_restaurant_pizza(NewRestaurantPizza {
                    price,
                    restaurant_id,
                    pizza_id,
                })
                .await?;
        }

        let total = seed.restaurants.len() + seed.pizzas.len() + seed.restaurant_pizzas.len();
        tracing::info!("Seeded {} rows", total);
        Ok(total)
    }
}

pub fn parse_restaurant_pizza(payload: &Value) -> Result<NewRestaurantPizza> {
    let body = payload
        .as_object()
        .ok_or_else(|| ServiceError::validation("request body must be a JSON object"))?;

    let price = validate_price(body.get("price"))?;
    let pizza_id = validate_foreign_id("pizza_id", body.get("pizza_id"))?;
    let restaurant_id = validate_foreign_id("restaurant_id", body.get("restaurant_id"))?;

    Ok(NewRestaurantPizza {
        price,
        restaurant_id,
        pizza_id,
    })
}

fn resolve_seed_ref(kind: &str, ids: &[i64], position: usize) -> Result<i64> {
    position
        .checked_sub(1)
        .and_then(|index| ids.get(index))
        .copied()
        .ok_or_else(|| ServiceError::InvalidConfigValueError {
            field: format!("seed.restaurant_pizzas.{}", kind),
            value: position.to_string(),
            reason: format!("no seeded {} at position {}", kind, position),
        })
}
