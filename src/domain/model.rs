use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, Validate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Restaurant,
    Pizza,
    RestaurantPizza,
}

impl EntityKind {
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Restaurant => "restaurants",
            EntityKind::Pizza => "pizzas",
            EntityKind::RestaurantPizza => "restaurant_pizzas",
        }
    }

    /// 錯誤訊息中使用的名稱，例如 "Restaurant not found"
    pub fn display_name(&self) -> &'static str {
        match self {
            EntityKind::Restaurant => "Restaurant",
            EntityKind::Pizza => "Pizza",
            EntityKind::RestaurantPizza => "RestaurantPizza",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pizza {
    pub id: i64,
    pub name: String,
    pub ingredients: String,
}

/// 餐廳與披薩之間的關聯，帶有價格
///
/// 只保存兩個外鍵；需要完整物件時透過 `Gateway::find_restaurant_with_menu` 一次讀出。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantPizza {
    pub id: i64,
    pub price: i64,
    pub restaurant_id: i64,
    pub pizza_id: i64,
}

/// RestaurantPizza 與其指向的 Pizza，由 Gateway 一次讀出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub restaurant_pizza: RestaurantPizza,
    pub pizza: Pizza,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRestaurant {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPizza {
    pub name: String,
    pub ingredients: String,
}

/// 已經通過價格檢查的建立請求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRestaurantPizza {
    pub price: i64,
    pub restaurant_id: i64,
    pub pizza_id: i64,
}

impl Validate for NewRestaurant {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        validate_non_empty_string("address", &self.address)
    }
}

impl Validate for NewPizza {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        validate_non_empty_string("ingredients", &self.ingredients)
    }
}

impl NewRestaurant {
    pub fn into_restaurant(self, id: i64) -> Restaurant {
        Restaurant {
            id,
            name: self.name,
            address: self.address,
        }
    }
}

impl NewPizza {
    pub fn into_pizza(self, id: i64) -> Pizza {
        Pizza {
            id,
            name: self.name,
            ingredients: self.ingredients,
        }
    }
}

impl NewRestaurantPizza {
    pub fn into_restaurant_pizza(self, id: i64) -> RestaurantPizza {
        RestaurantPizza {
            id,
            price: self.price,
            restaurant_id: self.restaurant_id,
            pizza_id: self.pizza_id,
        }
    }
}
