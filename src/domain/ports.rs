use crate::domain::model::{
    EntityKind, MenuEntry, NewPizza, NewRestaurant, NewRestaurantPizza, Pizza, Restaurant,
    RestaurantPizza,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 儲存層介面；每個方法都是獨立的交易
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn find_restaurant(&self, id: i64) -> Result<Option<Restaurant>>;
    async fn find_pizza(&self, id: i64) -> Result<Option<Pizza>>;
    async fn find_restaurant_pizza(&self, id: i64) -> Result<Option<RestaurantPizza>>;

    /// 依建立順序回傳
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>>;
    async fn list_pizzas(&self) -> Result<Vec<Pizza>>;

    /// `owner` 為 Restaurant 或 Pizza，回傳其擁有的 RestaurantPizza (建立順序)
    async fn find_related(&self, owner: EntityKind, id: i64) -> Result<Vec<RestaurantPizza>>;

    /// 在同一個鎖或交易內讀出餐廳與每筆 RestaurantPizza 及其 Pizza (建立順序)；
    /// 關聯指向不存在的 pizza 時回傳 `InconsistentData`
    async fn find_restaurant_with_menu(
        &self,
        id: i64,
    ) -> Result<Option<(Restaurant, Vec<MenuEntry>)>>;

    async fn insert_restaurant(&self, new: NewRestaurant) -> Result<Restaurant>;
    async fn insert_pizza(&self, new: NewPizza) -> Result<Pizza>;

    /// 外鍵不存在或價格違反約束時回傳 `IntegrityError`，且不寫入任何資料
    async fn insert_restaurant_pizza(&self, new: NewRestaurantPizza) -> Result<RestaurantPizza>;

    /// 連同擁有的 RestaurantPizza 一起刪除；不存在時回傳 false
    async fn delete_restaurant(&self, id: i64) -> Result<bool>;
    async fn delete_pizza(&self, id: i64) -> Result<bool>;

    async fn count(&self, kind: EntityKind) -> Result<usize>;
}
