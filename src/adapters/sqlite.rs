use crate::domain::model::{
    EntityKind, MenuEntry, NewPizza, NewRestaurant, NewRestaurantPizza, Pizza, Restaurant,
    RestaurantPizza,
};
use crate::domain::ports::Gateway;
use crate::domain::schema::declare_schema;
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const IN_MEMORY: &str = ":memory:";

/// 以 SQLite 為後端的 Gateway
///
/// 連線開啟時啟用外鍵並依 `declare_schema()` 建表；所有寫入都包在交易中。
/// rusqlite 是同步 API，每個操作都在 `spawn_blocking` 執行緒上持鎖執行。
#[derive(Clone)]
pub struct SqliteGateway {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteGateway {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = if path.as_os_str() == IN_MEMORY {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Connection::open(path)?
        };
        tracing::debug!("Opened SQLite database at {}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        // SQLite 預設不檢查外鍵，必須每條連線開啟
        conn.pragma_update(None, "foreign_keys", "ON")?;
        for statement in declare_schema().ddl() {
            conn.execute(&statement, [])?;
        }
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 在 blocking 執行緒上取得連線並執行 `op`
    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| ServiceError::BlockingTaskError {
                message: "sqlite connection lock poisoned".to_string(),
            })?;
            op(&mut *guard)
        })
        .await
        .map_err(|join_err| ServiceError::BlockingTaskError {
            message: format!("sqlite worker cancelled: {join_err}"),
        })?
    }
}

fn restaurant_from_row(row: &Row<'_>) -> rusqlite::Result<Restaurant> {
    Ok(Restaurant {
        id: row.get("id")?,
        name: row.get("name")?,
        address: row.get("address")?,
    })
}

fn pizza_from_row(row: &Row<'_>) -> rusqlite::Result<Pizza> {
    Ok(Pizza {
        id: row.get("id")?,
        name: row.get("name")?,
        ingredients: row.get("ingredients")?,
    })
}

fn restaurant_pizza_from_row(row: &Row<'_>) -> rusqlite::Result<RestaurantPizza> {
    Ok(RestaurantPizza {
        id: row.get("id")?,
        price: row.get("price")?,
        restaurant_id: row.get("restaurant_id")?,
        pizza_id: row.get("pizza_id")?,
    })
}

/// LEFT JOIN 的一列；pizza 欄位為 NULL 表示關聯懸空
fn menu_row(row: &Row<'_>) -> rusqlite::Result<(RestaurantPizza, Option<Pizza>)> {
    let restaurant_pizza = restaurant_pizza_from_row(row)?;
    let pizza_id: Option<i64> = row.get("p_id")?;
    let pizza = match pizza_id {
        Some(id) => Some(Pizza {
            id,
            name: row.get("p_name")?,
            ingredients: row.get("p_ingredients")?,
        }),
        None => None,
    };
    Ok((restaurant_pizza, pizza))
}

/// 把約束違反轉成 IntegrityError，其餘保留為 StorageError
fn map_constraint(err: rusqlite::Error) -> ServiceError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            ServiceError::integrity(
                message
                    .clone()
                    .unwrap_or_else(|| "constraint violation".to_string()),
            )
        }
        _ => ServiceError::StorageError(err),
    }
}

#[async_trait]
impl Gateway for SqliteGateway {
    async fn find_restaurant(&self, id: i64) -> Result<Option<Restaurant>> {
        self.run(move |conn| {
            Ok(conn
                .query_row(
                    "SELECT id, name, address FROM restaurants WHERE id = ?1",
                    params![id],
                    restaurant_from_row,
                )
                .optional()?)
        })
        .await
    }

    async fn find_pizza(&self, id: i64) -> Result<Option<Pizza>> {
        self.run(move |conn| {
            Ok(conn
                .query_row(
                    "SELECT id, name, ingredients FROM pizzas WHERE id = ?1",
                    params![id],
                    pizza_from_row,
                )
                .optional()?)
        })
        .await
    }

    async fn find_restaurant_pizza(&self, id: i64) -> Result<Option<RestaurantPizza>> {
        self.run(move |conn| {
            Ok(conn
                .query_row(
                    "SELECT id, price, restaurant_id, pizza_id FROM restaurant_pizzas WHERE id = ?1",
                    params![id],
                    restaurant_pizza_from_row,
                )
                .optional()?)
        })
        .await
    }

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>> {
        self.run(|conn| {
            let mut stmt = conn.prepare("SELECT id, name, address FROM restaurants ORDER BY id")?;
            let rows = stmt.query_map([], restaurant_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn list_pizzas(&self) -> Result<Vec<Pizza>> {
        self.run(|conn| {
            let mut stmt = conn.prepare("SELECT id, name, ingredients FROM pizzas ORDER BY id")?;
            let rows = stmt.query_map([], pizza_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn find_related(&self, owner: EntityKind, id: i64) -> Result<Vec<RestaurantPizza>> {
        let relation = declare_schema()
            .dependents_of(owner)
            .next()
            .ok_or_else(|| {
                ServiceError::integrity(format!("{} owns no related rows", owner.display_name()))
            })?;

        let sql = format!(
            "SELECT id, price, restaurant_id, pizza_id FROM {} WHERE {} = ?1 ORDER BY id",
            relation.child.table_name(),
            relation.foreign_key
        );
        self.run(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![id], restaurant_pizza_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn find_restaurant_with_menu(
        &self,
        id: i64,
    ) -> Result<Option<(Restaurant, Vec<MenuEntry>)>> {
        self.run(move |conn| {
            // 讀取交易：餐廳與菜單來自同一個快照
            let tx = conn.transaction()?;
            let Some(restaurant) = tx
                .query_row(
                    "SELECT id, name, address FROM restaurants WHERE id = ?1",
                    params![id],
                    restaurant_from_row,
                )
                .optional()?
            else {
                return Ok(None);
            };

            let rows = {
                let mut stmt = tx.prepare(
                    "SELECT rp.id, rp.price, rp.restaurant_id, rp.pizza_id, \
                            p.id AS p_id, p.name AS p_name, p.ingredients AS p_ingredients \
                     FROM restaurant_pizzas rp LEFT JOIN pizzas p ON p.id = rp.pizza_id \
                     WHERE rp.restaurant_id = ?1 ORDER BY rp.id",
                )?;
                let rows = stmt.query_map(params![id], menu_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            };
            tx.commit()?;

            let menu = rows
                .into_iter()
                .map(|(restaurant_pizza, pizza)| match pizza {
                    Some(pizza) => Ok(MenuEntry {
                        restaurant_pizza,
                        pizza,
                    }),
                    None => Err(ServiceError::InconsistentData {
                        message: format!(
                            "restaurant_pizza {} references missing pizza {}",
                            restaurant_pizza.id, restaurant_pizza.pizza_id
                        ),
                    }),
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(Some((restaurant, menu)))
        })
        .await
    }

    async fn insert_restaurant(&self, new: NewRestaurant) -> Result<Restaurant> {
        self.run(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO restaurants (name, address) VALUES (?1, ?2)",
                params![new.name, new.address],
            )
            .map_err(map_constraint)?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(new.into_restaurant(id))
        })
        .await
    }

    async fn insert_pizza(&self, new: NewPizza) -> Result<Pizza> {
        self.run(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO pizzas (name, ingredients) VALUES (?1, ?2)",
                params![new.name, new.ingredients],
            )
            .map_err(map_constraint)?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(new.into_pizza(id))
        })
        .await
    }

    async fn insert_restaurant_pizza(&self, new: NewRestaurantPizza) -> Result<RestaurantPizza> {
        self.run(move |conn| {
            let tx = conn.transaction()?;
            // 交易在 drop 時回滾，失敗不會留下資料
            tx.execute(
                "INSERT INTO restaurant_pizzas (price, restaurant_id, pizza_id) VALUES (?1, ?2, ?3)",
                params![new.price, new.restaurant_id, new.pizza_id],
            )
            .map_err(map_constraint)?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(new.into_restaurant_pizza(id))
        })
        .await
    }

    async fn delete_restaurant(&self, id: i64) -> Result<bool> {
        self.run(move |conn| delete_with_dependents(conn, EntityKind::Restaurant, id))
            .await
    }

    async fn delete_pizza(&self, id: i64) -> Result<bool> {
        self.run(move |conn| delete_with_dependents(conn, EntityKind::Pizza, id))
            .await
    }

    async fn count(&self, kind: EntityKind) -> Result<usize> {
        self.run(move |conn| {
            let sql = format!("SELECT COUNT(*) FROM {}", kind.table_name());
            let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}

/// 先刪子資料再刪父資料，全部在同一個交易中完成；
/// 不依賴 ON DELETE CASCADE 是否生效 (例如外鍵被關閉的舊資料庫)
fn delete_with_dependents(conn: &mut Connection, kind: EntityKind, id: i64) -> Result<bool> {
    let tx = conn.transaction()?;

    let mut removed = 0;
    for relation in declare_schema().dependents_of(kind) {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1",
            relation.child.table_name(),
            relation.foreign_key
        );
        removed += tx.execute(&sql, params![id])?;
    }

    let sql = format!("DELETE FROM {} WHERE id = ?1", kind.table_name());
    let deleted = tx.execute(&sql, params![id])?;
    if deleted == 0 {
        // 父資料不存在時不應刪除任何東西；drop 會回滾
        return Ok(false);
    }

    tx.commit()?;
    tracing::debug!(
        "Deleted {} {} and {} dependent rows",
        kind.display_name(),
        id,
        removed
    );
    Ok(true)
}
