use pizza_service::config::toml_config::SeedConfig;
use pizza_service::{api, AppState, ServiceConfig, SqliteGateway};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

/// 在隨機埠啟動伺服器，回傳 base url
async fn spawn_server(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, api::app(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_end_to_end_with_sqlite_store() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("app.db");

    let gateway = Arc::new(SqliteGateway::open(&db_path).unwrap());
    let base = spawn_server(AppState::new(gateway)).await;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(format!("{}/restaurants", base))
        .json(&json!({"name": "A", "address": "1 St"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created, json!({"id": 1, "name": "A", "address": "1 St"}));

    let response = client
        .post(format!("{}/pizzas", base))
        .json(&json!({"name": "Margherita", "ingredients": "Tomato,Cheese"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    // 價格超出範圍：400 且不寫入
    let response = client
        .post(format!("{}/restaurant_pizzas", base))
        .json(&json!({"price": 35, "pizza_id": 1, "restaurant_id": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"errors": ["validation errors"]}));

    for price in [12, 15] {
        let response = client
            .post(format!("{}/restaurant_pizzas", base))
            .json(&json!({"price": price, "pizza_id": 1, "restaurant_id": 1}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    let detail: Value = client
        .get(format!("{}/restaurants/1", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let nested = detail["restaurant_pizzas"].as_array().unwrap();
    assert_eq!(nested.len(), 2);
    // 第一筆失敗的請求沒有消耗 id
    assert_eq!(nested[0]["id"], json!(1));
    assert_eq!(nested[0]["price"], json!(12));
    assert_eq!(nested[1]["price"], json!(15));
    assert!(nested.iter().all(|entry| entry.get("restaurant").is_none()));

    let response = client
        .delete(format!("{}/restaurants/1", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
    assert!(response.text().await.unwrap().is_empty());

    let response = client
        .get(format!("{}/restaurants/1", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "Restaurant not found"}));

    let pizzas: Value = client
        .get(format!("{}/pizzas", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        pizzas,
        json!([{"id": 1, "name": "Margherita", "ingredients": "Tomato,Cheese"}])
    );
}

#[tokio::test]
async fn test_seeded_service_from_toml() {
    let toml_content = r#"
[database]
backend = "memory"

[[seed.restaurants]]
name = "Karen's Pizza Shack"
address = "address1"

[[seed.restaurants]]
name = "Sanjay's Pizza"
address = "address2"

[[seed.pizzas]]
name = "Emma"
ingredients = "Dough, Tomato Sauce, Cheese"

[[seed.restaurant_pizzas]]
restaurant = 2
pizza = 1
price = 9
"#;
    let config = ServiceConfig::from_toml_str(toml_content).unwrap();
    let gateway = pizza_service::open_gateway(&config.database).unwrap();
    let state = AppState::new(gateway);
    let seed: &SeedConfig = config.seed.as_ref().unwrap();
    assert_eq!(state.catalog.seed(seed).await.unwrap(), 4);

    let base = spawn_server(state).await;
    let restaurants: Value = reqwest::get(format!("{}/restaurants", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(restaurants.as_array().unwrap().len(), 2);

    let detail: Value = reqwest::get(format!("{}/restaurants/2", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["restaurant_pizzas"][0]["pizza"]["name"], json!("Emma"));
    assert_eq!(detail["restaurant_pizzas"][0]["price"], json!(9));
}
