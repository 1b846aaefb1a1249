//! API 路由定義

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::api::{handlers, state::AppState};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        // 餐廳
        .route(
            "/restaurants",
            get(handlers::list_restaurants).post(handlers::create_restaurant),
        )
        .route(
            "/restaurants/:id",
            get(handlers::get_restaurant).delete(handlers::delete_restaurant),
        )
        // 披薩
        .route(
            "/pizzas",
            get(handlers::list_pizzas).post(handlers::create_pizza),
        )
        .route("/pizzas/:id", delete(handlers::delete_pizza))
        // 價格
        .route(
            "/restaurant_pizzas",
            post(handlers::create_restaurant_pizza),
        )
}

/// 完整的應用程式 router，含請求追蹤
pub fn app(state: AppState) -> Router {
    api_routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
