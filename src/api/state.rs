use crate::core::catalog::Catalog;
use crate::domain::ports::Gateway;
use std::sync::Arc;

/// 所有 handler 共用的狀態
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
}

impl AppState {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            catalog: Catalog::new(gateway),
        }
    }
}
