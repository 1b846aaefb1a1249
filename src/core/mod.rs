pub mod catalog;

pub use crate::domain::model::{
    EntityKind, NewPizza, NewRestaurant, NewRestaurantPizza, Pizza, Restaurant, RestaurantPizza,
};
pub use crate::domain::ports::Gateway;
pub use crate::utils::error::Result;
