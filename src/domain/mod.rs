// Domain layer: entities, schema, views and the storage port.

pub mod model;
pub mod ports;
pub mod schema;
pub mod views;
