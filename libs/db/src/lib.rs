//! Database schema and enum types shared by all model crates

mod r#enum;
mod schema;

pub use r#enum::*;
pub use schema::*;
