//! Domain entities, value objects and pure business rules.

pub mod category;
pub mod score;
pub mod trainer_data;
pub mod types;
