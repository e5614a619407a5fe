pub mod health;
pub mod templates;
