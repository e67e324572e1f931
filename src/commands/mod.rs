pub mod classifier;
pub mod health;
