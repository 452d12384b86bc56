pub mod engine;
pub mod handlers;
pub mod identifier;
pub mod questions;
