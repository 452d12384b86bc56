pub mod client;
pub mod handlers;
pub mod query;
pub mod remote;
