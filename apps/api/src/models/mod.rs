pub mod learning_path;
pub mod quiz;
pub mod user;
pub mod video;
