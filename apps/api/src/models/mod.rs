pub mod history;
pub mod quiz;
pub mod skill_path;
pub mod tracking;
pub mod user;
