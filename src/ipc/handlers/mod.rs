pub mod assignments;
pub mod auth;
pub mod backup;
pub mod chat;
pub mod clubs;
pub mod core;
pub mod dashboard;
pub mod questionnaires;
pub mod users;
