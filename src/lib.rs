pub mod catalog;
pub mod collection;
pub mod config;
pub mod events;
pub mod session;
pub mod settings;
pub mod storage;
pub mod user_data;
