pub mod config;
pub mod error;
pub mod event;
pub mod indicator;
pub mod kalshi;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod order_manager;
pub mod runtime;
pub mod strategy;
pub mod tick_store;
