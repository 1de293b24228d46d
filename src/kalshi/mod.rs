pub mod rest;
pub mod types;

pub use rest::KalshiRestClient;
