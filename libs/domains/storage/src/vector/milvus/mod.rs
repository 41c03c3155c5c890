pub mod client;
pub mod config;

pub use client::MilvusClient;
pub use config::MilvusConfig;
