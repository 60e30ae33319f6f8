//! Remote catalog endpoint adapter.

pub mod client;
pub mod dto;

pub use client::{StoreApiClient, StoreApiConfig};
pub use dto::{RemoteCategory, RemoteImage, RemotePrices, RemoteProductRecord};
