mod client;
mod error;
mod manifest;

pub use client::BungieHttpClient;
pub use error::BungieClientError;
pub use manifest::ManifestDownloader;

#[cfg(test)]
mod testing;
