use async_trait::async_trait;
use log::info;

use crate::base_style::{BaseStyle, StyleDocument};
use crate::config::BaseLayerConfig;
use crate::error::ParcelMapError;

/// Source of style documents.
#[async_trait]
pub trait StyleProvider: Send + Sync {
    /// Loads and parses the style document at `url`.
    async fn load(&self, url: &str) -> Result<StyleDocument, ParcelMapError>;
}

/// Downloads style documents over HTTP.
#[derive(Debug, Clone)]
pub struct UrlStyleProvider {
    http_client: reqwest::Client,
}

impl UrlStyleProvider {
    /// Creates a new provider.
    pub fn new() -> Result<Self, ParcelMapError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("parcel-map/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl StyleProvider for UrlStyleProvider {
    async fn load(&self, url: &str) -> Result<StyleDocument, ParcelMapError> {
        let response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            info!("Failed to load {url}: {}", response.status());
            return Err(ParcelMapError::Http(response.status().as_u16()));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Loads the style document of the background layer and selects the layers to apply.
pub async fn load_base_style(
    provider: &dyn StyleProvider,
    config: &BaseLayerConfig,
) -> Result<BaseStyle, ParcelMapError> {
    let document = provider.load(&config.style_url).await?;
    info!(
        "Loaded style {:?} with {} layers from {}",
        document.name,
        document.layers.len(),
        config.style_url
    );

    BaseStyle::from_config(document, config)
}
