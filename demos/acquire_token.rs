//! Demonstrates acquiring and reusing a cached client-credentials token against a mock
//! Entra endpoint.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use onedrive_disk::{
	cache::{MemoryCache, TokenCache},
	config::Credentials,
	provider::{AcquireRequest, TokenProvider},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/demo-tenant/oauth2/v2.0/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let cache: Arc<dyn TokenCache> = Arc::new(MemoryCache::default());
	let credentials = Credentials::new("demo-tenant", "demo-client", "demo-secret")?;
	let provider =
		TokenProvider::new(cache, credentials).with_authority(Url::parse(&server.base_url())?);
	let first = provider.acquire(AcquireRequest::default()).await?;
	let second = provider.acquire(AcquireRequest::default()).await?;

	assert_eq!(first.bearer(), second.bearer());

	println!("Reusable access token: {}.", first.bearer());
	println!("Cache hits so far: {}.", provider.acquire_metrics.cache_hits());

	token_mock.assert_async().await;

	Ok(())
}
