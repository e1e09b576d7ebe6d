//! Opens a OneDrive disk against a mock Entra endpoint and prints the Graph address of a file
//! below the configured root.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use onedrive_disk::{
	cache::{MemoryCache, TokenCache},
	config::DiskConfig,
	disk::DriveDisk,
	provider::TokenProvider,
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
	let config: DiskConfig = serde_json::from_str(
		"{\"tenant_id\":\"demo-tenant\",\"client_id\":\"demo-client\",\
		 \"secret\":\"demo-secret\",\"root\":\"backups\",\"directory_type\":\"personal\"}",
	)?;
	let cache: Arc<dyn TokenCache> = Arc::new(MemoryCache::default());
	let provider = TokenProvider::new(cache, config.credentials())
		.with_authority(Url::parse(&server.base_url())?);
	let disk = DriveDisk::from_provider(config, provider).await?;

	println!("Disk opened for directory type: {}.", disk.client().directory_type());
	println!("Item address: {}.", disk.client().item_url("reports/2025.csv")?);

	token_mock.assert_async().await;

	Ok(())
}
