//! Thin factory turning a validated [`DiskConfig`] into an authenticated Graph drive client.
//!
//! The factory is pure composition: it runs the token provider and only constructs the client
//! once acquisition has succeeded, so a registration with bad credentials or an unreachable
//! token endpoint fails outright instead of producing a half-wired disk. The actual file
//! operations (read/write/list/delete) belong to the host application's drive adapter, which
//! consumes [`GraphDriveClient`] for addressing and authorization.

// self
use crate::{
	_prelude::*,
	auth::{CachedToken, TokenSecret},
	cache::TokenCache,
	config::DiskConfig,
	error::ConfigError,
	http::TokenHttpClient,
	provider::{AcquireRequest, TokenProvider},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Microsoft Graph REST root for drive calls. The trailing slash keeps joins relative.
pub const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0/";

/// Authenticated handle the host's drive adapter issues requests through.
#[derive(Clone, Debug)]
pub struct GraphDriveClient {
	bearer: TokenSecret,
	base: Url,
	root: String,
	directory_type: String,
}
impl GraphDriveClient {
	fn new(
		bearer: TokenSecret,
		root: String,
		directory_type: String,
	) -> Result<Self, ConfigError> {
		let base =
			Url::parse(GRAPH_BASE_URL).map_err(|source| ConfigError::InvalidEndpoint { source })?;

		Ok(Self { bearer, base, root, directory_type })
	}

	/// Current bearer secret. Callers must avoid logging it.
	pub fn bearer(&self) -> &TokenSecret {
		&self.bearer
	}

	/// Ready-to-send `Authorization` header value.
	pub fn authorization_header(&self) -> String {
		format!("Bearer {}", self.bearer.expose())
	}

	/// Drive-relative root the disk is anchored to.
	pub fn root(&self) -> &str {
		&self.root
	}

	/// Directory flavor the host configured; forwarded unvalidated.
	pub fn directory_type(&self) -> &str {
		&self.directory_type
	}

	/// Graph item address for a path below the configured root.
	pub fn item_url(&self, path: &str) -> Result<Url, ConfigError> {
		let root = self.root.trim_matches('/');
		let path = path.trim_matches('/');
		let location = match (root.is_empty(), path.is_empty()) {
			(true, true) => "me/drive/root".to_owned(),
			(true, false) => format!("me/drive/root:/{path}:"),
			(false, true) => format!("me/drive/root:/{root}:"),
			(false, false) => format!("me/drive/root:/{root}/{path}:"),
		};

		self.base.join(&location).map_err(|source| ConfigError::InvalidEndpoint { source })
	}
}

/// An opened disk: the authenticated client plus the provider that keeps it authenticated.
pub struct DriveDisk<C>
where
	C: ?Sized + TokenHttpClient,
{
	client: GraphDriveClient,
	provider: TokenProvider<C>,
}
impl<C> DriveDisk<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Opens a disk with a caller-provided transport.
	pub async fn open_with_http_client(
		config: DiskConfig,
		cache: Arc<dyn TokenCache>,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		let provider = TokenProvider::with_http_client(cache, config.credentials(), http_client);

		Self::from_provider(config, provider).await
	}

	/// Opens a disk with an already-assembled provider (custom cache key, authority, etc.).
	pub async fn from_provider(config: DiskConfig, provider: TokenProvider<C>) -> Result<Self> {
		let CachedToken { token, .. } = provider.acquire(AcquireRequest::default()).await?;
		let client = GraphDriveClient::new(token, config.root, config.directory_type)?;

		Ok(Self { client, provider })
	}

	/// The authenticated drive client.
	pub fn client(&self) -> &GraphDriveClient {
		&self.client
	}

	/// The provider backing this disk.
	pub fn provider(&self) -> &TokenProvider<C> {
		&self.provider
	}

	/// Re-runs acquisition and swaps in the (possibly refreshed) bearer.
	pub async fn renew(&mut self) -> Result<()> {
		let CachedToken { token, .. } = self.provider.acquire(AcquireRequest::default()).await?;

		self.client.bearer = token;

		Ok(())
	}
}
#[cfg(feature = "reqwest")]
impl DriveDisk<ReqwestHttpClient> {
	/// Opens a disk backed by the crate's default reqwest transport.
	pub async fn open(config: DiskConfig, cache: Arc<dyn TokenCache>) -> Result<Self> {
		Self::open_with_http_client(config, cache, ReqwestHttpClient::default()).await
	}
}
impl<C> Debug for DriveDisk<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DriveDisk").field("client", &self.client).finish()
	}
}
