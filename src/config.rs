//! Typed disk configuration validated once at construction.
//!
//! The host application's config file supplies `tenant_id`, `client_id`, `secret`, `root`, and
//! `directory_type` for each disk. Deserializing [`DiskConfig`] performs the credential
//! validation, so an invalid value surfaces as a fatal error before any network call.

// self
use crate::{
	_prelude::*,
	auth::{ClientId, CredentialError, TenantId, TokenSecret},
};

/// Validated service-principal credentials for the client-credentials grant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
	tenant_id: TenantId,
	client_id: ClientId,
	client_secret: ClientSecret,
}
impl Credentials {
	/// Validates and assembles the three credential fields.
	pub fn new(
		tenant_id: impl AsRef<str>,
		client_id: impl AsRef<str>,
		client_secret: impl Into<String>,
	) -> Result<Self, CredentialError> {
		Ok(Self {
			tenant_id: TenantId::new(tenant_id)?,
			client_id: ClientId::new(client_id)?,
			client_secret: ClientSecret::new(client_secret)?,
		})
	}

	/// Tenant the service principal lives in.
	pub fn tenant_id(&self) -> &TenantId {
		&self.tenant_id
	}

	/// Application (client) identifier.
	pub fn client_id(&self) -> &ClientId {
		&self.client_id
	}

	/// Client secret issued for the application registration.
	pub fn client_secret(&self) -> &ClientSecret {
		&self.client_secret
	}
}

/// Client secret wrapper that validates on construction and redacts in output.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct ClientSecret(TokenSecret);
impl ClientSecret {
	/// Validates and wraps a secret string.
	pub fn new(value: impl Into<String>) -> Result<Self, CredentialError> {
		let value = value.into();

		if value.is_empty() {
			return Err(CredentialError::Empty { kind: "Client secret" });
		}

		Ok(Self(TokenSecret::new(value)))
	}

	/// Returns the inner secret. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		self.0.expose()
	}
}
impl TryFrom<String> for ClientSecret {
	type Error = CredentialError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl Debug for ClientSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ClientSecret").field(&"<redacted>").finish()
	}
}
impl Display for ClientSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Per-disk configuration as the host application supplies it.
#[derive(Clone, Debug, Deserialize)]
pub struct DiskConfig {
	/// Entra tenant identifier.
	pub tenant_id: TenantId,
	/// Application (client) identifier.
	pub client_id: ClientId,
	/// Client secret for the application registration.
	pub secret: ClientSecret,
	/// Drive-relative root every storage operation is anchored to.
	pub root: String,
	/// Directory flavor forwarded to the drive adapter unvalidated.
	pub directory_type: String,
}
impl DiskConfig {
	/// Assembles the credential triple for the token provider.
	pub fn credentials(&self) -> Credentials {
		Credentials {
			tenant_id: self.tenant_id.clone(),
			client_id: self.client_id.clone(),
			client_secret: self.secret.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::{ConfigError, Error};

	#[test]
	fn credentials_reject_empty_fields() {
		assert!(matches!(
			Credentials::new("", "client-1", "secret-1"),
			Err(CredentialError::Empty { kind: "Tenant" })
		));
		assert!(matches!(
			Credentials::new("tenant-1", "", "secret-1"),
			Err(CredentialError::Empty { kind: "Client" })
		));
		assert!(matches!(
			Credentials::new("tenant-1", "client-1", ""),
			Err(CredentialError::Empty { kind: "Client secret" })
		));
	}

	#[test]
	fn credential_errors_surface_as_config_errors() {
		let err = Credentials::new("", "client-1", "secret-1")
			.map_err(ConfigError::from)
			.map_err(Error::from)
			.expect_err("Empty tenant must be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::Credential(_))));
		assert!(err.to_string().contains("Tenant"));
	}

	#[test]
	fn disk_config_deserializes_and_validates() {
		let config: DiskConfig = serde_json::from_str(
			"{\"tenant_id\":\"t1\",\"client_id\":\"c1\",\"secret\":\"s1\",\
			 \"root\":\"backups\",\"directory_type\":\"personal\"}",
		)
		.expect("Well-formed disk config should deserialize.");

		assert_eq!(config.credentials().tenant_id().as_ref(), "t1");
		assert_eq!(config.root, "backups");
		assert_eq!(config.directory_type, "personal");

		assert!(
			serde_json::from_str::<DiskConfig>(
				"{\"tenant_id\":\"t1\",\"client_id\":\"c1\",\"secret\":\"\",\
				 \"root\":\"\",\"directory_type\":\"personal\"}",
			)
			.is_err(),
			"Empty secrets must fail at the deserialization boundary."
		);
	}

	#[test]
	fn debug_output_redacts_the_secret() {
		let credentials = Credentials::new("tenant-1", "client-1", "hunter2")
			.expect("Credential fixture should be valid.");
		let rendered = format!("{credentials:?}");

		assert!(!rendered.contains("hunter2"));
		assert!(rendered.contains("<redacted>"));
	}
}
