//! Strongly typed credential identifiers validated at the configuration boundary.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, CredentialError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = CredentialError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = CredentialError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when credential validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum CredentialError {
	/// The credential value was empty.
	#[error("{kind} credential must not be empty.")]
	Empty {
		/// Kind of credential (tenant, client, client secret).
		kind: &'static str,
	},
	/// The credential contains whitespace characters.
	#[error("{kind} credential contains whitespace.")]
	ContainsWhitespace {
		/// Kind of credential (tenant, client, client secret).
		kind: &'static str,
	},
	/// The credential contains a character that would corrupt the token endpoint URL.
	#[error("{kind} credential contains the reserved character {character:?}.")]
	ReservedCharacter {
		/// Kind of credential (tenant, client, client secret).
		kind: &'static str,
		/// Offending character.
		character: char,
	},
	/// The credential exceeded the allowed character count.
	#[error("{kind} credential exceeds {max} characters.")]
	TooLong {
		/// Kind of credential (tenant, client, client secret).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { TenantId, "Entra tenant identifier (GUID or verified domain).", "Tenant" }
def_id! { ClientId, "Application (client) identifier of a service principal.", "Client" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), CredentialError> {
	if view.is_empty() {
		return Err(CredentialError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(CredentialError::ContainsWhitespace { kind });
	}
	// Identifiers are spliced into the token endpoint path.
	if let Some(character) = view.chars().find(|c| matches!(c, '/' | '?' | '#')) {
		return Err(CredentialError::ReservedCharacter { kind, character });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(CredentialError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
