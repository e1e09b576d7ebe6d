//! Cached Microsoft Entra client-credentials tokens and authenticated Graph drive disks for
//! storage backends.
//!
//! The crate centers on [`provider::TokenProvider`], which returns a valid bearer token for a
//! service principal, reusing a cached one when unexpired and performing at most one token
//! exchange per refresh. [`disk::DriveDisk`] composes a validated configuration, the provider,
//! and a thin Graph drive client so host applications can register an authenticated disk and
//! delegate the actual file operations to their drive adapter.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod config;
pub mod disk;
pub mod error;
pub mod http;
pub mod obs;
pub mod provider;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
