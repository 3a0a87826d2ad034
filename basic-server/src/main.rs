//! Standalone metafield server on a SQLite store.
//!
//! Configured from the environment:
//!
//! | Variable     | Default                 |
//! |--------------|-------------------------|
//! | `LISTEN`     | `127.0.0.1:8080`        |
//! | `DB_DIR`     | `./data`                |
//! | `BASE_URL`   | empty (relative links)  |
//! | `JWT_SECRET` | insecure dev secret     |
//! | `META_KEYS`  | `./meta-keys.yaml`      |
//! | `RUST_LOG`   | unset (errors only)     |

use std::{env, path::PathBuf, sync::Arc};

use metafield::AppBuilder;
use metafield::error::MfResult;
use metafield_core::config::KeyDefinitionFile;
use metafield_meta_store_sqlite::MetaStoreSqlite;
use tracing::{info, warn};

const DEV_SECRET: &str = "metafield-dev-secret";

pub struct Config {
	pub listen: String,
	pub db_dir: PathBuf,
	pub base_url: String,
	pub jwt_secret: Option<String>,
	pub meta_keys: PathBuf,
}

impl Config {
	fn from_env() -> Self {
		Config {
			listen: env::var("LISTEN").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
			db_dir: PathBuf::from(env::var("DB_DIR").unwrap_or_else(|_| "./data".to_string())),
			base_url: env::var("BASE_URL").unwrap_or_default(),
			jwt_secret: env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
			meta_keys: PathBuf::from(env::var("META_KEYS").unwrap_or_else(|_| "./meta-keys.yaml".to_string())),
		}
	}
}

#[tokio::main]
async fn main() -> MfResult<()> {
	let config = Config::from_env();

	// AppBuilder installs the tracing subscriber
	let mut builder = AppBuilder::new();

	let store = Arc::new(MetaStoreSqlite::new(&config.db_dir).await?);
	builder
		.listen(config.listen.as_str())
		.base_url(config.base_url.as_str())
		.meta_store(store.clone())
		.entity_directory(store);

	if let Some(secret) = &config.jwt_secret {
		builder.jwt_secret(secret.as_str());
	} else {
		warn!("JWT_SECRET is not set, using an insecure development secret");
		builder.jwt_secret(DEV_SECRET);
	}

	if config.meta_keys.exists() {
		KeyDefinitionFile::load(&config.meta_keys).await?.register_into(builder.registry_mut())?;
	} else {
		info!("No key definitions at {}, starting without meta keys", config.meta_keys.display());
	}

	builder.run().await
}

// vim: ts=4
