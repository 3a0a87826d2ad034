//! App state and builder - constructs and runs the metafield server

use std::sync::Arc;

use metafield_core::notify::{BroadcastNotifier, MetaEvent};
use metafield_core::perm::PermissionEngine;
use metafield_core::registry::{FrozenMetaKeyRegistry, MetaKeyRegistry};
use metafield_core::service::MetaResourceService;
use metafield_types::entity_adapter::{EntityAdapter, EntityDirectory};
use metafield_types::meta_store::MetaStore;

use crate::prelude::*;
use crate::routes;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	/// Prefix of the links in responses, empty for relative links
	pub base_url: Box<str>,
	pub jwt_secret: Box<str>,
	/// Events buffered per notification subscriber
	pub notify_buffer: usize,
}

pub struct AppState {
	pub opts: AppBuilderOpts,
	pub service: MetaResourceService,
	pub notifier: Arc<BroadcastNotifier>,
}

impl AppState {
	pub fn registry(&self) -> &FrozenMetaKeyRegistry {
		self.service.registry()
	}

	/// Receive meta.inserted / meta.updated / meta.deleted events
	pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<MetaEvent> {
		self.notifier.subscribe()
	}
}

pub type App = Arc<AppState>;

pub struct AppBuilder {
	opts: AppBuilderOpts,
	meta_store: Option<Arc<dyn MetaStore>>,
	entity_directory: Option<Arc<dyn EntityDirectory>>,
	entity_adapters: Vec<Arc<dyn EntityAdapter>>,
	registry: MetaKeyRegistry,
}

impl AppBuilder {
	pub fn new() -> Self {
		// Ignore the error when a subscriber is already installed
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();

		AppBuilder {
			opts: AppBuilderOpts {
				listen: "127.0.0.1:8080".into(),
				base_url: "".into(),
				jwt_secret: "".into(),
				notify_buffer: 128,
			},
			meta_store: None,
			entity_directory: None,
			entity_adapters: Vec::new(),
			registry: MetaKeyRegistry::new(),
		}
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}

	pub fn base_url(&mut self, base_url: impl Into<Box<str>>) -> &mut Self {
		self.opts.base_url = base_url.into();
		self
	}

	pub fn jwt_secret(&mut self, jwt_secret: impl Into<Box<str>>) -> &mut Self {
		self.opts.jwt_secret = jwt_secret.into();
		self
	}

	pub fn notify_buffer(&mut self, notify_buffer: usize) -> &mut Self {
		self.opts.notify_buffer = notify_buffer;
		self
	}

	// Adapters
	pub fn meta_store(&mut self, meta_store: Arc<dyn MetaStore>) -> &mut Self {
		self.meta_store = Some(meta_store);
		self
	}

	pub fn entity_directory(&mut self, entity_directory: Arc<dyn EntityDirectory>) -> &mut Self {
		self.entity_directory = Some(entity_directory);
		self
	}

	/// Replace the built-in adapter of one entity type
	pub fn entity_adapter(&mut self, adapter: Arc<dyn EntityAdapter>) -> &mut Self {
		self.entity_adapters.push(adapter);
		self
	}

	/// Registry to populate before the app is built
	pub fn registry_mut(&mut self) -> &mut MetaKeyRegistry {
		&mut self.registry
	}

	pub fn registry(&mut self, registry: MetaKeyRegistry) -> &mut Self {
		self.registry = registry;
		self
	}

	pub fn build(self) -> MfResult<App> {
		let Some(meta_store) = self.meta_store else {
			error!("FATAL: No meta store configured");
			return Err(Error::Internal("No meta store configured".to_string()));
		};
		let Some(entity_directory) = self.entity_directory else {
			error!("FATAL: No entity directory configured");
			return Err(Error::Internal("No entity directory configured".to_string()));
		};
		if self.opts.jwt_secret.is_empty() {
			error!("FATAL: No JWT secret configured");
			return Err(Error::ConfigError("No JWT secret configured".to_string()));
		}

		info!("Registered {} meta keys", self.registry.len());
		let registry = Arc::new(self.registry.freeze());

		let mut perm = PermissionEngine::with_directory(&entity_directory);
		for adapter in self.entity_adapters {
			perm.register_adapter(adapter);
		}

		let notifier = Arc::new(BroadcastNotifier::new(self.opts.notify_buffer));
		let service = MetaResourceService::new(registry, meta_store, perm, notifier.clone())
			.with_base_url(&self.opts.base_url);

		Ok(Arc::new(AppState { opts: self.opts, service, notifier }))
	}

	pub async fn run(self) -> MfResult<()> {
		info!("metafield V{}", VERSION);

		let app = self.build()?;
		let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await.map_err(|err| {
			error!("FATAL: Cannot listen on {}: {}", app.opts.listen, err);
			Error::Io(err)
		})?;
		info!("Listening on {}", app.opts.listen);

		let router = routes::init(app);
		axum::serve(listener, router).await?;
		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
