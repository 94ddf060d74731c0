//! Catalog Core
//!
//! An embeddable inventory-catalog engine: a three-level classification tree
//! with rename cascades into denormalized product documents, supplier records
//! with bulk-upload reconciliation, and session-gated writes. Storage sits
//! behind the [`infrastructure::store::DocumentStore`] trait; the in-memory
//! backend is wired in by default.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod product;
pub mod session;
pub mod shared;
pub mod supplier;
pub mod taxonomy;
pub mod telemetry;

use crate::config::AppConfig;
use crate::infrastructure::events::{Event, EventBus};
use crate::infrastructure::store::{DocumentStore, MemoryStore};
use crate::product::ProductWriter;
use crate::session::{Session, SessionResolver, StaticResolver};
use crate::supplier::SupplierManager;
use crate::taxonomy::{SelectionState, TaxonomyManager};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// The main context for all catalog operations
pub struct Core {
	/// Application configuration
	config: Arc<RwLock<AppConfig>>,

	/// Document store backend
	pub store: Arc<dyn DocumentStore>,

	/// Event bus for state changes
	pub events: Arc<EventBus>,

	/// Signed-in user tracking; every write goes through it
	pub session: Arc<Session>,

	/// Classification tree
	pub taxonomy: Arc<TaxonomyManager>,

	/// Supplier records and bulk upload
	pub suppliers: Arc<SupplierManager>,

	/// Product creation
	pub products: Arc<ProductWriter>,
}

impl Core {
	/// Initialize a new Core instance with default data directory
	pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
		let data_dir = crate::config::default_data_dir()?;
		Self::new_with_config(data_dir).await
	}

	/// Initialize a new Core instance with custom data directory
	pub async fn new_with_config(data_dir: PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
		Self::new_with_resolver(data_dir, Arc::new(StaticResolver::new())).await
	}

	/// Initialize with a custom session resolver (the auth seam)
	pub async fn new_with_resolver(
		data_dir: PathBuf,
		resolver: Arc<dyn SessionResolver>,
	) -> Result<Self, Box<dyn std::error::Error>> {
		let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
		Self::new_with_store(data_dir, store, resolver).await
	}

	/// Initialize against an existing store backend
	pub async fn new_with_store(
		data_dir: PathBuf,
		store: Arc<dyn DocumentStore>,
		resolver: Arc<dyn SessionResolver>,
	) -> Result<Self, Box<dyn std::error::Error>> {
		info!("Initializing catalog core at {:?}", data_dir);

		// 1. Load or create app config
		let config = AppConfig::load_or_create(&data_dir)?;
		config.ensure_directories()?;

		// 2. Create event bus
		let events = Arc::new(EventBus::new(config.event_capacity));
		let config = Arc::new(RwLock::new(config));

		// 3. Session gate
		let session = Arc::new(Session::new(resolver));

		// 4. Managers over the shared store
		let taxonomy = Arc::new(TaxonomyManager::new(store.clone(), events.clone()));
		let suppliers = Arc::new(SupplierManager::new(store.clone(), events.clone()));
		let products = Arc::new(ProductWriter::new(store.clone(), events.clone()));

		// 5. Emit startup event
		events.emit(Event::CoreStarted);

		Ok(Self {
			config,
			store,
			events,
			session,
			taxonomy,
			suppliers,
			products,
		})
	}

	/// Get the application configuration
	pub fn config(&self) -> Arc<RwLock<AppConfig>> {
		self.config.clone()
	}

	/// Start a product-creation selection walk over the taxonomy
	pub async fn selection(&self) -> SelectionState {
		SelectionState::new(self.taxonomy.clone()).await
	}

	/// Shutdown the core gracefully
	pub async fn shutdown(&self) -> Result<(), Box<dyn std::error::Error>> {
		info!("Shutting down catalog core");
		self.events.emit(Event::CoreShutdown);
		self.config.read().await.save()?;
		Ok(())
	}
}
