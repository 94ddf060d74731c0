//! Event bus for decoupled communication
//!
//! Managers emit an event after every successful write. Consumers (UI glue,
//! notification surfaces) subscribe and react; the core never waits on them.

use crate::domain::taxonomy::TaxonomyLevel;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Catalog lifecycle events
#[derive(Debug, Clone)]
pub enum Event {
	/// Core has started
	CoreStarted,

	/// Core is shutting down
	CoreShutdown,

	/// A taxonomy node was created
	TaxonomyNodeAdded {
		level: TaxonomyLevel,
		id: Uuid,
		parent_id: Option<Uuid>,
		name: String,
	},

	/// A taxonomy node was renamed; the new name was fanned out into
	/// `products_updated` product documents
	TaxonomyNodeRenamed {
		level: TaxonomyLevel,
		id: Uuid,
		name: String,
		products_updated: usize,
	},

	/// A taxonomy node was soft-deleted
	TaxonomyNodeDeleted { level: TaxonomyLevel, id: Uuid },

	/// A product was created
	ProductCreated { id: Uuid, product_code: String },

	/// A supplier was created
	SupplierCreated { id: Uuid, company: String },

	/// A supplier was edited; its company name was fanned out into
	/// `products_updated` product documents
	SupplierUpdated { id: Uuid, products_updated: usize },

	/// A supplier was soft-deleted
	SupplierDeleted { id: Uuid },

	/// A bulk supplier upload finished
	SupplierUploadCompleted {
		inserted: usize,
		reactivated: usize,
		skipped: usize,
	},
}

/// Event bus for broadcasting events
pub struct EventBus {
	sender: broadcast::Sender<Event>,
}

impl EventBus {
	/// Create a new event bus with specified capacity
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Emit an event
	pub fn emit(&self, event: Event) {
		// Ignore send errors (no receivers)
		let _ = self.sender.send(event);
	}

	/// Subscribe to events
	pub fn subscribe(&self) -> broadcast::Receiver<Event> {
		self.sender.subscribe()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(1024)
	}
}
