//! Live queries over the store change feed
//!
//! A [`LiveQuery`] holds the latest projection of one collection and re-runs
//! it whenever the store reports a change there. Dropping the handle aborts
//! the background task. Callers re-scoping a query (new parent id, new
//! selection) drop the old handle first so a stale subscription can never
//! overwrite newer state.

use super::{Document, DocumentStore};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::warn;

/// A restartable, push-updated view over one collection
pub struct LiveQuery<T> {
	rx: watch::Receiver<Vec<T>>,
	task: JoinHandle<()>,
}

impl<T> LiveQuery<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	/// Take the initial snapshot and start following changes.
	///
	/// The change feed is subscribed before the initial read so no update can
	/// slip between snapshot and subscription.
	pub(crate) async fn start<F>(
		store: Arc<dyn DocumentStore>,
		collection: String,
		project: F,
	) -> Self
	where
		F: Fn(&[Document]) -> Vec<T> + Send + Sync + 'static,
	{
		let mut changes = store.changes();
		let initial = match store.list(&collection).await {
			Ok(docs) => project(&docs),
			Err(e) => {
				warn!("Initial snapshot of {} failed: {}", collection, e);
				Vec::new()
			}
		};
		let (tx, rx) = watch::channel(initial);

		let task = tokio::spawn(async move {
			loop {
				match changes.recv().await {
					Ok(change) if change.collection == collection => {}
					Ok(_) => continue,
					// Lagging is fine; the snapshot below reads everything
					Err(broadcast::error::RecvError::Lagged(_)) => {}
					Err(broadcast::error::RecvError::Closed) => break,
				}
				match store.list(&collection).await {
					Ok(docs) => {
						let next = project(&docs);
						tx.send_if_modified(|current| {
							if *current != next {
								*current = next;
								true
							} else {
								false
							}
						});
					}
					Err(e) => warn!("Live query refresh of {} failed: {}", collection, e),
				}
			}
		});

		Self { rx, task }
	}

	/// Latest query results
	pub fn current(&self) -> Vec<T> {
		self.rx.borrow().clone()
	}

	/// Wait until the results change
	pub async fn changed(&mut self) {
		let _ = self.rx.changed().await;
	}

	/// Watch handle for callers that want their own receiver
	pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
		self.rx.clone()
	}
}

impl<T> Drop for LiveQuery<T> {
	fn drop(&mut self) {
		self.task.abort();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::infrastructure::store::MemoryStore;
	use serde_json::json;

	#[tokio::test]
	async fn test_live_query_sees_initial_and_new_documents() {
		let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
		store.create("names", json!({"name": "b"})).await.unwrap();

		let mut live = LiveQuery::start(store.clone(), "names".to_string(), |docs| {
			let mut names: Vec<String> = docs
				.iter()
				.filter_map(|d| d.data["name"].as_str().map(String::from))
				.collect();
			names.sort();
			names
		})
		.await;

		assert_eq!(live.current(), vec!["b".to_string()]);

		store.create("names", json!({"name": "a"})).await.unwrap();
		live.changed().await;
		assert_eq!(live.current(), vec!["a".to_string(), "b".to_string()]);
	}

	#[tokio::test]
	async fn test_live_query_ignores_other_collections() {
		let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
		let live = LiveQuery::start(store.clone(), "names".to_string(), |docs| {
			docs.iter()
				.filter_map(|d| d.data["name"].as_str().map(String::from))
				.collect::<Vec<_>>()
		})
		.await;

		store.create("other", json!({"name": "x"})).await.unwrap();
		tokio::task::yield_now().await;
		assert!(live.current().is_empty());
	}
}
