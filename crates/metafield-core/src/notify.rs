//! Change notifications
//!
//! Mutations emit fire-and-forget events. Sinks must not fail the request,
//! so [`NotificationSink::notify`] has no result.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::dto::MetaResponse;
use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaEventKind {
	Inserted,
	Updated,
	Deleted,
}

impl MetaEventKind {
	pub fn name(self) -> &'static str {
		match self {
			MetaEventKind::Inserted => "meta.inserted",
			MetaEventKind::Updated => "meta.updated",
			MetaEventKind::Deleted => "meta.deleted",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaEvent {
	pub kind: MetaEventKind,
	pub entity_type: EntityType,
	pub entity_id: EntityId,
	pub meta: MetaResponse,
}

pub trait NotificationSink: Send + Sync {
	fn notify(&self, event: &MetaEvent);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl NotificationSink for NullNotifier {
	fn notify(&self, _event: &MetaEvent) {}
}

/// Publishes events on a tokio broadcast channel
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
	tx: broadcast::Sender<MetaEvent>,
}

impl BroadcastNotifier {
	pub fn new(buffer_size: usize) -> Self {
		let (tx, _) = broadcast::channel(buffer_size.max(1));
		Self { tx }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<MetaEvent> {
		self.tx.subscribe()
	}

	pub fn subscriber_count(&self) -> usize {
		self.tx.receiver_count()
	}
}

impl Default for BroadcastNotifier {
	fn default() -> Self {
		Self::new(128)
	}
}

impl NotificationSink for BroadcastNotifier {
	fn notify(&self, event: &MetaEvent) {
		match self.tx.send(event.clone()) {
			Ok(n) => {
				debug!(event = event.kind.name(), subscribers = n, "Meta event broadcast");
			}
			Err(_) => {
				debug!(event = event.kind.name(), "No subscribers for meta event");
			}
		}
	}
}


// vim: ts=4
