//! Broadcast channel for application events.

use pizza_types::AppEvent;
use tokio::sync::broadcast;

/// Fan-out of [`AppEvent`]s to any number of subscribers.
///
/// Publishing never blocks. Slow subscribers lag and skip events rather than
/// holding up the loop.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
		self.sender.subscribe()
	}

	/// Sends to current subscribers. Errors only when there are none.
	pub fn publish(&self, event: AppEvent) -> Result<usize, broadcast::error::SendError<AppEvent>> {
		self.sender.send(event)
	}
}
