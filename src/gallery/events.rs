//! Observer events.
//!
//! The controller broadcasts what changed so a view can re-render without
//! being coupled to the upload call itself.

use async_channel::{Receiver, Sender, TrySendError};
use uuid::Uuid;

use crate::state::{Notice, UploadStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum GalleryEvent {
    UploadStarted { task_id: Uuid, path: String },
    UploadProgress { task_id: Uuid, ratio: f64 },
    UploadFinished { task_id: Uuid, status: UploadStatus },
    /// The asset list was replaced, grew or shrank.
    AssetsChanged { count: usize },
    SelectionChanged { path: Option<String> },
    Notice(Notice),
}

/// Events a subscriber may fall behind by before new ones are dropped for it.
pub const EVENT_BUFFER: usize = 256;

/// Fan-out of events to any number of subscribers.
///
/// Each subscriber gets a bounded queue. A subscriber that stops draining
/// misses events until it catches up; one that hangs up is forgotten.
#[derive(Debug, Default)]
pub(crate) struct EventHub {
    subscribers: Vec<Sender<GalleryEvent>>,
}

impl EventHub {
    pub(crate) fn subscribe(&mut self) -> Receiver<GalleryEvent> {
        let (tx, rx) = async_channel::bounded(EVENT_BUFFER);
        self.subscribers.push(tx);
        rx
    }

    /// Deliver to every live subscriber, forgetting the ones that hung up.
    pub(crate) fn emit(&mut self, event: GalleryEvent) {
        self.subscribers
            .retain(|tx| match tx.try_send(event.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    tracing::debug!("Gallery event subscriber is full, dropping event");
                    true
                }
                Err(TrySendError::Closed(_)) => false,
            });
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
