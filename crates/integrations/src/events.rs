use async_trait::async_trait;
use shared::protocol::LpaEvent;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::EventClient;

/// Publishes events on an in-process broadcast channel. Subscribers (a bus
/// forwarder, tests) attach with [`BroadcastEventClient::subscribe`].
#[derive(Clone)]
pub struct BroadcastEventClient {
    events: broadcast::Sender<LpaEvent>,
}

impl BroadcastEventClient {
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self { events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LpaEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl EventClient for BroadcastEventClient {
    async fn send(&self, event: LpaEvent) -> anyhow::Result<()> {
        info!(?event, "publishing lpa event");
        if self.events.send(event).is_err() {
            debug!("no event subscribers attached");
        }
        Ok(())
    }
}
