// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use super::{Document, DocumentStore, Query};

/// Push-updated view of a collection query
pub struct CollectionSubscription {
    receiver: watch::Receiver<Vec<Document>>,
    handle: JoinHandle<()>,
}

impl CollectionSubscription {
    pub fn receiver(&self) -> watch::Receiver<Vec<Document>> {
        self.receiver.clone()
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

/// Subscribe to `collection` filtered by `query`.
///
/// The store is polled every `poll_interval`; receivers are only woken when the result set
/// changes. The poller stops once every receiver has been dropped. Failed reads are logged and the
/// last good result is kept.
pub fn subscribe_collection(
    store: Arc<dyn DocumentStore>,
    collection: impl Into<String>,
    query: Query,
    poll_interval: Duration,
) -> CollectionSubscription {
    let collection = collection.into();
    let (tx, rx) = watch::channel(Vec::new());

    let handle = tokio::spawn(async move {
        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if tx.is_closed() {
                debug!("All subscribers of {} are gone, stopping poller", collection);
                break;
            }

            match store.list(&collection, &query).await {
                Ok(docs) => {
                    tx.send_if_modified(|current| {
                        if *current == docs {
                            false
                        } else {
                            *current = docs;
                            true
                        }
                    });
                }
                Err(e) => warn!("Failed to refresh subscription on {}: {}", collection, e),
            }
        }
    });

    CollectionSubscription {
        receiver: rx,
        handle,
    }
}
