//! Live update hub: fan-out broadcasting to connected clients.
//!
//! # Responsibility
//! - Own the set of live subscriber channels.
//! - Serialize each change event once and deliver the same bytes to every
//!   subscriber.
//!
//! # Invariants
//! - Membership is mutated only by the coordinating thread; a broadcast
//!   always sees a consistent membership snapshot.
//! - Delivery to one subscriber never blocks or fails delivery to others;
//!   a subscriber whose delivery fails is evicted on the failed attempt.
//! - Broadcast faults never propagate to the caller that performed the
//!   mutation.

use log::{error, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Default per-subscriber event buffer depth.
///
/// A subscriber that falls this many events behind is considered stalled
/// and is evicted rather than allowed to block the fan-out loop.
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 64;

/// Stable identifier the hub assigns to each registered subscriber.
pub type SubscriberId = u64;

enum HubCommand {
    Register {
        id: SubscriberId,
        sink: SyncSender<Vec<u8>>,
    },
    Unregister {
        id: SubscriberId,
    },
    Broadcast {
        payload: Vec<u8>,
    },
}

/// Outbound event envelope: `{"type": ..., "data": ...}`.
#[derive(Serialize)]
struct UpdateEvent<'a, T: Serialize> {
    #[serde(rename = "type")]
    event_type: &'a str,
    data: &'a T,
}

/// Cloneable handle to the update hub.
///
/// All operations are safe to invoke concurrently from any number of
/// callers; they enqueue commands for the single coordinating thread that
/// exclusively owns the subscriber set. The thread exits once every handle
/// and subscription has been dropped.
#[derive(Clone)]
pub struct UpdateHub {
    commands: Sender<HubCommand>,
    next_subscriber_id: Arc<AtomicU64>,
}

impl UpdateHub {
    /// Starts the coordinating thread and returns a handle to it.
    pub fn spawn() -> std::io::Result<Self> {
        let (commands, inbox) = mpsc::channel();
        thread::Builder::new()
            .name("gsd-update-hub".to_string())
            .spawn(move || run_loop(inbox))?;
        Ok(Self {
            commands,
            next_subscriber_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Registers a new subscriber with the default buffer depth.
    pub fn subscribe(&self) -> Subscription {
        self.subscribe_with_buffer(DEFAULT_SUBSCRIBER_BUFFER)
    }

    /// Registers a new subscriber with an explicit buffer depth.
    ///
    /// Registration itself never fails. A depth of zero turns the channel
    /// into a rendezvous: deliveries only succeed while the subscriber is
    /// blocked in `recv`, which is rarely what a transport wants.
    pub fn subscribe_with_buffer(&self, buffer: usize) -> Subscription {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let (sink, events) = mpsc::sync_channel(buffer);
        let _ = self.commands.send(HubCommand::Register { id, sink });
        Subscription {
            id,
            events,
            commands: self.commands.clone(),
        }
    }

    /// Serializes `{"type": event_type, "data": data}` once and delivers
    /// the same bytes to every registered subscriber.
    ///
    /// Serialization failure is logged and the broadcast dropped; it never
    /// reaches the caller.
    pub fn broadcast<T: Serialize>(&self, event_type: &str, data: &T) {
        let envelope = UpdateEvent { event_type, data };
        match serde_json::to_vec(&envelope) {
            Ok(payload) => self.send_payload(payload),
            Err(err) => {
                error!(
                    "event=hub_broadcast module=hub status=error error_code=serialize_failed event_type={event_type} error={err}"
                );
            }
        }
    }

    /// Fans pre-serialized bytes out to every registered subscriber.
    ///
    /// Used by transports to echo client-originated messages verbatim.
    pub fn broadcast_raw(&self, payload: Vec<u8>) {
        self.send_payload(payload);
    }

    /// Removes and closes a subscriber by id. Unknown ids are a no-op.
    pub fn unsubscribe(&self, id: SubscriberId) {
        let _ = self.commands.send(HubCommand::Unregister { id });
    }

    fn send_payload(&self, payload: Vec<u8>) {
        if self
            .commands
            .send(HubCommand::Broadcast { payload })
            .is_err()
        {
            warn!("event=hub_broadcast module=hub status=error error_code=hub_stopped");
        }
    }
}

/// A registered subscriber's receiving end.
///
/// Dropping the subscription unregisters it; unregistering twice is a
/// no-op. A `None` from the receive methods means the channel is closed:
/// either the hub evicted this subscriber or the hub itself is gone.
pub struct Subscription {
    id: SubscriberId,
    events: Receiver<Vec<u8>>,
    commands: Sender<HubCommand>,
}

impl Subscription {
    /// Stable id of this subscriber within the hub.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Blocks until the next event payload arrives.
    pub fn recv(&self) -> Option<Vec<u8>> {
        self.events.recv().ok()
    }

    /// Blocks up to `timeout` for the next event payload.
    ///
    /// Returns `None` on timeout as well as on closure; use `recv` when the
    /// distinction matters for connection teardown.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Vec<u8>> {
        match self.events.recv_timeout(timeout) {
            Ok(payload) => Some(payload),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let _ = self.commands.send(HubCommand::Unregister { id: self.id });
    }
}

fn run_loop(inbox: Receiver<HubCommand>) {
    let mut subscribers: HashMap<SubscriberId, SyncSender<Vec<u8>>> = HashMap::new();

    while let Ok(command) = inbox.recv() {
        match command {
            HubCommand::Register { id, sink } => {
                subscribers.insert(id, sink);
                info!(
                    "event=hub_register module=hub status=ok subscriber_id={id} subscriber_count={}",
                    subscribers.len()
                );
            }
            HubCommand::Unregister { id } => {
                if subscribers.remove(&id).is_some() {
                    info!(
                        "event=hub_unregister module=hub status=ok subscriber_id={id} subscriber_count={}",
                        subscribers.len()
                    );
                }
            }
            HubCommand::Broadcast { payload } => {
                let mut evicted: Vec<SubscriberId> = Vec::new();
                for (id, sink) in &subscribers {
                    match sink.try_send(payload.clone()) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            warn!(
                                "event=hub_broadcast module=hub status=error error_code=subscriber_stalled subscriber_id={id}"
                            );
                            evicted.push(*id);
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            evicted.push(*id);
                        }
                    }
                }
                // Dropping the sink closes the subscriber's channel.
                for id in evicted {
                    subscribers.remove(&id);
                    info!(
                        "event=hub_evict module=hub status=ok subscriber_id={id} subscriber_count={}",
                        subscribers.len()
                    );
                }
            }
        }
    }
}
