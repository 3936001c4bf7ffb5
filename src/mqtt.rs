//! MQTT transport for alerts
//!
//! [`MqttSink`] only enqueues messages on the client's request channel. The
//! network side lives in an event loop task owned by [`MqttConnection`], which
//! reports connection, acknowledgement and disconnect events through `tracing`.
//!
//! ```text
//! HealthChecker ── publish ──> MqttSink ── try_publish ──> request channel
//!                                                               │
//!                                   MqttConnection task <──────┘
//!                                   (poll, ConnAck, PubAck, Disconnect)
//! ```
//!
//! Reconnection is not attempted: the first connection error ends the loop and
//! every later publish fails with [`PublishError::NotConnected`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS, Transport};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::{alerts::AlertSink, config::MqttConfig, error::PublishError};

/// Capacity of the client's request channel
const REQUEST_CAPACITY: usize = 64;

/// How often `shutdown` checks for outstanding acknowledgements
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Default)]
struct ConnectionState {
    stopped: AtomicBool,
    /// QoS 1 publishes not yet acknowledged by the broker
    in_flight: AtomicUsize,
}

pub fn options(config: &MqttConfig) -> MqttOptions {
    let mut options = MqttOptions::new(&config.client_id, &config.server, config.port);
    options.set_keep_alive(Duration::from_secs(config.keep_alive));

    if let Some((username, password)) = config.credentials() {
        options.set_credentials(username, password);
    }

    if config.tls {
        options.set_transport(Transport::tls_with_default_config());
    }

    options
}

/// Publishes alerts with QoS 1 without waiting for delivery
#[derive(Clone)]
pub struct MqttSink {
    client: AsyncClient,
    state: Arc<ConnectionState>,
}

impl MqttSink {
    /// Create the client and spawn its event loop on the current tokio runtime.
    pub fn connect(config: &MqttConfig) -> (MqttSink, MqttConnection) {
        let (client, eventloop) = AsyncClient::new(options(config), REQUEST_CAPACITY);
        let state = Arc::new(ConnectionState::default());

        debug!("connecting to {}:{}", config.server, config.port);
        let task = tokio::spawn(drive(eventloop, state.clone()));

        let sink = MqttSink {
            client: client.clone(),
            state: state.clone(),
        };
        let connection = MqttConnection {
            client,
            state,
            task,
        };

        (sink, connection)
    }
}

impl AlertSink for MqttSink {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        if self.state.stopped.load(Ordering::SeqCst) {
            return Err(PublishError::NotConnected);
        }

        self.client
            .try_publish(topic, QoS::AtLeastOnce, false, payload.as_bytes().to_vec())
            .map_err(|e| {
                // the event loop drops the request channel only after marking itself stopped
                if self.state.stopped.load(Ordering::SeqCst) {
                    PublishError::NotConnected
                } else {
                    PublishError::Rejected(e.to_string())
                }
            })?;

        self.state.in_flight.fetch_add(1, Ordering::SeqCst);
        trace!("queued alert for {topic}");
        Ok(())
    }
}

/// Owns the event loop task of an [`MqttSink`]
pub struct MqttConnection {
    client: AsyncClient,
    state: Arc<ConnectionState>,
    task: JoinHandle<()>,
}

impl MqttConnection {
    pub fn is_running(&self) -> bool {
        !self.state.stopped.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    /// Wait up to `grace` for outstanding acknowledgements, then disconnect.
    #[instrument(skip(self))]
    pub async fn shutdown(self, grace: Duration) {
        let drained = tokio::time::timeout(grace, async {
            while self.is_running() && self.in_flight() > 0 {
                tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
            }
        })
        .await;

        if drained.is_err() {
            warn!("{} alert(s) unacknowledged at shutdown", self.in_flight());
        }

        if self.is_running() {
            if let Err(e) = self.client.disconnect().await {
                warn!("failed to request disconnect: {e}");
            }
        }

        match tokio::time::timeout(grace, self.task).await {
            Ok(Ok(())) => trace!("event loop finished"),
            Ok(Err(e)) => error!("event loop task failed: {e}"),
            Err(_) => warn!("event loop did not stop within {grace:?}"),
        }
    }
}

async fn drive(mut eventloop: EventLoop, state: Arc<ConnectionState>) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                info!("connected with result code {:?}", ack.code);
            }
            Ok(Event::Incoming(Packet::PubAck(ack))) => {
                let _ = state
                    .in_flight
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
                debug!("mid: {}", ack.pkid);
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                info!("disconnected by broker");
                break;
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                info!("disconnected");
                break;
            }
            Ok(event) => trace!("{event:?}"),
            Err(e) => {
                error!("connection error: {e}");
                break;
            }
        }
    }

    state.stopped.store(true, Ordering::SeqCst);
}
