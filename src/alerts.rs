use std::sync::Arc;

use tracing::trace;

use crate::error::PublishError;

/// Destination for alert messages.
///
/// `publish` hands the message to the transport and returns without waiting for
/// delivery. Implementations decide how delivery failures surface; an `Err`
/// here only means the message was not accepted.
pub trait AlertSink: Send + Sync {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError>;
}

impl<T: AlertSink + ?Sized> AlertSink for Arc<T> {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        (**self).publish(topic, payload)
    }
}

impl<T: AlertSink + ?Sized> AlertSink for Box<T> {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        (**self).publish(topic, payload)
    }
}

/// Sink used when no broker is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl AlertSink for NoopSink {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        trace!("no broker configured, dropping alert for {topic}: {payload}");
        Ok(())
    }
}
