// SPDX-License-Identifier: MIT OR Apache-2.0

//! RabbitMQ change-notification adapters.
//!
//! Writers publish change events to the `config.updates` fanout exchange;
//! every reader binds its own server-named queue to that exchange and
//! receives every event. Filtering by application identity happens in the
//! reader, not here.

use crate::domain::{ChangeEvent, ConfigError, Result};
use crate::ports::{ChangeNotifier, ChangeSubscriber};
use async_trait::async_trait;
use futures::StreamExt;
use lapin::options::{
    BasicConsumeOptions, BasicPublishOptions, ExchangeDeclareOptions, QueueBindOptions,
    QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use tokio::sync::mpsc;

/// The fanout exchange every configuration write publishes to.
pub const CONFIG_EXCHANGE: &str = "config.updates";

async fn open_channel(uri: &str) -> Result<(Connection, Channel)> {
    let connection = Connection::connect(uri, ConnectionProperties::default())
        .await
        .map_err(|e| ConfigError::transport_unavailable("cannot connect to RabbitMQ", e))?;
    let channel = connection
        .create_channel()
        .await
        .map_err(|e| ConfigError::transport_unavailable("cannot open RabbitMQ channel", e))?;
    channel
        .exchange_declare(
            CONFIG_EXCHANGE,
            ExchangeKind::Fanout,
            ExchangeDeclareOptions::default(),
            FieldTable::default(),
        )
        .await
        .map_err(|e| ConfigError::transport_unavailable("cannot declare fanout exchange", e))?;
    Ok((connection, channel))
}

/// Publish-side adapter used by the administrative surface.
///
/// # Examples
///
/// ```rust,no_run
/// use dynconfig::adapters::RabbitMqNotifier;
/// use dynconfig::domain::{ChangeAction, ChangeEvent};
/// use dynconfig::ports::ChangeNotifier;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let notifier = RabbitMqNotifier::connect("amqp://localhost:5672").await?;
/// let event = ChangeEvent::for_application("SERVICE-A", ChangeAction::Updated);
/// notifier.publish(&event).await?;
/// # Ok(())
/// # }
/// ```
pub struct RabbitMqNotifier {
    _connection: Connection,
    channel: Channel,
}

impl RabbitMqNotifier {
    /// Connects to the broker and declares the fanout exchange.
    pub async fn connect(uri: &str) -> Result<Self> {
        let (connection, channel) = open_channel(uri).await?;
        tracing::info!(exchange = CONFIG_EXCHANGE, "change notifier connected");
        Ok(RabbitMqNotifier {
            _connection: connection,
            channel,
        })
    }
}

#[async_trait]
impl ChangeNotifier for RabbitMqNotifier {
    async fn publish(&self, event: &ChangeEvent) -> Result<()> {
        let payload = serde_json::to_vec(event)?;
        self.channel
            .basic_publish(
                CONFIG_EXCHANGE,
                "",
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default(),
            )
            .await
            .map_err(|e| ConfigError::transport_unavailable("cannot publish change event", e))?
            .await
            .map_err(|e| ConfigError::transport_unavailable("change event not confirmed", e))?;
        tracing::info!(
            application = ?event.application_name,
            action = %event.action,
            "change event published"
        );
        Ok(())
    }
}

/// Subscribe-side adapter used by readers.
///
/// Each subscription declares an exclusive, auto-delete, server-named queue
/// bound to the fanout exchange and consumes it with auto-ack, then forwards
/// decoded events into a channel from its own task. Malformed payloads are
/// logged and skipped; they never take the subscription down.
pub struct RabbitMqSubscriber {
    uri: String,
}

impl RabbitMqSubscriber {
    /// Creates a subscriber for the given broker target. The connection is
    /// established lazily by [`ChangeSubscriber::subscribe`].
    pub fn new(uri: impl Into<String>) -> Self {
        RabbitMqSubscriber { uri: uri.into() }
    }
}

#[async_trait]
impl ChangeSubscriber for RabbitMqSubscriber {
    async fn subscribe(&self) -> Result<mpsc::Receiver<ChangeEvent>> {
        let (connection, channel) = open_channel(&self.uri).await?;

        let queue = channel
            .queue_declare(
                "",
                QueueDeclareOptions {
                    exclusive: true,
                    auto_delete: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| ConfigError::transport_unavailable("cannot declare queue", e))?;
        channel
            .queue_bind(
                queue.name().as_str(),
                CONFIG_EXCHANGE,
                "",
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| ConfigError::transport_unavailable("cannot bind queue", e))?;

        let mut consumer = channel
            .basic_consume(
                queue.name().as_str(),
                "dynconfig-reader",
                BasicConsumeOptions {
                    no_ack: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| ConfigError::transport_unavailable("cannot start consumer", e))?;

        tracing::info!(
            exchange = CONFIG_EXCHANGE,
            queue = queue.name().as_str(),
            "subscribed to change events"
        );

        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            // The connection must outlive the consumer.
            let _connection = connection;
            while let Some(delivery) = consumer.next().await {
                match delivery {
                    Ok(delivery) => match serde_json::from_slice::<ChangeEvent>(&delivery.data) {
                        Ok(event) => {
                            if tx.send(event).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::error!("discarding malformed change event: {e}");
                        }
                    },
                    Err(e) => {
                        tracing::error!("change event stream failed: {e}");
                        break;
                    }
                }
            }
            tracing::debug!("change event consumer stopped");
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_name() {
        assert_eq!(CONFIG_EXCHANGE, "config.updates");
    }

    #[test]
    fn test_subscriber_holds_target() {
        let subscriber = RabbitMqSubscriber::new("amqp://localhost:5672");
        assert_eq!(subscriber.uri, "amqp://localhost:5672");
    }
}
