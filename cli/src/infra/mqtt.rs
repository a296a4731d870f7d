//! MQTT infrastructure: implements `DeviceTransport` with `rumqttc` and
//! pumps the client's event loop into the session's event queue.
//!
//! The pump is the only task polling the `rumqttc` event loop. It turns raw
//! packets into `DeviceEvent`s, pairs SUBACKs with the topic filter that was
//! requested, and keeps polling after connection errors so the client
//! reconnects on its own.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS,
    SubscribeReasonCode, TlsConfiguration, Transport,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::ports::DeviceTransport;
use crate::domain::{DeviceEvent, DeviceSettings};

const KEEP_ALIVE: Duration = Duration::from_secs(30);
const REQUEST_CAPACITY: usize = 16;
const EVENT_CAPACITY: usize = 64;

/// Outbound handle on the MQTT connection. Cheap to clone.
#[derive(Clone)]
pub struct MqttTransport {
    client: AsyncClient,
    pending: Arc<Mutex<VecDeque<String>>>,
    closing: Arc<AtomicBool>,
}

/// A started connection: outbound handle, inbound queue, pump task.
pub struct MqttConnection {
    pub transport: MqttTransport,
    pub events: mpsc::Receiver<DeviceEvent>,
    pub pump: JoinHandle<()>,
}

/// Build TLS options from the device's certificate bundle and start pumping.
///
/// The connection itself is established lazily by the pump; the first
/// `DeviceEvent` is `Connected` or `Error`.
///
/// # Errors
///
/// Returns an error if a certificate, key or CA file cannot be read.
pub fn connect(settings: &DeviceSettings) -> Result<MqttConnection> {
    let ca = read_pem(&settings.ca_path, "CA bundle")?;
    let cert = read_pem(&settings.device_cert_path, "device certificate")?;
    let key = read_pem(&settings.device_key_path, "device key")?;

    let mut options = MqttOptions::new(
        settings.client_id(),
        settings.endpoint.clone(),
        settings.mqtt_port,
    );
    options.set_keep_alive(KEEP_ALIVE);
    options.set_transport(Transport::tls_with_config(TlsConfiguration::Simple {
        ca,
        alpn: None,
        client_auth: Some((cert, key)),
    }));

    tracing::info!(
        device_id = %settings.device_id,
        client_id = %settings.client_id(),
        host = %settings.endpoint,
        port = settings.mqtt_port,
        "opening MQTT connection",
    );

    Ok(start(
        options,
        Duration::from_secs(settings.reconnect_delay_secs),
    ))
}

/// Create the client for `options` and spawn the pump on its event loop.
fn start(options: MqttOptions, reconnect_delay: Duration) -> MqttConnection {
    let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
    let (tx, events) = mpsc::channel(EVENT_CAPACITY);
    let transport = MqttTransport {
        client,
        pending: Arc::new(Mutex::new(VecDeque::new())),
        closing: Arc::new(AtomicBool::new(false)),
    };

    let pump = EventPump {
        translator: EventTranslator::new(Arc::clone(&transport.pending)),
        closing: Arc::clone(&transport.closing),
        reconnect_delay,
    };
    let pump = tokio::spawn(pump.run(eventloop, tx));

    MqttConnection {
        transport,
        events,
        pump,
    }
}

fn read_pem(path: &Path, what: &str) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {what} from {}", path.display()))
}

impl DeviceTransport for MqttTransport {
    async fn subscribe(&self, topic: &str) -> Result<()> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(topic.to_string());
        if let Err(e) = self.client.subscribe(topic, QoS::AtLeastOnce).await {
            self.pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_back();
            return Err(e).with_context(|| format!("requesting subscription to {topic}"));
        }
        tracing::debug!(topic, "subscription requested");
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await
            .with_context(|| format!("publishing to {topic}"))?;
        tracing::debug!(topic, "publish queued");
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.closing.store(true, Ordering::SeqCst);
        self.client
            .disconnect()
            .await
            .context("requesting MQTT disconnect")
    }
}

// ── Event pump ────────────────────────────────────────────────────────────────

struct EventPump {
    translator: EventTranslator,
    closing: Arc<AtomicBool>,
    reconnect_delay: Duration,
}

impl EventPump {
    async fn run(mut self, mut eventloop: EventLoop, tx: mpsc::Sender<DeviceEvent>) {
        loop {
            let events = match eventloop.poll().await {
                Ok(event) => self.translator.translate(&event),
                Err(_) if self.closing.load(Ordering::SeqCst) => vec![DeviceEvent::Closed],
                Err(e) => {
                    tracing::warn!(error = %e, "MQTT connection error");
                    self.translator.reset();
                    let failed = [DeviceEvent::Error(e.to_string()), DeviceEvent::Disconnected];
                    if !forward(&tx, failed).await {
                        return;
                    }
                    tokio::time::sleep(self.reconnect_delay).await;
                    if self.closing.load(Ordering::SeqCst) {
                        vec![DeviceEvent::Closed]
                    } else {
                        vec![DeviceEvent::Reconnecting]
                    }
                }
            };
            if !forward(&tx, events).await {
                return;
            }
        }
    }
}

/// Send events in order. Returns `false` once the pump should stop: the
/// queue was dropped or `Closed` went out.
async fn forward(
    tx: &mpsc::Sender<DeviceEvent>,
    events: impl IntoIterator<Item = DeviceEvent>,
) -> bool {
    for event in events {
        let closed = event == DeviceEvent::Closed;
        if tx.send(event).await.is_err() || closed {
            return false;
        }
    }
    true
}

/// Stateful packet → `DeviceEvent` mapping.
///
/// `rumqttc` reports SUBSCRIBE packet ids only as they are written, in
/// request order, so requested topic filters are queued in `pending` and
/// bound to a packet id on `Outgoing::Subscribe`.
pub(crate) struct EventTranslator {
    pending: Arc<Mutex<VecDeque<String>>>,
    in_flight: HashMap<u16, String>,
}

impl EventTranslator {
    pub(crate) fn new(pending: Arc<Mutex<VecDeque<String>>>) -> Self {
        Self {
            pending,
            in_flight: HashMap::new(),
        }
    }

    /// Forget unacknowledged subscriptions after the connection drops.
    pub(crate) fn reset(&mut self) {
        self.in_flight.clear();
    }

    pub(crate) fn translate(&mut self, event: &Event) -> Vec<DeviceEvent> {
        match event {
            Event::Incoming(Packet::ConnAck(ack)) => {
                if ack.code == ConnectReturnCode::Success {
                    vec![DeviceEvent::Connected]
                } else {
                    vec![DeviceEvent::Error(format!(
                        "connection refused: {:?}",
                        ack.code
                    ))]
                }
            }
            Event::Incoming(Packet::Publish(publish)) => vec![DeviceEvent::Message {
                topic: publish.topic.clone(),
                payload: publish.payload.to_vec(),
            }],
            Event::Incoming(Packet::SubAck(ack)) => {
                let topic = self
                    .in_flight
                    .remove(&ack.pkid)
                    .unwrap_or_else(|| format!("<packet {}>", ack.pkid));
                ack.return_codes
                    .iter()
                    .map(|code| match code {
                        SubscribeReasonCode::Success(_) => DeviceEvent::Subscribed {
                            topic: topic.clone(),
                        },
                        SubscribeReasonCode::Failure => {
                            DeviceEvent::Error(format!("subscription to {topic} rejected"))
                        }
                    })
                    .collect()
            }
            Event::Incoming(Packet::Disconnect) => vec![DeviceEvent::Disconnected],
            Event::Outgoing(Outgoing::Subscribe(pkid)) => {
                let next = self
                    .pending
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop_front();
                if let Some(topic) = next {
                    self.in_flight.insert(*pkid, topic);
                }
                Vec::new()
            }
            Event::Outgoing(Outgoing::Disconnect) => vec![DeviceEvent::Closed],
            _ => Vec::new(),
        }
    }
}
