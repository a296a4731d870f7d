//! Application service: device session use-case.
//!
//! Consumes the transport's event queue on a single task, preserving event
//! order. On every `Connected` the association workflow runs to completion
//! before any subscription is requested: subscribing to a topic the device is
//! not yet allowed to use makes the broker drop the connection.

use anyhow::{Context, Result};
use jitp_common::ShadowTopics;
use jitp_common::topics::test_topic;
use tokio::sync::mpsc;

use crate::application::ports::{
    ControlPlane, DeviceTransport, MessageSink, ProgressReporter, ShadowStore,
};
use crate::application::services::association::{AssociationOutcome, associate_device};
use crate::domain::session::greeting;
use crate::domain::{DeviceEvent, DeviceSettings, SessionState};

/// Injected collaborators of a [`DeviceSession`].
pub struct SessionPorts<'a, C, S, T, R, M> {
    pub control: &'a C,
    pub shadows: &'a S,
    pub transport: &'a T,
    pub reporter: &'a R,
    pub sink: &'a M,
}

/// Event-driven device session. Exactly one per process.
pub struct DeviceSession<'a, C, S, T, R, M> {
    ports: SessionPorts<'a, C, S, T, R, M>,
    settings: &'a DeviceSettings,
    shadow: ShadowTopics,
    test_topic: String,
    state: SessionState,
}

impl<'a, C, S, T, R, M> DeviceSession<'a, C, S, T, R, M>
where
    C: ControlPlane,
    S: ShadowStore,
    T: DeviceTransport,
    R: ProgressReporter,
    M: MessageSink,
{
    #[must_use]
    pub fn new(ports: SessionPorts<'a, C, S, T, R, M>, settings: &'a DeviceSettings) -> Self {
        Self {
            ports,
            settings,
            shadow: ShadowTopics::for_thing(&settings.device_id),
            test_topic: test_topic(&settings.stage, &settings.tenant_id),
            state: SessionState::Offline,
        }
    }

    /// Drain `events` until the transport closes or the queue ends.
    ///
    /// Handler failures are reported and never end the session.
    pub async fn run(mut self, mut events: mpsc::Receiver<DeviceEvent>) -> SessionState {
        while let Some(event) = events.recv().await {
            if let Err(e) = self.handle(event).await {
                tracing::error!(error = %format!("{e:#}"), "session event failed");
                self.ports.reporter.warn(&format!("{e:#}"));
            }
            if self.state == SessionState::Closed {
                break;
            }
        }
        self.state
    }

    /// React to one transport event.
    ///
    /// # Errors
    ///
    /// Returns an error if association, a subscription request or a publish
    /// fails. The session stays usable; a failed association is retried on
    /// the next `Connected`.
    pub async fn handle(&mut self, event: DeviceEvent) -> Result<()> {
        match event {
            DeviceEvent::Connected => self.on_connected().await,
            DeviceEvent::Subscribed { topic } => self.on_subscribed(&topic).await,
            DeviceEvent::Message { topic, payload } => {
                self.on_message(&topic, &payload);
                Ok(())
            }
            DeviceEvent::Error(message) => {
                tracing::warn!(%message, "transport error");
                self.ports.reporter.warn(&format!("error: {message}"));
                Ok(())
            }
            DeviceEvent::Reconnecting => {
                tracing::info!("reconnecting");
                self.ports.reporter.step("reconnecting");
                Ok(())
            }
            DeviceEvent::Disconnected => {
                tracing::info!("disconnected");
                self.state = SessionState::Offline;
                self.ports.reporter.warn("disconnected");
                Ok(())
            }
            DeviceEvent::Closed => {
                tracing::info!("transport closed");
                self.state = SessionState::Closed;
                self.ports.reporter.step("connection closed");
                Ok(())
            }
        }
    }

    async fn on_connected(&mut self) -> Result<()> {
        self.state = SessionState::Connected;
        self.ports.reporter.step("connected");

        let outcome = associate_device(
            self.ports.control,
            self.ports.shadows,
            self.ports.reporter,
            self.settings,
        )
        .await
        .context("associating device with tenant")?;
        if let AssociationOutcome::AlreadyAssociated { tenant_id } = &outcome {
            tracing::info!(%tenant_id, "device already associated");
        }

        let get_accepted = self.shadow.get_accepted();
        for topic in [get_accepted.as_str(), self.test_topic.as_str()] {
            self.ports
                .transport
                .subscribe(topic)
                .await
                .with_context(|| format!("subscribing to {topic}"))?;
        }
        self.state = SessionState::Ready;
        Ok(())
    }

    async fn on_subscribed(&self, topic: &str) -> Result<()> {
        self.ports.reporter.success(&format!("subscribed to {topic}"));

        if topic == self.shadow.get_accepted() {
            self.ports
                .reporter
                .step("publishing empty message to retrieve shadow");
            self.ports
                .transport
                .publish(&self.shadow.get(), b"{}".to_vec())
                .await
                .context("requesting shadow")?;
        } else if topic == self.test_topic {
            self.ports.reporter.step("publishing hello message");
            let body = greeting(
                &self.settings.device_id,
                chrono::Utc::now().timestamp_millis(),
            );
            let payload = serde_json::to_vec(&body).context("encoding greeting")?;
            self.ports
                .transport
                .publish(&self.test_topic, payload)
                .await
                .context("publishing greeting")?;
        }
        Ok(())
    }

    fn on_message(&self, topic: &str, payload: &[u8]) {
        match serde_json::from_slice::<serde_json::Value>(payload) {
            Ok(body) => {
                tracing::debug!(topic, "message received");
                self.ports.sink.received(topic, &body);
            }
            Err(e) => {
                tracing::warn!(topic, error = %e, "malformed message");
                self.ports.sink.malformed(topic, &e.to_string());
            }
        }
    }
}
