//! `jitp connect`: run the device session until Ctrl-C.

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::ports::DeviceTransport;
use crate::application::services::session::{DeviceSession, SessionPorts};
use crate::infra::aws::AwsIot;
use crate::infra::config::device_settings;
use crate::infra::mqtt;
use crate::output::{ConsoleSink, Renderer, TerminalReporter};

/// Run `jitp connect`.
///
/// Opens the MQTT connection with the device certificate, then consumes
/// transport events until the connection is closed. Ctrl-C sends MQTT
/// DISCONNECT, which ends the session cleanly.
///
/// # Errors
///
/// Returns an error if the environment is incomplete or the certificate
/// bundle cannot be read. Errors during the session are reported, not
/// returned.
pub async fn run(app: &AppContext) -> Result<()> {
    let settings = device_settings()?;
    let connection = mqtt::connect(&settings)?;
    let control = AwsIot::connect(&settings.region, Some(&settings.endpoint)).await;

    let shutdown = connection.transport.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, disconnecting");
            if let Err(e) = shutdown.disconnect().await {
                tracing::warn!(error = %format!("{e:#}"), "disconnect request failed");
            }
        }
    });

    let reporter = TerminalReporter::new(&app.output);
    let sink = ConsoleSink::new(&app.output, app.is_json());
    let session = DeviceSession::new(
        SessionPorts {
            control: &control,
            shadows: &control,
            transport: &connection.transport,
            reporter: &reporter,
            sink: &sink,
        },
        &settings,
    );

    let state = session.run(connection.events).await;
    connection.pump.await.context("MQTT event pump panicked")?;

    if let Renderer::Human(r) = app.renderer() {
        r.render_session_end(state);
    }
    Ok(())
}
