mod http;
mod recording;

pub use http::HttpTransport;
pub use recording::RecordingTransport;

use std::sync::Arc;

use async_trait::async_trait;
use servodeck_api::{Command, DeviceStatus};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::Result;

/// Network boundary between the panel and the device.
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    /// Read the full status snapshot.
    async fn fetch_status(&self) -> Result<DeviceStatus>;

    /// Issue a command. The response body is never inspected.
    async fn send(&self, command: &Command) -> Result<()>;
}

/// Send `command` in the background and forget about it.
///
/// Failures are logged and dropped; the next status poll shows whether the
/// command took effect.
pub fn dispatch(transport: Arc<dyn DeviceTransport>, command: Command) -> JoinHandle<()> {
    debug!("Sending {}", command);

    tokio::spawn(async move {
        if let Err(e) = transport.send(&command).await {
            debug!("Dropped {}: {}", command, e);
        }
    })
}
