use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use servodeck_api::{Command, DeviceStatus};
use tokio::sync::Mutex;

use crate::error::{Error, Result};

use super::DeviceTransport;

/// Offline transport that serves a scripted status and records every command.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    status: Mutex<DeviceStatus>,
    offline: AtomicBool,
    polls: AtomicUsize,
    sent: Mutex<Vec<Command>>,
}

impl RecordingTransport {
    pub fn new(status: DeviceStatus) -> Self {
        Self {
            status: Mutex::new(status),
            ..Default::default()
        }
    }

    pub async fn set_status(&self, status: DeviceStatus) {
        *self.status.lock().await = status;
    }

    /// Make every following status fetch fail as if the device were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub async fn sent(&self) -> Vec<Command> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl DeviceTransport for RecordingTransport {
    async fn fetch_status(&self) -> Result<DeviceStatus> {
        self.polls.fetch_add(1, Ordering::SeqCst);

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::network("device unreachable"));
        }
        Ok(self.status.lock().await.clone())
    }

    async fn send(&self, command: &Command) -> Result<()> {
        self.sent.lock().await.push(*command);
        Ok(())
    }
}
