use async_trait::async_trait;
use reqwest::{Client, Url};
use servodeck_api::{Command, DeviceStatus, STATUS_PATH};

use crate::configs::Device;
use crate::error::{Error, Result};

use super::DeviceTransport;

/// Talks to the device web server over plain HTTP GETs.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(device: &Device) -> Result<Self> {
        let base_url = Url::parse(&device.base_url).map_err(|e| {
            Error::config(format!("invalid device url '{}': {}", device.base_url, e))
        })?;

        // The device sits on the local network or its own access point.
        let client = Client::builder()
            .no_proxy()
            .timeout(device.request_timeout())
            .connect_timeout(device.connect_timeout())
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::config(format!("invalid endpoint '{}': {}", path, e)))
    }
}

#[async_trait]
impl DeviceTransport for HttpTransport {
    async fn fetch_status(&self) -> Result<DeviceStatus> {
        let response = self.client.get(self.endpoint(STATUS_PATH)?).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::status(status.as_u16(), STATUS_PATH));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send(&self, command: &Command) -> Result<()> {
        let response = self
            .client
            .get(self.endpoint(command.endpoint())?)
            .query(&command.query())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::status(status.as_u16(), command.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(base_url: &str) -> Device {
        Device {
            base_url: base_url.to_string(),
            request_timeout_ms: 2000,
            connect_timeout_ms: 1000,
        }
    }

    #[test]
    fn test_endpoints_resolve_against_base() {
        let transport = HttpTransport::new(&device("http://192.168.4.1:8080")).unwrap();

        assert_eq!(
            transport.endpoint(STATUS_PATH).unwrap().as_str(),
            "http://192.168.4.1:8080/api/status"
        );
        assert_eq!(
            transport.endpoint("/api/servo").unwrap().as_str(),
            "http://192.168.4.1:8080/api/servo"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = HttpTransport::new(&device("192.168.4.1"));

        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
