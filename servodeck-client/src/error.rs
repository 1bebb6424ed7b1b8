use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Transport-level failures (connect, timeout, reset)
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    /// The device answered with a non-success status code
    Status { code: u16, endpoint: String },
    /// Payload could not be decoded
    Serialization { message: String },
    /// Settings could not be loaded or are inconsistent
    Config { message: String },
    /// User input the device cannot accept
    InvalidInput { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    pub fn network_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn status<E: Into<String>>(code: u16, endpoint: E) -> Self {
        Self::Status {
            code,
            endpoint: endpoint.into(),
        }
    }

    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Network { message, .. } => write!(f, "Network error: {}", message),
            Error::Status { code, endpoint } => {
                write!(f, "Device answered {} for {}", code, endpoint)
            }
            Error::Serialization { message } => write!(f, "Serialization error: {}", message),
            Error::Config { message } => write!(f, "Configuration error: {}", message),
            Error::InvalidInput { message } => write!(f, "Invalid input: {}", message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Network {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Error::serialization(err.to_string());
        }
        Error::network_with_source("HTTP request failed", Box::new(err))
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::config(err.to_string())
    }
}
