use std::fmt;

#[derive(Debug)]
pub enum AdvisorError {
    Api {
        status: u16,
        message: String,
    },
    ConfigError(String),
    NetworkError(reqwest::Error),
    Timeout,
    InvalidResponse(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    YamlError(serde_yaml::Error),
    Other(String),
}

impl AdvisorError {
    /// True for both our own deadline and reqwest's transport timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            AdvisorError::Timeout => true,
            AdvisorError::NetworkError(e) => e.is_timeout(),
            _ => false,
        }
    }
}

impl fmt::Display for AdvisorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisorError::Api { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            AdvisorError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AdvisorError::NetworkError(e) => write!(f, "Network error: {}", e),
            AdvisorError::Timeout => write!(f, "Request timeout"),
            AdvisorError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            AdvisorError::IoError(e) => write!(f, "IO error: {}", e),
            AdvisorError::JsonError(e) => write!(f, "JSON error: {}", e),
            AdvisorError::YamlError(e) => write!(f, "YAML error: {}", e),
            AdvisorError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AdvisorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdvisorError::NetworkError(e) => Some(e),
            AdvisorError::IoError(e) => Some(e),
            AdvisorError::JsonError(e) => Some(e),
            AdvisorError::YamlError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AdvisorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdvisorError::Timeout
        } else {
            AdvisorError::NetworkError(err)
        }
    }
}

impl From<std::io::Error> for AdvisorError {
    fn from(err: std::io::Error) -> Self {
        AdvisorError::IoError(err)
    }
}

impl From<serde_json::Error> for AdvisorError {
    fn from(err: serde_json::Error) -> Self {
        AdvisorError::JsonError(err)
    }
}

impl From<serde_yaml::Error> for AdvisorError {
    fn from(err: serde_yaml::Error) -> Self {
        AdvisorError::YamlError(err)
    }
}

impl From<anyhow::Error> for AdvisorError {
    fn from(err: anyhow::Error) -> Self {
        AdvisorError::ConfigError(format!("{:#}", err))
    }
}

impl From<String> for AdvisorError {
    fn from(msg: String) -> Self {
        AdvisorError::Other(msg)
    }
}

impl From<&str> for AdvisorError {
    fn from(msg: &str) -> Self {
        AdvisorError::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
