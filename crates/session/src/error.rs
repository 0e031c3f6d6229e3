use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed inbound message: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Could not encode outbound message: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config must be a JSON object")]
    NotAnObject,
}
