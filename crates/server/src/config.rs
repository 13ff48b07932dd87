//! Server-side environment configuration.

use std::net::SocketAddr;

use thiserror::Error;

use rentaldesk_core::StaffId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServerConfigError {
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Process configuration beyond the store connection.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Staff recorded on rentals when the caller omits `staff_id`.
    pub default_staff_id: StaffId,
    /// When set, serve JSON-RPC over HTTP on this address instead of stdio.
    pub http_addr: Option<SocketAddr>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ServerConfigError> {
        let default_staff_id = match std::env::var("RENTALDESK_DEFAULT_STAFF_ID") {
            Ok(raw) => StaffId::new(raw.parse::<i32>().map_err(|_| {
                ServerConfigError::Invalid {
                    name: "RENTALDESK_DEFAULT_STAFF_ID",
                    value: raw,
                }
            })?),
            Err(_) => StaffId::new(1),
        };

        let http_addr = match std::env::var("RENTALDESK_HTTP_ADDR") {
            Ok(raw) => Some(raw.parse::<SocketAddr>().map_err(|_| {
                ServerConfigError::Invalid {
                    name: "RENTALDESK_HTTP_ADDR",
                    value: raw,
                }
            })?),
            Err(_) => None,
        };

        Ok(Self {
            default_staff_id,
            http_addr,
        })
    }
}
