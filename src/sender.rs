//! ==============================================================================
//! sender.rs - pushes observation records to the backend api
//! ==============================================================================
//!
//! purpose:
//!     posts one ObservationRecord as json to the configured endpoint and
//!     folds every possible result into a SendOutcome. nothing escapes:
//!     a rejected request or a dead backend is just another outcome line.
//!
//! outcome mapping:
//!     - http 200           -> Delivered
//!     - any other status   -> Rejected (status code + body text)
//!     - transport failure  -> ConnectionError (refused, dns, timeout, ...)
//!
//! relationships:
//!     - used by: runtime.rs (one send per reporting cycle)
//!     - sends: domain.rs (ObservationRecord, serialized by serde)
//!
//! ==============================================================================

use crate::domain::ObservationRecord;

use anyhow::{Context, Result};
use chrono::{Local, NaiveTime};
use reqwest::{Client, StatusCode, Url};
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("rejected with status {status}")]
    Rejected { status: StatusCode, body: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// result of one send attempt, rendered as a single console line
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Delivered {
        at: NaiveTime,
        vehicles_waiting: u32,
        total_vehicles_counted: u32,
    },
    Rejected {
        status: u16,
        body: String,
    },
    ConnectionError {
        reason: String,
    },
}

impl SendOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered { .. })
    }
}

impl fmt::Display for SendOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendOutcome::Delivered {
                at,
                vehicles_waiting,
                total_vehicles_counted,
            } => write!(
                f,
                "[✓] Data sent successfully at {} | Waiting vehicles: {} | Total counted: {}",
                at.format("%H:%M:%S"),
                vehicles_waiting,
                total_vehicles_counted
            ),
            SendOutcome::Rejected { status, body } => write!(f, "[✗] Error: {} - {}", status, body),
            SendOutcome::ConnectionError { reason } => write!(f, "[✗] Connection error: {}", reason),
        }
    }
}

/// http client bound to one backend endpoint for the life of the process
#[derive(Debug, Clone)]
pub struct Sender {
    client: Client,
    endpoint: Url,
}

impl Sender {
    /// uses the client's default timeouts, there is no override.
    /// no idle connections are pooled: each send opens its own connection
    /// and it is closed once the send returns.
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid endpoint url: {}", endpoint))?;

        let client = Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .context("Failed to build http client")?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// post the record and report what happened; never fails
    pub async fn send_record(&self, record: &ObservationRecord) -> SendOutcome {
        let err = match self.deliver(record).await {
            Ok(()) => {
                return SendOutcome::Delivered {
                    at: Local::now().time(),
                    vehicles_waiting: record.vehicles_waiting,
                    total_vehicles_counted: record.total_vehicles_counted,
                }
            }
            Err(err) => err,
        };

        debug!(endpoint = %self.endpoint, error = %err, "delivery failed");
        match err {
            DeliveryError::Rejected { status, body } => SendOutcome::Rejected {
                status: status.as_u16(),
                body,
            },
            DeliveryError::Transport(e) => SendOutcome::ConnectionError {
                reason: describe(&e),
            },
        }
    }

    async fn deliver(&self, record: &ObservationRecord) -> Result<(), DeliveryError> {
        debug!(endpoint = %self.endpoint, timestamp = %record.timestamp, "posting observation");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        let body = response.text().await?;
        Err(DeliveryError::Rejected { status, body })
    }
}

/// flatten an error and its causes into one line
fn describe(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        // reqwest already folds some causes into its own message
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}
