//! Command plumbing shared by every mutation handler
//!
//! - `CommandResponse`: the success/error value every mutation returns
//! - `Validation`: field checks aggregated into one `|`-joined message
//! - `RequestHandler`: the per-request-type entry point used by transport
//! - `name_taken`: the normalized-name uniqueness check

use async_trait::async_trait;
use serde::{Serialize, Serializer};
use tokio_util::sync::CancellationToken;

use crate::domain::entities::{Named, Record};
use crate::domain::ports::{Lookup, Repository, TrackingMode};
use crate::error::{AppError, DomainError};

/// Delimiter between aggregated validation messages
pub const MESSAGE_DELIMITER: &str = "|";

/// Outcome of a mutation; business-rule failures are values, not errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResponse {
    Success { message: String, id: i32 },
    Error { message: String },
}

impl CommandResponse {
    pub fn success(message: impl Into<String>, id: i32) -> Self {
        CommandResponse::Success {
            message: message.into(),
            id,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        CommandResponse::Error {
            message: message.into(),
        }
    }

    pub fn is_successful(&self) -> bool {
        matches!(self, CommandResponse::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            CommandResponse::Success { message, .. } | CommandResponse::Error { message } => {
                message
            }
        }
    }

    pub fn id(&self) -> Option<i32> {
        match self {
            CommandResponse::Success { id, .. } => Some(*id),
            CommandResponse::Error { .. } => None,
        }
    }

    pub fn created<E: Record>(id: i32) -> Self {
        Self::success(format!("{} created successfully.", E::ENTITY), id)
    }

    pub fn updated<E: Record>(id: i32) -> Self {
        Self::success(format!("{} updated successfully.", E::ENTITY), id)
    }

    pub fn deleted<E: Record>(id: i32) -> Self {
        Self::success(format!("{} deleted successfully.", E::ENTITY), id)
    }

    pub fn name_exists<E: Record>() -> Self {
        Self::error(format!("{} with the same name exists!", E::ENTITY))
    }

    pub fn not_found<E: Record>() -> Self {
        Self::error(format!("{} not found!", E::ENTITY))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommandResponseBody<'a> {
    is_successful: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i32>,
}

impl Serialize for CommandResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CommandResponseBody {
            is_successful: self.is_successful(),
            message: self.message(),
            id: self.id(),
        }
        .serialize(serializer)
    }
}

/// Collects field-level validation failures
#[derive(Debug, Default)]
pub struct Validation {
    messages: Vec<String>,
}

impl Validation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field must be present and not blank
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.messages
                .push(format!("The {} field is required.", field));
        }
        self
    }

    /// Field must be at most `max` characters
    pub fn max_length(mut self, field: &str, value: &str, max: usize) -> Self {
        if value.chars().count() > max {
            self.messages.push(format!(
                "The field {} must be a string with a maximum length of {}.",
                field, max
            ));
        }
        self
    }

    /// `None` when every check passed, else an `Error` with all messages
    pub fn finish(self) -> Option<CommandResponse> {
        if self.messages.is_empty() {
            None
        } else {
            Some(CommandResponse::error(
                self.messages.join(MESSAGE_DELIMITER),
            ))
        }
    }
}

/// Handle one request type
///
/// Queries return a lazy `Query`; mutations return a `CommandResponse`.
/// Only faults come back as `Err`.
#[async_trait]
pub trait RequestHandler<Req: Send + 'static>: Send + Sync {
    type Output: Send;

    async fn handle(
        &self,
        request: Req,
        cancel: &CancellationToken,
    ) -> Result<Self::Output, AppError>;
}

/// True if another record already uses `name` once both are normalized
///
/// `except` skips the record being updated. Reads tracked state so names
/// staged earlier in the same unit of work count.
pub async fn name_taken<E, R>(
    repository: &R,
    name: &str,
    except: Option<i32>,
    cancel: &CancellationToken,
) -> Result<bool, DomainError>
where
    E: Named,
    R: Repository<E> + ?Sized,
{
    let matches = repository
        .lookup(Lookup::name(name), TrackingMode::Tracking, cancel)
        .await?;
    Ok(matches.iter().any(|record| Some(record.id()) != except))
}
