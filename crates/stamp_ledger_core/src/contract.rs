use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::StampKey;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum RequestType {
    GetStamps,
    AddStamps,
    ResetStamps,
    DeleteStamps,
    SetupCustomer,
}

impl RequestType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetStamps => "getStamps",
            Self::AddStamps => "addStamps",
            Self::ResetStamps => "resetStamps",
            Self::DeleteStamps => "deleteStamps",
            Self::SetupCustomer => "setupCustomer",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "getStamps" => Ok(Self::GetStamps),
            "addStamps" => Ok(Self::AddStamps),
            "resetStamps" => Ok(Self::ResetStamps),
            "deleteStamps" => Ok(Self::DeleteStamps),
            "setupCustomer" => Ok(Self::SetupCustomer),
            other => Err(ValidationError::UnknownRequestType(other.to_string())),
        }
    }
}

/// Wire shape of an inbound request. Every field is optional here; which ones
/// are required depends on `requestType` and is checked by [`parse_request`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawStampRequest {
    pub request_type: Option<String>,
    pub store_id: Option<String>,
    pub customer_id: Option<String>,
    pub number_of_stamps: Option<i64>,
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StampRequest {
    GetStamps { key: StampKey },
    AddStamps { key: StampKey, number_of_stamps: i64 },
    ResetStamps { key: StampKey },
    DeleteStamps { key: StampKey, number_of_stamps: i64 },
    SetupCustomer { store_id: String, customer_name: String },
}

impl StampRequest {
    pub fn request_type(&self) -> RequestType {
        match self {
            Self::GetStamps { .. } => RequestType::GetStamps,
            Self::AddStamps { .. } => RequestType::AddStamps,
            Self::ResetStamps { .. } => RequestType::ResetStamps,
            Self::DeleteStamps { .. } => RequestType::DeleteStamps,
            Self::SetupCustomer { .. } => RequestType::SetupCustomer,
        }
    }

    pub fn store_id(&self) -> &str {
        match self {
            Self::GetStamps { key }
            | Self::AddStamps { key, .. }
            | Self::ResetStamps { key }
            | Self::DeleteStamps { key, .. } => &key.store_id,
            Self::SetupCustomer { store_id, .. } => store_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Malformed request: {0}")]
    Malformed(String),
    #[error("requestType is required")]
    MissingRequestType,
    #[error("Unknown requestType '{0}'")]
    UnknownRequestType(String),
    #[error("{field} is required for {request_type}")]
    MissingField {
        field: &'static str,
        request_type: RequestType,
    },
    #[error("{field} cannot be empty")]
    BlankField { field: &'static str },
    #[error("numberOfStamps must be a non-negative integer, got {0}")]
    NegativeStampCount(i64),
    #[error("adding {added} stamps to {current} would exceed the maximum stamp count")]
    StampCountOverflow { current: i64, added: i64 },
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownRequestType(_) => "unknown_request_type",
            _ => "validation_error",
        }
    }
}

pub fn parse_request(payload: Value) -> Result<StampRequest, ValidationError> {
    if !payload.is_object() {
        return Err(ValidationError::Malformed(
            "request payload must be a JSON object".to_string(),
        ));
    }
    let raw = serde_json::from_value::<RawStampRequest>(payload)
        .map_err(|error| ValidationError::Malformed(error.to_string()))?;
    validate_request(raw)
}

pub fn validate_request(raw: RawStampRequest) -> Result<StampRequest, ValidationError> {
    let request_type: RequestType = raw
        .request_type
        .as_deref()
        .ok_or(ValidationError::MissingRequestType)?
        .parse()?;

    let store_id = required_text(raw.store_id, "storeId", request_type)?;

    match request_type {
        RequestType::SetupCustomer => {
            let customer_name = required_text(raw.customer_name, "customerName", request_type)?;
            Ok(StampRequest::SetupCustomer {
                store_id,
                customer_name,
            })
        }
        RequestType::GetStamps | RequestType::ResetStamps => {
            let customer_id = required_text(raw.customer_id, "customerId", request_type)?;
            let key = StampKey::new(store_id, customer_id);
            if request_type == RequestType::GetStamps {
                Ok(StampRequest::GetStamps { key })
            } else {
                Ok(StampRequest::ResetStamps { key })
            }
        }
        RequestType::AddStamps | RequestType::DeleteStamps => {
            let customer_id = required_text(raw.customer_id, "customerId", request_type)?;
            let number_of_stamps = raw.number_of_stamps.ok_or(ValidationError::MissingField {
                field: "numberOfStamps",
                request_type,
            })?;
            if number_of_stamps < 0 {
                return Err(ValidationError::NegativeStampCount(number_of_stamps));
            }
            let key = StampKey::new(store_id, customer_id);
            if request_type == RequestType::AddStamps {
                Ok(StampRequest::AddStamps {
                    key,
                    number_of_stamps,
                })
            } else {
                Ok(StampRequest::DeleteStamps {
                    key,
                    number_of_stamps,
                })
            }
        }
    }
}

fn required_text(
    value: Option<String>,
    field: &'static str,
    request_type: RequestType,
) -> Result<String, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField {
        field,
        request_type,
    })?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField { field });
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Found,
    Created,
    Incremented,
    Reset,
    Decremented,
    NotFound,
}

impl OutcomeKind {
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            Self::Created | Self::Incremented | Self::Reset | Self::Decremented
        )
    }
}

/// Successful result of a counter operation, rendered as the response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerOutcome {
    pub outcome: OutcomeKind,
    pub request_type: RequestType,
    #[serde(flatten)]
    pub key: StampKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamps: Option<i64>,
    pub message: String,
}
