//! Datastore-facing types and constants
//!
//! This module defines the status codes, request descriptor and callback
//! signature of the datastore's operational get-items contract. The numeric
//! values follow sysrepo's `sr_error_t` so codes can be handed back verbatim.

use std::fmt;

use crate::plugin::Plugin;
use crate::session::Session;
use crate::tree::DataTree;

/// Status codes returned to the datastore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// SR_ERR_OK
    Ok = 0,
    /// SR_ERR_INVAL_ARG
    InvalArg = 1,
    /// SR_ERR_LY, the tree library rejected the data
    Ly = 2,
    /// SR_ERR_SYS
    Sys = 3,
    /// SR_ERR_NO_MEMORY
    NoMemory = 4,
    /// SR_ERR_NOT_FOUND
    NotFound = 5,
    /// SR_ERR_EXISTS
    Exists = 6,
    /// SR_ERR_INTERNAL
    Internal = 7,
    /// SR_ERR_UNSUPPORTED
    Unsupported = 8,
    /// SR_ERR_VALIDATION_FAILED
    ValidationFailed = 9,
    /// SR_ERR_OPERATION_FAILED
    OperationFailed = 10,
    /// SR_ERR_UNAUTHORIZED
    Unauthorized = 11,
    /// SR_ERR_LOCKED
    Locked = 12,
    /// SR_ERR_TIME_OUT
    TimeOut = 13,
    /// SR_ERR_CALLBACK_FAILED
    CallbackFailed = 14,
    /// SR_ERR_CALLBACK_SHELVE
    CallbackShelve = 15,
}

impl ErrorCode {
    /// Convert from a raw status code
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Ok),
            1 => Some(Self::InvalArg),
            2 => Some(Self::Ly),
            3 => Some(Self::Sys),
            4 => Some(Self::NoMemory),
            5 => Some(Self::NotFound),
            6 => Some(Self::Exists),
            7 => Some(Self::Internal),
            8 => Some(Self::Unsupported),
            9 => Some(Self::ValidationFailed),
            10 => Some(Self::OperationFailed),
            11 => Some(Self::Unauthorized),
            12 => Some(Self::Locked),
            13 => Some(Self::TimeOut),
            14 => Some(Self::CallbackFailed),
            15 => Some(Self::CallbackShelve),
            _ => None,
        }
    }

    /// Get the raw status code
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this is the success code
    pub fn is_success(self) -> bool {
        self == Self::Ok
    }

    fn message(self) -> &'static str {
        match self {
            Self::Ok => "Operation succeeded",
            Self::InvalArg => "Invalid argument",
            Self::Ly => "libyang error",
            Self::Sys => "System function call failed",
            Self::NoMemory => "Out of memory",
            Self::NotFound => "Item not found",
            Self::Exists => "Item already exists",
            Self::Internal => "Internal error",
            Self::Unsupported => "Operation not supported",
            Self::ValidationFailed => "Validation failed",
            Self::OperationFailed => "Operation failed",
            Self::Unauthorized => "Operation not authorized",
            Self::Locked => "Requested resource is already locked",
            Self::TimeOut => "Timeout expired",
            Self::CallbackFailed => "User callback failed",
            Self::CallbackShelve => "User callback shelved",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Everything that determines the data a single get-items request must produce
///
/// Built per invocation and never retained past the callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Subscription the request was delivered to
    pub subscription_id: u32,
    /// Module the subscription was made for
    pub module_name: String,
    /// Subscribed path
    pub path: String,
    /// Path the reader actually asked for; `None` or empty means the whole subtree
    pub request_xpath: Option<String>,
    /// Datastore request identifier
    pub request_id: u32,
}

impl RequestDescriptor {
    /// Create a descriptor for a subscription path
    pub fn new(module_name: &str, path: &str) -> Self {
        Self {
            subscription_id: 0,
            module_name: module_name.to_string(),
            path: path.to_string(),
            request_xpath: None,
            request_id: 0,
        }
    }

    /// Set the requested XPath
    pub fn with_request_xpath(mut self, xpath: &str) -> Self {
        self.request_xpath = Some(xpath.to_string());
        self
    }

    /// Set subscription and request identifiers
    pub fn with_ids(mut self, subscription_id: u32, request_id: u32) -> Self {
        self.subscription_id = subscription_id;
        self.request_id = request_id;
        self
    }

    /// The requested XPath, with an empty one folded into `None`
    pub fn effective_xpath(&self) -> Option<&str> {
        self.request_xpath.as_deref().filter(|x| !x.trim().is_empty())
    }
}

/// Fixed signature of an operational get-items callback
///
/// Parameter order mirrors `sr_oper_get_items_cb`: session, subscription id,
/// module name, subscribed path, request XPath, request id, the parent slot
/// and the private data captured at registration.
pub type OperGetItemsCb = fn(
    session: &dyn Session,
    subscription_id: u32,
    module_name: &str,
    path: &str,
    request_xpath: Option<&str>,
    request_id: u32,
    parent: &mut Option<DataTree>,
    private_data: &Plugin,
) -> ErrorCode;

/// One operational subscription the plugin asks the datastore to register
#[derive(Clone, Copy)]
pub struct Subscription {
    /// Module owning the subscribed path
    pub module_name: &'static str,
    /// Subscribed path
    pub xpath: &'static str,
    /// Callback invoked for requests under `xpath`
    pub callback: OperGetItemsCb,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("module_name", &self.module_name)
            .field("xpath", &self.xpath)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_conversion() {
        assert_eq!(ErrorCode::from_i32(2), Some(ErrorCode::Ly));
        assert_eq!(ErrorCode::OperationFailed.as_i32(), 10);
        assert_eq!(ErrorCode::from_i32(42), None);
        assert!(ErrorCode::Ok.is_success());
        assert!(!ErrorCode::Internal.is_success());
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::Ly.to_string(), "libyang error");
    }

    #[test]
    fn test_effective_xpath() {
        let desc = RequestDescriptor::new("m", "/m:a");
        assert_eq!(desc.effective_xpath(), None);

        let desc = desc.with_request_xpath("  ");
        assert_eq!(desc.effective_xpath(), None);

        let desc = RequestDescriptor::new("m", "/m:a").with_request_xpath("/m:a/b");
        assert_eq!(desc.effective_xpath(), Some("/m:a/b"));
    }
}
