//! Visit Context
//!
//! Metadata about the current request: who is visiting and how to trace it.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use uuid::Uuid;

/// Visitor key used when the request carries no usable address
pub const ANONYMOUS_VISITOR: &str = "unknown";

/// Context for a single inbound request, used for counting and tracing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitContext {
    /// Opaque visitor key (normally the client address)
    pub visitor_key: String,

    /// Client IP address, when it could be parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl VisitContext {
    /// Create a context for an anonymous visitor
    pub fn new() -> Self {
        Self {
            visitor_key: ANONYMOUS_VISITOR.to_string(),
            client_ip: None,
            correlation_id: None,
        }
    }

    /// Create context with an explicit visitor key
    ///
    /// The key is kept verbatim. If it parses as an IP address the
    /// address is recorded too.
    pub fn with_visitor_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.client_ip = key.trim().parse().ok();
        self.visitor_key = key;
        self
    }

    /// Create context from a client IP
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.visitor_key = ip.to_string();
        self.client_ip = Some(ip);
        self
    }

    /// Create context with correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Generate a new correlation ID if not present
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }
}

impl Default for VisitContext {
    fn default() -> Self {
        Self::new()
    }
}
