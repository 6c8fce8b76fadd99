//! REST collaborator: wire types, the HTTP client and the request dispatcher.
//!
//! The UI never awaits a request. It queues [`ApiRequest`]s, the
//! [`Dispatcher`] runs them on a tokio runtime, and each one comes back as
//! exactly one [`ApiEvent`] on the next tick of the event loop.
//!
mod client;
mod dispatch;

pub use client::CustomerClient;
pub use dispatch::{Dispatcher, execute};

use serde::{Deserialize, Serialize};

/// Client-assigned customer identifier (milliseconds since the Unix epoch at creation).
pub type CustomerId = i64;

/// Collection URL used when neither config nor CLI provide one.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/customers";

/// A customer record as stored by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// The editable part of a customer; this is the body of an update request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl Customer {
    pub fn with_id(id: CustomerId, fields: CustomerFields) -> Self {
        Self {
            id,
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            address: fields.address,
        }
    }

    pub fn fields(&self) -> CustomerFields {
        CustomerFields {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
        }
    }
}

/// Work queued by the UI for the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiRequest {
    /// Fetch the whole collection. `seq` orders reloads so stale ones can be dropped.
    List { seq: u64 },
    Create(Customer),
    Update {
        id: CustomerId,
        fields: CustomerFields,
    },
    Delete {
        id: CustomerId,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    List,
    Create,
    Update,
    Delete,
}

impl RequestKind {
    pub fn label(self) -> &'static str {
        match self {
            RequestKind::List => "list",
            RequestKind::Create => "create",
            RequestKind::Update => "update",
            RequestKind::Delete => "delete",
        }
    }
}

impl ApiRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            ApiRequest::List { .. } => RequestKind::List,
            ApiRequest::Create(_) => RequestKind::Create,
            ApiRequest::Update { .. } => RequestKind::Update,
            ApiRequest::Delete { .. } => RequestKind::Delete,
        }
    }

    /// Customer the request targets, if any.
    pub fn target_id(&self) -> Option<CustomerId> {
        match self {
            ApiRequest::List { .. } => None,
            ApiRequest::Create(c) => Some(c.id),
            ApiRequest::Update { id, .. } | ApiRequest::Delete { id } => Some(*id),
        }
    }
}

/// Completion of one [`ApiRequest`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiEvent {
    Listed {
        seq: u64,
        customers: Vec<Customer>,
    },
    Created {
        id: CustomerId,
    },
    Updated {
        id: CustomerId,
    },
    Deleted {
        id: CustomerId,
    },
    Failed {
        kind: RequestKind,
        id: Option<CustomerId>,
        error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn customer_serializes_with_client_id() {
        let c = Customer {
            id: 1_700_000_000_123,
            name: "Ann".into(),
            email: "ann@x.com".into(),
            phone: "555".into(),
            address: "1 Main St".into(),
        };
        assert_eq!(
            serde_json::to_value(&c).unwrap(),
            json!({"id": 1_700_000_000_123i64, "name": "Ann", "email": "ann@x.com", "phone": "555", "address": "1 Main St"})
        );
    }

    #[test]
    fn update_body_has_no_id() {
        let fields = CustomerFields {
            name: "Bob".into(),
            email: "bob@x.com".into(),
            phone: "1".into(),
            address: "2".into(),
        };
        let v = serde_json::to_value(&fields).unwrap();
        assert!(v.get("id").is_none());
        assert_eq!(v["email"], "bob@x.com");
    }

    #[test]
    fn missing_text_fields_default_to_empty() {
        let c: Customer = serde_json::from_value(json!({"id": 3, "name": "Cy"})).unwrap();
        assert_eq!(c.name, "Cy");
        assert!(c.email.is_empty() && c.phone.is_empty() && c.address.is_empty());
    }

    #[test]
    fn request_kind_and_target() {
        assert_eq!(ApiRequest::List { seq: 4 }.target_id(), None);
        let del = ApiRequest::Delete { id: 9 };
        assert_eq!(del.kind(), RequestKind::Delete);
        assert_eq!(del.target_id(), Some(9));
    }
}
