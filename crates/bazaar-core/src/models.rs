//! JSON payloads exchanged with clients and relayed to backend services.
//!
//! The gateway does not interpret these beyond minimal validation. Fields the
//! backend assigns (IDs) default to empty and are omitted when empty, so a
//! client payload survives decode/encode unchanged.

use serde::{Deserialize, Serialize};

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// A user as understood by the users backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend-assigned identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Password, only ever sent towards the backend.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
}

impl User {
    /// Returns `true` if username or password is empty.
    #[must_use]
    pub fn has_empty_credentials(&self) -> bool {
        self.username.is_empty() || self.password.is_empty()
    }

    /// Copy of this user suitable for returning to an HTTP caller.
    #[must_use]
    pub fn redacted(mut self) -> Self {
        self.password.clear();
        self
    }
}

/// Login credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    /// Returns `true` if username or password is empty.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        self.username.is_empty() || self.password.is_empty()
    }
}

/// Response body of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The issued bearer token.
    pub access_key: String,
}

/// A catalogue product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Backend-assigned identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Display name; required on creation.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Unit price.
    #[serde(default)]
    pub price: f64,
}

/// An order placed by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Backend-assigned identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Owner; always stamped by the gateway from the authenticated subject.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    /// Ordered product.
    #[serde(default)]
    pub product_id: String,
    /// Ordered quantity.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub quantity: u32,
}
