//! Object Discriminator

use serde::{Deserialize, Serialize};

/// Subsystem a webhook event belongs to, taken from the envelope's `object` field.
///
/// The platform adds object types over time, so unrecognised names are kept
/// in [`Object::Other`] instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Object {
    /// Page feed and messaging events.
    Page,
    /// Group posts, comments and membership.
    Group,
    /// User profile and status changes.
    User,
    /// Permission grants and revocations.
    Permissions,
    /// App-level events.
    Application,
    /// Security events (logins, device changes).
    WorkplaceSecurity,
    /// Link preview (unfurl) requests.
    Link,
    /// Any object type not listed above.
    ///
    /// Build values with [`Object::from`]; an `Other` holding a known name
    /// only matches its dedicated variant after [`Object::normalized`].
    Other(String),
}

impl Object {
    /// Every object type with a dedicated variant.
    pub const KNOWN: &'static [Self] = &[
        Self::Page,
        Self::Group,
        Self::User,
        Self::Permissions,
        Self::Application,
        Self::WorkplaceSecurity,
        Self::Link,
    ];

    /// Wire name of the object (e.g., `"page"`).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Page => "page",
            Self::Group => "group",
            Self::User => "user",
            Self::Permissions => "permissions",
            Self::Application => "application",
            Self::WorkplaceSecurity => "workplace_security",
            Self::Link => "link",
            Self::Other(name) => name,
        }
    }

    /// Map an `Other` holding a known wire name to its dedicated variant.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Other(name) => Self::from(name),
            known => known,
        }
    }
}

impl From<String> for Object {
    fn from(s: String) -> Self {
        match s.as_str() {
            "page" => Self::Page,
            "group" => Self::Group,
            "user" => Self::User,
            "permissions" => Self::Permissions,
            "application" => Self::Application,
            "workplace_security" => Self::WorkplaceSecurity,
            "link" => Self::Link,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for Object {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<Object> for String {
    fn from(object: Object) -> Self {
        match object {
            Object::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
