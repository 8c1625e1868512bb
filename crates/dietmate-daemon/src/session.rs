//! Session state of one host connection.

use dietmate_rpc::HostCapabilities;
use serde::{Deserialize, Serialize};

use crate::error::{DaemonError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A registered host runtime
#[derive(Debug, Clone)]
pub struct HostInfo {
    pub id: SessionId,
    pub name: String,
    pub capabilities: HostCapabilities,
}

#[derive(Debug, Clone)]
pub enum Session {
    /// Connected, `register` not received yet
    Pending(SessionId),
    Registered(HostInfo),
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Session::Pending(SessionId::new())
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        match self {
            Session::Pending(id) => id,
            Session::Registered(info) => &info.id,
        }
    }

    #[must_use]
    pub fn is_registered(&self) -> bool {
        matches!(self, Session::Registered(_))
    }

    #[must_use]
    pub fn host_name(&self) -> Option<&str> {
        match self {
            Session::Registered(info) => Some(&info.name),
            Session::Pending(_) => None,
        }
    }

    /// Promote a pending session. A session registers exactly once.
    ///
    /// # Errors
    ///
    /// Returns `DaemonError::AlreadyRegistered` for a second registration.
    pub fn register(&mut self, name: String, capabilities: HostCapabilities) -> Result<&HostInfo> {
        let Session::Pending(id) = self else {
            return Err(DaemonError::AlreadyRegistered);
        };
        let id = id.clone();
        *self = Session::Registered(HostInfo {
            id,
            name,
            capabilities,
        });
        match self {
            Session::Registered(info) => Ok(info),
            Session::Pending(_) => Err(DaemonError::NotRegistered),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
