//! Authenticated caller identity.

/// Identity of an authenticated caller, attached to the request by the
/// application's authentication layer.
///
/// Presence of an `Identity` extension means the caller authenticated;
/// the engine still requires a user id before consulting permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable user identifier, the key for permission lookups.
    pub user_id: Option<String>,

    /// Display name, used only for logging.
    pub display_name: Option<String>,
}

impl Identity {
    /// Identity with a known user id.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            display_name: None,
        }
    }

    /// Attach a display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// The user id, if present and non-empty.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.is_empty())
    }
}
