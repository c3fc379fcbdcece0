//! Owner token handed out by a successful login.

/// Proof that `owner` authenticated against this vault.
///
/// Only `VaultService::authenticate` creates one.  Every secret
/// operation takes the session explicitly, so the service itself never
/// holds a "current user".  Expiry is up to the caller: dropping the
/// session (or passing it to `logout`) is all there is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    owner: String,
}

impl Session {
    pub(crate) fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
        }
    }

    /// The authenticated username.
    pub fn owner(&self) -> &str {
        &self.owner
    }
}
