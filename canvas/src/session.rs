//! Account session: the signed-in profile, persisted under the `user` key.
//!
//! Sign-in is mocked locally; there is no account backend. `login` derives a
//! profile from the email address, `register` creates a free profile, and the
//! result is written to storage so a reload restores it. The session is an
//! explicit value owned by the editor rather than ambient global state.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::consts::USER_KEY;
use crate::storage::{KeyValueStorage, StorageError, load_json, save_json};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("a valid email address is required")]
    InvalidEmail,
    #[error("name is required")]
    MissingName,
    #[error("not signed in")]
    SignedOut,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Subscription tier. Also the plan names the billing flow charges for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subscription {
    Free,
    Pro,
    Enterprise,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandKit {
    pub colors: Vec<String>,
    pub fonts: Vec<String>,
    pub logos: Vec<String>,
}

impl Default for BrandKit {
    fn default() -> Self {
        Self {
            colors: vec!["#3B82F6".into(), "#EF4444".into(), "#10B981".into()],
            fonts: vec!["Inter".into(), "Roboto".into(), "Open Sans".into()],
            logos: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub subscription: Subscription,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_kit: Option<BrandKit>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<UserProfile>,
}

impl Session {
    /// A signed-out session.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Read the persisted profile. A missing key means signed out.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the stored profile cannot be read or parsed.
    pub fn restore<S: KeyValueStorage + ?Sized>(storage: &S) -> Result<Self, SessionError> {
        let user: Option<UserProfile> = load_json(storage, USER_KEY)?;
        Ok(Self { user })
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == Role::Admin)
    }

    /// Mocked sign-in: the name is the local part of the email, addresses
    /// containing `admin` get the admin role, and every account is on Pro
    /// with the default brand kit.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidEmail`] or a storage error.
    pub fn login<S: KeyValueStorage + ?Sized>(
        &mut self,
        storage: &mut S,
        email: &str,
    ) -> Result<&UserProfile, SessionError> {
        let email = validate_email(email)?;
        let name = email.split('@').next().unwrap_or_default().to_owned();
        let role = if email.contains("admin") { Role::Admin } else { Role::User };
        let profile = UserProfile {
            id: Uuid::new_v4().to_string(),
            email: email.to_owned(),
            name,
            role,
            subscription: Subscription::Pro,
            brand_kit: Some(BrandKit::default()),
        };
        self.persist(storage, profile)
    }

    /// Create a free account with no brand kit.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad email or empty name, or a
    /// storage error.
    pub fn register<S: KeyValueStorage + ?Sized>(
        &mut self,
        storage: &mut S,
        email: &str,
        name: &str,
    ) -> Result<&UserProfile, SessionError> {
        let email = validate_email(email)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::MissingName);
        }
        let profile = UserProfile {
            id: Uuid::new_v4().to_string(),
            email: email.to_owned(),
            name: name.to_owned(),
            role: Role::User,
            subscription: Subscription::Free,
            brand_kit: None,
        };
        self.persist(storage, profile)
    }

    /// Forget the profile in memory and in storage.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the key cannot be removed; the in-memory
    /// session is signed out either way.
    pub fn logout<S: KeyValueStorage + ?Sized>(&mut self, storage: &mut S) -> Result<(), SessionError> {
        self.user = None;
        storage.remove(USER_KEY)?;
        debug!("signed out");
        Ok(())
    }

    /// Move the signed-in account to `plan` after a settled payment.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SignedOut`] without a profile, or a storage
    /// error.
    pub fn upgrade<S: KeyValueStorage + ?Sized>(
        &mut self,
        storage: &mut S,
        plan: Subscription,
    ) -> Result<&UserProfile, SessionError> {
        let mut profile = self.user.clone().ok_or(SessionError::SignedOut)?;
        profile.subscription = plan;
        self.persist(storage, profile)
    }

    fn persist<S: KeyValueStorage + ?Sized>(
        &mut self,
        storage: &mut S,
        profile: UserProfile,
    ) -> Result<&UserProfile, SessionError> {
        save_json(storage, USER_KEY, &profile)?;
        debug!(id = %profile.id, subscription = ?profile.subscription, "profile stored");
        Ok(self.user.insert(profile))
    }
}

fn validate_email(email: &str) -> Result<&str, SessionError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(SessionError::InvalidEmail),
    }
}
