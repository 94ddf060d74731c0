//! Acting-user resolution and the write gate
//!
//! Every mutating operation in the core takes an [`ActingUser`], which can
//! only be obtained from a [`Session`] after the user's profile has resolved.
//! Until then [`Session::acting_user`] fails with `ReferenceNotLoaded`, which
//! stands in for disabling all mutating actions while the ReferenceID is
//! still loading.

use crate::domain::UserProfile;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

/// Session errors
#[derive(Error, Debug)]
pub enum SessionError {
	/// No profile has resolved yet; mutating actions are rejected
	#[error("User reference is not loaded yet")]
	ReferenceNotLoaded,

	/// The resolver does not know this user id
	#[error("Unknown user: {0}")]
	UnknownUser(String),

	/// The auth collaborator failed
	#[error("User lookup failed: {0}")]
	Lookup(String),
}

/// Result type for session operations
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Resolves an opaque user id into a profile (the `GET /users?id=` seam)
#[async_trait]
pub trait SessionResolver: Send + Sync {
	async fn resolve(&self, user_id: &str) -> SessionResult<UserProfile>;
}

/// In-memory resolver for tests and embedded use
#[derive(Default)]
pub struct StaticResolver {
	users: HashMap<String, UserProfile>,
}

impl StaticResolver {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_user(mut self, user_id: impl Into<String>, profile: UserProfile) -> Self {
		self.users.insert(user_id.into(), profile);
		self
	}
}

#[async_trait]
impl SessionResolver for StaticResolver {
	async fn resolve(&self, user_id: &str) -> SessionResult<UserProfile> {
		self.users
			.get(user_id)
			.cloned()
			.ok_or_else(|| SessionError::UnknownUser(user_id.to_string()))
	}
}

/// Proof that the acting user's ReferenceID has resolved; carried into every
/// mutating operation and used for audit stamps
#[derive(Debug, Clone)]
pub struct ActingUser {
	pub user_id: String,
	pub reference_id: String,
}

/// Tracks the signed-in user for one core instance
pub struct Session {
	resolver: Arc<dyn SessionResolver>,
	current: RwLock<Option<ActingUser>>,
}

impl Session {
	pub fn new(resolver: Arc<dyn SessionResolver>) -> Self {
		Self {
			resolver,
			current: RwLock::new(None),
		}
	}

	/// Resolve and remember the acting user
	pub async fn sign_in(&self, user_id: &str) -> SessionResult<UserProfile> {
		let profile = self.resolver.resolve(user_id).await?;
		info!("Session resolved for user {}", user_id);
		*self.current.write().await = Some(ActingUser {
			user_id: user_id.to_string(),
			reference_id: profile.reference_id.clone(),
		});
		Ok(profile)
	}

	pub async fn sign_out(&self) {
		*self.current.write().await = None;
	}

	pub async fn is_signed_in(&self) -> bool {
		self.current.read().await.is_some()
	}

	/// The acting user, or `ReferenceNotLoaded` until sign-in has resolved
	pub async fn acting_user(&self) -> SessionResult<ActingUser> {
		self.current
			.read()
			.await
			.clone()
			.ok_or(SessionError::ReferenceNotLoaded)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn profile(reference_id: &str) -> UserProfile {
		UserProfile {
			firstname: "Ada".into(),
			lastname: "Reyes".into(),
			role: "Staff".into(),
			reference_id: reference_id.into(),
			email: "ada@example.com".into(),
		}
	}

	#[tokio::test]
	async fn test_writes_gated_until_reference_resolves() {
		let resolver = Arc::new(StaticResolver::new().with_user("u1", profile("REF-1")));
		let session = Session::new(resolver);

		assert!(matches!(
			session.acting_user().await,
			Err(SessionError::ReferenceNotLoaded)
		));

		session.sign_in("u1").await.unwrap();
		let acting = session.acting_user().await.unwrap();
		assert_eq!(acting.reference_id, "REF-1");

		session.sign_out().await;
		assert!(!session.is_signed_in().await);
	}

	#[tokio::test]
	async fn test_unknown_user() {
		let session = Session::new(Arc::new(StaticResolver::new()));
		assert!(matches!(
			session.sign_in("nobody").await,
			Err(SessionError::UnknownUser(_))
		));
	}
}
