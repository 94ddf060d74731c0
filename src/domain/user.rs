//! User profile returned by the authentication collaborator
//!
//! The account store itself (login, lockout, password hashing) is external;
//! the core only consumes the resolved profile, and of it mostly the
//! `ReferenceID` audit stamp.

use serde::{Deserialize, Serialize};

/// Payload of the auth collaborator's `GET /users?id=` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserProfile {
	pub firstname: String,
	pub lastname: String,
	pub role: String,
	#[serde(rename = "ReferenceID")]
	pub reference_id: String,
	pub email: String,
}
