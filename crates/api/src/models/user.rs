//! User domain types.

use serde::{Deserialize, Serialize};

use dinehub_core::{Email, UserId};

/// A user of the ordering app.
///
/// Created on first login from the identity the auth provider reports; the
/// profile fields are filled in later by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Subject identifier issued by the auth provider.
    pub auth0_id: String,
    /// Email address reported by the auth provider.
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl User {
    /// Overwrite every profile field.
    ///
    /// Fields absent from `profile` are cleared, so callers must always send
    /// the full set.
    pub fn apply_profile(&mut self, profile: UserProfile) {
        let UserProfile {
            name,
            address_line1,
            city,
            country,
        } = profile;
        self.name = name;
        self.address_line1 = address_line1;
        self.city = city;
        self.country = country;
    }
}

/// Mutable profile fields of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserProfile {
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Parameters for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub auth0_id: String,
    pub email: Email,
    pub profile: UserProfile,
}

/// The authenticated caller of a protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// Local user ID, used for all ownership checks.
    pub id: UserId,
    /// Auth provider subject the gateway vouched for.
    pub auth0_id: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            auth0_id: user.auth0_id.clone(),
        }
    }
}
