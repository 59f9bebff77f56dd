use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatewarden_core::{Realm, Resolver};

/// Role a trusted assertion may claim.
///
/// Closed set: an unknown role string fails claim deserialization at the
/// boundary instead of flowing into the matching logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Privileged roles are never granted on the word of an assertion whose
    /// algorithm is outside the accepted set.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim set carried by a trusted assertion (transport-agnostic).
///
/// This is the set of claims the gateway requires once an assertion has been
/// decoded and its signature verified. On success the verifier hands the
/// claims back unchanged; the audit layer records `username` verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Role the remote identity provider vouches for.
    pub role: Role,

    /// Local username the assertion claims.
    pub username: String,

    /// Realm the claimed identity lives in.
    pub realm: Realm,

    /// Resolver (identity source) within the realm.
    pub resolver: Resolver,

    /// Expiry, carried on the wire as numeric `exp` seconds since epoch.
    #[serde(
        rename = "exp",
        with = "chrono::serde::ts_seconds_option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}
