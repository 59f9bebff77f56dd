//! Verification of externally issued signed identity assertions.
//!
//! A remote identity provider vouches for a user with a compact signed
//! token (`header.payload.signature`, base64url segments). Verification
//! decides three things in a fixed order: the assertion is genuine
//! (signature), current (expiry), and allowed to claim the identity it
//! carries (local impersonation rules). The provider is trusted for
//! *authentication* only; which identities it may assert is bounded locally,
//! so a compromised provider cannot mint assertions for arbitrary accounts.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Validation, decode, decode_header};
use thiserror::Error;
use tracing::{info, warn};

use crate::claims::{Claims, Role};
use crate::config::{IdentityAuthorization, TrustConfig, UnsupportedAlgorithmPolicy};

/// The assertion is not genuine or not current.
///
/// Expected occasional events (stale keys, tampering, probing); logged at
/// informational severity and surfaced as a rejected authentication attempt.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// Not a structurally valid compact token, or the claim set is missing
    /// or malformed.
    #[error("malformed assertion: {0}")]
    Malformed(#[source] jsonwebtoken::errors::Error),

    /// The header algorithm is outside the accepted set.
    #[error("unsupported trusted-assertion algorithm {0:?}")]
    UnsupportedAlgorithm(Algorithm),

    /// No public key is bound to the header algorithm.
    #[error("no trusted key configured for algorithm {0:?}")]
    NoTrustedKey(Algorithm),

    #[error("assertion signature does not match")]
    SignatureMismatch,

    #[error("assertion expired")]
    Expired,

    #[error("role mismatch: assertion carries {claimed}, caller requires {required}")]
    RoleMismatch { claimed: Role, required: Role },
}

/// The assertion is genuine and current, but the claimed identity is not
/// permitted.
///
/// Logged at warning severity: a valid-but-overreaching identity provider is
/// operationally distinct from a plain authentication failure.
#[derive(Debug, Error)]
pub enum AuthorizationError {
    #[error("username {username} is not allowed to impersonate via a trusted assertion")]
    ImpersonationDenied { username: String },
}

/// Terminal outcome of a single verification call. Never retried here.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
}

/// Verifier for trusted assertions.
///
/// Holds only read-only configuration injected at construction. `verify` is
/// a pure decision aside from structured logging and may run concurrently
/// from any number of threads.
#[derive(Debug, Clone)]
pub struct AssertionVerifier {
    trust: TrustConfig,
    identities: IdentityAuthorization,
}

impl AssertionVerifier {
    pub fn new(trust: TrustConfig, identities: IdentityAuthorization) -> Self {
        Self { trust, identities }
    }

    /// Verify `assertion` and return its claims when it is genuine, current,
    /// and authorized to claim the identity it carries.
    ///
    /// Check order: algorithm acceptance, signature, expiry, role,
    /// impersonation rules. An expired assertion never yields claims,
    /// whatever else it contains.
    pub fn verify(&self, assertion: &str, required_role: Role) -> Result<Claims, VerifyError> {
        let header = decode_header(assertion).map_err(AuthenticationError::Malformed)?;
        let algorithm = header.alg;

        if !self.trust.is_accepted(algorithm) {
            warn!(?algorithm, "unsupported trusted-assertion algorithm");
            let reject = match self.trust.unsupported_algorithm_policy() {
                UnsupportedAlgorithmPolicy::Reject => true,
                // Unaccepted algorithms are never authoritative for a
                // privileged role.
                UnsupportedAlgorithmPolicy::WarnAndContinue => required_role.is_privileged(),
            };
            if reject {
                return Err(AuthenticationError::UnsupportedAlgorithm(algorithm).into());
            }
        }

        let key = self
            .trust
            .key_for(algorithm)
            .ok_or(AuthenticationError::NoTrustedKey(algorithm))?;

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        // `exp` is optional; when present it is still checked.
        validation.set_required_spec_claims::<&str>(&[]);

        let decoded = decode::<Claims>(assertion, key, &validation).map_err(|err| {
            match err.into_kind() {
                ErrorKind::InvalidSignature => {
                    info!("assertion signature does not match");
                    AuthenticationError::SignatureMismatch
                }
                ErrorKind::ExpiredSignature => {
                    info!("assertion expired");
                    AuthenticationError::Expired
                }
                kind => AuthenticationError::Malformed(kind.into()),
            }
        })?;
        let claims = decoded.claims;

        if claims.role != required_role {
            return Err(AuthenticationError::RoleMismatch {
                claimed: claims.role,
                required: required_role,
            }
            .into());
        }

        if !self
            .identities
            .authorizes(&claims.realm, &claims.resolver, &claims.username)
        {
            warn!(
                username = %claims.username,
                realm = %claims.realm,
                resolver = %claims.resolver,
                "username is not allowed to impersonate via a trusted assertion"
            );
            return Err(AuthorizationError::ImpersonationDenied {
                username: claims.username,
            }
            .into());
        }

        Ok(claims)
    }
}
