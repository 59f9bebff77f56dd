//! `gatewarden-auth` — trust-boundary decision core (zero-trust).
//!
//! Two independent decision leaves of the authentication gateway: verifying
//! externally issued signed identity assertions, and deciding whether a
//! hardware credential's attestation certificate is acceptable for
//! registration. This crate is intentionally decoupled from HTTP and
//! storage; all configuration is constructed by the caller and injected.

pub mod assertion;
pub mod attestation;
pub mod claims;
pub mod config;
pub mod pattern;

pub use assertion::{AssertionVerifier, AuthenticationError, AuthorizationError, VerifyError};
pub use attestation::{AttestationAttribute, AttestationInfo, AttestationPolicy, AttestationRule};
pub use claims::{Claims, Role};
pub use config::{
    ConfigError, IdentityAuthorization, IdentityAuthorizationRule, TrustConfig,
    UnsupportedAlgorithmPolicy,
};
pub use pattern::{AttributePattern, PatternError, UsernamePattern};
