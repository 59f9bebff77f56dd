//! Trust configuration: key material, accepted algorithms, and the identity
//! authorization rule set.
//!
//! Everything here is loaded once at startup and read-only afterwards; the
//! decision functions take it by shared reference and may be called from any
//! number of threads concurrently.

use std::collections::{HashMap, HashSet};
use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey};
use thiserror::Error;

use gatewarden_core::{Realm, Resolver};

use crate::pattern::{PatternError, UsernamePattern};

/// Configuration-load-time failure.
///
/// Fatal: surfaced to the operator when the rule set or key material is
/// constructed, never deferred to a per-request runtime failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    InvalidPattern(#[from] PatternError),

    /// An attestation rule key does not have the `<attribute>/<regex>/` shape.
    #[error("invalid attestation rule key {0:?}")]
    InvalidRuleKey(String),

    /// An attestation rule names an attribute with no certificate mapping.
    #[error("unknown attestation attribute {0:?}")]
    UnknownAttribute(String),

    /// An attestation rule carries no action tags.
    #[error("attestation rule {0:?} has an empty action set")]
    EmptyActionSet(String),

    /// Trusted public key material does not parse.
    #[error("invalid trusted key material for {algorithm:?}")]
    InvalidKeyMaterial {
        algorithm: Algorithm,
        #[source]
        source: jsonwebtoken::errors::Error,
    },
}

/// What to do with an assertion whose header algorithm is not in the
/// accepted set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedAlgorithmPolicy {
    /// Fail verification immediately.
    #[default]
    Reject,

    /// Log a warning and verify with the key bound to that algorithm, but
    /// never yield claims when the caller requires a privileged role.
    WarnAndContinue,
}

/// Trusted signer configuration: which public key verifies which algorithm,
/// and which algorithms are accepted at all.
///
/// The accepted set is authoritative. A key whose algorithm is outside it
/// stays untrusted even though the material exists, so a signer cannot talk
/// the gateway into a weaker algorithm it happens to hold a key for.
#[derive(Clone, Default)]
pub struct TrustConfig {
    keys: HashMap<Algorithm, DecodingKey>,
    accepted: HashSet<Algorithm>,
    on_unsupported: UnsupportedAlgorithmPolicy,
}

impl TrustConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind already-parsed public key material to an algorithm.
    #[must_use]
    pub fn trust_key(mut self, algorithm: Algorithm, key: DecodingKey) -> Self {
        self.keys.insert(algorithm, key);
        self
    }

    /// Bind an RSA public key in PEM form to an algorithm.
    pub fn trust_rsa_pem(self, algorithm: Algorithm, pem: &[u8]) -> Result<Self, ConfigError> {
        let key = DecodingKey::from_rsa_pem(pem)
            .map_err(|source| ConfigError::InvalidKeyMaterial { algorithm, source })?;
        Ok(self.trust_key(algorithm, key))
    }

    /// Add an algorithm to the accepted set.
    #[must_use]
    pub fn accept(mut self, algorithm: Algorithm) -> Self {
        self.accepted.insert(algorithm);
        self
    }

    #[must_use]
    pub fn with_unsupported_algorithm_policy(mut self, policy: UnsupportedAlgorithmPolicy) -> Self {
        self.on_unsupported = policy;
        self
    }

    pub fn is_accepted(&self, algorithm: Algorithm) -> bool {
        self.accepted.contains(&algorithm)
    }

    pub fn key_for(&self, algorithm: Algorithm) -> Option<&DecodingKey> {
        self.keys.get(&algorithm)
    }

    pub fn unsupported_algorithm_policy(&self) -> UnsupportedAlgorithmPolicy {
        self.on_unsupported
    }
}

// Hand-written so key material never reaches logs or error chains.
impl fmt::Debug for TrustConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keyed: Vec<String> = self.keys.keys().map(|a| format!("{a:?}")).collect();
        keyed.sort();
        let mut accepted: Vec<String> = self.accepted.iter().map(|a| format!("{a:?}")).collect();
        accepted.sort();

        f.debug_struct("TrustConfig")
            .field("keys", &keyed)
            .field("accepted", &accepted)
            .field("on_unsupported", &self.on_unsupported)
            .finish()
    }
}

/// One impersonation grant.
///
/// Assertions from `(realm, resolver)` claiming a username that matches
/// `username` may authenticate as that local user. The pattern is evaluated
/// locally so a compromised or overly permissive identity provider cannot
/// widen its own grant.
#[derive(Debug, Clone)]
pub struct IdentityAuthorizationRule {
    realm: Realm,
    resolver: Resolver,
    username: UsernamePattern,
}

impl IdentityAuthorizationRule {
    pub fn new(realm: Realm, resolver: Resolver, username: UsernamePattern) -> Self {
        Self {
            realm,
            resolver,
            username,
        }
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn username(&self) -> &UsernamePattern {
        &self.username
    }
}

/// The loaded impersonation rule set, indexed by claimed source.
#[derive(Debug, Clone, Default)]
pub struct IdentityAuthorization {
    by_source: HashMap<Realm, HashMap<Resolver, Vec<UsernamePattern>>>,
}

impl IdentityAuthorization {
    pub fn from_rules(rules: impl IntoIterator<Item = IdentityAuthorizationRule>) -> Self {
        let mut by_source: HashMap<Realm, HashMap<Resolver, Vec<UsernamePattern>>> = HashMap::new();
        for rule in rules {
            by_source
                .entry(rule.realm)
                .or_default()
                .entry(rule.resolver)
                .or_default()
                .push(rule.username);
        }
        Self { by_source }
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }

    /// True iff a rule scoped to exactly `(realm, resolver)` matches the
    /// whole username.
    pub fn authorizes(&self, realm: &Realm, resolver: &Resolver, username: &str) -> bool {
        self.by_source
            .get(realm)
            .and_then(|resolvers| resolvers.get(resolver))
            .is_some_and(|patterns| patterns.iter().any(|p| p.matches(username)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rules() -> IdentityAuthorization {
        IdentityAuthorization::from_rules([
            IdentityAuthorizationRule::new(
                Realm::new("realmX"),
                Resolver::new("resolverX"),
                UsernamePattern::compile("h*s"),
            ),
            IdentityAuthorizationRule::new(
                Realm::new("realm1"),
                Resolver::new("resolverX"),
                UsernamePattern::compile("userA"),
            ),
        ])
    }

    #[test]
    fn authorizes_matching_username_in_scope() {
        let rules = test_rules();
        assert!(rules.authorizes(&Realm::new("realmX"), &Resolver::new("resolverX"), "hans"));
        assert!(rules.authorizes(&Realm::new("realm1"), &Resolver::new("resolverX"), "userA"));
    }

    #[test]
    fn scope_is_exact_per_realm_and_resolver() {
        let rules = test_rules();

        // Right username, wrong realm or resolver.
        assert!(!rules.authorizes(&Realm::new("realm1"), &Resolver::new("resolverX"), "hans"));
        assert!(!rules.authorizes(&Realm::new("realmX"), &Resolver::new("resolverY"), "hans"));
        assert!(!rules.authorizes(&Realm::new("realmY"), &Resolver::new("resolverX"), "hans"));
    }

    #[test]
    fn empty_rule_set_authorizes_nobody() {
        let rules = IdentityAuthorization::from_rules([]);
        assert!(rules.is_empty());
        assert!(!rules.authorizes(&Realm::new("realmX"), &Resolver::new("resolverX"), "hans"));
    }

    #[test]
    fn debug_output_never_contains_key_material() {
        let pem = include_str!("../tests/data/assertion_sign.pub");
        let config = TrustConfig::new()
            .trust_rsa_pem(Algorithm::RS256, pem.as_bytes())
            .unwrap()
            .accept(Algorithm::RS256);

        let rendered = format!("{config:?}");
        assert!(rendered.contains("RS256"));
        assert!(!rendered.contains("BEGIN PUBLIC KEY"));
        // Nor the base64 body of the PEM.
        assert!(!rendered.contains("MII"));
    }

    #[test]
    fn garbage_key_material_is_a_config_error() {
        let err = TrustConfig::new()
            .trust_rsa_pem(Algorithm::RS256, b"not a pem")
            .unwrap_err();
        match err {
            ConfigError::InvalidKeyMaterial { algorithm, .. } => {
                assert_eq!(algorithm, Algorithm::RS256);
            }
            other => panic!("expected InvalidKeyMaterial, got {other:?}"),
        }
    }

    #[test]
    fn default_unsupported_algorithm_policy_is_reject() {
        assert_eq!(
            TrustConfig::new().unsupported_algorithm_policy(),
            UnsupportedAlgorithmPolicy::Reject
        );
    }
}
