//! Strongly-typed identity-scope names.
//!
//! A `(Realm, Resolver)` pair names the identity source an assertion claims
//! to come from. Both are opaque at this layer; naming rules belong to the
//! provisioning layer that loads them.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Name of a realm (authentication namespace).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Realm(Cow<'static, str>);

/// Name of a user resolver (identity source within a realm).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resolver(Cow<'static, str>);

macro_rules! impl_name_newtype {
    ($t:ty) => {
        impl $t {
            pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
                Self(name.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&'static str> for $t {
            fn from(value: &'static str) -> Self {
                Self(Cow::Borrowed(value))
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(Cow::Owned(value))
            }
        }
    };
}

impl_name_newtype!(Realm);
impl_name_newtype!(Resolver);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn realm_serde_is_transparent() {
        let realm = Realm::new("realmX");
        let json = serde_json::to_string(&realm).unwrap();
        assert_eq!(json, "\"realmX\"");

        let back: Realm = serde_json::from_str(&json).unwrap();
        assert_eq!(back, realm);
    }

    #[test]
    fn realm_and_resolver_compare_by_name() {
        assert_eq!(Realm::new("realm1"), Realm::from("realm1".to_string()));
        assert_ne!(Resolver::new("resolverX"), Resolver::new("resolverY"));
    }
}
