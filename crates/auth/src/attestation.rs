//! Declarative policy over hardware-credential attestation certificates.
//!
//! Operators restrict which credentials may register by matching attributes
//! of the presented attestation certificate against configured regexes.
//! Every configured rule is an additional requirement layered on by the
//! operator, so the rule set combines with logical AND.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::pattern::AttributePattern;

/// Attestation certificate attribute a rule can constrain.
///
/// Rule keys use the short name (`subject`); the registration flow maps the
/// parsed certificate fields onto the same names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttestationAttribute {
    Subject,
    Issuer,
    Serial,
}

impl AttestationAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttestationAttribute::Subject => "subject",
            AttestationAttribute::Issuer => "issuer",
            AttestationAttribute::Serial => "serial",
        }
    }
}

impl FromStr for AttestationAttribute {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subject" => Ok(AttestationAttribute::Subject),
            "issuer" => Ok(AttestationAttribute::Issuer),
            "serial" => Ok(AttestationAttribute::Serial),
            other => Err(ConfigError::UnknownAttribute(other.to_string())),
        }
    }
}

impl core::fmt::Display for AttestationAttribute {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes extracted from a presented attestation certificate.
///
/// Built by the registration flow after parsing the certificate; lives only
/// for the single decision call that consumes it. `None` at the decision
/// point means no attestation certificate was presented at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttestationInfo {
    attributes: HashMap<AttestationAttribute, String>,
}

impl AttestationInfo {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, attribute: AttestationAttribute, value: impl Into<String>) -> Self {
        self.attributes.insert(attribute, value.into());
        self
    }

    pub fn get(&self, attribute: AttestationAttribute) -> Option<&str> {
        self.attributes.get(&attribute).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl FromIterator<(AttestationAttribute, String)> for AttestationInfo {
    fn from_iter<I: IntoIterator<Item = (AttestationAttribute, String)>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}

/// One configured requirement, parsed from a `<attribute>/<regex>/` key plus
/// the set of actions the rule applies to.
#[derive(Debug, Clone)]
pub struct AttestationRule {
    attribute: AttestationAttribute,
    pattern: AttributePattern,
    actions: BTreeSet<String>,
}

impl AttestationRule {
    /// Parse a rule from its configured key, e.g. `subject/.*Yubico.*/`.
    ///
    /// The regex sits between the first `/` and the trailing `/` and may
    /// itself contain `/`. The regex is compiled here: a malformed pattern
    /// is a configuration error, never a per-registration failure. The
    /// action set must be non-empty.
    pub fn parse(
        key: &str,
        actions: impl IntoIterator<Item = String>,
    ) -> Result<Self, ConfigError> {
        let Some((attribute, rest)) = key.split_once('/') else {
            return Err(ConfigError::InvalidRuleKey(key.to_string()));
        };
        let Some(regex) = rest.strip_suffix('/') else {
            return Err(ConfigError::InvalidRuleKey(key.to_string()));
        };

        let attribute = attribute.parse::<AttestationAttribute>()?;
        let pattern = AttributePattern::compile(regex)?;
        let actions: BTreeSet<String> = actions.into_iter().collect();
        if actions.is_empty() {
            return Err(ConfigError::EmptyActionSet(key.to_string()));
        }

        Ok(Self {
            attribute,
            pattern,
            actions,
        })
    }

    pub fn attribute(&self) -> AttestationAttribute {
        self.attribute
    }

    /// Search semantics: the regex needs to find a match somewhere in the
    /// attribute value. A missing attribute fails the rule.
    pub fn matches(&self, info: &AttestationInfo) -> bool {
        info.get(self.attribute)
            .is_some_and(|value| self.pattern.matches(value))
    }

    pub fn applies_to(&self, action: &str) -> bool {
        self.actions.contains(action)
    }
}

/// The operator's attestation rule set, evaluated as one decision.
#[derive(Debug, Clone, Default)]
pub struct AttestationPolicy {
    rules: Vec<AttestationRule>,
}

impl AttestationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a policy from `(key, action tags)` pairs as they appear in
    /// configuration. Fails on the first malformed rule.
    pub fn from_rules<K, A>(rules: impl IntoIterator<Item = (K, A)>) -> Result<Self, ConfigError>
    where
        K: AsRef<str>,
        A: IntoIterator<Item = String>,
    {
        let rules = rules
            .into_iter()
            .map(|(key, actions)| AttestationRule::parse(key.as_ref(), actions))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// The subset of rules tagged for `action`, for callers that scope the
    /// policy to a higher-level operation before deciding.
    #[must_use]
    pub fn scoped_to(&self, action: &str) -> Self {
        Self {
            rules: self
                .rules
                .iter()
                .filter(|rule| rule.applies_to(action))
                .cloned()
                .collect(),
        }
    }

    /// Decide whether a presented attestation satisfies this policy.
    ///
    /// No configured rules means no restriction. Otherwise every rule must
    /// match: one unmatched rule, or an attestation absent while rules
    /// exist, denies the whole attestation. Action tags play no part here;
    /// scope with [`AttestationPolicy::scoped_to`] first where needed.
    pub fn is_allowed(&self, info: Option<&AttestationInfo>) -> bool {
        if self.rules.is_empty() {
            return true;
        }
        let Some(info) = info else {
            return false;
        };
        self.rules.iter().all(|rule| rule.matches(info))
    }
}
