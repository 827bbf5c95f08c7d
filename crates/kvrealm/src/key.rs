//! Cache keys and store-key derivation.
//!
//! A [`CacheKey`] is resolved once, at the call boundary, into the string
//! that is prefixed with the cache namespace and handed to the key codec.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

/// A principal's identity across one or more authentication realms.
///
/// Only the set of realm names takes part in key derivation: two identities
/// with the same realms map to the same cache entry regardless of the order
/// principals were added in or how many principals each realm contributed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    /// `(realm, principal)` pairs in insertion order.
    principals: Vec<(String, String)>,
}

impl IdentityKey {
    /// Create an empty identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an identity that only carries realm names.
    pub fn from_realms<I, S>(realms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            principals: realms
                .into_iter()
                .map(|realm| (realm.into(), String::new()))
                .collect(),
        }
    }

    /// Add a principal contributed by `realm`.
    pub fn with_principal(
        mut self,
        realm: impl Into<String>,
        principal: impl Into<String>,
    ) -> Self {
        self.principals.push((realm.into(), principal.into()));
        self
    }

    /// Distinct realm names, ascending.
    pub fn realm_names(&self) -> BTreeSet<&str> {
        self.principals.iter().map(|(realm, _)| realm.as_str()).collect()
    }

    /// Principals contributed by `realm`, in insertion order.
    pub fn principals_for<'a>(&'a self, realm: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.principals
            .iter()
            .filter(move |(r, _)| r == realm)
            .map(|(_, p)| p.as_str())
    }

    /// The first principal added, if any.
    pub fn primary_principal(&self) -> Option<&str> {
        self.principals.first().map(|(_, p)| p.as_str())
    }

    /// Sorted realm names concatenated with no separator.
    pub fn derived_key(&self) -> String {
        self.realm_names().into_iter().collect()
    }
}

/// A logical cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// A plain string key, stored under the cache namespace.
    Plain(String),

    /// A composite identity, stored under the cache namespace by its
    /// derived realm key.
    Identity(IdentityKey),

    /// A key handed to the key codec as-is, without the namespace prefix.
    ///
    /// Entries written this way are invisible to `keys`, `values` and
    /// `clear`, which only scan the namespace.
    Unprefixed(String),
}

impl CacheKey {
    /// Canonical string form of the key, before any prefixing.
    pub fn canonical(&self) -> Cow<'_, str> {
        match self {
            CacheKey::Plain(key) | CacheKey::Unprefixed(key) => Cow::Borrowed(key),
            CacheKey::Identity(identity) => Cow::Owned(identity.derived_key()),
        }
    }

    /// The string a cache with `key_prefix` stores this key under.
    pub fn store_key(&self, key_prefix: &str) -> String {
        match self {
            CacheKey::Plain(_) | CacheKey::Identity(_) => {
                let mut key = String::with_capacity(key_prefix.len() + 16);
                key.push_str(key_prefix);
                key.push_str(&self.canonical());
                key
            }
            CacheKey::Unprefixed(key) => key.clone(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        CacheKey::Plain(key.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        CacheKey::Plain(key)
    }
}

impl From<IdentityKey> for CacheKey {
    fn from(identity: IdentityKey) -> Self {
        CacheKey::Identity(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realm_order_does_not_matter() {
        let ba = IdentityKey::from_realms(["b", "a"]);
        let ab = IdentityKey::from_realms(["a", "b"]);
        assert_eq!(ba.derived_key(), "ab");
        assert_eq!(ab.derived_key(), "ab");
    }

    #[test]
    fn test_duplicate_realms_collapse() {
        let identity = IdentityKey::new()
            .with_principal("ldap", "alice")
            .with_principal("jdbc", "alice@example.com")
            .with_principal("ldap", "uid=alice");
        assert_eq!(identity.derived_key(), "jdbcldap");
        assert_eq!(
            identity.principals_for("ldap").collect::<Vec<_>>(),
            vec!["alice", "uid=alice"]
        );
        assert_eq!(identity.primary_principal(), Some("alice"));
    }

    #[test]
    fn test_empty_identity_derives_empty_key() {
        assert_eq!(IdentityKey::new().derived_key(), "");
    }

    #[test]
    fn test_store_key_prefixing() {
        let prefix = "shiro:cache:auth:";
        assert_eq!(
            CacheKey::from("alice").store_key(prefix),
            "shiro:cache:auth:alice"
        );
        assert_eq!(
            CacheKey::from(IdentityKey::from_realms(["ldap", "jdbc"])).store_key(prefix),
            "shiro:cache:auth:jdbcldap"
        );
        assert_eq!(
            CacheKey::Unprefixed("global:flag".into()).store_key(prefix),
            "global:flag"
        );
    }

    #[test]
    fn test_display_uses_canonical_form() {
        let key = CacheKey::from(IdentityKey::from_realms(["z", "m"]));
        assert_eq!(key.to_string(), "mz");
    }
}
