//! Identity → claims mapping.
use serde::{Deserialize, Serialize};

/// Claim-type names used for the canonical identity claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimTypeMap {
    pub subject: String,
    pub name: String,
    pub role: String,
}

impl Default for ClaimTypeMap {
    fn default() -> Self {
        Self {
            subject: "sub".to_string(),
            name: "name".to_string(),
            role: "role".to_string(),
        }
    }
}

/// A user as the identity store hands it out. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub user_name: String,
    pub roles: Vec<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// Ordered claims for one sign-in / token-issuance operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Vec<Claim>);

impl ClaimSet {
    pub fn push(&mut self, claim_type: impl Into<String>, value: impl Into<String>) {
        self.0.push(Claim::new(claim_type, value));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Claim> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values_of<'a>(&'a self, claim_type: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }

    /// Keep only claims whose type passes `keep`. Order is preserved.
    pub fn retain_types(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|c| keep(&c.claim_type));
    }
}

impl<'a> IntoIterator for &'a ClaimSet {
    type Item = &'a Claim;
    type IntoIter = std::slice::Iter<'a, Claim>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Subject, then name, then one role claim per role in the order the store gave them.
///
/// No validation: an empty user name still yields a name claim.
pub fn map_user(user: &UserRecord, types: &ClaimTypeMap) -> ClaimSet {
    let mut claims = ClaimSet(Vec::with_capacity(2 + user.roles.len()));
    claims.push(types.subject.as_str(), user.id.as_str());
    claims.push(types.name.as_str(), user.user_name.as_str());
    for role in &user.roles {
        claims.push(types.role.as_str(), role.as_str());
    }
    claims
}

/// `map_user` bound to a fixed `ClaimTypeMap`.
#[derive(Debug, Clone, Default)]
pub struct ClaimsMapper {
    types: ClaimTypeMap,
}

impl ClaimsMapper {
    pub fn new(types: ClaimTypeMap) -> Self {
        Self { types }
    }

    pub fn claim_types(&self) -> &ClaimTypeMap {
        &self.types
    }

    pub fn map(&self, user: &UserRecord) -> ClaimSet {
        map_user(user, &self.types)
    }
}
