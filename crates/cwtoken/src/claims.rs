//! Claim profiles
//!
//! Maps a [`Contract`] onto the ordered claim list of one vocabulary. The
//! mapping is pure: the same contract always yields the same claims, except
//! for the IUA `jti` which is a fresh UUID unless supplied by the caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::{Contract, NameOption};

/// XSPA attribute URNs
pub mod xspa {
    /// Subject identifier
    pub const SUBJECT_ID: &str = "urn:oasis:names:tc:xspa:1.0:subject:subject-id";
    /// Subject organization
    pub const ORGANIZATION: &str = "urn:oasis:names:tc:xspa:1.0:subject:organization";
    /// Subject role
    pub const ROLE: &str = "urn:oasis:names:tc:xacml:2.0:subject:role";
    /// Purpose of use
    pub const PURPOSE_OF_USE: &str = "urn:oasis:names:tc:xspa:1.0:subject:purposeofuse";
    /// Subject organization identifier
    pub const ORGANIZATION_ID: &str = "urn:oasis:names:tc:xspa:1.0:subject:organization-id";
    /// National provider identifier
    pub const NPI: &str = "urn:oasis:names:tc:xspa:2.0:subject:npi";
    /// Home community identifier
    pub const HOME_COMMUNITY_ID: &str = "urn:nhin:names:saml:homeCommunityId";
}

/// IHE IUA claim names
pub mod iua {
    /// Token identifier
    pub const JWT_ID: &str = "jti";
    /// Subject
    pub const SUBJECT: &str = "sub";
    /// Subject identifier
    pub const SUBJECT_ID: &str = "SubjectID";
    /// Subject organization
    pub const SUBJECT_ORGANIZATION: &str = "SubjectOrganization";
    /// Subject role
    pub const SUBJECT_ROLE: &str = "SubjectRole";
    /// Purpose of use
    pub const PURPOSE_OF_USE: &str = "PurposeOfUse";
    /// Subject organization identifier
    pub const SUBJECT_ORGANIZATION_ID: &str = "SubjectOrganizationID";
    /// Home community identifier
    pub const HOME_COMMUNITY_ID: &str = "HomeCommunityID";
    /// National provider identifier
    pub const NPI: &str = "NationalProviderIdentifier";
}

/// Custom profile: XSPA URNs plus a payload hash
pub mod custom {
    pub use super::xspa::{
        HOME_COMMUNITY_ID, NPI, ORGANIZATION, ORGANIZATION_ID, PURPOSE_OF_USE, ROLE, SUBJECT_ID,
    };

    /// Hash of the authorized payload
    pub const PAYLOAD_HASH: &str = "urn:payload-hash";
}

/// A single claim
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    /// Claim type (URN or short name, depending on the profile)
    pub claim_type: String,
    /// Claim value
    pub value: String,
}

impl Claim {
    /// Create a claim
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// Ordered list of claims
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Vec<Claim>);

impl ClaimSet {
    /// Create an empty claim set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a claim
    pub fn push(&mut self, claim_type: impl Into<String>, value: impl Into<String>) {
        self.0.push(Claim::new(claim_type, value));
    }

    /// Value of the first claim of `claim_type`
    pub fn get(&self, claim_type: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|claim| claim.claim_type == claim_type)
            .map(|claim| claim.value.as_str())
    }

    /// Whether a claim of `claim_type` is present
    pub fn contains(&self, claim_type: &str) -> bool {
        self.get(claim_type).is_some()
    }

    /// Claim types in order
    pub fn claim_types(&self) -> Vec<&str> {
        self.0.iter().map(|claim| claim.claim_type.as_str()).collect()
    }

    /// Iterate over the claims in order
    pub fn iter(&self) -> std::slice::Iter<'_, Claim> {
        self.0.iter()
    }

    /// Number of claims
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Claims as a JSON object, preserving order
    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.0
            .iter()
            .map(|claim| (claim.claim_type.clone(), serde_json::Value::String(claim.value.clone())))
            .collect()
    }

    /// Display adapter that shows claim types but hides values
    pub fn redacted(&self) -> Redacted<'_> {
        Redacted(self)
    }
}

impl FromIterator<Claim> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = Claim>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ClaimSet {
    type Item = Claim;
    type IntoIter = std::vec::IntoIter<Claim>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ClaimSet {
    type Item = &'a Claim;
    type IntoIter = std::slice::Iter<'a, Claim>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ClaimSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|c| (&c.claim_type, &c.value)))
            .finish()
    }
}

/// See [`ClaimSet::redacted`]
pub struct Redacted<'a>(&'a ClaimSet);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.claim_types()).finish()
    }
}

/// Claim vocabulary and value rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimProfile {
    /// XSPA URNs, coded values rendered as HL7 XML (SAML assertions)
    SamlXspa,
    /// XSPA URNs, coded values as bare codes (JWT)
    Xspa,
    /// IUA short names (JWT)
    Iua,
    /// XSPA URNs plus payload hash (JWT)
    Custom,
}

impl From<NameOption> for ClaimProfile {
    fn from(option: NameOption) -> Self {
        match option {
            NameOption::Xspa => Self::Xspa,
            NameOption::Iua => Self::Iua,
            NameOption::Custom => Self::Custom,
        }
    }
}

/// Map a contract onto a claim profile
pub fn map_claims(contract: &Contract, profile: ClaimProfile) -> ClaimSet {
    map_claims_with_jti(contract, profile, Uuid::new_v4())
}

/// Map a contract onto a claim profile with a caller-supplied IUA `jti`
///
/// Profiles other than [`ClaimProfile::Iua`] ignore `jti`.
pub fn map_claims_with_jti(contract: &Contract, profile: ClaimProfile, jti: Uuid) -> ClaimSet {
    let mut claims = ClaimSet::new();

    match profile {
        ClaimProfile::SamlXspa => {
            claims.push(xspa::SUBJECT_ID, &contract.subject_id);
            claims.push(xspa::ROLE, contract.subject_role.to_xml());
            claims.push(xspa::ORGANIZATION, &contract.organization);
            claims.push(xspa::ORGANIZATION_ID, contract.organization_id.as_str());
            claims.push(xspa::PURPOSE_OF_USE, contract.purpose_of_use.to_xml());
            push_identifiers(&mut claims, contract, xspa::NPI, xspa::HOME_COMMUNITY_ID);
        }
        ClaimProfile::Xspa => {
            claims.push(xspa::SUBJECT_ID, &contract.subject_id);
            claims.push(xspa::ROLE, &contract.subject_role.code);
            claims.push(xspa::ORGANIZATION, &contract.organization);
            claims.push(xspa::ORGANIZATION_ID, contract.organization_id.as_str());
            claims.push(xspa::PURPOSE_OF_USE, &contract.purpose_of_use.code);
            push_identifiers(&mut claims, contract, xspa::NPI, xspa::HOME_COMMUNITY_ID);
        }
        ClaimProfile::Iua => {
            claims.push(iua::JWT_ID, jti.to_string());
            claims.push(iua::SUBJECT, &contract.subject);
            claims.push(iua::SUBJECT_ID, &contract.subject_id);
            claims.push(iua::SUBJECT_ROLE, &contract.subject_role.code);
            claims.push(iua::SUBJECT_ORGANIZATION, &contract.organization);
            claims.push(iua::SUBJECT_ORGANIZATION_ID, contract.organization_id.as_str());
            claims.push(iua::PURPOSE_OF_USE, &contract.purpose_of_use.code);
            push_identifiers(&mut claims, contract, iua::NPI, iua::HOME_COMMUNITY_ID);
        }
        ClaimProfile::Custom => {
            claims.push(custom::SUBJECT_ID, &contract.subject_id);
            claims.push(custom::ROLE, &contract.subject_role.code);
            claims.push(custom::ORGANIZATION, &contract.organization);
            claims.push(custom::ORGANIZATION_ID, contract.organization_id.as_str());
            claims.push(custom::PURPOSE_OF_USE, &contract.purpose_of_use.code);
            if let Some(hash) = contract.payload_hash() {
                claims.push(custom::PAYLOAD_HASH, hash);
            }
            push_identifiers(&mut claims, contract, custom::NPI, custom::HOME_COMMUNITY_ID);
        }
    }

    claims
}

fn push_identifiers(claims: &mut ClaimSet, contract: &Contract, npi: &str, hcid: &str) {
    if let Some(value) = contract.npi() {
        claims.push(npi, value);
    }
    if let Some(value) = contract.home_community_id() {
        claims.push(hcid, value);
    }
}
