//! Token descriptors handed to the serialization provider

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::authentication::AuthenticationStatement;
use crate::claims::ClaimSet;
use crate::confirmation::{ConfirmationStrategy, ProofDescriptor};
use crate::constants::{JWT_HEADER_ALGORITHM, JWT_HEADER_TYPE};
use crate::credentials::{EncryptingCredential, SigningCredential};

/// Validity window of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifetime {
    /// Not valid before
    pub created: DateTime<Utc>,
    /// Not valid on or after
    pub expires: DateTime<Utc>,
}

/// Subject confirmation of a SAML assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectConfirmation {
    /// Confirmation method URN
    pub method: &'static str,
    /// WS-Trust key type URI
    pub key_type: &'static str,
}

impl From<ConfirmationStrategy> for SubjectConfirmation {
    fn from(strategy: ConfirmationStrategy) -> Self {
        Self {
            method: strategy.method_uri(),
            key_type: strategy.key_type(),
        }
    }
}

/// Everything a serialization provider needs to materialize one token
#[derive(Debug, Clone)]
pub struct TokenDescriptor {
    /// Token type URI (`SAML2_TOKEN_TYPE` or `JWT`)
    pub token_type: &'static str,
    /// Issuer name
    pub issuer: String,
    /// Audience
    pub applies_to: String,
    /// Requested validity
    pub lifetime: Lifetime,
    /// Ordered subject claims
    pub claims: ClaimSet,
    /// Credential the token is signed with
    pub signing_credential: SigningCredential,
    /// Credential the token is encrypted with, if any
    pub encrypting_credential: Option<EncryptingCredential>,
    /// Subject confirmation (SAML only)
    pub confirmation: Option<SubjectConfirmation>,
    /// Proof-of-possession material (SAML holder-of-key only)
    pub proof: Option<ProofDescriptor>,
    /// Authentication statement (SAML only)
    pub authentication: Option<AuthenticationStatement>,
}

impl TokenDescriptor {
    /// The fixed JWT header
    pub fn jwt_header() -> Map<String, Value> {
        let mut header = Map::new();
        header.insert("typ".into(), Value::from(JWT_HEADER_TYPE));
        header.insert("alg".into(), Value::from(JWT_HEADER_ALGORITHM));
        header
    }

    /// JWT payload: the claims in order, then `iss`, `aud`, `nbf`, `exp`
    pub fn jwt_payload(&self) -> Map<String, Value> {
        let mut payload = self.claims.to_json_map();
        payload.insert("iss".into(), Value::from(self.issuer.clone()));
        payload.insert("aud".into(), Value::from(self.applies_to.clone()));
        payload.insert("nbf".into(), Value::from(self.lifetime.created.timestamp()));
        payload.insert("exp".into(), Value::from(self.lifetime.expires.timestamp()));
        payload
    }
}
