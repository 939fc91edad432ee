//! Issued tokens

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::certificate::CertificateRef;
use crate::claims::ClaimSet;
use crate::confirmation::SymmetricKey;
use crate::constants::{SAML2_ID_VALUE_TYPE, SAML2_TOKEN_TYPE};
use crate::descriptor::{SubjectConfirmation, TokenDescriptor};
use crate::error::TokenError;
use crate::Result;

/// WS-Security reference to an issued assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityTokenReference {
    /// Referenced assertion ID
    pub assertion_id: String,
    /// Key identifier value type
    pub value_type: &'static str,
    /// Referenced token type
    pub token_type: &'static str,
    /// Whether the reference is used while the token is attached to the message
    pub attached: bool,
}

impl SecurityTokenReference {
    fn for_assertion(assertion_id: &str, attached: bool) -> Self {
        Self {
            assertion_id: assertion_id.to_string(),
            value_type: SAML2_ID_VALUE_TYPE,
            token_type: SAML2_TOKEN_TYPE,
            attached,
        }
    }
}

/// Key material embedded in a holder-of-key token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofKey {
    /// Signing certificate
    X509(CertificateRef),
    /// Symmetric proof key in the clear, for the requester
    Symmetric(SymmetricKey),
}

/// An issued SAML assertion
#[derive(Debug, Clone)]
pub struct SamlOutputToken {
    /// Signed assertion XML
    pub xml: String,
    /// Assertion ID
    pub assertion_id: String,
    /// Reference used while the token travels with the message
    pub attached_reference: SecurityTokenReference,
    /// Reference used when the token is sent separately
    pub unattached_reference: SecurityTokenReference,
    /// Proof keys, empty for bearer assertions
    pub security_keys: Vec<ProofKey>,
    /// Subject confirmation the assertion was issued with
    pub confirmation: SubjectConfirmation,
    /// Start of the token validity window
    pub valid_from: DateTime<Utc>,
    /// End of the token validity window
    pub valid_to: DateTime<Utc>,
}

impl SamlOutputToken {
    pub(crate) fn references(assertion_id: &str) -> (SecurityTokenReference, SecurityTokenReference) {
        (
            SecurityTokenReference::for_assertion(assertion_id, true),
            SecurityTokenReference::for_assertion(assertion_id, false),
        )
    }
}

/// An issued compact JWT
#[derive(Debug, Clone)]
pub struct JwtOutputToken {
    /// `header.payload.signature`
    pub compact: String,
    /// Decoded header
    pub header: Map<String, Value>,
    /// Profile claims in order
    pub claims: ClaimSet,
    /// `iss`
    pub issuer: String,
    /// `aud`
    pub audience: String,
    /// `nbf`
    pub not_before: DateTime<Utc>,
    /// `exp`
    pub expires: DateTime<Utc>,
}

/// A token issued by [`TokenFactory`](crate::TokenFactory)
#[derive(Debug, Clone)]
pub enum OutputToken {
    /// SAML 2.0 assertion
    Saml(SamlOutputToken),
    /// Compact JWT
    Jwt(JwtOutputToken),
}

impl OutputToken {
    /// Wire form of the token: assertion XML or compact JWT
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Saml(token) => &token.xml,
            Self::Jwt(token) => &token.compact,
        }
    }

    /// SAML assertion, if this is one
    pub fn as_saml(&self) -> Option<&SamlOutputToken> {
        match self {
            Self::Saml(token) => Some(token),
            Self::Jwt(_) => None,
        }
    }

    /// JWT, if this is one
    pub fn as_jwt(&self) -> Option<&JwtOutputToken> {
        match self {
            Self::Jwt(token) => Some(token),
            Self::Saml(_) => None,
        }
    }
}

/// Check a provider-encoded JWT: three segments and the fixed header
pub(crate) fn check_compact(compact: &str) -> Result<Map<String, Value>> {
    let separators = compact.matches('.').count();
    if separators != 2 {
        return Err(TokenError::issuance_failed(format!(
            "compact token has {separators} separators, expected 2"
        )));
    }

    let encoded_header = compact.split('.').next().unwrap_or_default();
    let header_bytes = URL_SAFE_NO_PAD
        .decode(encoded_header)
        .map_err(|e| TokenError::issuance_failed(format!("compact token header is not base64url: {e}")))?;
    let header: Map<String, Value> = serde_json::from_slice(&header_bytes)
        .map_err(|e| TokenError::issuance_failed(format!("compact token header is not JSON: {e}")))?;

    if header != TokenDescriptor::jwt_header() {
        return Err(TokenError::issuance_failed(format!(
            "compact token header {} does not match the issued header",
            Value::Object(header)
        )));
    }

    Ok(header)
}
