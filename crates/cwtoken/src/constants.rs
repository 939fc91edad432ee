//! Wire constants shared by every issued token.
//!
//! These values are compared byte-for-byte by relying parties and must not be
//! reformatted.

/// Token type URI of a SAML 2.0 assertion (WS-Security SAML token profile 1.1)
pub const SAML2_TOKEN_TYPE: &str =
    "http://docs.oasis-open.org/wss/oasis-wss-saml-token-profile-1.1#SAMLV2.0";

/// Token type of a compact JSON Web Token
pub const JWT_TOKEN_TYPE: &str = "JWT";

/// Value type of a SAML 2.0 assertion reference
pub const SAML2_ASSERTION_VALUE_TYPE: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

/// Value type of a key identifier that references an assertion by its ID
pub const SAML2_ID_VALUE_TYPE: &str =
    "http://docs.oasis-open.org/wss/oasis-wss-saml-token-profile-1.1#SAMLID";

/// Audience every token is issued for
pub const AUDIENCE: &str = "urn:commonwellalliance.org";

/// WS-Trust key types
pub mod key_type {
    /// Bearer token, no proof key
    pub const BEARER: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Bearer";
    /// Symmetric proof key
    pub const SYMMETRIC: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/SymmetricKey";
    /// Asymmetric (public) proof key
    pub const ASYMMETRIC: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/PublicKey";
}

/// SAML 2.0 subject confirmation methods
pub mod confirmation_method {
    /// Bearer confirmation
    pub const BEARER: &str = "urn:oasis:names:tc:SAML:2.0:cm:bearer";
    /// Holder-of-key confirmation
    pub const HOLDER_OF_KEY: &str = "urn:oasis:names:tc:SAML:2.0:cm:holder-of-key";
    /// Sender-vouches confirmation
    pub const SENDER_VOUCHES: &str = "urn:oasis:names:tc:SAML:2.0:cm:sender-vouches";
}

/// HL7 v3 namespace of coded claim elements
pub const HL7_V3_NAMESPACE: &str = "urn:hl7-org:v3";

/// XML Schema instance namespace
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Fixed JWT header values
pub const JWT_HEADER_TYPE: &str = "JWT";
/// JWS algorithm of every issued JWT
pub const JWT_HEADER_ALGORITHM: &str = "RS256";

/// Validity of a SAML output token, independent of the requested expiration
pub const SAML_OUTPUT_VALIDITY_HOURS: i64 = 8;
