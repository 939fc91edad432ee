//! Issuance contracts
//!
//! A contract describes one token to issue: who the subject is, which
//! organization vouches for them, why they are asking, and with which
//! certificate the token is signed. [`TokenContract`] selects between a SAML
//! assertion and a JWT.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::algorithm::AlgorithmSuite;
use crate::authentication::AuthenticationContext;
use crate::certificate::CertificateRef;
use crate::coded::CodedClaim;
use crate::constants::confirmation_method;
use crate::constants::key_type;
use crate::error::TokenError;
use crate::Result;

/// Fields shared by every token contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Requesting issuer
    pub issuer: String,
    /// Subject name (IUA `sub`)
    pub subject: String,
    /// Subject identifier
    pub subject_id: String,
    /// Subject role
    pub subject_role: CodedClaim,
    /// Purpose of use
    pub purpose_of_use: CodedClaim,
    /// Subject organization name
    pub organization: String,
    /// Subject organization identifier
    pub organization_id: Url,
    /// Home community identifier
    pub home_community_id: Option<Url>,
    /// National provider identifier
    pub npi: Option<String>,
    /// Requested token expiration
    pub expiration: DateTime<Utc>,
    /// Hash of the payload the token authorizes
    pub payload_hash: Option<String>,
    /// Certificate the token is signed with
    pub signing_certificate: CertificateRef,
}

impl Contract {
    /// Start building a contract
    pub fn builder() -> ContractBuilder {
        ContractBuilder::default()
    }

    /// NPI, if present and non-empty
    pub fn npi(&self) -> Option<&str> {
        self.npi.as_deref().filter(|npi| !npi.is_empty())
    }

    /// Payload hash, if present and non-empty
    pub fn payload_hash(&self) -> Option<&str> {
        self.payload_hash.as_deref().filter(|hash| !hash.is_empty())
    }

    /// Home community identifier, if present
    pub fn home_community_id(&self) -> Option<&str> {
        self.home_community_id.as_ref().map(Url::as_str)
    }
}

/// Builder for [`Contract`]
#[derive(Debug, Default, Clone)]
pub struct ContractBuilder {
    issuer: Option<String>,
    subject: Option<String>,
    subject_id: Option<String>,
    subject_role: Option<CodedClaim>,
    purpose_of_use: Option<CodedClaim>,
    organization: Option<String>,
    organization_id: Option<String>,
    home_community_id: Option<String>,
    npi: Option<String>,
    expiration: Option<DateTime<Utc>>,
    payload_hash: Option<String>,
    signing_certificate: Option<CertificateRef>,
}

impl ContractBuilder {
    /// Set the requesting issuer
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Set the subject name
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the subject identifier
    pub fn subject_id(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    /// Set the subject role
    pub fn subject_role(mut self, role: CodedClaim) -> Self {
        self.subject_role = Some(role);
        self
    }

    /// Set the purpose of use
    pub fn purpose_of_use(mut self, purpose: CodedClaim) -> Self {
        self.purpose_of_use = Some(purpose);
        self
    }

    /// Set the organization name
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Set the organization identifier URI
    pub fn organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Set the home community identifier URI
    pub fn home_community_id(mut self, home_community_id: impl Into<String>) -> Self {
        self.home_community_id = Some(home_community_id.into());
        self
    }

    /// Set the national provider identifier
    pub fn npi(mut self, npi: impl Into<String>) -> Self {
        self.npi = Some(npi.into());
        self
    }

    /// Set the requested expiration
    pub fn expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Set the payload hash
    pub fn payload_hash(mut self, payload_hash: impl Into<String>) -> Self {
        self.payload_hash = Some(payload_hash.into());
        self
    }

    /// Set the signing certificate
    pub fn signing_certificate(mut self, certificate: CertificateRef) -> Self {
        self.signing_certificate = Some(certificate);
        self
    }

    /// Build the contract
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidInput`] when a required field is missing or
    /// a URI field does not parse.
    pub fn build(self) -> Result<Contract> {
        let organization_id = required(self.organization_id, "organization_id")?;
        let organization_id = parse_uri("organization_id", organization_id)?;
        let home_community_id = self
            .home_community_id
            .filter(|hcid| !hcid.is_empty())
            .map(|hcid| parse_uri("home_community_id", hcid))
            .transpose()?;

        Ok(Contract {
            issuer: self.issuer.unwrap_or_default(),
            subject: self.subject.unwrap_or_default(),
            subject_id: required(self.subject_id, "subject_id")?,
            subject_role: required(self.subject_role, "subject_role")?,
            purpose_of_use: required(self.purpose_of_use, "purpose_of_use")?,
            organization: required(self.organization, "organization")?,
            organization_id,
            home_community_id,
            npi: self.npi,
            expiration: required(self.expiration, "expiration")?,
            payload_hash: self.payload_hash,
            signing_certificate: required(self.signing_certificate, "signing_certificate")?,
        })
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| TokenError::invalid_input(format!("missing required field: {field}")))
}

fn parse_uri(field: &str, value: String) -> Result<Url> {
    Url::parse(&value)
        .map_err(|e| TokenError::invalid_input(format!("{field} is not a valid URI ({e}): {value}")))
}

/// Subject confirmation requested for a SAML assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfirmationKind {
    /// Anyone presenting the assertion may use it
    Bearer,
    /// Presenter proves possession of a symmetric key
    SymmetricHolderOfKey {
        /// Base64 proof key to embed; a fresh key is generated when absent
        symmetric_key_value: Option<String>,
    },
    /// Presenter proves possession of the signing certificate's private key
    AsymmetricHolderOfKey,
    /// An intermediary vouches for the subject (never issued)
    SenderVouches,
}

impl ConfirmationKind {
    /// SAML subject confirmation method URN
    pub fn method_uri(&self) -> &'static str {
        match self {
            Self::Bearer => confirmation_method::BEARER,
            Self::SymmetricHolderOfKey { .. } | Self::AsymmetricHolderOfKey => {
                confirmation_method::HOLDER_OF_KEY
            }
            Self::SenderVouches => confirmation_method::SENDER_VOUCHES,
        }
    }

    /// WS-Trust key type URI
    pub fn key_type(&self) -> &'static str {
        match self {
            Self::Bearer | Self::SenderVouches => key_type::BEARER,
            Self::SymmetricHolderOfKey { .. } => key_type::SYMMETRIC,
            Self::AsymmetricHolderOfKey => key_type::ASYMMETRIC,
        }
    }
}

impl fmt::Display for ConfirmationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bearer => "bearer",
            Self::SymmetricHolderOfKey { .. } => "symmetric-holder-of-key",
            Self::AsymmetricHolderOfKey => "asymmetric-holder-of-key",
            Self::SenderVouches => "sender-vouches",
        })
    }
}

/// Contract for a SAML 2.0 assertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamlContract {
    /// Shared contract fields
    pub base: Contract,
    /// Algorithms the assertion is signed and encrypted with
    pub algorithm_suite: AlgorithmSuite,
    /// Certificate the assertion or proof key is encrypted for
    pub encrypting_certificate: Option<CertificateRef>,
    /// Sign with the certificate's RSA key instead of its X.509 identity
    pub use_rsa_signing: bool,
    /// Requested subject confirmation
    pub confirmation: ConfirmationKind,
    authentication_context: Option<AuthenticationContext>,
}

impl SamlContract {
    /// Create a SAML contract
    pub fn new(base: Contract, confirmation: ConfirmationKind) -> Self {
        Self {
            base,
            algorithm_suite: AlgorithmSuite::default(),
            encrypting_certificate: None,
            use_rsa_signing: false,
            confirmation,
            authentication_context: None,
        }
    }

    /// Bearer assertion
    pub fn bearer(base: Contract) -> Self {
        Self::new(base, ConfirmationKind::Bearer)
    }

    /// Holder-of-key assertion with a symmetric proof key encrypted for `encrypting_certificate`
    pub fn symmetric_holder_of_key(base: Contract, encrypting_certificate: CertificateRef) -> Self {
        Self::new(
            base,
            ConfirmationKind::SymmetricHolderOfKey {
                symmetric_key_value: None,
            },
        )
        .with_encrypting_certificate(encrypting_certificate)
    }

    /// Holder-of-key assertion bound to the signing certificate
    pub fn asymmetric_holder_of_key(base: Contract) -> Self {
        Self::new(base, ConfirmationKind::AsymmetricHolderOfKey)
    }

    /// Sender-vouches assertion
    pub fn sender_vouches(base: Contract) -> Self {
        Self::new(base, ConfirmationKind::SenderVouches)
    }

    /// Use a different algorithm suite
    pub fn with_algorithm_suite(mut self, suite: AlgorithmSuite) -> Self {
        self.algorithm_suite = suite;
        self
    }

    /// Set the encrypting certificate
    pub fn with_encrypting_certificate(mut self, certificate: CertificateRef) -> Self {
        self.encrypting_certificate = Some(certificate);
        self
    }

    /// Choose RSA signing
    pub fn with_rsa_signing(mut self, use_rsa_signing: bool) -> Self {
        self.use_rsa_signing = use_rsa_signing;
        self
    }

    /// Set the authentication context
    pub fn with_authentication_context(mut self, context: AuthenticationContext) -> Self {
        self.authentication_context = Some(context);
        self
    }

    /// Set the authentication context from its class URI
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidInput`] when `uri` is not one of the
    /// supported authentication context classes. The previous value is kept.
    pub fn set_authentication_context(&mut self, uri: &str) -> Result<()> {
        self.authentication_context = Some(uri.parse()?);
        Ok(())
    }

    /// Authentication context, `unspecified` when never set
    pub fn authentication_context(&self) -> AuthenticationContext {
        self.authentication_context.unwrap_or_default()
    }
}

/// Claim vocabulary of a JWT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameOption {
    /// XSPA attribute URNs
    Xspa,
    /// IHE Internet User Authorization claim names
    #[serde(alias = "IUA")]
    Iua,
    /// XSPA URNs plus a payload hash
    Custom,
}

impl NameOption {
    /// Every naming option
    pub const ALL: [Self; 3] = [Self::Xspa, Self::Iua, Self::Custom];
}

impl fmt::Display for NameOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Xspa => "xspa",
            Self::Iua => "iua",
            Self::Custom => "custom",
        })
    }
}

/// Contract for a JWT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtContract {
    /// Shared contract fields
    pub base: Contract,
    /// Claim vocabulary, required at issuance
    pub name_option: Option<NameOption>,
}

impl JwtContract {
    /// Create a JWT contract
    pub fn new(base: Contract, name_option: NameOption) -> Self {
        Self {
            base,
            name_option: Some(name_option),
        }
    }
}

/// The token to issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "token", rename_all = "snake_case")]
pub enum TokenContract {
    /// SAML 2.0 assertion
    Saml(SamlContract),
    /// Compact JWT
    Jwt(JwtContract),
}

impl TokenContract {
    /// Shared contract fields
    pub fn base(&self) -> &Contract {
        match self {
            Self::Saml(contract) => &contract.base,
            Self::Jwt(contract) => &contract.base,
        }
    }

    /// Token kind, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Saml(_) => "saml2",
            Self::Jwt(_) => "jwt",
        }
    }
}

impl From<SamlContract> for TokenContract {
    fn from(contract: SamlContract) -> Self {
        Self::Saml(contract)
    }
}

impl From<JwtContract> for TokenContract {
    fn from(contract: JwtContract) -> Self {
        Self::Jwt(contract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn builder() -> ContractBuilder {
        Contract::builder()
            .subject("Dr. X")
            .subject_id("Dr. X")
            .subject_role(CodedClaim::role("PROVIDER", "234"))
            .purpose_of_use(CodedClaim::purpose_of_use("TREATMENT", "5678"))
            .organization("Acme")
            .organization_id("urn:oid:1.2.3")
            .expiration(Utc::now() + Duration::days(3))
            .signing_certificate(CertificateRef::new("k", "CN=Acme", vec![1]))
    }

    #[test]
    fn test_builder_parses_uri_fields() {
        let contract = builder().home_community_id("urn:oid:9.8.7").build().unwrap();
        assert_eq!(contract.organization_id.as_str(), "urn:oid:1.2.3");
        assert_eq!(contract.home_community_id(), Some("urn:oid:9.8.7"));
    }

    #[test]
    fn test_builder_rejects_missing_and_malformed_fields() {
        let err = Contract::builder().subject_id("x").build().unwrap_err();
        assert!(err.is_input_error());

        let err = builder().organization_id("not a uri").build().unwrap_err();
        assert!(err.to_string().contains("organization_id"));
    }

    #[test]
    fn test_empty_optional_values_read_as_absent() {
        let contract = builder()
            .npi("")
            .payload_hash("")
            .home_community_id("")
            .build()
            .unwrap();
        assert_eq!(contract.npi(), None);
        assert_eq!(contract.payload_hash(), None);
        assert_eq!(contract.home_community_id(), None);
    }

    #[test]
    fn test_authentication_context_defaults_to_unspecified() {
        let mut saml = SamlContract::bearer(builder().build().unwrap());
        assert_eq!(saml.authentication_context(), AuthenticationContext::Unspecified);

        saml.set_authentication_context("urn:oasis:names:tc:SAML:2.0:ac:classes:X509")
            .unwrap();
        assert_eq!(saml.authentication_context(), AuthenticationContext::X509);

        assert!(saml.set_authentication_context("X509").unwrap_err().is_input_error());
        assert_eq!(saml.authentication_context(), AuthenticationContext::X509);
    }

    #[test]
    fn test_saml_contract_round_trips_through_json() {
        // GIVEN: a SAML contract with a non-default suite and context
        let saml = SamlContract::symmetric_holder_of_key(
            builder().npi("12345667").build().unwrap(),
            CertificateRef::new("rp", "CN=Relying Party", vec![2]),
        )
        .with_algorithm_suite(AlgorithmSuite::BASIC128)
        .with_rsa_signing(true)
        .with_authentication_context(AuthenticationContext::TlsClient);
        let contract = TokenContract::from(saml);

        // WHEN: it is serialized and read back
        let json = serde_json::to_value(&contract).unwrap();
        let parsed: TokenContract = serde_json::from_value(json.clone()).unwrap();

        // THEN: nothing is lost and the suite travels by name
        assert_eq!(parsed, contract);
        assert_eq!(json["token"], "saml");
        assert_eq!(json["algorithm_suite"], "Basic128");
        let TokenContract::Saml(saml) = parsed else {
            panic!("expected a SAML contract");
        };
        assert_eq!(saml.authentication_context(), AuthenticationContext::TlsClient);
    }

    #[test]
    fn test_confirmation_kind_uris() {
        let symmetric = ConfirmationKind::SymmetricHolderOfKey {
            symmetric_key_value: None,
        };
        assert_eq!(symmetric.method_uri(), confirmation_method::HOLDER_OF_KEY);
        assert_eq!(symmetric.key_type(), key_type::SYMMETRIC);
        assert_eq!(ConfirmationKind::Bearer.method_uri(), confirmation_method::BEARER);
        assert_eq!(ConfirmationKind::AsymmetricHolderOfKey.key_type(), key_type::ASYMMETRIC);
    }
}
