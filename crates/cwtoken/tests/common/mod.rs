//! Common test utilities for issuance integration tests
//!
//! Provides a deterministic signing provider, a serialization provider that
//! renders a minimal SAML assertion and compact JWTs (and reads both back),
//! plus contract fixtures.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use base64::{engine::general_purpose::STANDARD, engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use cwtoken::{
    AssertionHandle, CertificateRef, ClaimSet, CodedClaim, Contract, ContractBuilder,
    IssuanceConfig, ProviderError, ProviderResult, RsaKeyParameters, SerializationProvider,
    SigningProvider, TokenDescriptor, TokenFactory,
};
use sha2::{Digest, Sha256};

pub const ORGANIZATION: &str = "CommonWell Token Organization";
pub const ORGANIZATION_ID: &str = "urn:oid:1.2.3.4.5.6.7.8";
pub const HOME_COMMUNITY_ID: &str = "urn:oid:9.8.7.6.5.4.3";
pub const NPI: &str = "12345667";
pub const SUBJECT: &str = "Dr. Vladmir Zhivago";
pub const SIGNING_KEY: &str = "signing-key";
pub const ENCRYPTING_KEY: &str = "relying-party-key";

/// One call made to the signing provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerCall {
    Sign { key_ref: String, algorithm: String },
    Wrap { key_ref: String, algorithm: String },
}

/// Signs with SHA-256(key_ref || payload) and wraps by XOR with the certificate hash
#[derive(Debug, Default)]
pub struct FakeSigner {
    calls: Mutex<Vec<SignerCall>>,
}

impl FakeSigner {
    pub fn calls(&self) -> Vec<SignerCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Reverse of [`SigningProvider::wrap_key`]
    pub fn unwrap_key(wrapped: &[u8], certificate: &CertificateRef) -> Vec<u8> {
        xor_with_certificate(wrapped, certificate)
    }
}

fn xor_with_certificate(bytes: &[u8], certificate: &CertificateRef) -> Vec<u8> {
    let pad = Sha256::digest(certificate.raw_data());
    bytes
        .iter()
        .zip(pad.iter().cycle())
        .map(|(b, p)| b ^ p)
        .collect()
}

impl SigningProvider for FakeSigner {
    fn sign(&self, payload: &[u8], key_ref: &str, algorithm: &str) -> ProviderResult<Vec<u8>> {
        self.calls.lock().unwrap().push(SignerCall::Sign {
            key_ref: key_ref.to_string(),
            algorithm: algorithm.to_string(),
        });
        if key_ref == "unknown" {
            return Err(ProviderError::KeyNotFound {
                key_ref: key_ref.to_string(),
            });
        }
        let mut hasher = Sha256::new();
        hasher.update(key_ref.as_bytes());
        hasher.update(payload);
        Ok(hasher.finalize().to_vec())
    }

    fn wrap_key(
        &self,
        key: &[u8],
        certificate: &CertificateRef,
        algorithm: &str,
    ) -> ProviderResult<Vec<u8>> {
        self.calls.lock().unwrap().push(SignerCall::Wrap {
            key_ref: certificate.key_ref().to_string(),
            algorithm: algorithm.to_string(),
        });
        Ok(xor_with_certificate(key, certificate))
    }
}

/// Renders a minimal signed SAML assertion and compact JWTs
#[derive(Debug, Default)]
pub struct FakeSerializer {
    /// Make `create_signed_assertion` return `None`
    pub fail_assertion: bool,
    last_descriptor: Mutex<Option<TokenDescriptor>>,
}

impl FakeSerializer {
    pub fn failing() -> Self {
        Self {
            fail_assertion: true,
            ..Self::default()
        }
    }

    /// Descriptor handed to the most recent assertion or compact call
    pub fn last_descriptor(&self) -> Option<TokenDescriptor> {
        self.last_descriptor.lock().unwrap().clone()
    }

    fn record(&self, descriptor: &TokenDescriptor) {
        *self.last_descriptor.lock().unwrap() = Some(descriptor.clone());
    }
}

impl SerializationProvider for FakeSerializer {
    fn create_signed_assertion(
        &self,
        descriptor: &TokenDescriptor,
        signer: &dyn SigningProvider,
    ) -> ProviderResult<Option<AssertionHandle>> {
        self.record(descriptor);
        if self.fail_assertion {
            return Ok(None);
        }

        let id = format!("_{}", uuid::Uuid::new_v4().simple());
        let issue_instant = descriptor.lifetime.created;
        let unsigned = assertion_xml(&id, issue_instant, descriptor, None);
        let signature = signer.sign(
            unsigned.as_bytes(),
            &descriptor.signing_credential.key_ref,
            &descriptor.signing_credential.signature_algorithm,
        )?;
        let signed = assertion_xml(&id, issue_instant, descriptor, Some(&STANDARD.encode(signature)));

        Ok(Some(AssertionHandle::new(id, issue_instant, signed)))
    }

    fn render(&self, assertion: &AssertionHandle) -> ProviderResult<String> {
        assertion
            .downcast_ref::<String>()
            .cloned()
            .ok_or_else(|| ProviderError::operation("foreign assertion handle"))
    }

    fn render_compact(
        &self,
        descriptor: &TokenDescriptor,
        signer: &dyn SigningProvider,
    ) -> ProviderResult<String> {
        self.record(descriptor);
        let credential = &descriptor.signing_credential;
        let algorithm = credential
            .jws_algorithm()
            .ok_or_else(|| ProviderError::UnsupportedAlgorithm {
                algorithm: credential.signature_algorithm.clone(),
            })?;
        let header = serde_json::Value::Object(TokenDescriptor::jwt_header()).to_string();
        let payload = serde_json::Value::Object(descriptor.jwt_payload()).to_string();
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = signer.sign(signing_input.as_bytes(), &credential.key_ref, algorithm)?;
        Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    fn read_claims(&self, token: &str) -> ProviderResult<ClaimSet> {
        if token.starts_with('<') {
            read_assertion_claims(token)
        } else {
            read_jwt_claims(token)
        }
    }
}

fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn assertion_xml(
    id: &str,
    issue_instant: DateTime<Utc>,
    descriptor: &TokenDescriptor,
    signature: Option<&str>,
) -> String {
    let mut xml = format!(
        r#"<saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="{id}" IssueInstant="{}" Version="2.0">"#,
        timestamp(issue_instant)
    );
    xml.push_str(&format!("<saml:Issuer>{}</saml:Issuer>", escape(&descriptor.issuer)));
    if let Some(signature) = signature {
        xml.push_str(&format!(
            r#"<ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#" Algorithm="{}">{signature}</ds:Signature>"#,
            descriptor.signing_credential.signature_algorithm
        ));
    }
    if let Some(confirmation) = &descriptor.confirmation {
        xml.push_str(&format!(
            r#"<saml:Subject><saml:SubjectConfirmation Method="{}"/></saml:Subject>"#,
            confirmation.method
        ));
    }
    xml.push_str(&format!(
        r#"<saml:Conditions NotBefore="{}" NotOnOrAfter="{}"><saml:AudienceRestriction><saml:Audience>{}</saml:Audience></saml:AudienceRestriction></saml:Conditions>"#,
        timestamp(descriptor.lifetime.created),
        timestamp(descriptor.lifetime.expires),
        descriptor.applies_to
    ));
    if let Some(authn) = &descriptor.authentication {
        xml.push_str(&format!(
            r#"<saml:AuthnStatement AuthnInstant="{}"><saml:AuthnContext><saml:AuthnContextClassRef>{}</saml:AuthnContextClassRef></saml:AuthnContext></saml:AuthnStatement>"#,
            timestamp(authn.instant),
            authn.context.as_uri()
        ));
    }
    xml.push_str("<saml:AttributeStatement>");
    for claim in &descriptor.claims {
        xml.push_str(&format!(
            r#"<saml:Attribute Name="{}"><saml:AttributeValue>{}</saml:AttributeValue></saml:Attribute>"#,
            escape(&claim.claim_type),
            escape(&claim.value)
        ));
    }
    xml.push_str("</saml:AttributeStatement></saml:Assertion>");
    xml
}

fn read_assertion_claims(xml: &str) -> ProviderResult<ClaimSet> {
    let mut claims = ClaimSet::new();
    let mut rest = xml;
    while let Some(start) = rest.find(r#"<saml:Attribute Name=""#) {
        rest = &rest[start + r#"<saml:Attribute Name=""#.len()..];
        let (name, after) = rest
            .split_once('"')
            .ok_or_else(|| ProviderError::operation("unterminated attribute name"))?;
        let value_start = after
            .find("<saml:AttributeValue>")
            .ok_or_else(|| ProviderError::operation("attribute without value"))?
            + "<saml:AttributeValue>".len();
        let value_end = after
            .find("</saml:AttributeValue>")
            .ok_or_else(|| ProviderError::operation("unterminated attribute value"))?;
        claims.push(unescape(name), unescape(&after[value_start..value_end]));
        rest = &after[value_end..];
    }
    Ok(claims)
}

fn read_jwt_claims(compact: &str) -> ProviderResult<ClaimSet> {
    let payload = compact
        .split('.')
        .nth(1)
        .ok_or_else(|| ProviderError::operation("compact token without payload"))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| ProviderError::operation(e.to_string()))?;
    let object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(&bytes).map_err(|e| ProviderError::operation(e.to_string()))?;

    Ok(object
        .into_iter()
        .filter(|(name, _)| !matches!(name.as_str(), "iss" | "aud" | "nbf" | "exp"))
        .filter_map(|(name, value)| match value {
            serde_json::Value::String(value) => Some(cwtoken::Claim::new(name, value)),
            _ => None,
        })
        .collect())
}

/// Decode the JSON payload of a compact JWT
pub fn jwt_payload(compact: &str) -> serde_json::Map<String, serde_json::Value> {
    let payload = compact.split('.').nth(1).unwrap();
    serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap()
}

/// Decode the JSON header of a compact JWT as its raw string
pub fn jwt_header_json(compact: &str) -> String {
    let header = compact.split('.').next().unwrap();
    String::from_utf8(URL_SAFE_NO_PAD.decode(header).unwrap()).unwrap()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn unescape(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&amp;", "&")
}

pub fn signing_certificate() -> CertificateRef {
    CertificateRef::new(
        SIGNING_KEY,
        "CN=CommonWell Token Issuer, O=CommonWell",
        b"signing certificate der".to_vec(),
    )
}

pub fn rsa_signing_certificate() -> CertificateRef {
    signing_certificate().with_rsa_key(RsaKeyParameters {
        modulus: vec![0xC3; 256],
        exponent: vec![0x01, 0x00, 0x01],
    })
}

pub fn encrypting_certificate() -> CertificateRef {
    CertificateRef::new(
        ENCRYPTING_KEY,
        "CN=Relying Party",
        b"relying party certificate der".to_vec(),
    )
}

/// The reference contract: every optional field filled in
pub fn contract_builder() -> ContractBuilder {
    Contract::builder()
        .issuer("CommonWell")
        .subject(SUBJECT)
        .subject_id(SUBJECT)
        .subject_role(CodedClaim::role("PROVIDER", "234"))
        .purpose_of_use(CodedClaim::purpose_of_use("TREATMENT", "5678"))
        .organization(ORGANIZATION)
        .organization_id(ORGANIZATION_ID)
        .home_community_id(HOME_COMMUNITY_ID)
        .npi(NPI)
        .expiration(Utc::now() + Duration::days(3))
        .signing_certificate(signing_certificate())
}

pub fn contract() -> Contract {
    contract_builder().build().unwrap()
}

pub struct Harness {
    pub factory: TokenFactory,
    pub signer: Arc<FakeSigner>,
    pub serializer: Arc<FakeSerializer>,
}

pub fn harness() -> Harness {
    harness_with(IssuanceConfig::default(), FakeSerializer::default())
}

pub fn harness_with(config: IssuanceConfig, serializer: FakeSerializer) -> Harness {
    let signer = Arc::new(FakeSigner::default());
    let serializer = Arc::new(serializer);
    let factory = TokenFactory::new(config, signer.clone(), serializer.clone());
    Harness {
        factory,
        signer,
        serializer,
    }
}
