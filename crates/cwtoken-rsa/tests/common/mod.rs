//! Shared fixtures for RSA provider integration tests
//!
//! Key generation is slow, so each key is generated once per test binary.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use base64::{engine::general_purpose::STANDARD, engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use cwtoken::{
    AssertionHandle, CertificateRef, ClaimSet, CodedClaim, Contract, IssuanceConfig,
    ProofDescriptor, ProviderError, ProviderResult, SerializationProvider, SigningProvider,
    TokenDescriptor, TokenFactory,
};
use cwtoken_rsa::RsaSigningProvider;
use rsa::RsaPrivateKey;

pub const ISSUER_KEY: &str = "issuer";
pub const RELYING_PARTY_KEY: &str = "relying-party";
pub const ISSUER_SUBJECT: &str = "CN=CommonWell Token Issuer, O=CommonWell";

pub fn issuer_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048).unwrap())
}

pub fn relying_party_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::rngs::OsRng, 1024).unwrap())
}

/// Provider holding the issuer's private key and the relying party's public key
pub fn provider() -> Arc<RsaSigningProvider> {
    let provider = RsaSigningProvider::new();
    provider.insert_private_key(ISSUER_KEY, issuer_key().clone());
    provider.insert_public_key(RELYING_PARTY_KEY, relying_party_key().to_public_key());
    Arc::new(provider)
}

/// Assertion held between signing and rendering
#[derive(Debug)]
struct SignedAssertion {
    body: String,
    signature: Vec<u8>,
}

/// Renders a flat assertion whose signature covers everything but the
/// `ds:Signature` element, plus compact JWTs
#[derive(Debug, Default)]
pub struct TestSerializer {
    next_id: AtomicU64,
}

impl SerializationProvider for TestSerializer {
    fn create_signed_assertion(
        &self,
        descriptor: &TokenDescriptor,
        signer: &dyn SigningProvider,
    ) -> ProviderResult<Option<AssertionHandle>> {
        let id = format!("_assertion{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut body = format!(r#"<saml:Assertion ID="{id}">"#);
        body.push_str(&format!("<saml:Issuer>{}</saml:Issuer>", descriptor.issuer));
        if let Some(ProofDescriptor::Symmetric { wrapped_key, .. }) = &descriptor.proof {
            body.push_str(&format!(
                "<xenc:CipherValue>{}</xenc:CipherValue>",
                STANDARD.encode(wrapped_key)
            ));
        }
        for claim in &descriptor.claims {
            body.push_str(&format!(
                r#"<saml:Attribute Name="{}">{}</saml:Attribute>"#,
                claim.claim_type, claim.value
            ));
        }
        body.push_str("</saml:Assertion>");

        let credential = &descriptor.signing_credential;
        let signature = signer.sign(
            body.as_bytes(),
            &credential.key_ref,
            &credential.signature_algorithm,
        )?;
        Ok(Some(AssertionHandle::new(
            id,
            descriptor.lifetime.created,
            SignedAssertion { body, signature },
        )))
    }

    fn render(&self, assertion: &AssertionHandle) -> ProviderResult<String> {
        let signed = assertion
            .downcast_ref::<SignedAssertion>()
            .ok_or_else(|| ProviderError::operation("foreign assertion handle"))?;
        let signature = format!(
            "<ds:Signature>{}</ds:Signature></saml:Assertion>",
            STANDARD.encode(&signed.signature)
        );
        Ok(signed.body.replacen("</saml:Assertion>", &signature, 1))
    }

    fn render_compact(
        &self,
        descriptor: &TokenDescriptor,
        signer: &dyn SigningProvider,
    ) -> ProviderResult<String> {
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

    fn read_claims(&self, _token: &str) -> ProviderResult<ClaimSet> {
        Err(ProviderError::operation("claim reading is not implemented"))
    }
}

/// Split a rendered assertion into its signed body and signature
pub fn split_signature(xml: &str) -> (String, Vec<u8>) {
    let start = xml.find("<ds:Signature>").unwrap();
    let end = xml.find("</ds:Signature>").unwrap();
    let value = &xml[start + "<ds:Signature>".len()..end];
    let body = format!("{}{}", &xml[..start], &xml[end + "</ds:Signature>".len()..]);
    (body, STANDARD.decode(value).unwrap())
}

/// Extract the wrapped proof key of a symmetric holder-of-key assertion
pub fn wrapped_key(xml: &str) -> Vec<u8> {
    let start = xml.find("<xenc:CipherValue>").unwrap() + "<xenc:CipherValue>".len();
    let end = xml.find("</xenc:CipherValue>").unwrap();
    STANDARD.decode(&xml[start..end]).unwrap()
}

pub fn signing_certificate(provider: &RsaSigningProvider) -> CertificateRef {
    provider.certificate(ISSUER_KEY, ISSUER_SUBJECT, None).unwrap()
}

pub fn encrypting_certificate(provider: &RsaSigningProvider) -> CertificateRef {
    provider
        .certificate(RELYING_PARTY_KEY, "CN=Relying Party", None)
        .unwrap()
}

pub fn contract(provider: &RsaSigningProvider) -> Contract {
    Contract::builder()
        .subject("Dr. X")
        .subject_id("Dr. X")
        .subject_role(CodedClaim::role("PROVIDER", "234"))
        .purpose_of_use(CodedClaim::purpose_of_use("TREATMENT", "5678"))
        .organization("Acme")
        .organization_id("urn:oid:1.2.3")
        .home_community_id("urn:oid:9.8.7")
        .npi("12345667")
        .expiration(Utc::now() + Duration::days(3))
        .signing_certificate(signing_certificate(provider))
        .build()
        .unwrap()
}

pub fn factory(provider: Arc<RsaSigningProvider>) -> TokenFactory {
    TokenFactory::new(
        IssuanceConfig::default(),
        provider,
        Arc::new(TestSerializer::default()),
    )
}
