//! Signing and encrypting credentials
//!
//! Credentials only describe keys and algorithms. Signing itself happens in
//! the [`SigningProvider`](crate::SigningProvider) the credential's key
//! reference points into.

use serde::{Deserialize, Serialize};

use crate::algorithm::{uri, AlgorithmSuite};
use crate::certificate::{CertificateRef, RsaKeyParameters};
use crate::error::TokenError;
use crate::Result;

/// How a relying party locates the key that signed or encrypted a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyIdentifier {
    /// Full DER encoding of the X.509 certificate
    X509RawData(Vec<u8>),
    /// RSA public key value
    RsaKeyValue(RsaKeyParameters),
}

/// Kind of key a credential signs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SigningKeyKind {
    /// Certificate-backed key identified by the certificate
    X509,
    /// Bare RSA key identified by its key value
    Rsa,
}

/// Key and algorithms a token is signed with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningCredential {
    /// Provider key reference
    pub key_ref: String,
    /// Kind of signing key
    pub kind: SigningKeyKind,
    /// Identifier embedded in the signature
    pub key_identifier: KeyIdentifier,
    /// Signature algorithm URI
    pub signature_algorithm: String,
    /// Digest algorithm URI
    pub digest_algorithm: String,
}

impl SigningCredential {
    /// JWS `alg` value for the signature algorithm, if it has one
    pub fn jws_algorithm(&self) -> Option<&'static str> {
        match self.signature_algorithm.as_str() {
            uri::RSA_SHA256 => Some("RS256"),
            uri::RSA_SHA384 => Some("RS384"),
            uri::RSA_SHA512 => Some("RS512"),
            _ => None,
        }
    }
}

/// Build the credential a SAML assertion is signed with
///
/// With `use_rsa_signing` the certificate's RSA key is used directly and
/// identified by its key value. Otherwise the certificate itself identifies
/// the key.
///
/// # Errors
///
/// Returns [`TokenError::InvalidInput`] when RSA signing is requested but the
/// certificate exposes no RSA private key, or when the certificate has no raw
/// data to identify it by.
pub fn build_signing_credential(
    certificate: &CertificateRef,
    use_rsa_signing: bool,
    suite: &AlgorithmSuite,
) -> Result<SigningCredential> {
    if use_rsa_signing {
        let rsa_key = certificate.rsa_key().ok_or_else(|| {
            TokenError::invalid_input("signing certificate must include a private key for RSA signature")
        })?;

        return Ok(SigningCredential {
            key_ref: certificate.key_ref().to_string(),
            kind: SigningKeyKind::Rsa,
            key_identifier: KeyIdentifier::RsaKeyValue(rsa_key.clone()),
            signature_algorithm: suite.asymmetric_signature.to_string(),
            digest_algorithm: suite.digest.to_string(),
        });
    }

    x509_credential(certificate, suite)
}

/// Build the credential a JWT is signed with (always X.509, RSA-SHA256)
///
/// # Errors
///
/// Returns [`TokenError::InvalidInput`] when the certificate has no raw data.
pub fn build_jwt_signing_credential(certificate: &CertificateRef) -> Result<SigningCredential> {
    x509_credential(certificate, &AlgorithmSuite::JWT)
}

fn x509_credential(certificate: &CertificateRef, suite: &AlgorithmSuite) -> Result<SigningCredential> {
    if certificate.raw_data().is_empty() {
        return Err(TokenError::invalid_input("signing certificate has no raw data"));
    }

    Ok(SigningCredential {
        key_ref: certificate.key_ref().to_string(),
        kind: SigningKeyKind::X509,
        key_identifier: KeyIdentifier::X509RawData(certificate.raw_data().to_vec()),
        signature_algorithm: suite.asymmetric_signature.to_string(),
        digest_algorithm: suite.digest.to_string(),
    })
}

/// Certificate and algorithms an assertion is encrypted for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptingCredential {
    /// Recipient certificate
    pub certificate: CertificateRef,
    /// Identifier of the recipient key
    pub key_identifier: KeyIdentifier,
    /// Key transport algorithm URI
    pub key_wrap_algorithm: String,
    /// Derived key length in bits
    pub key_derivation_length: u32,
    /// Bulk encryption algorithm URI
    pub encryption_algorithm: String,
}

/// Build the credential an assertion is encrypted with
pub fn build_encrypting_credential(
    certificate: &CertificateRef,
    suite: &AlgorithmSuite,
) -> EncryptingCredential {
    EncryptingCredential {
        certificate: certificate.clone(),
        key_identifier: KeyIdentifier::X509RawData(certificate.raw_data().to_vec()),
        key_wrap_algorithm: suite.asymmetric_key_wrap.to_string(),
        key_derivation_length: suite.encryption_key_derivation_length,
        encryption_algorithm: suite.encryption.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn certificate() -> CertificateRef {
        CertificateRef::new("signing", "CN=Issuer", vec![0x30, 0x82])
    }

    #[test]
    fn test_x509_credential_identifies_certificate() {
        let credential =
            build_signing_credential(&certificate(), false, &AlgorithmSuite::BASIC256).unwrap();
        assert_eq!(credential.kind, SigningKeyKind::X509);
        assert_eq!(credential.key_identifier, KeyIdentifier::X509RawData(vec![0x30, 0x82]));
        assert_eq!(credential.signature_algorithm, uri::RSA_SHA1);
        assert_eq!(credential.digest_algorithm, uri::SHA1);
    }

    #[test]
    fn test_rsa_signing_requires_rsa_key() {
        let err =
            build_signing_credential(&certificate(), true, &AlgorithmSuite::default()).unwrap_err();
        assert!(err.is_input_error());
        assert!(err.to_string().contains("private key for RSA signature"));
    }

    #[test]
    fn test_rsa_credential_uses_key_value() {
        let params = RsaKeyParameters {
            modulus: vec![0xAB; 4],
            exponent: vec![1, 0, 1],
        };
        let cert = certificate().with_rsa_key(params.clone());
        let credential = build_signing_credential(&cert, true, &AlgorithmSuite::default()).unwrap();
        assert_eq!(credential.kind, SigningKeyKind::Rsa);
        assert_eq!(credential.key_identifier, KeyIdentifier::RsaKeyValue(params));
        assert_eq!(credential.jws_algorithm(), Some("RS256"));
    }

    #[test]
    fn test_jwt_credential_is_rs256() {
        let credential = build_jwt_signing_credential(&certificate()).unwrap();
        assert_eq!(credential.kind, SigningKeyKind::X509);
        assert_eq!(credential.jws_algorithm(), Some("RS256"));
        assert_eq!(credential.digest_algorithm, uri::SHA256);

        let empty = CertificateRef::new("k", "CN=Empty", Vec::new());
        assert!(build_jwt_signing_credential(&empty).unwrap_err().is_input_error());
    }

    #[test]
    fn test_encrypting_credential_follows_suite() {
        let credential = build_encrypting_credential(&certificate(), &AlgorithmSuite::BASIC128);
        assert_eq!(credential.key_wrap_algorithm, uri::RSA_OAEP_MGF1P);
        assert_eq!(credential.key_derivation_length, 128);
        assert_eq!(credential.encryption_algorithm, uri::AES128_CBC);
    }
}
