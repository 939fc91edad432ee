//! Certificate handles passed to the engine
//!
//! A [`CertificateRef`] names a key held by a [`SigningProvider`](crate::SigningProvider)
//! and carries the public parts of the certificate the engine needs to build
//! key identifiers. Private key bytes never cross this boundary.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Public parameters of an RSA key the signing provider can use directly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaKeyParameters {
    /// Big-endian modulus
    pub modulus: Vec<u8>,
    /// Big-endian public exponent
    pub exponent: Vec<u8>,
}

/// Opaque reference to a certificate and its private key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRef {
    key_ref: String,
    subject_name: String,
    raw_data: Vec<u8>,
    rsa_key: Option<RsaKeyParameters>,
}

impl CertificateRef {
    /// Create a certificate handle
    ///
    /// `key_ref` is resolved by the signing provider, `raw_data` is the DER
    /// encoding of the certificate.
    pub fn new(
        key_ref: impl Into<String>,
        subject_name: impl Into<String>,
        raw_data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            key_ref: key_ref.into(),
            subject_name: subject_name.into(),
            raw_data: raw_data.into(),
            rsa_key: None,
        }
    }

    /// Declare that the provider holds an RSA private key for this certificate
    pub fn with_rsa_key(mut self, parameters: RsaKeyParameters) -> Self {
        self.rsa_key = Some(parameters);
        self
    }

    /// Provider key reference
    pub fn key_ref(&self) -> &str {
        &self.key_ref
    }

    /// Certificate subject name, used as the token issuer
    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    /// DER encoding of the certificate
    pub fn raw_data(&self) -> &[u8] {
        &self.raw_data
    }

    /// RSA key parameters, if the provider exposes an RSA private key
    pub fn rsa_key(&self) -> Option<&RsaKeyParameters> {
        self.rsa_key.as_ref()
    }

    /// Lower-case hex SHA-256 thumbprint of the certificate
    pub fn thumbprint(&self) -> String {
        hex::encode(Sha256::digest(&self.raw_data))
    }
}
