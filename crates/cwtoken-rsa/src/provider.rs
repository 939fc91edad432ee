//! In-memory RSA signing provider

use std::collections::HashMap;
use std::fmt;

use cwtoken::{CertificateRef, ProviderError, ProviderResult, RsaKeyParameters, SigningProvider};
use parking_lot::RwLock;
use rsa::pkcs8::EncodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::debug;

use crate::algorithm::{KeyTransport, SignatureAlgorithm};

enum KeyEntry {
    Private(RsaPrivateKey),
    Public(RsaPublicKey),
}

impl KeyEntry {
    fn public_key(&self) -> RsaPublicKey {
        match self {
            Self::Private(key) => key.to_public_key(),
            Self::Public(key) => key.clone(),
        }
    }
}

/// RSA keys held in memory, addressed by key reference
///
/// Private keys sign and are exposed to the engine through
/// [`CertificateRef::with_rsa_key`]. Public-only keys (relying parties) can
/// only be wrapped for.
#[derive(Default)]
pub struct RsaSigningProvider {
    keys: RwLock<HashMap<String, KeyEntry>>,
}

impl RsaSigningProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a private key
    pub fn insert_private_key(&self, key_ref: impl Into<String>, key: RsaPrivateKey) {
        self.keys.write().insert(key_ref.into(), KeyEntry::Private(key));
    }

    /// Register a public key that proof keys can be wrapped for
    pub fn insert_public_key(&self, key_ref: impl Into<String>, key: RsaPublicKey) {
        self.keys.write().insert(key_ref.into(), KeyEntry::Public(key));
    }

    /// Generate and register a private key of `bits` bits
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Operation`] when key generation fails.
    pub fn generate_private_key(
        &self,
        key_ref: impl Into<String>,
        bits: usize,
    ) -> ProviderResult<RsaPublicKey> {
        let key_ref = key_ref.into();
        let mut rng = rand::rngs::OsRng;
        let key = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| ProviderError::operation(format!("RSA key generation failed: {e}")))?;
        let public = key.to_public_key();
        debug!(key_ref = %key_ref, bits, "Generated RSA key");
        self.insert_private_key(key_ref, key);
        Ok(public)
    }

    /// Remove a key; returns whether it was present
    pub fn remove_key(&self, key_ref: &str) -> bool {
        self.keys.write().remove(key_ref).is_some()
    }

    /// Public key registered under `key_ref`
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::KeyNotFound`] for unknown references.
    pub fn public_key(&self, key_ref: &str) -> ProviderResult<RsaPublicKey> {
        self.keys
            .read()
            .get(key_ref)
            .map(KeyEntry::public_key)
            .ok_or_else(|| key_not_found(key_ref))
    }

    /// Build a certificate handle for a registered key
    ///
    /// `certificate_der` is the DER encoding of the X.509 certificate issued
    /// for the key. Without one, the DER `SubjectPublicKeyInfo` identifies the
    /// key. Private keys are advertised as usable for RSA signing.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::KeyNotFound`] for unknown references and
    /// [`ProviderError::Operation`] when the public key cannot be encoded.
    pub fn certificate(
        &self,
        key_ref: &str,
        subject_name: &str,
        certificate_der: Option<Vec<u8>>,
    ) -> ProviderResult<CertificateRef> {
        let keys = self.keys.read();
        let entry = keys.get(key_ref).ok_or_else(|| key_not_found(key_ref))?;
        let public = entry.public_key();

        let raw_data = match certificate_der {
            Some(der) => der,
            None => public
                .to_public_key_der()
                .map_err(|e| ProviderError::operation(format!("public key encoding failed: {e}")))?
                .as_bytes()
                .to_vec(),
        };

        let certificate = CertificateRef::new(key_ref, subject_name, raw_data);
        Ok(match entry {
            KeyEntry::Private(_) => certificate.with_rsa_key(RsaKeyParameters {
                modulus: public.n().to_bytes_be(),
                exponent: public.e().to_bytes_be(),
            }),
            KeyEntry::Public(_) => certificate,
        })
    }
}

fn key_not_found(key_ref: &str) -> ProviderError {
    ProviderError::KeyNotFound {
        key_ref: key_ref.to_string(),
    }
}

impl fmt::Debug for RsaSigningProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = self.keys.read();
        let mut refs: Vec<&String> = keys.keys().collect();
        refs.sort();
        f.debug_struct("RsaSigningProvider")
            .field("keys", &refs)
            .finish()
    }
}

impl SigningProvider for RsaSigningProvider {
    fn sign(&self, payload: &[u8], key_ref: &str, algorithm: &str) -> ProviderResult<Vec<u8>> {
        let algorithm = SignatureAlgorithm::from_identifier(algorithm)?;
        let keys = self.keys.read();
        let key = match keys.get(key_ref) {
            Some(KeyEntry::Private(key)) => key,
            Some(KeyEntry::Public(_)) => {
                return Err(ProviderError::operation(format!(
                    "key {key_ref} has no private part"
                )))
            }
            None => return Err(key_not_found(key_ref)),
        };

        let signature = algorithm
            .sign(key, payload)
            .map_err(|e| ProviderError::operation(format!("RSA signature failed: {e}")))?;
        debug!(key_ref, ?algorithm, payload_len = payload.len(), "Signed payload");
        Ok(signature)
    }

    fn wrap_key(
        &self,
        key: &[u8],
        certificate: &CertificateRef,
        algorithm: &str,
    ) -> ProviderResult<Vec<u8>> {
        let transport = KeyTransport::from_identifier(algorithm)?;
        let public = self.public_key(certificate.key_ref())?;

        let wrapped = transport
            .encrypt(&public, key)
            .map_err(|e| ProviderError::operation(format!("RSA key transport failed: {e}")))?;
        debug!(key_ref = certificate.key_ref(), ?transport, "Wrapped key");
        Ok(wrapped)
    }
}
