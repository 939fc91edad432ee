//! Subject confirmation and proof-of-possession material

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use tracing::debug;
use zeroize::Zeroizing;

use crate::contract::{ConfirmationKind, SamlContract};
use crate::credentials::KeyIdentifier;
use crate::error::TokenError;
use crate::provider::SigningProvider;
use crate::Result;

/// Symmetric proof key, zeroed on drop
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey(Zeroizing<Vec<u8>>);

impl SymmetricKey {
    /// Wrap key bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Generate `len` random bytes from the operating system RNG
    pub fn generate(len: usize) -> Self {
        let mut bytes = Zeroizing::new(vec![0u8; len]);
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key length in bits
    pub fn bits(&self) -> usize {
        self.0.len() * 8
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey({} bits, [REDACTED])", self.bits())
    }
}

/// Key material a holder-of-key assertion is bound to
#[derive(Debug, Clone)]
pub enum ProofDescriptor {
    /// Symmetric key, encrypted for the relying party
    Symmetric {
        /// The proof key
        key: SymmetricKey,
        /// Proof key encrypted under the encrypting certificate
        wrapped_key: Vec<u8>,
        /// Key transport algorithm URI
        wrap_algorithm: String,
        /// Certificate the key was encrypted for
        encrypting_key_identifier: KeyIdentifier,
    },
    /// The signing certificate's key pair
    Asymmetric {
        /// Identifier of the signing certificate
        key_identifier: KeyIdentifier,
    },
}

/// Confirmation strategy chosen for an issuance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationStrategy {
    /// No proof of possession
    Bearer,
    /// Symmetric proof key
    SymmetricHolderOfKey,
    /// Signing certificate as proof key
    AsymmetricHolderOfKey,
}

impl ConfirmationStrategy {
    /// Select the strategy for a requested confirmation
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Unsupported`] for sender-vouches.
    pub fn select(kind: &ConfirmationKind) -> Result<Self> {
        match kind {
            ConfirmationKind::Bearer => Ok(Self::Bearer),
            ConfirmationKind::SymmetricHolderOfKey { .. } => Ok(Self::SymmetricHolderOfKey),
            ConfirmationKind::AsymmetricHolderOfKey => Ok(Self::AsymmetricHolderOfKey),
            ConfirmationKind::SenderVouches => {
                Err(TokenError::unsupported("sender-vouches subject confirmation"))
            }
        }
    }

    /// SAML subject confirmation method URN
    pub fn method_uri(self) -> &'static str {
        self.kind_template().method_uri()
    }

    /// WS-Trust key type URI
    pub fn key_type(self) -> &'static str {
        self.kind_template().key_type()
    }

    fn kind_template(self) -> ConfirmationKind {
        match self {
            Self::Bearer => ConfirmationKind::Bearer,
            Self::SymmetricHolderOfKey => ConfirmationKind::SymmetricHolderOfKey {
                symmetric_key_value: None,
            },
            Self::AsymmetricHolderOfKey => ConfirmationKind::AsymmetricHolderOfKey,
        }
    }

    /// Produce the proof material for `contract`
    ///
    /// Bearer yields `None`. Symmetric holder-of-key generates (or decodes) a
    /// key of the suite's length and has `signer` wrap it for the encrypting
    /// certificate. Asymmetric holder-of-key references the signing
    /// certificate.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidInput`] when `contract` requests a
    /// different confirmation, when a symmetric proof has no encrypting
    /// certificate or a malformed supplied key, and [`TokenError::IssuanceFailed`]
    /// when the key cannot be wrapped.
    pub fn proof(
        self,
        contract: &SamlContract,
        signer: &dyn SigningProvider,
    ) -> Result<Option<ProofDescriptor>> {
        match (self, &contract.confirmation) {
            (Self::Bearer, ConfirmationKind::Bearer) => Ok(None),
            (
                Self::SymmetricHolderOfKey,
                ConfirmationKind::SymmetricHolderOfKey {
                    symmetric_key_value,
                },
            ) => symmetric_proof(contract, symmetric_key_value.as_deref(), signer).map(Some),
            (Self::AsymmetricHolderOfKey, ConfirmationKind::AsymmetricHolderOfKey) => {
                let raw_data = contract.base.signing_certificate.raw_data();
                if raw_data.is_empty() {
                    return Err(TokenError::invalid_input(
                        "asymmetric proof requires signing certificate raw data",
                    ));
                }
                Ok(Some(ProofDescriptor::Asymmetric {
                    key_identifier: KeyIdentifier::X509RawData(raw_data.to_vec()),
                }))
            }
            (strategy, requested) => Err(TokenError::invalid_input(format!(
                "contract requests {requested} confirmation but {strategy:?} was selected"
            ))),
        }
    }
}

fn symmetric_proof(
    contract: &SamlContract,
    supplied: Option<&str>,
    signer: &dyn SigningProvider,
) -> Result<ProofDescriptor> {
    let certificate = contract.encrypting_certificate.as_ref().ok_or_else(|| {
        TokenError::invalid_input("symmetric proof key requires an encrypting certificate")
    })?;

    let suite = &contract.algorithm_suite;
    let expected = suite.symmetric_key_bytes();
    if expected == 0 {
        return Err(TokenError::invalid_input(format!(
            "algorithm suite {suite} has no symmetric key length"
        )));
    }

    let key = match supplied {
        Some(value) => {
            let bytes = STANDARD
                .decode(value)
                .map_err(|e| TokenError::invalid_input(format!("symmetric key value is not base64: {e}")))?;
            let key = SymmetricKey::new(bytes);
            if key.as_bytes().len() != expected {
                return Err(TokenError::invalid_input(format!(
                    "symmetric key value is {} bits, algorithm suite {suite} requires {}",
                    key.bits(),
                    suite.symmetric_key_length
                )));
            }
            key
        }
        None => SymmetricKey::generate(expected),
    };

    let wrapped_key = signer.wrap_key(key.as_bytes(), certificate, suite.asymmetric_key_wrap)?;

    debug!(
        key_bits = key.bits(),
        wrap_algorithm = suite.asymmetric_key_wrap,
        recipient = %certificate.thumbprint(),
        "Wrapped symmetric proof key"
    );

    Ok(ProofDescriptor::Symmetric {
        key,
        wrapped_key,
        wrap_algorithm: suite.asymmetric_key_wrap.to_string(),
        encrypting_key_identifier: KeyIdentifier::X509RawData(certificate.raw_data().to_vec()),
    })
}
