//! Collaborator interfaces
//!
//! The engine decides what a token contains. Producing signatures, wrapping
//! keys, canonicalizing XML and encoding compact tokens is delegated to the
//! providers defined here.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::certificate::CertificateRef;
use crate::claims::ClaimSet;
use crate::descriptor::TokenDescriptor;
use crate::error::ProviderError;

/// Result type of provider operations
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Cryptographic operations on keys the engine only references
///
/// Implementations may block (HSM, remote KMS). The engine does not retry.
pub trait SigningProvider: Send + Sync + fmt::Debug {
    /// Sign `payload` with the key behind `key_ref`
    ///
    /// `algorithm` is either an XML-DSig signature URI or a JWS `alg` name.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::KeyNotFound`] for unknown keys and
    /// [`ProviderError::UnsupportedAlgorithm`] for algorithms the provider
    /// does not implement.
    fn sign(&self, payload: &[u8], key_ref: &str, algorithm: &str) -> ProviderResult<Vec<u8>>;

    /// Encrypt `key` for the holder of `certificate`
    ///
    /// `algorithm` is an XML-Enc key transport URI.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::KeyNotFound`] when the certificate's key is
    /// unknown and [`ProviderError::UnsupportedAlgorithm`] for algorithms the
    /// provider does not implement.
    fn wrap_key(
        &self,
        key: &[u8],
        certificate: &CertificateRef,
        algorithm: &str,
    ) -> ProviderResult<Vec<u8>>;
}

/// Materializes token descriptors into wire formats
pub trait SerializationProvider: Send + Sync + fmt::Debug {
    /// Build and sign a SAML assertion for `descriptor`
    ///
    /// `Ok(None)` means the provider could not produce an assertion.
    ///
    /// # Errors
    ///
    /// Propagates signing failures from `signer`.
    fn create_signed_assertion(
        &self,
        descriptor: &TokenDescriptor,
        signer: &dyn SigningProvider,
    ) -> ProviderResult<Option<AssertionHandle>>;

    /// Render a signed assertion as XML
    ///
    /// # Errors
    ///
    /// Returns an error when the handle was not created by this provider.
    fn render(&self, assertion: &AssertionHandle) -> ProviderResult<String>;

    /// Encode and sign `descriptor` as a compact JWT
    ///
    /// # Errors
    ///
    /// Propagates signing failures from `signer`.
    fn render_compact(
        &self,
        descriptor: &TokenDescriptor,
        signer: &dyn SigningProvider,
    ) -> ProviderResult<String>;

    /// Read the claims back out of a rendered token
    ///
    /// # Errors
    ///
    /// Returns an error when `token` is not in a format this provider reads.
    fn read_claims(&self, token: &str) -> ProviderResult<ClaimSet>;
}

/// A signed assertion held by a serialization provider
#[derive(Clone)]
pub struct AssertionHandle {
    id: String,
    issue_instant: DateTime<Utc>,
    inner: Arc<dyn Any + Send + Sync>,
}

impl AssertionHandle {
    /// Wrap a provider-specific assertion
    pub fn new<T: Any + Send + Sync>(
        id: impl Into<String>,
        issue_instant: DateTime<Utc>,
        inner: T,
    ) -> Self {
        Self {
            id: id.into(),
            issue_instant,
            inner: Arc::new(inner),
        }
    }

    /// Assertion ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Assertion issue instant
    pub fn issue_instant(&self) -> DateTime<Utc> {
        self.issue_instant
    }

    /// The provider-specific assertion, if it is a `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for AssertionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssertionHandle")
            .field("id", &self.id)
            .field("issue_instant", &self.issue_instant)
            .finish_non_exhaustive()
    }
}
