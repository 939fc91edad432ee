//! # cwtoken-rsa - RSA Signing Provider
//!
//! A [`cwtoken::SigningProvider`] backed by in-memory RSA keys.
//!
//! ## Supported algorithms
//!
//! - **Signatures** - PKCS#1 v1.5 with SHA-256, SHA-384 and SHA-512, addressed
//!   either by XML-DSig URI or by JWS name (`RS256`, `RS384`, `RS512`), plus
//!   `rsa-sha1` for the legacy `Basic*` suites (URI only)
//! - **Key transport** - `rsa-1_5`, `rsa-oaep-mgf1p` (OAEP over SHA-1) and
//!   `rsa-oaep` (SHA-256)
//!
//! Anything else is rejected with
//! [`cwtoken::ProviderError::UnsupportedAlgorithm`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use cwtoken::SigningProvider;
//! use cwtoken_rsa::RsaSigningProvider;
//!
//! # fn run() -> cwtoken::ProviderResult<()> {
//! let provider = RsaSigningProvider::new();
//! provider.generate_private_key("issuer", 2048)?;
//! let certificate = provider.certificate("issuer", "CN=Token Issuer", None)?;
//!
//! let signature = provider.sign(b"payload", certificate.key_ref(), "RS256")?;
//! # let _ = signature;
//! # Ok(())
//! # }
//! ```

pub mod algorithm;
pub mod provider;

pub use algorithm::{KeyTransport, SignatureAlgorithm};
pub use provider::RsaSigningProvider;
