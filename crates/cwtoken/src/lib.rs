//! # cwtoken - Identity Token Issuance for CommonWell
//!
//! Issues signed SAML 2.0 assertions and compact JWTs that carry a verified
//! actor's claims (subject, organization, role, purpose of use, national
//! provider identifier, home community) for cross-organization identity
//! federation.
//!
//! ## Core Features
//!
//! - **Claim profiles** - XSPA, IHE IUA and a custom XSPA variant with a payload hash
//! - **Subject confirmation** - bearer, symmetric and asymmetric holder-of-key
//! - **Algorithm suites** - WS-SecurityPolicy `Basic128` through `Basic256Sha256Rsa15`
//! - **Pluggable crypto** - signing, key wrapping and wire encoding live behind traits
//!
//! ## Architecture
//!
//! - `contract` - What to issue ([`TokenContract`], [`SamlContract`], [`JwtContract`])
//! - `claims` - Contract to claim-set mapping per profile
//! - `confirmation` - Confirmation strategy and proof-of-possession material
//! - `credentials` - Signing and encrypting credentials
//! - `descriptor` - The description handed to the serialization provider
//! - `provider` - [`SigningProvider`] and [`SerializationProvider`] traits
//! - `factory` - [`TokenFactory`], which ties the above together
//! - `config` - [`IssuanceConfig`] loading
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chrono::{Duration, Utc};
//! use cwtoken::{
//!     CertificateRef, CodedClaim, Contract, IssuanceConfig, JwtContract, NameOption,
//!     SerializationProvider, SigningProvider, TokenFactory,
//! };
//!
//! # fn run(
//! #     signer: Arc<dyn SigningProvider>,
//! #     serializer: Arc<dyn SerializationProvider>,
//! #     certificate: CertificateRef,
//! # ) -> cwtoken::Result<()> {
//! let factory = TokenFactory::new(IssuanceConfig::default(), signer, serializer);
//!
//! let contract = Contract::builder()
//!     .subject("Dr. X")
//!     .subject_id("Dr. X")
//!     .subject_role(CodedClaim::role("PROVIDER", "234"))
//!     .purpose_of_use(CodedClaim::purpose_of_use("TREATMENT", "5678"))
//!     .organization("Acme")
//!     .organization_id("urn:oid:1.2.3")
//!     .npi("12345667")
//!     .expiration(Utc::now() + Duration::days(3))
//!     .signing_certificate(certificate)
//!     .build()?;
//!
//! let token = factory.generate_token(&JwtContract::new(contract, NameOption::Xspa).into())?;
//! println!("{}", token.as_wire());
//! # Ok(())
//! # }
//! ```

pub mod algorithm;
pub mod authentication;
pub mod certificate;
pub mod claims;
pub mod coded;
pub mod config;
pub mod confirmation;
pub mod constants;
pub mod contract;
pub mod credentials;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod provider;
pub mod token;

pub use algorithm::AlgorithmSuite;
pub use authentication::{AuthenticationContext, AuthenticationStatement};
pub use certificate::{CertificateRef, RsaKeyParameters};
pub use claims::{map_claims, map_claims_with_jti, Claim, ClaimProfile, ClaimSet};
pub use coded::{CodedClaim, CodedElement};
pub use config::IssuanceConfig;
pub use confirmation::{ConfirmationStrategy, ProofDescriptor, SymmetricKey};
pub use contract::{
    ConfirmationKind, Contract, ContractBuilder, JwtContract, NameOption, SamlContract,
    TokenContract,
};
pub use credentials::{EncryptingCredential, KeyIdentifier, SigningCredential, SigningKeyKind};
pub use descriptor::{Lifetime, SubjectConfirmation, TokenDescriptor};
pub use error::{ConfigError, ProviderError, TokenError};
pub use factory::TokenFactory;
pub use provider::{AssertionHandle, ProviderResult, SerializationProvider, SigningProvider};
pub use token::{JwtOutputToken, OutputToken, ProofKey, SamlOutputToken, SecurityTokenReference};

/// Issuance result type
pub type Result<T> = std::result::Result<T, TokenError>;
