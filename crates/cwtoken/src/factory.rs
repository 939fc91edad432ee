//! Token assembly
//!
//! [`TokenFactory`] turns a [`TokenContract`] into a signed token. It maps the
//! contract's claims, selects the subject confirmation, builds credentials,
//! and hands the resulting [`TokenDescriptor`] to the serialization provider.
//! Issuance is all-or-nothing and keeps no state between calls.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, info_span, warn};

use crate::authentication::AuthenticationStatement;
use crate::claims::{map_claims, ClaimProfile, ClaimSet};
use crate::config::IssuanceConfig;
use crate::confirmation::{ConfirmationStrategy, ProofDescriptor};
use crate::constants::{AUDIENCE, JWT_TOKEN_TYPE, SAML2_TOKEN_TYPE, SAML_OUTPUT_VALIDITY_HOURS};
use crate::contract::{JwtContract, SamlContract, TokenContract};
use crate::credentials::{
    build_encrypting_credential, build_jwt_signing_credential, build_signing_credential,
};
use crate::descriptor::{Lifetime, SubjectConfirmation, TokenDescriptor};
use crate::error::TokenError;
use crate::provider::{SerializationProvider, SigningProvider};
use crate::token::{check_compact, JwtOutputToken, OutputToken, ProofKey, SamlOutputToken};
use crate::Result;

/// Issues SAML assertions and JWTs
///
/// Cheap to clone and safe to share across threads.
#[derive(Debug, Clone)]
pub struct TokenFactory {
    config: Arc<IssuanceConfig>,
    signer: Arc<dyn SigningProvider>,
    serializer: Arc<dyn SerializationProvider>,
}

impl TokenFactory {
    /// Create a factory
    pub fn new(
        config: IssuanceConfig,
        signer: Arc<dyn SigningProvider>,
        serializer: Arc<dyn SerializationProvider>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            signer,
            serializer,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &IssuanceConfig {
        &self.config
    }

    /// Issue a token for `contract` at the current time
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidInput`] for contracts that cannot be
    /// issued as given, [`TokenError::Unsupported`] for sender-vouches
    /// assertions, and [`TokenError::IssuanceFailed`] when a provider fails.
    pub fn generate_token(&self, contract: &TokenContract) -> Result<OutputToken> {
        self.generate_token_at(contract, Utc::now())
    }

    /// Issue a token for `contract` as of `now`
    ///
    /// # Errors
    ///
    /// See [`TokenFactory::generate_token`].
    pub fn generate_token_at(
        &self,
        contract: &TokenContract,
        now: DateTime<Utc>,
    ) -> Result<OutputToken> {
        let certificate = &contract.base().signing_certificate;
        let span = info_span!(
            "issue_token",
            service = %self.config.service_name,
            token_kind = contract.kind(),
            key_ref = certificate.key_ref(),
        );
        let _guard = span.enter();

        let result = match contract {
            TokenContract::Saml(saml) => self.build_saml_token(saml, now).map(OutputToken::Saml),
            TokenContract::Jwt(jwt) => self.build_jwt_token(jwt, now).map(OutputToken::Jwt),
        };

        match &result {
            Ok(_) => info!(thumbprint = %certificate.thumbprint(), "Issued token"),
            Err(e) => warn!(error = %e, "Token issuance rejected"),
        }
        result
    }

    /// Validate a previously issued token
    ///
    /// # Errors
    ///
    /// Always returns [`TokenError::Unsupported`]; this engine only issues.
    pub fn validate_token(&self, _token: &str) -> Result<()> {
        Err(TokenError::unsupported("token validation"))
    }

    /// Read the claims of an issued token back through the serialization provider
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::IssuanceFailed`] when the provider cannot parse
    /// the token.
    pub fn read_claims(&self, token: &OutputToken) -> Result<ClaimSet> {
        Ok(self.serializer.read_claims(token.as_wire())?)
    }

    fn build_saml_token(&self, contract: &SamlContract, now: DateTime<Utc>) -> Result<SamlOutputToken> {
        let strategy = ConfirmationStrategy::select(&contract.confirmation)?;
        let base = &contract.base;
        let suite = &contract.algorithm_suite;

        let claims = map_claims(base, ClaimProfile::SamlXspa);
        self.log_claims(&claims);

        let signing_credential =
            build_signing_credential(&base.signing_certificate, contract.use_rsa_signing, suite)?;
        let encrypting_credential = contract
            .encrypting_certificate
            .as_ref()
            .map(|cert| build_encrypting_credential(cert, suite));
        let proof = strategy.proof(contract, self.signer.as_ref())?;

        debug!(
            suite = %suite,
            confirmation = %contract.confirmation,
            rsa_signing = contract.use_rsa_signing,
            encrypted = encrypting_credential.is_some(),
            "Prepared SAML assertion descriptor"
        );

        let descriptor = TokenDescriptor {
            token_type: SAML2_TOKEN_TYPE,
            issuer: base.signing_certificate.subject_name().to_string(),
            applies_to: AUDIENCE.to_string(),
            lifetime: Lifetime {
                created: now,
                expires: base.expiration,
            },
            claims,
            signing_credential,
            encrypting_credential,
            confirmation: Some(SubjectConfirmation::from(strategy)),
            proof,
            authentication: Some(AuthenticationStatement {
                context: contract.authentication_context(),
                instant: now,
            }),
        };

        let assertion = self
            .serializer
            .create_signed_assertion(&descriptor, self.signer.as_ref())?
            .ok_or_else(|| TokenError::issuance_failed("failed to create SAML2 security token"))?;
        let xml = self.serializer.render(&assertion)?;
        if xml.is_empty() {
            return Err(TokenError::issuance_failed("serializer rendered an empty assertion"));
        }

        let security_keys = match descriptor.proof {
            Some(ProofDescriptor::Symmetric { key, .. }) => vec![ProofKey::Symmetric(key)],
            Some(ProofDescriptor::Asymmetric { .. }) => {
                vec![ProofKey::X509(base.signing_certificate.clone())]
            }
            None => Vec::new(),
        };
        let (attached_reference, unattached_reference) = SamlOutputToken::references(assertion.id());

        debug!(
            assertion_id = assertion.id(),
            keys = security_keys.len(),
            "Rendered SAML assertion"
        );

        Ok(SamlOutputToken {
            xml,
            assertion_id: assertion.id().to_string(),
            attached_reference,
            unattached_reference,
            security_keys,
            confirmation: SubjectConfirmation::from(strategy),
            valid_from: now,
            valid_to: now + Duration::hours(SAML_OUTPUT_VALIDITY_HOURS),
        })
    }

    fn build_jwt_token(&self, contract: &JwtContract, now: DateTime<Utc>) -> Result<JwtOutputToken> {
        let name_option = contract
            .name_option
            .ok_or_else(|| TokenError::invalid_input("missing naming option"))?;
        if !self.config.allows(name_option) {
            return Err(TokenError::invalid_input(format!(
                "naming option {name_option} is not enabled"
            )));
        }

        let base = &contract.base;
        let claims = map_claims(base, ClaimProfile::from(name_option));
        self.log_claims(&claims);

        let descriptor = TokenDescriptor {
            token_type: JWT_TOKEN_TYPE,
            issuer: base.signing_certificate.subject_name().to_string(),
            applies_to: AUDIENCE.to_string(),
            lifetime: Lifetime {
                created: now,
                expires: base.expiration,
            },
            claims,
            signing_credential: build_jwt_signing_credential(&base.signing_certificate)?,
            encrypting_credential: None,
            confirmation: None,
            proof: None,
            authentication: None,
        };

        let compact = self
            .serializer
            .render_compact(&descriptor, self.signer.as_ref())?;
        let header = check_compact(&compact)?;

        debug!(name_option = %name_option, len = compact.len(), "Encoded JWT");

        Ok(JwtOutputToken {
            compact,
            header,
            claims: descriptor.claims,
            issuer: descriptor.issuer,
            audience: descriptor.applies_to,
            not_before: descriptor.lifetime.created,
            expires: descriptor.lifetime.expires,
        })
    }

    fn log_claims(&self, claims: &ClaimSet) {
        if self.config.redact_claim_values {
            debug!(count = claims.len(), claims = %claims.redacted(), "Mapped claims");
        } else {
            debug!(count = claims.len(), claims = %claims, "Mapped claims");
        }
    }
}
