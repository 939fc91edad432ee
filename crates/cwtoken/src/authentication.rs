//! SAML 2.0 authentication context classes

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

const CLASS_PREFIX: &str = "urn:oasis:names:tc:SAML:2.0:ac:classes:";

/// How the subject authenticated, as an authentication context class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AuthenticationContext {
    /// Password over an unprotected channel
    Password,
    /// Password over a protected transport
    PasswordProtectedTransport,
    /// TLS client certificate
    TlsClient,
    /// X.509 certificate
    X509,
    /// Kerberos ticket
    Kerberos,
    /// Network address
    InternetProtocol,
    /// Previously established session
    PreviousSession,
    /// Unspecified
    #[default]
    Unspecified,
}

impl AuthenticationContext {
    /// Every accepted authentication context
    pub const ALL: [Self; 8] = [
        Self::Password,
        Self::PasswordProtectedTransport,
        Self::TlsClient,
        Self::X509,
        Self::Kerberos,
        Self::InternetProtocol,
        Self::PreviousSession,
        Self::Unspecified,
    ];

    /// Authentication context class URI
    pub fn as_uri(self) -> &'static str {
        match self {
            Self::Password => "urn:oasis:names:tc:SAML:2.0:ac:classes:Password",
            Self::PasswordProtectedTransport => {
                "urn:oasis:names:tc:SAML:2.0:ac:classes:PasswordProtectedTransport"
            }
            Self::TlsClient => "urn:oasis:names:tc:SAML:2.0:ac:classes:TLSClient",
            Self::X509 => "urn:oasis:names:tc:SAML:2.0:ac:classes:X509",
            Self::Kerberos => "urn:oasis:names:tc:SAML:2.0:ac:classes:Kerberos",
            Self::InternetProtocol => "urn:oasis:names:tc:SAML:2.0:ac:classes:InternetProtocol",
            Self::PreviousSession => "urn:oasis:names:tc:SAML:2.0:ac:classes:PreviousSession",
            Self::Unspecified => "urn:oasis:names:tc:SAML:2.0:ac:classes:unspecified",
        }
    }
}

impl fmt::Display for AuthenticationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_uri())
    }
}

impl FromStr for AuthenticationContext {
    type Err = TokenError;

    /// Only the exact class URIs are accepted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ctx| ctx.as_uri() == s)
            .ok_or_else(|| {
                if s.starts_with(CLASS_PREFIX) {
                    TokenError::invalid_input(format!(
                        "unsupported authentication context class: {s}"
                    ))
                } else {
                    TokenError::invalid_input(format!("invalid authentication context: {s}"))
                }
            })
    }
}

impl TryFrom<String> for AuthenticationContext {
    type Error = TokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AuthenticationContext> for String {
    fn from(ctx: AuthenticationContext) -> Self {
        ctx.as_uri().to_string()
    }
}

/// Authentication statement attached to a SAML assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationStatement {
    /// Authentication context class
    pub context: AuthenticationContext,
    /// When the subject authenticated
    pub instant: DateTime<Utc>,
}
