//! Named algorithm suites
//!
//! Suites follow the WS-SecurityPolicy names. Each bundles the algorithm URIs a
//! SAML assertion is signed and encrypted with, plus the symmetric key sizes.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::TokenError;

/// XML-DSig and XML-Enc algorithm identifiers
pub mod uri {
    /// RSA PKCS#1 v1.5 signature with SHA-1
    pub const RSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";
    /// RSA PKCS#1 v1.5 signature with SHA-256
    pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
    /// RSA PKCS#1 v1.5 signature with SHA-384
    pub const RSA_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384";
    /// RSA PKCS#1 v1.5 signature with SHA-512
    pub const RSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512";

    /// SHA-1 digest
    pub const SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";
    /// SHA-256 digest
    pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";

    /// AES-128 in CBC mode
    pub const AES128_CBC: &str = "http://www.w3.org/2001/04/xmlenc#aes128-cbc";
    /// AES-192 in CBC mode
    pub const AES192_CBC: &str = "http://www.w3.org/2001/04/xmlenc#aes192-cbc";
    /// AES-256 in CBC mode
    pub const AES256_CBC: &str = "http://www.w3.org/2001/04/xmlenc#aes256-cbc";

    /// AES-128 key wrap
    pub const KW_AES128: &str = "http://www.w3.org/2001/04/xmlenc#kw-aes128";
    /// AES-192 key wrap
    pub const KW_AES192: &str = "http://www.w3.org/2001/04/xmlenc#kw-aes192";
    /// AES-256 key wrap
    pub const KW_AES256: &str = "http://www.w3.org/2001/04/xmlenc#kw-aes256";

    /// RSA-OAEP key transport with MGF1/SHA-1
    pub const RSA_OAEP_MGF1P: &str = "http://www.w3.org/2001/04/xmlenc#rsa-oaep-mgf1p";
    /// RSA-OAEP key transport (XML-Enc 1.1, SHA-256 digest)
    pub const RSA_OAEP: &str = "http://www.w3.org/2009/xmlenc11#rsa-oaep";
    /// RSA PKCS#1 v1.5 key transport
    pub const RSA_1_5: &str = "http://www.w3.org/2001/04/xmlenc#rsa-1_5";
}

/// A named bundle of signature, digest, encryption and key-wrap algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct AlgorithmSuite {
    name: &'static str,
    /// Asymmetric signature algorithm URI
    pub asymmetric_signature: &'static str,
    /// Digest algorithm URI
    pub digest: &'static str,
    /// Symmetric key-wrap algorithm URI
    pub symmetric_key_wrap: &'static str,
    /// Asymmetric key-wrap (key transport) algorithm URI
    pub asymmetric_key_wrap: &'static str,
    /// Proof key length in bits
    pub symmetric_key_length: u32,
    /// Bulk encryption algorithm URI
    pub encryption: &'static str,
    /// Derived encryption key length in bits
    pub encryption_key_derivation_length: u32,
}

impl AlgorithmSuite {
    /// Every suite known to the engine
    pub const ALL: [Self; 6] = [
        Self::BASIC128,
        Self::BASIC192,
        Self::BASIC256,
        Self::BASIC128_SHA256,
        Self::BASIC256_SHA256,
        Self::BASIC256_SHA256_RSA15,
    ];

    /// `Basic128`: AES-128, RSA-SHA1, RSA-OAEP
    pub const BASIC128: Self = Self {
        name: "Basic128",
        asymmetric_signature: uri::RSA_SHA1,
        digest: uri::SHA1,
        symmetric_key_wrap: uri::KW_AES128,
        asymmetric_key_wrap: uri::RSA_OAEP_MGF1P,
        symmetric_key_length: 128,
        encryption: uri::AES128_CBC,
        encryption_key_derivation_length: 128,
    };

    /// `Basic192`: AES-192, RSA-SHA1, RSA-OAEP
    pub const BASIC192: Self = Self {
        name: "Basic192",
        asymmetric_signature: uri::RSA_SHA1,
        digest: uri::SHA1,
        symmetric_key_wrap: uri::KW_AES192,
        asymmetric_key_wrap: uri::RSA_OAEP_MGF1P,
        symmetric_key_length: 192,
        encryption: uri::AES192_CBC,
        encryption_key_derivation_length: 192,
    };

    /// `Basic256`: AES-256, RSA-SHA1, RSA-OAEP
    pub const BASIC256: Self = Self {
        name: "Basic256",
        asymmetric_signature: uri::RSA_SHA1,
        digest: uri::SHA1,
        symmetric_key_wrap: uri::KW_AES256,
        asymmetric_key_wrap: uri::RSA_OAEP_MGF1P,
        symmetric_key_length: 256,
        encryption: uri::AES256_CBC,
        encryption_key_derivation_length: 256,
    };

    /// `Basic128Sha256`: AES-128, RSA-SHA256, RSA-OAEP
    pub const BASIC128_SHA256: Self = Self {
        name: "Basic128Sha256",
        asymmetric_signature: uri::RSA_SHA256,
        digest: uri::SHA256,
        ..Self::BASIC128
    };

    /// `Basic256Sha256`: AES-256, RSA-SHA256, RSA-OAEP
    pub const BASIC256_SHA256: Self = Self {
        name: "Basic256Sha256",
        asymmetric_signature: uri::RSA_SHA256,
        digest: uri::SHA256,
        ..Self::BASIC256
    };

    /// `Basic256Sha256Rsa15`: AES-256, RSA-SHA256, RSA PKCS#1 v1.5 key transport
    pub const BASIC256_SHA256_RSA15: Self = Self {
        name: "Basic256Sha256Rsa15",
        asymmetric_key_wrap: uri::RSA_1_5,
        ..Self::BASIC256_SHA256
    };

    /// Suite used for JWT signing: RSA-SHA256 over SHA-256
    pub const JWT: Self = Self::BASIC256_SHA256;

    /// WS-SecurityPolicy name of the suite
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Proof key length in bytes
    pub fn symmetric_key_bytes(&self) -> usize {
        (self.symmetric_key_length / 8) as usize
    }
}

impl Default for AlgorithmSuite {
    fn default() -> Self {
        Self::BASIC256_SHA256
    }
}

impl fmt::Display for AlgorithmSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl FromStr for AlgorithmSuite {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|suite| suite.name.eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| TokenError::invalid_input(format!("unknown algorithm suite: {s}")))
    }
}

impl<'de> Deserialize<'de> for AlgorithmSuite {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

impl From<AlgorithmSuite> for String {
    fn from(suite: AlgorithmSuite) -> Self {
        suite.name.to_string()
    }
}
