//! Algorithm identifiers understood by the RSA provider

use cwtoken::algorithm::uri;
use cwtoken::{ProviderError, ProviderResult};
use rsa::{Oaep, Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// PKCS#1 v1.5 signature algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// RSA with SHA-1, XML-DSig only
    RsaSha1,
    /// RSA with SHA-256 (`RS256`)
    RsaSha256,
    /// RSA with SHA-384 (`RS384`)
    RsaSha384,
    /// RSA with SHA-512 (`RS512`)
    RsaSha512,
}

impl SignatureAlgorithm {
    /// Resolve an XML-DSig URI or JWS `alg` name
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnsupportedAlgorithm`] for anything else.
    pub fn from_identifier(identifier: &str) -> ProviderResult<Self> {
        match identifier {
            uri::RSA_SHA1 => Ok(Self::RsaSha1),
            uri::RSA_SHA256 | "RS256" => Ok(Self::RsaSha256),
            uri::RSA_SHA384 | "RS384" => Ok(Self::RsaSha384),
            uri::RSA_SHA512 | "RS512" => Ok(Self::RsaSha512),
            other => Err(ProviderError::UnsupportedAlgorithm {
                algorithm: other.to_string(),
            }),
        }
    }

    pub(crate) fn sign(self, key: &RsaPrivateKey, payload: &[u8]) -> rsa::Result<Vec<u8>> {
        match self {
            Self::RsaSha1 => key.sign(Pkcs1v15Sign::new::<Sha1>(), &Sha1::digest(payload)),
            Self::RsaSha256 => key.sign(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(payload)),
            Self::RsaSha384 => key.sign(Pkcs1v15Sign::new::<Sha384>(), &Sha384::digest(payload)),
            Self::RsaSha512 => key.sign(Pkcs1v15Sign::new::<Sha512>(), &Sha512::digest(payload)),
        }
    }
}

/// RSA key transport algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTransport {
    /// RSAES-PKCS1-v1_5
    Rsa15,
    /// RSAES-OAEP with SHA-1 and MGF1-SHA-1 (`rsa-oaep-mgf1p`)
    OaepMgf1pSha1,
    /// RSAES-OAEP with SHA-256
    OaepSha256,
}

impl KeyTransport {
    /// Resolve an XML-Enc key transport URI
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnsupportedAlgorithm`] for anything else.
    pub fn from_identifier(identifier: &str) -> ProviderResult<Self> {
        match identifier {
            uri::RSA_1_5 => Ok(Self::Rsa15),
            uri::RSA_OAEP_MGF1P => Ok(Self::OaepMgf1pSha1),
            uri::RSA_OAEP => Ok(Self::OaepSha256),
            other => Err(ProviderError::UnsupportedAlgorithm {
                algorithm: other.to_string(),
            }),
        }
    }

    pub(crate) fn encrypt(self, key: &RsaPublicKey, data: &[u8]) -> rsa::Result<Vec<u8>> {
        let mut rng = rand::rngs::OsRng;
        match self {
            Self::Rsa15 => key.encrypt(&mut rng, Pkcs1v15Encrypt, data),
            Self::OaepMgf1pSha1 => key.encrypt(&mut rng, Oaep::new::<Sha1>(), data),
            Self::OaepSha256 => key.encrypt(&mut rng, Oaep::new::<Sha256>(), data),
        }
    }
}
