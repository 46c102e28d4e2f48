//! JSON Web Algorithms (RFC 7518) signing presets.
//!
//! Each [`Jwa`] names a digest and signing family; [`Jwa::create_signer`]
//! builds a signer configured the way JWS expects: unpadded base64url text
//! and, for `ES*`, fixed-width IEEE P1363 signatures.

use crate::{
    Algorithm, Encoding, Error, ErrorKind, HashAlgorithm, Result, SignAlgorithm,
    ecdsa::{EcdsaOptions, EcdsaSigner, SignatureFormat},
    eddsa::{EddsaOptions, EddsaSigner},
    hmac::HmacSigner,
    key::KeyInput,
    rsa::{RsaOptions, RsaPadding, RsaSigner},
    signer::Signer,
};
use core::{fmt, str::FromStr};
use tokio::io::AsyncRead;

/// JWS `alg` value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::upper_case_acronyms, missing_docs)]
pub enum Jwa {
    HS256,
    HS384,
    HS512,
    RS256,
    RS384,
    RS512,
    PS256,
    PS384,
    PS512,
    ES256,
    ES384,
    ES512,
    EdDSA,
}

impl Jwa {
    /// Every preset.
    pub const ALL: &'static [Self] = &[
        Self::HS256,
        Self::HS384,
        Self::HS512,
        Self::RS256,
        Self::RS384,
        Self::RS512,
        Self::PS256,
        Self::PS384,
        Self::PS512,
        Self::ES256,
        Self::ES384,
        Self::ES512,
        Self::EdDSA,
    ];

    /// Registered `alg` name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
            Self::PS256 => "PS256",
            Self::PS384 => "PS384",
            Self::PS512 => "PS512",
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
            Self::ES512 => "ES512",
            Self::EdDSA => "EdDSA",
        }
    }

    /// Digest of this preset; `None` for EdDSA, which digests internally.
    pub fn hash_algorithm(self) -> Option<HashAlgorithm> {
        match self {
            Self::HS256 | Self::RS256 | Self::PS256 | Self::ES256 => Some(HashAlgorithm::Sha256),
            Self::HS384 | Self::RS384 | Self::PS384 | Self::ES384 => Some(HashAlgorithm::Sha384),
            Self::HS512 | Self::RS512 | Self::PS512 | Self::ES512 => Some(HashAlgorithm::Sha512),
            Self::EdDSA => None,
        }
    }

    /// Signing family of this preset.
    pub fn sign_algorithm(self) -> SignAlgorithm {
        match self {
            Self::HS256 | Self::HS384 | Self::HS512 => SignAlgorithm::Hmac,
            Self::RS256 | Self::RS384 | Self::RS512 => SignAlgorithm::Rsa,
            Self::PS256 | Self::PS384 | Self::PS512 => SignAlgorithm::Rsa,
            Self::ES256 | Self::ES384 | Self::ES512 => SignAlgorithm::Ecdsa,
            Self::EdDSA => SignAlgorithm::Eddsa,
        }
    }

    /// Build a signer for this preset.
    ///
    /// `HS*` presets take a [`JwaKey::Secret`]; all others take
    /// [`JwaKey::Asymmetric`].
    pub fn create_signer(self, key: JwaKey) -> Result<AnySigner> {
        let encoding = Encoding::Base64Url;

        let signer = match (self.sign_algorithm(), self.hash_algorithm(), key) {
            (SignAlgorithm::Hmac, Some(hash), JwaKey::Secret(secret)) => {
                AnySigner::Hmac(HmacSigner::new(hash, secret)?.with_encoding(encoding))
            }
            (SignAlgorithm::Hmac, _, JwaKey::Asymmetric { .. }) => {
                return Err(Error::new(ErrorKind::InvalidPrivateKey)
                    .with_context("jwa", self)
                    .with_context("expectedKey", "secret"));
            }
            (_, _, JwaKey::Secret(_)) => {
                return Err(Error::new(ErrorKind::InvalidPublicKey)
                    .with_context("jwa", self)
                    .with_context("expectedKey", "asymmetric"));
            }
            (SignAlgorithm::Rsa, Some(hash), JwaKey::Asymmetric { public, private }) => {
                let padding = match self {
                    Self::PS256 | Self::PS384 | Self::PS512 => RsaPadding::PssMgf1,
                    _ => RsaPadding::Pkcs1v15,
                };
                let options = RsaOptions::default()
                    .with_padding(padding)
                    .with_encoding(encoding);
                AnySigner::Rsa(RsaSigner::new(hash, public, private, options)?)
            }
            (SignAlgorithm::Ecdsa, Some(hash), JwaKey::Asymmetric { public, private }) => {
                let options = EcdsaOptions::default()
                    .with_format(SignatureFormat::IeeeP1363)
                    .with_encoding(encoding);
                AnySigner::Ecdsa(EcdsaSigner::new(hash, public, private, options)?)
            }
            (_, _, JwaKey::Asymmetric { public, private }) => {
                let options = EddsaOptions::default().with_encoding(encoding);
                AnySigner::Eddsa(EddsaSigner::new(public, private, None, options)?)
            }
        };

        tracing::debug!(jwa = %self, "created JWA signer");
        Ok(signer)
    }
}

impl fmt::Display for Jwa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Jwa {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|jwa| jwa.as_str() == s)
            .ok_or_else(|| Error::new(ErrorKind::UnsupportedAlgorithm).with_context("jwa", s))
    }
}

/// Key material for [`Jwa::create_signer`].
#[derive(Clone, Debug)]
pub enum JwaKey {
    /// Shared secret of an `HS*` preset.
    Secret(Vec<u8>),

    /// Key pair of an asymmetric preset; either half may be omitted.
    Asymmetric {
        /// Verification key.
        public: Option<KeyInput>,
        /// Signing key.
        private: Option<KeyInput>,
    },
}

impl JwaKey {
    /// Shared secret.
    pub fn secret(secret: impl AsRef<[u8]>) -> Self {
        Self::Secret(secret.as_ref().to_vec())
    }

    /// Public and private key.
    pub fn pair(public: impl Into<KeyInput>, private: impl Into<KeyInput>) -> Self {
        Self::Asymmetric {
            public: Some(public.into()),
            private: Some(private.into()),
        }
    }

    /// Verification-only key.
    pub fn public(public: impl Into<KeyInput>) -> Self {
        Self::Asymmetric {
            public: Some(public.into()),
            private: None,
        }
    }

    /// Signing-only key.
    pub fn private(private: impl Into<KeyInput>) -> Self {
        Self::Asymmetric {
            public: None,
            private: Some(private.into()),
        }
    }
}

/// Signer of any family, as returned by [`Jwa::create_signer`].
#[derive(Clone, Debug)]
pub enum AnySigner {
    /// HMAC.
    Hmac(HmacSigner),
    /// RSA.
    Rsa(RsaSigner),
    /// ECDSA.
    Ecdsa(EcdsaSigner),
    /// EdDSA.
    Eddsa(EddsaSigner),
}

macro_rules! delegate {
    ($self:ident, $signer:ident => $expr:expr) => {
        match $self {
            AnySigner::Hmac($signer) => $expr,
            AnySigner::Rsa($signer) => $expr,
            AnySigner::Ecdsa($signer) => $expr,
            AnySigner::Eddsa($signer) => $expr,
        }
    };
}

impl Signer for AnySigner {
    fn algorithm(&self) -> Algorithm {
        delegate!(self, s => s.algorithm())
    }

    fn encoding(&self) -> Encoding {
        delegate!(self, s => s.encoding())
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        delegate!(self, s => s.sign(message))
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool> {
        delegate!(self, s => s.verify(message, signature))
    }

    async fn sign_stream<R>(&self, message: R) -> Result<Vec<u8>>
    where
        R: AsyncRead + Unpin + Send,
    {
        delegate!(self, s => s.sign_stream(message).await)
    }

    async fn verify_stream<R>(&self, message: R, signature: &[u8]) -> Result<bool>
    where
        R: AsyncRead + Unpin + Send,
    {
        delegate!(self, s => s.verify_stream(message, signature).await)
    }
}
