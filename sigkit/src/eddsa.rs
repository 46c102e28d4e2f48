//! Edwards-curve signatures.
//!
//! EdDSA hashes the message as part of the signature scheme, so there is no
//! separate digest algorithm and no incremental (streaming) mode.

use crate::{
    Algorithm, Encoding, Error, ErrorKind, Result, SignAlgorithm,
    error::BoxError,
    key::{self, KeyInput, PrivateKey, PublicKey},
    signer::Signer,
};
use core::fmt;
use der::{Decode, asn1::OctetStringRef};
use ed25519_dalek::{Signature, Signer as _, SigningKey, VerifyingKey};
use ed448_goldilocks_plus as ed448;
use tokio::io::AsyncRead;

/// Length of Ed448 public and private keys in bytes.
const ED448_KEY_SIZE: usize = 57;

/// Length of an Ed448 signature in bytes.
const ED448_SIGNATURE_SIZE: usize = 114;

/// Edwards curve of an EdDSA key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EddsaCurve {
    /// Ed25519.
    Ed25519,
    /// Ed448.
    Ed448,
}

impl EddsaCurve {
    /// Lowercase curve name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519",
            Self::Ed448 => "ed448",
        }
    }
}

impl fmt::Display for EddsaCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ed448 signing key from the `privateKey` field of a PKCS#8 document,
/// which wraps the raw 57-byte seed in a further OCTET STRING.
pub(crate) fn ed448_signing_key(
    field: &[u8],
) -> core::result::Result<ed448::SigningKey, BoxError> {
    let seed = OctetStringRef::from_der(field)?;
    Ok(ed448::SigningKey::try_from(seed.as_bytes())?)
}

/// Ed448 verifying key from its compressed encoding.
pub(crate) fn ed448_verifying_key(
    bytes: &[u8],
) -> core::result::Result<ed448::VerifyingKey, BoxError> {
    let bytes: &[u8; ED448_KEY_SIZE] = bytes.try_into().map_err(|_| {
        format!("Ed448 public keys are {ED448_KEY_SIZE} bytes, got {}", bytes.len())
    })?;

    ed448::VerifyingKey::from_bytes(bytes).map_err(|e| e.to_string().into())
}

/// Options of the EdDSA signer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct EddsaOptions {
    /// Passphrase of an encrypted private key.
    pub key_passphrase: Option<String>,

    /// Text encoding of signatures.
    pub encoding: Encoding,
}

impl EddsaOptions {
    /// Set the private key passphrase.
    pub fn with_key_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.key_passphrase = Some(passphrase.into());
        self
    }

    /// Set the text encoding.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

#[derive(Clone)]
enum EdPrivateKey {
    Ed25519(Box<SigningKey>),
    Ed448(Box<ed448::SigningKey>),
}

#[derive(Clone)]
enum EdPublicKey {
    Ed25519(VerifyingKey),
    Ed448(ed448::VerifyingKey),
}

impl EdPrivateKey {
    fn curve(&self) -> EddsaCurve {
        match self {
            Self::Ed25519(_) => EddsaCurve::Ed25519,
            Self::Ed448(_) => EddsaCurve::Ed448,
        }
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Ed25519(key) => {
                let signature: Signature = key.try_sign(message).map_err(|e| {
                    tracing::debug!(error = %e, "Ed25519 signing failed");
                    Error::new(ErrorKind::SignFailed).with_source(e)
                })?;
                Ok(signature.to_bytes().to_vec())
            }
            Self::Ed448(key) => Ok(key.sign_raw(message).to_bytes().to_vec()),
        }
    }
}

impl EdPublicKey {
    fn curve(&self) -> EddsaCurve {
        match self {
            Self::Ed25519(_) => EddsaCurve::Ed25519,
            Self::Ed448(_) => EddsaCurve::Ed448,
        }
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool> {
        match self {
            Self::Ed25519(key) => match Signature::from_slice(signature) {
                Ok(signature) => Ok(key.verify_strict(message, &signature).is_ok()),
                Err(_) => Ok(false),
            },
            Self::Ed448(key) => {
                let Ok(bytes) = <&[u8; ED448_SIGNATURE_SIZE]>::try_from(signature) else {
                    return Ok(false);
                };

                match ed448::Signature::from_bytes(bytes) {
                    Ok(signature) => Ok(key.verify_raw(&signature, message).is_ok()),
                    Err(_) => Ok(false),
                }
            }
        }
    }
}

fn private_key(input: KeyInput, passphrase: Option<&str>) -> Result<EdPrivateKey> {
    key::resolve_private(input, passphrase, "ed25519|ed448", |key| match key {
        PrivateKey::Ed25519(key) => Some(EdPrivateKey::Ed25519(key)),
        PrivateKey::Ed448(key) => Some(EdPrivateKey::Ed448(key)),
        _ => None,
    })
}

fn public_key(input: KeyInput) -> Result<EdPublicKey> {
    key::resolve_public(input, "ed25519|ed448", |key| match key {
        PublicKey::Ed25519(key) => Some(EdPublicKey::Ed25519(key)),
        PublicKey::Ed448(key) => Some(EdPublicKey::Ed448(key)),
        _ => None,
    })
}

/// Sign a message with an EdDSA private key.
pub fn sign(
    private_key: impl Into<KeyInput>,
    message: impl AsRef<[u8]>,
    options: &EddsaOptions,
) -> Result<Vec<u8>> {
    self::private_key(private_key.into(), options.key_passphrase.as_deref())?
        .sign(message.as_ref())
}

/// Verify an EdDSA signature.
pub fn verify(
    public_key: impl Into<KeyInput>,
    message: impl AsRef<[u8]>,
    signature: &[u8],
) -> Result<bool> {
    self::public_key(public_key.into())?.verify(message.as_ref(), signature)
}

/// [`Signer`] bound to an Ed25519 or Ed448 key pair.
#[derive(Clone)]
pub struct EddsaSigner {
    curve: EddsaCurve,
    encoding: Encoding,
    private: Option<EdPrivateKey>,
    public: Option<EdPublicKey>,
}

impl EddsaSigner {
    /// Create a signer from a public key, a private key, or both.
    ///
    /// When `expected` is given, every supplied key must be on that curve;
    /// otherwise both keys must agree with each other.
    pub fn new(
        public_key: Option<KeyInput>,
        private_key: Option<KeyInput>,
        expected: Option<EddsaCurve>,
        options: EddsaOptions,
    ) -> Result<Self> {
        if public_key.is_none() && private_key.is_none() {
            return Err(Error::new(ErrorKind::NoKeyProvided));
        }

        let public = public_key.map(self::public_key).transpose()?;
        let private = private_key
            .map(|key| self::private_key(key, options.key_passphrase.as_deref()))
            .transpose()?;

        let key_curve = private
            .as_ref()
            .map(EdPrivateKey::curve)
            .or_else(|| public.as_ref().map(EdPublicKey::curve));

        let Some(curve) = expected.or(key_curve) else {
            return Err(Error::new(ErrorKind::NoKeyProvided));
        };

        let actual = [
            public.as_ref().map(EdPublicKey::curve),
            private.as_ref().map(EdPrivateKey::curve),
        ];

        if let Some(mismatch) = actual.into_iter().flatten().find(|c| *c != curve) {
            return Err(Error::new(ErrorKind::KeyPairMismatch)
                .with_context("keyAlgo", mismatch)
                .with_context("expectedAlgo", curve));
        }

        tracing::debug!(%curve, "created EdDSA signer");

        Ok(Self {
            curve,
            encoding: options.encoding,
            private,
            public,
        })
    }

    /// Curve of this signer's keys.
    pub fn curve(&self) -> EddsaCurve {
        self.curve
    }
}

impl fmt::Debug for EddsaSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EddsaSigner")
            .field("curve", &self.curve)
            .field("encoding", &self.encoding)
            .field("has_private_key", &self.private.is_some())
            .field("has_public_key", &self.public.is_some())
            .finish()
    }
}

impl Signer for EddsaSigner {
    fn algorithm(&self) -> Algorithm {
        Algorithm::new(self.curve.as_str(), SignAlgorithm::Eddsa)
    }

    fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        self.private
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::NoPrivateKey))?
            .sign(message)
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool> {
        self.public
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::NoPublicKey))?
            .verify(message, signature)
    }

    async fn sign_stream<R>(&self, _message: R) -> Result<Vec<u8>>
    where
        R: AsyncRead + Unpin + Send,
    {
        Err(Error::new(ErrorKind::NotImplemented).with_context("operation", "sign_stream"))
    }

    async fn verify_stream<R>(&self, _message: R, _signature: &[u8]) -> Result<bool>
    where
        R: AsyncRead + Unpin + Send,
    {
        Err(Error::new(ErrorKind::NotImplemented).with_context("operation", "verify_stream"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn ed448_public_key_length_checked() {
        let err = ed448_verifying_key(&[0u8; 32]).unwrap_err();
        assert!(err.to_string().contains("57 bytes"), "{err}");
    }

    #[test]
    fn ed448_pkcs8_field_is_wrapped() {
        let seed = hex!(
            "c4eab05d357007c632f3dbb48489924d552b08fe0c353a0d4a1f00acda2c463a"
            "fbea67c5e8d2877c5e3bc397a659949ef8021e954e0a12274e"
        );

        let mut field = hex!("0439").to_vec();
        field.extend_from_slice(&seed);

        let key = ed448_signing_key(&field).unwrap();
        assert_eq!(
            key.verifying_key().to_bytes(),
            hex!(
                "43ba28f430cdff456ae531545f7ecd0ac834a55d9358c0372bfa0c6c6798c086"
                "6aea01eb00742802b8438ea4cb82169c235160627b4c3a9480"
            )
        );
        assert!(ed448_signing_key(&seed).is_err());
    }

    #[test]
    fn ed448_signature_length_checked() {
        let mut field = hex!("0439").to_vec();
        field.extend_from_slice(&[7u8; ED448_KEY_SIZE]);
        let key = ed448_signing_key(&field).unwrap();

        let public = EdPublicKey::Ed448(key.verifying_key());
        let signature = EdPrivateKey::Ed448(Box::new(key)).sign(b"abc").unwrap();
        assert_eq!(signature.len(), ED448_SIGNATURE_SIZE);
        assert!(public.verify(b"abc", &signature).unwrap());
        assert!(!public.verify(b"abc", &signature[..64]).unwrap());
    }

    #[test]
    fn options_builder() {
        let options = EddsaOptions::default()
            .with_key_passphrase("pw")
            .with_encoding(Encoding::Hex);
        assert_eq!(options.key_passphrase.as_deref(), Some("pw"));
        assert_eq!(options.encoding, Encoding::Hex);
    }
}
