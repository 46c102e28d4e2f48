//! Key material accepted by the asymmetric signers.
//!
//! Keys are parsed once into a [`KeyObject`], which every signer then
//! inspects for the expected type and algorithm family. Supported
//! encodings:
//!
//! - PKCS#8 `PRIVATE KEY` and PBES2 `ENCRYPTED PRIVATE KEY`
//! - SEC1 `EC PRIVATE KEY`
//! - PKCS#1 `RSA PRIVATE KEY` and `RSA PUBLIC KEY`
//! - SPKI `PUBLIC KEY`
//!
//! each either PEM-armored or as raw DER.

use crate::{
    EcCurve, Error, ErrorKind, Result,
    ecdsa::{EcPublicKey, EcSecretKey},
    eddsa::{self, EddsaCurve},
    error::BoxError,
};
use core::fmt;
use der::Decode;
use pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncryptedPrivateKeyInfo, ObjectIdentifier, PrivateKeyInfo,
};
use rsa::{
    RsaPrivateKey, RsaPublicKey,
    pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
    traits::PublicKeyParts,
};
use spki::SubjectPublicKeyInfoRef;

const RSA_ENCRYPTION_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const ED25519_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");
const ED448_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.113");

/// Whether a key is the public or the private half of a pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// Public key.
    Public,
    /// Private key.
    Private,
}

impl KeyType {
    /// Lowercase name, `public` or `private`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Algorithm family of an asymmetric key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AsymmetricKeyType {
    /// RSA.
    Rsa,
    /// Elliptic curve key for ECDSA.
    Ec,
    /// Ed25519.
    Ed25519,
    /// Ed448.
    Ed448,
}

impl AsymmetricKeyType {
    /// Lowercase name, e.g. `ed25519`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rsa => "rsa",
            Self::Ec => "ec",
            Self::Ed25519 => "ed25519",
            Self::Ed448 => "ed448",
        }
    }
}

impl fmt::Display for AsymmetricKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key material as supplied by a caller.
#[derive(Clone)]
pub enum KeyInput {
    /// PEM text.
    Pem(String),

    /// Raw DER bytes.
    Der(Vec<u8>),

    /// Encrypted PKCS#8 key, PEM or DER, with its passphrase.
    Encrypted {
        /// PEM text or DER bytes.
        key: Vec<u8>,
        /// Passphrase protecting the key.
        passphrase: String,
    },

    /// Previously parsed key.
    Object(KeyObject),
}

impl KeyInput {
    /// Encrypted PKCS#8 key with its passphrase.
    pub fn encrypted(key: impl Into<Vec<u8>>, passphrase: impl Into<String>) -> Self {
        Self::Encrypted {
            key: key.into(),
            passphrase: passphrase.into(),
        }
    }
}

impl fmt::Debug for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pem(_) => f.write_str("KeyInput::Pem(..)"),
            Self::Der(_) => f.write_str("KeyInput::Der(..)"),
            Self::Encrypted { .. } => f.write_str("KeyInput::Encrypted { .. }"),
            Self::Object(key) => f.debug_tuple("KeyInput::Object").field(key).finish(),
        }
    }
}

impl From<&str> for KeyInput {
    fn from(pem: &str) -> Self {
        Self::Pem(pem.to_owned())
    }
}

impl From<String> for KeyInput {
    fn from(pem: String) -> Self {
        Self::Pem(pem)
    }
}

impl From<&[u8]> for KeyInput {
    fn from(der: &[u8]) -> Self {
        Self::Der(der.to_vec())
    }
}

impl From<Vec<u8>> for KeyInput {
    fn from(der: Vec<u8>) -> Self {
        Self::Der(der)
    }
}

impl From<KeyObject> for KeyInput {
    fn from(key: KeyObject) -> Self {
        Self::Object(key)
    }
}

/// Parsed asymmetric key.
#[derive(Clone)]
pub struct KeyObject {
    key: Key,
}

#[derive(Clone)]
enum Key {
    Private(PrivateKey),
    Public(PublicKey),
}

#[derive(Clone)]
pub(crate) enum PrivateKey {
    Rsa(Box<RsaPrivateKey>),
    Ec(EcSecretKey),
    Ed25519(Box<ed25519_dalek::SigningKey>),
    Ed448(Box<ed448_goldilocks_plus::SigningKey>),
}

#[derive(Clone)]
pub(crate) enum PublicKey {
    Rsa(Box<RsaPublicKey>),
    Ec(EcPublicKey),
    Ed25519(ed25519_dalek::VerifyingKey),
    Ed448(ed448_goldilocks_plus::VerifyingKey),
}

impl PrivateKey {
    fn asymmetric_key_type(&self) -> AsymmetricKeyType {
        match self {
            Self::Rsa(_) => AsymmetricKeyType::Rsa,
            Self::Ec(_) => AsymmetricKeyType::Ec,
            Self::Ed25519(_) => AsymmetricKeyType::Ed25519,
            Self::Ed448(_) => AsymmetricKeyType::Ed448,
        }
    }

    fn public_key(&self) -> PublicKey {
        match self {
            Self::Rsa(key) => PublicKey::Rsa(Box::new(key.to_public_key())),
            Self::Ec(key) => PublicKey::Ec(key.public_key()),
            Self::Ed25519(key) => PublicKey::Ed25519(key.verifying_key()),
            Self::Ed448(key) => PublicKey::Ed448(key.verifying_key()),
        }
    }
}

impl PublicKey {
    fn asymmetric_key_type(&self) -> AsymmetricKeyType {
        match self {
            Self::Rsa(_) => AsymmetricKeyType::Rsa,
            Self::Ec(_) => AsymmetricKeyType::Ec,
            Self::Ed25519(_) => AsymmetricKeyType::Ed25519,
            Self::Ed448(_) => AsymmetricKeyType::Ed448,
        }
    }
}

impl KeyObject {
    /// Parse a private key.
    ///
    /// `passphrase` decrypts `ENCRYPTED PRIVATE KEY` material; the
    /// passphrase inside [`KeyInput::Encrypted`] takes precedence. A
    /// [`KeyInput::Object`] is returned as-is.
    pub fn parse_private(input: impl Into<KeyInput>, passphrase: Option<&str>) -> Result<Self> {
        let parsed = match input.into() {
            KeyInput::Object(key) => return Ok(key),
            KeyInput::Pem(pem) => parse_private(pem.as_bytes(), passphrase),
            KeyInput::Der(der) => parse_private(&der, passphrase),
            KeyInput::Encrypted { key, passphrase } => parse_private(&key, Some(&passphrase)),
        };

        let key = parsed.map_err(|e| Error::new(ErrorKind::InvalidPrivateKey).with_source(e))?;
        let key = Self {
            key: Key::Private(key),
        };

        tracing::trace!(key = ?key, "parsed private key");
        Ok(key)
    }

    /// Parse a public key.
    ///
    /// Private PEM, DER or encrypted key material is accepted too, in which
    /// case its public half is derived. A [`KeyInput::Object`] must already
    /// be a public key; use [`KeyObject::to_public`] to convert a private
    /// one explicitly.
    pub fn parse_public(input: impl Into<KeyInput>) -> Result<Self> {
        let key = Self {
            key: Key::Public(public_from_input(input.into())?),
        };

        tracing::trace!(key = ?key, "parsed public key");
        Ok(key)
    }

    /// Public half of this key.
    pub fn to_public(&self) -> Self {
        let public = match &self.key {
            Key::Public(key) => key.clone(),
            Key::Private(key) => key.public_key(),
        };

        Self {
            key: Key::Public(public),
        }
    }

    /// Whether this is a public or a private key.
    pub fn key_type(&self) -> KeyType {
        match self.key {
            Key::Private(_) => KeyType::Private,
            Key::Public(_) => KeyType::Public,
        }
    }

    /// Algorithm family of this key.
    pub fn asymmetric_key_type(&self) -> AsymmetricKeyType {
        match &self.key {
            Key::Private(key) => key.asymmetric_key_type(),
            Key::Public(key) => key.asymmetric_key_type(),
        }
    }

    /// Named curve of an EC key.
    pub fn curve(&self) -> Option<EcCurve> {
        match &self.key {
            Key::Private(PrivateKey::Ec(key)) => Some(key.curve()),
            Key::Public(PublicKey::Ec(key)) => Some(key.curve()),
            _ => None,
        }
    }

    /// Curve of an EdDSA key.
    pub fn eddsa_curve(&self) -> Option<EddsaCurve> {
        match self.asymmetric_key_type() {
            AsymmetricKeyType::Ed25519 => Some(EddsaCurve::Ed25519),
            AsymmetricKeyType::Ed448 => Some(EddsaCurve::Ed448),
            _ => None,
        }
    }

    /// Modulus length of an RSA key in bits.
    pub fn modulus_bits(&self) -> Option<usize> {
        match &self.key {
            Key::Private(PrivateKey::Rsa(key)) => Some(key.size() * 8),
            Key::Public(PublicKey::Rsa(key)) => Some(key.size() * 8),
            _ => None,
        }
    }
}

impl fmt::Debug for KeyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("KeyObject");
        debug
            .field("type", &self.key_type())
            .field("algorithm", &self.asymmetric_key_type());

        if let Some(curve) = self.curve() {
            debug.field("curve", &curve);
        }

        if let Some(bits) = self.modulus_bits() {
            debug.field("modulus_bits", &bits);
        }

        debug.finish()
    }
}

/// Resolve caller input to the private key of one algorithm family.
///
/// `extract` returns `None` when the key belongs to another family.
pub(crate) fn resolve_private<T>(
    input: KeyInput,
    passphrase: Option<&str>,
    expected: &'static str,
    extract: impl FnOnce(PrivateKey) -> Option<T>,
) -> Result<T> {
    let key = KeyObject::parse_private(input, passphrase)?;
    let algorithm = key.asymmetric_key_type();

    let private = match key.key {
        Key::Private(private) => private,
        Key::Public(_) => {
            return Err(Error::new(ErrorKind::InvalidPrivateKey)
                .with_context("keyType", KeyType::Public)
                .with_context("keyAlgo", algorithm));
        }
    };

    extract(private).ok_or_else(|| {
        Error::new(ErrorKind::InvalidPrivateKey)
            .with_context("keyAlgo", algorithm)
            .with_context("expectedAlgo", expected)
    })
}

/// Resolve caller input to the public key of one algorithm family.
pub(crate) fn resolve_public<T>(
    input: KeyInput,
    expected: &'static str,
    extract: impl FnOnce(PublicKey) -> Option<T>,
) -> Result<T> {
    let public = public_from_input(input)?;
    let algorithm = public.asymmetric_key_type();

    extract(public).ok_or_else(|| {
        Error::new(ErrorKind::InvalidPublicKey)
            .with_context("keyAlgo", algorithm)
            .with_context("expectedAlgo", expected)
    })
}

fn public_from_input(input: KeyInput) -> Result<PublicKey> {
    let parsed = match input {
        KeyInput::Object(KeyObject {
            key: Key::Public(key),
        }) => return Ok(key),
        KeyInput::Object(key) => {
            return Err(Error::new(ErrorKind::InvalidPublicKey)
                .with_context("keyType", KeyType::Private)
                .with_context("keyAlgo", key.asymmetric_key_type()));
        }
        KeyInput::Pem(pem) => parse_public(pem.as_bytes(), None),
        KeyInput::Der(der) => parse_public(&der, None),
        KeyInput::Encrypted { key, passphrase } => parse_public(&key, Some(&passphrase)),
    };

    parsed.map_err(|e| Error::new(ErrorKind::InvalidPublicKey).with_source(e))
}

type ParseResult<T> = core::result::Result<T, BoxError>;

/// Split PEM armor off `bytes`, or pass DER through unlabeled.
fn unarmor(bytes: &[u8]) -> ParseResult<(Option<String>, Vec<u8>)> {
    let trimmed = bytes.trim_ascii();

    if trimmed.starts_with(b"-----BEGIN ") {
        let (label, der) = pem_rfc7468::decode_vec(trimmed)?;
        Ok((Some(label.to_owned()), der))
    } else {
        Ok((None, bytes.to_vec()))
    }
}

fn parse_private(bytes: &[u8], passphrase: Option<&str>) -> ParseResult<PrivateKey> {
    let (label, der) = unarmor(bytes)?;

    match label.as_deref() {
        Some("PRIVATE KEY") => pkcs8_private(&der),
        Some("ENCRYPTED PRIVATE KEY") => encrypted_private(&der, passphrase),
        Some("EC PRIVATE KEY") => sec1_private(&der),
        Some("RSA PRIVATE KEY") => Ok(PrivateKey::Rsa(Box::new(RsaPrivateKey::from_pkcs1_der(
            &der,
        )?))),
        Some(other) => Err(format!("unsupported PEM label {other:?}").into()),
        None => sniff_private(&der, passphrase),
    }
}

fn parse_public(bytes: &[u8], passphrase: Option<&str>) -> ParseResult<PublicKey> {
    let (label, der) = unarmor(bytes)?;

    match label.as_deref() {
        Some("PUBLIC KEY") => spki_public(&der),
        Some("RSA PUBLIC KEY") => Ok(PublicKey::Rsa(Box::new(RsaPublicKey::from_pkcs1_der(&der)?))),
        Some(_) => Ok(parse_private(bytes, passphrase)?.public_key()),
        None => {
            if let Ok(key) = spki_public(&der) {
                return Ok(key);
            }

            if let Ok(key) = RsaPublicKey::from_pkcs1_der(&der) {
                return Ok(PublicKey::Rsa(Box::new(key)));
            }

            Ok(sniff_private(&der, passphrase)?.public_key())
        }
    }
}

/// Identify unlabeled private key DER by trying each structure in turn.
fn sniff_private(der: &[u8], passphrase: Option<&str>) -> ParseResult<PrivateKey> {
    if PrivateKeyInfo::from_der(der).is_ok() {
        return pkcs8_private(der);
    }

    if EncryptedPrivateKeyInfo::from_der(der).is_ok() {
        return encrypted_private(der, passphrase);
    }

    if sec1::EcPrivateKey::from_der(der).is_ok() {
        return sec1_private(der);
    }

    match RsaPrivateKey::from_pkcs1_der(der) {
        Ok(key) => Ok(PrivateKey::Rsa(Box::new(key))),
        Err(_) => Err("unrecognized private key encoding".into()),
    }
}

fn pkcs8_private(der: &[u8]) -> ParseResult<PrivateKey> {
    let info = PrivateKeyInfo::from_der(der)?;
    let oid = info.algorithm.oid;

    if oid == RSA_ENCRYPTION_OID {
        Ok(PrivateKey::Rsa(Box::new(RsaPrivateKey::from_pkcs8_der(der)?)))
    } else if oid == EC_PUBLIC_KEY_OID {
        let curve = named_curve(info.algorithm.parameters_oid()?)?;
        Ok(PrivateKey::Ec(EcSecretKey::from_pkcs8_der(curve, der)?))
    } else if oid == ED25519_OID {
        Ok(PrivateKey::Ed25519(Box::new(
            ed25519_dalek::SigningKey::from_pkcs8_der(der)?,
        )))
    } else if oid == ED448_OID {
        Ok(PrivateKey::Ed448(Box::new(eddsa::ed448_signing_key(
            info.private_key,
        )?)))
    } else {
        Err(format!("unsupported key algorithm {oid}").into())
    }
}

fn encrypted_private(der: &[u8], passphrase: Option<&str>) -> ParseResult<PrivateKey> {
    let passphrase = passphrase.ok_or("encrypted private key requires a passphrase")?;
    let document = EncryptedPrivateKeyInfo::from_der(der)?.decrypt(passphrase)?;
    pkcs8_private(document.as_bytes())
}

fn sec1_private(der: &[u8]) -> ParseResult<PrivateKey> {
    let key = sec1::EcPrivateKey::from_der(der)?;
    let oid = key
        .parameters
        .and_then(|params| params.named_curve())
        .ok_or("EC private key does not name its curve")?;

    Ok(PrivateKey::Ec(EcSecretKey::from_sec1_der(named_curve(oid)?, der)?))
}

fn spki_public(der: &[u8]) -> ParseResult<PublicKey> {
    let info = SubjectPublicKeyInfoRef::from_der(der)?;
    let oid = info.algorithm.oid;

    if oid == RSA_ENCRYPTION_OID {
        Ok(PublicKey::Rsa(Box::new(RsaPublicKey::from_public_key_der(der)?)))
    } else if oid == EC_PUBLIC_KEY_OID {
        let curve = named_curve(info.algorithm.parameters_oid()?)?;
        Ok(PublicKey::Ec(EcPublicKey::from_public_key_der(curve, der)?))
    } else if oid == ED25519_OID {
        Ok(PublicKey::Ed25519(ed25519_dalek::VerifyingKey::from_public_key_der(der)?))
    } else if oid == ED448_OID {
        let bytes = info
            .subject_public_key
            .as_bytes()
            .ok_or("Ed448 public key has unused bits")?;
        Ok(PublicKey::Ed448(eddsa::ed448_verifying_key(bytes)?))
    } else {
        Err(format!("unsupported key algorithm {oid}").into())
    }
}

fn named_curve(oid: ObjectIdentifier) -> ParseResult<EcCurve> {
    EcCurve::from_oid(oid).ok_or_else(|| format!("unsupported named curve {oid}").into())
}
