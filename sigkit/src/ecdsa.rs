//! Elliptic Curve Digital Signature Algorithm (ECDSA) over the NIST prime
//! curves P-256, P-384 and P-521.
//!
//! The message is digested with the configured hash algorithm and the digest
//! is signed with an RFC 6979 deterministic nonce. Signatures are produced
//! and accepted either in ASN.1 DER form or in the fixed-width IEEE P1363
//! form used by JOSE and WebCrypto; [`der_to_p1363`] and [`p1363_to_der`]
//! convert between the two.
//!
//! ## Digest length
//!
//! Any supported digest may be paired with any curve. A digest narrower than
//! the curve's field is taken as an integer, as OpenSSL does, so `sha1` on
//! P-521 interoperates with other implementations.

mod curve;
mod format;

pub use self::{
    curve::EcCurve,
    format::{SignatureFormat, der_to_p1363, der_to_p1363_with_width, p1363_to_der},
};

pub(crate) use self::curve::{EcPublicKey, EcSecretKey};

use crate::{
    Algorithm, Encoding, Error, ErrorKind, HashAlgorithm, Result, SignAlgorithm,
    hash,
    key::{self, KeyInput, PrivateKey, PublicKey},
    signer::Signer,
    stream,
};
use core::fmt;
use tokio::io::AsyncRead;

const SUPPORTED_ALGORITHMS: &[HashAlgorithm] = &[
    HashAlgorithm::Sha1,
    HashAlgorithm::Sha224,
    HashAlgorithm::Sha256,
    HashAlgorithm::Sha384,
    HashAlgorithm::Sha512,
    HashAlgorithm::Sha3_224,
    HashAlgorithm::Sha3_256,
    HashAlgorithm::Sha3_384,
    HashAlgorithm::Sha3_512,
];

/// Hash algorithms usable with ECDSA.
pub fn supported_algorithms() -> &'static [HashAlgorithm] {
    SUPPORTED_ALGORITHMS
}

/// Options of the ECDSA signer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct EcdsaOptions {
    /// Signature encoding produced by signing and expected by verification.
    pub format: SignatureFormat,

    /// Passphrase of an encrypted private key.
    pub key_passphrase: Option<String>,

    /// Text encoding of signatures.
    pub encoding: Encoding,
}

impl EcdsaOptions {
    /// Set the signature format.
    pub fn with_format(mut self, format: SignatureFormat) -> Self {
        self.format = format;
        self
    }

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

/// Sign a message.
pub fn sign(
    algorithm: HashAlgorithm,
    private_key: impl Into<KeyInput>,
    message: impl AsRef<[u8]>,
    options: &EcdsaOptions,
) -> Result<Vec<u8>> {
    check_algorithm(algorithm)?;
    let key = secret_key(private_key.into(), options.key_passphrase.as_deref())?;
    sign_digest(&key, algorithm, &hash::hash(algorithm, message), options.format)
}

/// Verify a signature over a message.
pub fn verify(
    algorithm: HashAlgorithm,
    public_key: impl Into<KeyInput>,
    message: impl AsRef<[u8]>,
    signature: &[u8],
    options: &EcdsaOptions,
) -> Result<bool> {
    check_algorithm(algorithm)?;
    let key = self::public_key(public_key.into())?;
    verify_digest(&key, algorithm, &hash::hash(algorithm, message), signature, options.format)
}

/// Sign a message read from an asynchronous stream.
pub async fn sign_stream<R>(
    algorithm: HashAlgorithm,
    private_key: impl Into<KeyInput>,
    message: R,
    options: &EcdsaOptions,
) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin + Send,
{
    check_algorithm(algorithm)?;
    let key = secret_key(private_key.into(), options.key_passphrase.as_deref())?;
    let digest = digest_stream(algorithm, message, ErrorKind::SignFailed).await?;
    sign_digest(&key, algorithm, &digest, options.format)
}

/// Verify a signature over a message read from an asynchronous stream.
pub async fn verify_stream<R>(
    algorithm: HashAlgorithm,
    public_key: impl Into<KeyInput>,
    message: R,
    signature: &[u8],
    options: &EcdsaOptions,
) -> Result<bool>
where
    R: AsyncRead + Unpin + Send,
{
    check_algorithm(algorithm)?;
    let key = self::public_key(public_key.into())?;
    let digest = digest_stream(algorithm, message, ErrorKind::VerifyFailed).await?;
    verify_digest(&key, algorithm, &digest, signature, options.format)
}

/// [`Signer`] bound to an EC key pair and digest algorithm.
#[derive(Clone)]
pub struct EcdsaSigner {
    algorithm: HashAlgorithm,
    curve: EcCurve,
    format: SignatureFormat,
    encoding: Encoding,
    private: Option<EcSecretKey>,
    public: Option<EcPublicKey>,
}

impl EcdsaSigner {
    /// Create a signer from a public key, a private key, or both.
    ///
    /// Both keys, when given, must be on the same curve.
    pub fn new(
        algorithm: HashAlgorithm,
        public_key: Option<KeyInput>,
        private_key: Option<KeyInput>,
        options: EcdsaOptions,
    ) -> Result<Self> {
        check_algorithm(algorithm)?;

        let public = public_key.map(self::public_key).transpose()?;
        let private = private_key
            .map(|key| secret_key(key, options.key_passphrase.as_deref()))
            .transpose()?;

        if let (Some(public), Some(private)) = (&public, &private) {
            if public.curve() != private.curve() {
                return Err(Error::new(ErrorKind::KeyPairMismatch)
                    .with_context("publicKeyCurve", public.curve())
                    .with_context("privateKeyCurve", private.curve()));
            }
        }

        let Some(curve) = private
            .as_ref()
            .map(EcSecretKey::curve)
            .or_else(|| public.as_ref().map(EcPublicKey::curve))
        else {
            return Err(Error::new(ErrorKind::NoKeyProvided));
        };

        tracing::debug!(hash = %algorithm, %curve, format = %options.format, "created ECDSA signer");

        Ok(Self {
            algorithm,
            curve,
            format: options.format,
            encoding: options.encoding,
            private,
            public,
        })
    }

    /// Digest algorithm of this signer.
    pub fn digest(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Curve of this signer's keys.
    pub fn curve(&self) -> EcCurve {
        self.curve
    }

    /// Signature format of this signer.
    pub fn format(&self) -> SignatureFormat {
        self.format
    }

    fn private(&self) -> Result<&EcSecretKey> {
        self.private
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::NoPrivateKey))
    }

    fn public(&self) -> Result<&EcPublicKey> {
        self.public
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::NoPublicKey))
    }
}

impl fmt::Debug for EcdsaSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdsaSigner")
            .field("algorithm", &self.algorithm)
            .field("curve", &self.curve)
            .field("format", &self.format)
            .field("encoding", &self.encoding)
            .field("has_private_key", &self.private.is_some())
            .field("has_public_key", &self.public.is_some())
            .finish()
    }
}

impl Signer for EcdsaSigner {
    fn algorithm(&self) -> Algorithm {
        Algorithm::new(self.algorithm.as_str(), SignAlgorithm::Ecdsa)
    }

    fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let key = self.private()?;
        sign_digest(key, self.algorithm, &hash::hash(self.algorithm, message), self.format)
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool> {
        let key = self.public()?;
        let digest = hash::hash(self.algorithm, message);
        verify_digest(key, self.algorithm, &digest, signature, self.format)
    }

    async fn sign_stream<R>(&self, message: R) -> Result<Vec<u8>>
    where
        R: AsyncRead + Unpin + Send,
    {
        let key = self.private()?;
        let digest = digest_stream(self.algorithm, message, ErrorKind::SignFailed).await?;
        sign_digest(key, self.algorithm, &digest, self.format)
    }

    async fn verify_stream<R>(&self, message: R, signature: &[u8]) -> Result<bool>
    where
        R: AsyncRead + Unpin + Send,
    {
        let key = self.public()?;
        let digest = digest_stream(self.algorithm, message, ErrorKind::VerifyFailed).await?;
        verify_digest(key, self.algorithm, &digest, signature, self.format)
    }
}

fn check_algorithm(algorithm: HashAlgorithm) -> Result<()> {
    if SUPPORTED_ALGORITHMS.contains(&algorithm) {
        Ok(())
    } else {
        Err(Error::unsupported("ecdsa", algorithm))
    }
}

fn secret_key(input: KeyInput, passphrase: Option<&str>) -> Result<EcSecretKey> {
    key::resolve_private(input, passphrase, "ec", |key| match key {
        PrivateKey::Ec(key) => Some(key),
        _ => None,
    })
}

fn public_key(input: KeyInput) -> Result<EcPublicKey> {
    key::resolve_public(input, "ec", |key| match key {
        PublicKey::Ec(key) => Some(key),
        _ => None,
    })
}

async fn digest_stream<R>(algorithm: HashAlgorithm, message: R, kind: ErrorKind) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin + Send,
{
    let mut ctx = hash::context(algorithm);

    stream::drain(message, |chunk| ctx.update(chunk))
        .await
        .map_err(|e| {
            Error::new(kind)
                .with_context("hashAlgo", algorithm)
                .with_source(e)
        })?;

    Ok(ctx.finalize())
}

fn sign_digest(
    key: &EcSecretKey,
    algorithm: HashAlgorithm,
    digest: &[u8],
    format: SignatureFormat,
) -> Result<Vec<u8>> {
    let der = key.sign_prehash_der(digest).map_err(|e| {
        tracing::debug!(error = %e, hash = %algorithm, curve = %key.curve(), "ECDSA signing failed");
        Error::new(ErrorKind::SignFailed)
            .with_context("hashAlgo", algorithm)
            .with_context("curve", key.curve())
            .with_source(e)
    })?;

    match format {
        SignatureFormat::Der => Ok(der),
        SignatureFormat::IeeeP1363 => der_to_p1363_with_width(&der, key.curve().component_size()),
    }
}

fn verify_digest(
    key: &EcPublicKey,
    algorithm: HashAlgorithm,
    digest: &[u8],
    signature: &[u8],
    format: SignatureFormat,
) -> Result<bool> {
    let der = match format {
        SignatureFormat::Der => signature.to_vec(),
        SignatureFormat::IeeeP1363 => {
            if signature.len() != key.curve().component_size() * 2 {
                return Ok(false);
            }

            match p1363_to_der(signature) {
                Ok(der) => der,
                Err(_) => return Ok(false),
            }
        }
    };

    match key.verify_prehash_der(digest, &der) {
        Ok(()) => Ok(true),
        Err(e) => {
            tracing::trace!(error = %e, hash = %algorithm, curve = %key.curve(), "ECDSA signature rejected");
            Ok(false)
        }
    }
}
