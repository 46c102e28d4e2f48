//! RSA signatures with PKCS#1 v1.5 or PSS (MGF1) padding.

use crate::{
    Algorithm, Encoding, Error, ErrorKind, HashAlgorithm, Result, SignAlgorithm, hash,
    key::{self, KeyInput, PrivateKey, PublicKey},
    signer::Signer,
    stream,
};
use core::fmt;
use digest::{Digest, DynDigest};
use md5::Md5;
use rand_core::OsRng;
use ripemd::Ripemd160;
use rsa::{Pkcs1v15Sign, Pss, RsaPrivateKey, RsaPublicKey, traits::PublicKeyParts};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};
use tokio::io::AsyncRead;

const SUPPORTED_ALGORITHMS: &[HashAlgorithm] = &[
    HashAlgorithm::Sha1,
    HashAlgorithm::Md5,
    HashAlgorithm::Ripemd160,
    HashAlgorithm::Sha224,
    HashAlgorithm::Sha256,
    HashAlgorithm::Sha384,
    HashAlgorithm::Sha512,
    HashAlgorithm::Sha3_224,
    HashAlgorithm::Sha3_256,
    HashAlgorithm::Sha3_384,
    HashAlgorithm::Sha3_512,
];

/// Hash algorithms usable with RSA.
pub fn supported_algorithms() -> &'static [HashAlgorithm] {
    SUPPORTED_ALGORITHMS
}

/// RSA signature padding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RsaPadding {
    /// RSASSA-PKCS1-v1_5.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "pkcs1-v1_5"))]
    Pkcs1v15,

    /// RSASSA-PSS with MGF1 over the message digest.
    #[cfg_attr(feature = "serde", serde(rename = "pss-mgf1"))]
    PssMgf1,
}

impl RsaPadding {
    /// Name of this padding.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pkcs1v15 => "pkcs1-v1_5",
            Self::PssMgf1 => "pss-mgf1",
        }
    }
}

impl fmt::Display for RsaPadding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options of the RSA signer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct RsaOptions {
    /// Signature padding.
    pub padding: RsaPadding,

    /// PSS salt length in bytes.
    ///
    /// When unset, signing uses the digest length and verification accepts
    /// any salt length.
    pub salt_length: Option<usize>,

    /// Passphrase of an encrypted private key.
    pub key_passphrase: Option<String>,

    /// Text encoding of signatures.
    pub encoding: Encoding,
}

impl RsaOptions {
    /// Set the padding.
    pub fn with_padding(mut self, padding: RsaPadding) -> Self {
        self.padding = padding;
        self
    }

    /// Set the PSS salt length.
    pub fn with_salt_length(mut self, salt_length: usize) -> Self {
        self.salt_length = Some(salt_length);
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

/// Padding parameters shared by signing and verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Padding {
    algorithm: HashAlgorithm,
    padding: RsaPadding,
    salt_length: Option<usize>,
}

impl Padding {
    fn new(algorithm: HashAlgorithm, options: &RsaOptions) -> Result<Self> {
        if !SUPPORTED_ALGORITHMS.contains(&algorithm) {
            return Err(Error::unsupported("rsa", algorithm));
        }

        Ok(Self {
            algorithm,
            padding: options.padding,
            salt_length: options.salt_length,
        })
    }

    fn sign(&self, key: &RsaPrivateKey, digest: &[u8]) -> Result<Vec<u8>> {
        let signature = match self.padding {
            RsaPadding::Pkcs1v15 => key.sign(self.pkcs1v15()?, digest),
            RsaPadding::PssMgf1 => key.sign_with_rng(&mut OsRng, self.pss(self.salt_length)?, digest),
        };

        signature.map_err(|e| {
            tracing::debug!(error = %e, hash = %self.algorithm, padding = %self.padding, "RSA signing failed");
            self.error(ErrorKind::SignFailed).with_source(e)
        })
    }

    fn verify(&self, key: &RsaPublicKey, digest: &[u8], signature: &[u8]) -> Result<bool> {
        let verified = match (self.padding, self.salt_length) {
            (RsaPadding::Pkcs1v15, _) => key.verify(self.pkcs1v15()?, digest, signature),
            (RsaPadding::PssMgf1, Some(salt)) => key.verify(self.pss(Some(salt))?, digest, signature),
            (RsaPadding::PssMgf1, None) => return self.verify_pss_any_salt(key, digest, signature),
        };

        self.verified(verified)
    }

    /// PSS verification with no configured salt length, accepting any salt
    /// length the key admits.
    ///
    /// The digest length and the maximum are tried first since they are what
    /// signers use in practice.
    fn verify_pss_any_salt(
        &self,
        key: &RsaPublicKey,
        digest: &[u8],
        signature: &[u8],
    ) -> Result<bool> {
        let em_len = key.n().bits().saturating_sub(1).div_ceil(8);
        let max = em_len.saturating_sub(digest.len() + 2);

        let preferred = [digest.len(), max];
        let salt_lengths = preferred
            .into_iter()
            .filter(|&len| len <= max)
            .chain((0..=max).filter(|len| !preferred.contains(len)));

        for salt_length in salt_lengths {
            let verified = key.verify(self.pss(Some(salt_length))?, digest, signature);

            if self.verified(verified)? {
                tracing::trace!(salt_length, "recovered PSS salt length");
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn verified(&self, verified: rsa::Result<()>) -> Result<bool> {
        match verified {
            Ok(()) => Ok(true),
            Err(rsa::Error::Verification) => Ok(false),
            Err(e) => {
                tracing::debug!(error = %e, hash = %self.algorithm, padding = %self.padding, "RSA verification failed");
                Err(self.error(ErrorKind::VerifyFailed).with_source(e))
            }
        }
    }

    fn error(&self, kind: ErrorKind) -> Error {
        Error::new(kind)
            .with_context("hashAlgo", self.algorithm)
            .with_context("padding", self.padding)
    }

    fn pkcs1v15(&self) -> Result<Pkcs1v15Sign> {
        Ok(match self.algorithm {
            HashAlgorithm::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
            HashAlgorithm::Md5 => Pkcs1v15Sign::new::<Md5>(),
            HashAlgorithm::Ripemd160 => Pkcs1v15Sign::new::<Ripemd160>(),
            HashAlgorithm::Sha224 => Pkcs1v15Sign::new::<Sha224>(),
            HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
            HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
            HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
            HashAlgorithm::Sha3_224 => Pkcs1v15Sign::new::<Sha3_224>(),
            HashAlgorithm::Sha3_256 => Pkcs1v15Sign::new::<Sha3_256>(),
            HashAlgorithm::Sha3_384 => Pkcs1v15Sign::new::<Sha3_384>(),
            HashAlgorithm::Sha3_512 => Pkcs1v15Sign::new::<Sha3_512>(),
            other => return Err(Error::unsupported("rsa", other)),
        })
    }

    fn pss(&self, salt_length: Option<usize>) -> Result<Pss> {
        fn scheme<D>(salt_length: Option<usize>) -> Pss
        where
            D: 'static + Digest + DynDigest + Send + Sync,
        {
            match salt_length {
                Some(len) => Pss::new_with_salt::<D>(len),
                None => Pss::new::<D>(),
            }
        }

        Ok(match self.algorithm {
            HashAlgorithm::Sha1 => scheme::<Sha1>(salt_length),
            HashAlgorithm::Md5 => scheme::<Md5>(salt_length),
            HashAlgorithm::Ripemd160 => scheme::<Ripemd160>(salt_length),
            HashAlgorithm::Sha224 => scheme::<Sha224>(salt_length),
            HashAlgorithm::Sha256 => scheme::<Sha256>(salt_length),
            HashAlgorithm::Sha384 => scheme::<Sha384>(salt_length),
            HashAlgorithm::Sha512 => scheme::<Sha512>(salt_length),
            HashAlgorithm::Sha3_224 => scheme::<Sha3_224>(salt_length),
            HashAlgorithm::Sha3_256 => scheme::<Sha3_256>(salt_length),
            HashAlgorithm::Sha3_384 => scheme::<Sha3_384>(salt_length),
            HashAlgorithm::Sha3_512 => scheme::<Sha3_512>(salt_length),
            other => return Err(Error::unsupported("rsa", other)),
        })
    }
}

fn private_key(input: KeyInput, passphrase: Option<&str>) -> Result<Box<RsaPrivateKey>> {
    key::resolve_private(input, passphrase, "rsa", |key| match key {
        PrivateKey::Rsa(key) => Some(key),
        _ => None,
    })
}

fn public_key(input: KeyInput) -> Result<Box<RsaPublicKey>> {
    key::resolve_public(input, "rsa", |key| match key {
        PublicKey::Rsa(key) => Some(key),
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

/// Sign a message.
pub fn sign(
    algorithm: HashAlgorithm,
    private_key: impl Into<KeyInput>,
    message: impl AsRef<[u8]>,
    options: &RsaOptions,
) -> Result<Vec<u8>> {
    let padding = Padding::new(algorithm, options)?;
    let key = self::private_key(private_key.into(), options.key_passphrase.as_deref())?;
    padding.sign(&key, &hash::hash(algorithm, message))
}

/// Verify a signature over a message.
pub fn verify(
    algorithm: HashAlgorithm,
    public_key: impl Into<KeyInput>,
    message: impl AsRef<[u8]>,
    signature: &[u8],
    options: &RsaOptions,
) -> Result<bool> {
    let padding = Padding::new(algorithm, options)?;
    let key = self::public_key(public_key.into())?;
    padding.verify(&key, &hash::hash(algorithm, message), signature)
}

/// Sign a message read from an asynchronous stream.
pub async fn sign_stream<R>(
    algorithm: HashAlgorithm,
    private_key: impl Into<KeyInput>,
    message: R,
    options: &RsaOptions,
) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin + Send,
{
    let padding = Padding::new(algorithm, options)?;
    let key = self::private_key(private_key.into(), options.key_passphrase.as_deref())?;
    let digest = digest_stream(algorithm, message, ErrorKind::SignFailed).await?;
    padding.sign(&key, &digest)
}

/// Verify a signature over a message read from an asynchronous stream.
pub async fn verify_stream<R>(
    algorithm: HashAlgorithm,
    public_key: impl Into<KeyInput>,
    message: R,
    signature: &[u8],
    options: &RsaOptions,
) -> Result<bool>
where
    R: AsyncRead + Unpin + Send,
{
    let padding = Padding::new(algorithm, options)?;
    let key = self::public_key(public_key.into())?;
    let digest = digest_stream(algorithm, message, ErrorKind::VerifyFailed).await?;
    padding.verify(&key, &digest, signature)
}

/// [`Signer`] bound to an RSA key pair, digest algorithm and padding.
#[derive(Clone)]
pub struct RsaSigner {
    padding: Padding,
    encoding: Encoding,
    private: Option<Box<RsaPrivateKey>>,
    public: Option<Box<RsaPublicKey>>,
}

impl RsaSigner {
    /// Create a signer from a public key, a private key, or both.
    ///
    /// Both keys, when given, must have the same modulus length.
    pub fn new(
        algorithm: HashAlgorithm,
        public_key: Option<KeyInput>,
        private_key: Option<KeyInput>,
        options: RsaOptions,
    ) -> Result<Self> {
        let padding = Padding::new(algorithm, &options)?;

        if public_key.is_none() && private_key.is_none() {
            return Err(Error::new(ErrorKind::NoKeyProvided));
        }

        let public = public_key.map(self::public_key).transpose()?;
        let private = private_key
            .map(|key| self::private_key(key, options.key_passphrase.as_deref()))
            .transpose()?;

        if let (Some(public), Some(private)) = (&public, &private) {
            if public.size() != private.size() {
                return Err(Error::new(ErrorKind::KeyPairMismatch)
                    .with_context("privateKeyLength", private.size() * 8)
                    .with_context("publicKeyLength", public.size() * 8));
            }
        }

        tracing::debug!(
            hash = %algorithm,
            padding = %options.padding,
            salt_length = ?options.salt_length,
            "created RSA signer"
        );

        Ok(Self {
            padding,
            encoding: options.encoding,
            private,
            public,
        })
    }

    /// Digest algorithm of this signer.
    pub fn digest(&self) -> HashAlgorithm {
        self.padding.algorithm
    }

    /// Padding of this signer.
    pub fn padding(&self) -> RsaPadding {
        self.padding.padding
    }

    /// Modulus length of this signer's keys in bits.
    pub fn modulus_bits(&self) -> usize {
        self.private
            .as_ref()
            .map(|key| key.size())
            .or_else(|| self.public.as_ref().map(|key| key.size()))
            .unwrap_or_default()
            * 8
    }

    fn private(&self) -> Result<&RsaPrivateKey> {
        self.private
            .as_deref()
            .ok_or_else(|| Error::new(ErrorKind::NoPrivateKey))
    }

    fn public(&self) -> Result<&RsaPublicKey> {
        self.public
            .as_deref()
            .ok_or_else(|| Error::new(ErrorKind::NoPublicKey))
    }
}

impl fmt::Debug for RsaSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaSigner")
            .field("algorithm", &self.padding.algorithm)
            .field("padding", &self.padding.padding)
            .field("salt_length", &self.padding.salt_length)
            .field("encoding", &self.encoding)
            .field("modulus_bits", &self.modulus_bits())
            .finish_non_exhaustive()
    }
}

impl Signer for RsaSigner {
    fn algorithm(&self) -> Algorithm {
        Algorithm::new(self.padding.algorithm.as_str(), SignAlgorithm::Rsa)
    }

    fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let key = self.private()?;
        self.padding
            .sign(key, &hash::hash(self.padding.algorithm, message))
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool> {
        let key = self.public()?;
        self.padding
            .verify(key, &hash::hash(self.padding.algorithm, message), signature)
    }

    async fn sign_stream<R>(&self, message: R) -> Result<Vec<u8>>
    where
        R: AsyncRead + Unpin + Send,
    {
        let key = self.private()?;
        let digest = digest_stream(self.padding.algorithm, message, ErrorKind::SignFailed).await?;
        self.padding.sign(key, &digest)
    }

    async fn verify_stream<R>(&self, message: R, signature: &[u8]) -> Result<bool>
    where
        R: AsyncRead + Unpin + Send,
    {
        let key = self.public()?;
        let digest = digest_stream(self.padding.algorithm, message, ErrorKind::VerifyFailed).await?;
        self.padding.verify(key, &digest, signature)
    }
}
