//! HMAC signing and verification.
//!
//! Verification recomputes the MAC and compares it to the supplied signature
//! in constant time.

use crate::{
    Algorithm, Encoding, Error, ErrorKind, HashAlgorithm, Result, SignAlgorithm, signer::Signer,
    stream,
};
use blake2::{Blake2b512, Blake2s256};
use core::fmt;
use digest::{Digest, KeyInit, core_api::BlockSizeUser};
use hmac::{Mac, SimpleHmac};
use md5::Md5;
use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};
use sm3::Sm3;
use subtle::ConstantTimeEq;
use tokio::io::AsyncRead;

const SUPPORTED_ALGORITHMS: &[HashAlgorithm] = &[
    HashAlgorithm::Blake2b512,
    HashAlgorithm::Blake2s256,
    HashAlgorithm::Md5,
    HashAlgorithm::Ripemd160,
    HashAlgorithm::Sha1,
    HashAlgorithm::Sha224,
    HashAlgorithm::Sha256,
    HashAlgorithm::Sha384,
    HashAlgorithm::Sha512,
    HashAlgorithm::Sha512_224,
    HashAlgorithm::Sha512_256,
    HashAlgorithm::Sha3_224,
    HashAlgorithm::Sha3_256,
    HashAlgorithm::Sha3_384,
    HashAlgorithm::Sha3_512,
    HashAlgorithm::Sm3,
];

/// Hash algorithms usable with HMAC.
pub fn supported_algorithms() -> &'static [HashAlgorithm] {
    SUPPORTED_ALGORITHMS
}

/// Compute the HMAC of a message.
pub fn sign(
    algorithm: HashAlgorithm,
    key: impl AsRef<[u8]>,
    message: impl AsRef<[u8]>,
) -> Result<Vec<u8>> {
    let mut ctx = context(algorithm, key.as_ref())?;
    ctx.update(message.as_ref());
    Ok(ctx.finalize())
}

/// Check an HMAC over a message.
pub fn verify(
    algorithm: HashAlgorithm,
    key: impl AsRef<[u8]>,
    message: impl AsRef<[u8]>,
    signature: &[u8],
) -> Result<bool> {
    let expected = sign(algorithm, key, message)?;
    Ok(expected.ct_eq(signature).into())
}

/// Compute the HMAC of a message read from an asynchronous stream.
pub async fn sign_stream<R>(
    algorithm: HashAlgorithm,
    key: impl AsRef<[u8]>,
    message: R,
) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin + Send,
{
    mac_stream(algorithm, key.as_ref(), message)
        .await
        .map_err(|e| read_error(ErrorKind::SignFailed, algorithm, e))
}

/// Check an HMAC over a message read from an asynchronous stream.
pub async fn verify_stream<R>(
    algorithm: HashAlgorithm,
    key: impl AsRef<[u8]>,
    message: R,
    signature: &[u8],
) -> Result<bool>
where
    R: AsyncRead + Unpin + Send,
{
    let expected = mac_stream(algorithm, key.as_ref(), message)
        .await
        .map_err(|e| read_error(ErrorKind::VerifyFailed, algorithm, e))?;

    Ok(expected.ct_eq(signature).into())
}

/// [`Signer`] bound to an HMAC key and digest.
#[derive(Clone)]
pub struct HmacSigner {
    algorithm: HashAlgorithm,
    key: Vec<u8>,
    encoding: Encoding,
}

impl HmacSigner {
    /// Create a signer for `algorithm` keyed with `key`.
    pub fn new(algorithm: HashAlgorithm, key: impl AsRef<[u8]>) -> Result<Self> {
        if !SUPPORTED_ALGORITHMS.contains(&algorithm) {
            return Err(Error::unsupported("hmac", algorithm));
        }

        tracing::debug!(hash = %algorithm, "created HMAC signer");

        Ok(Self {
            algorithm,
            key: key.as_ref().to_vec(),
            encoding: Encoding::default(),
        })
    }

    /// Set the text encoding used by [`Signer::sign_encoded`].
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Digest algorithm of this signer.
    pub fn digest(&self) -> HashAlgorithm {
        self.algorithm
    }
}

impl fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacSigner")
            .field("algorithm", &self.algorithm)
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

impl Signer for HmacSigner {
    fn algorithm(&self) -> Algorithm {
        Algorithm::new(self.algorithm.as_str(), SignAlgorithm::Hmac)
    }

    fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        sign(self.algorithm, &self.key, message)
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool> {
        verify(self.algorithm, &self.key, message, signature)
    }

    async fn sign_stream<R>(&self, message: R) -> Result<Vec<u8>>
    where
        R: AsyncRead + Unpin + Send,
    {
        sign_stream(self.algorithm, &self.key, message).await
    }

    async fn verify_stream<R>(&self, message: R, signature: &[u8]) -> Result<bool>
    where
        R: AsyncRead + Unpin + Send,
    {
        verify_stream(self.algorithm, &self.key, message, signature).await
    }
}

/// Error from a stream operation: either the key/algorithm was rejected
/// up front, or reading failed.
enum StreamError {
    Setup(Error),
    Read(std::io::Error),
}

async fn mac_stream<R>(
    algorithm: HashAlgorithm,
    key: &[u8],
    message: R,
) -> core::result::Result<Vec<u8>, StreamError>
where
    R: AsyncRead + Unpin + Send,
{
    let mut ctx = context(algorithm, key).map_err(StreamError::Setup)?;

    stream::drain(message, |chunk| ctx.update(chunk))
        .await
        .map_err(StreamError::Read)?;

    Ok(ctx.finalize())
}

fn read_error(kind: ErrorKind, algorithm: HashAlgorithm, err: StreamError) -> Error {
    match err {
        StreamError::Setup(err) => err,
        StreamError::Read(io) => Error::new(kind)
            .with_context("hashAlgo", algorithm)
            .with_source(io),
    }
}

/// Incremental HMAC state for any supported [`HashAlgorithm`].
trait MacContext: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self: Box<Self>) -> Vec<u8>;
}

impl<D> MacContext for SimpleHmac<D>
where
    D: Digest + BlockSizeUser + Send,
{
    fn update(&mut self, data: &[u8]) {
        Mac::update(self, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        Mac::finalize(*self).into_bytes().to_vec()
    }
}

fn keyed<D>(key: &[u8]) -> Result<Box<dyn MacContext>>
where
    D: Digest + BlockSizeUser + Send + 'static,
{
    let mac = <SimpleHmac<D> as KeyInit>::new_from_slice(key)
        .map_err(|_| Error::new(ErrorKind::InvalidPrivateKey).with_context("keyLength", key.len()))?;

    Ok(Box::new(mac))
}

fn context(algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn MacContext>> {
    match algorithm {
        HashAlgorithm::Blake2b512 => keyed::<Blake2b512>(key),
        HashAlgorithm::Blake2s256 => keyed::<Blake2s256>(key),
        HashAlgorithm::Md5 => keyed::<Md5>(key),
        HashAlgorithm::Ripemd160 => keyed::<Ripemd160>(key),
        HashAlgorithm::Sha1 => keyed::<Sha1>(key),
        HashAlgorithm::Sha224 => keyed::<Sha224>(key),
        HashAlgorithm::Sha256 => keyed::<Sha256>(key),
        HashAlgorithm::Sha384 => keyed::<Sha384>(key),
        HashAlgorithm::Sha512 => keyed::<Sha512>(key),
        HashAlgorithm::Sha512_224 => keyed::<Sha512_224>(key),
        HashAlgorithm::Sha512_256 => keyed::<Sha512_256>(key),
        HashAlgorithm::Sha3_224 => keyed::<Sha3_224>(key),
        HashAlgorithm::Sha3_256 => keyed::<Sha3_256>(key),
        HashAlgorithm::Sha3_384 => keyed::<Sha3_384>(key),
        HashAlgorithm::Sha3_512 => keyed::<Sha3_512>(key),
        HashAlgorithm::Sm3 => keyed::<Sm3>(key),
        HashAlgorithm::Md5Sha1 => Err(Error::unsupported("hmac", algorithm)),
    }
}
