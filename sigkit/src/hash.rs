//! Message digests.

use crate::{Encoding, Error, ErrorKind, HashAlgorithm, Result, signer::Hasher, stream};
use blake2::{Blake2b512, Blake2s256};
use digest::Digest;
use md5::Md5;
use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};
use sm3::Sm3;
use tokio::io::AsyncRead;

/// Hash algorithms accepted by [`hash`] and [`DigestHasher`].
pub fn supported_algorithms() -> &'static [HashAlgorithm] {
    HashAlgorithm::ALL
}

/// Digest a message.
pub fn hash(algorithm: HashAlgorithm, message: impl AsRef<[u8]>) -> Vec<u8> {
    let mut ctx = context(algorithm);
    ctx.update(message.as_ref());
    ctx.finalize()
}

/// Digest a message read from an asynchronous stream.
pub async fn hash_stream<R>(algorithm: HashAlgorithm, message: R) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin + Send,
{
    let mut ctx = context(algorithm);

    stream::drain(message, |chunk| ctx.update(chunk))
        .await
        .map_err(|e| {
            Error::new(ErrorKind::ReadFailed)
                .with_context("hashAlgo", algorithm)
                .with_source(e)
        })?;

    Ok(ctx.finalize())
}

/// [`Hasher`] bound to one digest algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DigestHasher {
    algorithm: HashAlgorithm,
    encoding: Encoding,
}

impl DigestHasher {
    /// Create a hasher with the default text encoding.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            encoding: Encoding::default(),
        }
    }

    /// Set the text encoding used by [`Hasher::hash_encoded`].
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

impl Hasher for DigestHasher {
    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn hash(&self, message: &[u8]) -> Vec<u8> {
        hash(self.algorithm, message)
    }

    async fn hash_stream<R>(&self, message: R) -> Result<Vec<u8>>
    where
        R: AsyncRead + Unpin + Send,
    {
        hash_stream(self.algorithm, message).await
    }
}

/// Incremental digest state for any [`HashAlgorithm`].
pub(crate) trait HashContext: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self: Box<Self>) -> Vec<u8>;
}

struct DigestContext<D>(D);

impl<D: Digest + Send> HashContext for DigestContext<D> {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().to_vec()
    }
}

/// MD5 and SHA-1 of the same input, concatenated.
#[derive(Default)]
struct Md5Sha1Context {
    md5: Md5,
    sha1: Sha1,
}

impl HashContext for Md5Sha1Context {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.md5, data);
        Digest::update(&mut self.sha1, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        let mut out = self.md5.finalize().to_vec();
        out.extend_from_slice(&self.sha1.finalize());
        out
    }
}

fn boxed<D: Digest + Send + 'static>() -> Box<dyn HashContext> {
    Box::new(DigestContext(D::new()))
}

pub(crate) fn context(algorithm: HashAlgorithm) -> Box<dyn HashContext> {
    match algorithm {
        HashAlgorithm::Blake2b512 => boxed::<Blake2b512>(),
        HashAlgorithm::Blake2s256 => boxed::<Blake2s256>(),
        HashAlgorithm::Md5 => boxed::<Md5>(),
        HashAlgorithm::Md5Sha1 => Box::<Md5Sha1Context>::default(),
        HashAlgorithm::Ripemd160 => boxed::<Ripemd160>(),
        HashAlgorithm::Sha1 => boxed::<Sha1>(),
        HashAlgorithm::Sha224 => boxed::<Sha224>(),
        HashAlgorithm::Sha256 => boxed::<Sha256>(),
        HashAlgorithm::Sha384 => boxed::<Sha384>(),
        HashAlgorithm::Sha512 => boxed::<Sha512>(),
        HashAlgorithm::Sha512_224 => boxed::<Sha512_224>(),
        HashAlgorithm::Sha512_256 => boxed::<Sha512_256>(),
        HashAlgorithm::Sha3_224 => boxed::<Sha3_224>(),
        HashAlgorithm::Sha3_256 => boxed::<Sha3_256>(),
        HashAlgorithm::Sha3_384 => boxed::<Sha3_384>(),
        HashAlgorithm::Sha3_512 => boxed::<Sha3_512>(),
        HashAlgorithm::Sm3 => boxed::<Sm3>(),
    }
}
