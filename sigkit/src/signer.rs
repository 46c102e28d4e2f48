//! Signer and hasher traits implemented by every algorithm family.

use crate::{Algorithm, Encoding, HashAlgorithm, Result, SignAlgorithm};
use core::future::Future;
use tokio::io::AsyncRead;

/// Object bound to an algorithm and a key, able to sign and verify messages.
///
/// Signers are immutable after construction and may be shared between
/// concurrent callers.
pub trait Signer: Send + Sync {
    /// Digest and signing family of this signer.
    fn algorithm(&self) -> Algorithm;

    /// Text encoding applied by [`Signer::sign_encoded`] and
    /// [`Signer::verify_encoded`].
    fn encoding(&self) -> Encoding;

    /// Sign a message held in memory.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;

    /// Verify a signature over a message held in memory.
    ///
    /// Returns `Ok(false)` for a well-formed call whose signature does not
    /// match.
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool>;

    /// Sign a message read from an asynchronous stream.
    fn sign_stream<R>(&self, message: R) -> impl Future<Output = Result<Vec<u8>>> + Send
    where
        R: AsyncRead + Unpin + Send;

    /// Verify a signature over a message read from an asynchronous stream.
    fn verify_stream<R>(
        &self,
        message: R,
        signature: &[u8],
    ) -> impl Future<Output = Result<bool>> + Send
    where
        R: AsyncRead + Unpin + Send;

    /// Name of the digest algorithm.
    fn hash_algorithm(&self) -> &'static str {
        self.algorithm().hash
    }

    /// Signing family.
    fn sign_algorithm(&self) -> SignAlgorithm {
        self.algorithm().sign
    }

    /// Sign a message and encode the signature as text.
    fn sign_encoded(&self, message: &[u8]) -> Result<String> {
        let signature = self.sign(message)?;
        Ok(self.encoding().encode(&signature))
    }

    /// Decode a text signature and verify it.
    fn verify_encoded(&self, message: &[u8], signature: &str) -> Result<bool> {
        let signature = self.encoding().decode(signature)?;
        self.verify(message, &signature)
    }
}

/// Object bound to a digest algorithm.
pub trait Hasher: Send + Sync {
    /// Digest algorithm.
    fn algorithm(&self) -> HashAlgorithm;

    /// Text encoding applied by [`Hasher::hash_encoded`].
    fn encoding(&self) -> Encoding;

    /// Digest a message held in memory.
    fn hash(&self, message: &[u8]) -> Vec<u8>;

    /// Digest a message read from an asynchronous stream.
    fn hash_stream<R>(&self, message: R) -> impl Future<Output = Result<Vec<u8>>> + Send
    where
        R: AsyncRead + Unpin + Send;

    /// Digest a message and encode the result as text.
    fn hash_encoded(&self, message: &[u8]) -> String {
        self.encoding().encode(&self.hash(message))
    }
}
