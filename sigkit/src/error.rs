//! Error types.

use core::fmt;
use std::error::Error as StdError;

/// Result type with the `sigkit` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Boxed underlying error retained as the source of an [`Error`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Kinds of errors raised by signers, hashers and the signature codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A signer was constructed with neither a public nor a private key.
    NoKeyProvided,

    /// The public key failed to parse, or has the wrong type or algorithm.
    InvalidPublicKey,

    /// The private key failed to parse, or has the wrong type or algorithm.
    InvalidPrivateKey,

    /// The public and private keys disagree on algorithm, curve or modulus length.
    KeyPairMismatch,

    /// Signing was requested from a signer without a private key.
    NoPrivateKey,

    /// Verification was requested from a signer without a public key.
    NoPublicKey,

    /// The underlying signing operation failed.
    SignFailed,

    /// The underlying verification operation failed.
    VerifyFailed,

    /// The operation is not available for this algorithm.
    NotImplemented,

    /// The hash algorithm is not offered by this signer family.
    UnsupportedAlgorithm,

    /// Text could not be decoded with the requested encoding.
    InvalidEncoding,

    /// A signature is not a well-formed DER or IEEE P1363 ECDSA signature.
    InvalidSignature,

    /// Reading from an input stream failed.
    ReadFailed,
}

impl ErrorKind {
    /// Snake-case identifier of this kind, e.g. `no_key_provided`.
    pub fn name(self) -> &'static str {
        match self {
            Self::NoKeyProvided => "no_key_provided",
            Self::InvalidPublicKey => "invalid_public_key",
            Self::InvalidPrivateKey => "invalid_private_key",
            Self::KeyPairMismatch => "key_pair_mismatch",
            Self::NoPrivateKey => "no_private_key",
            Self::NoPublicKey => "no_public_key",
            Self::SignFailed => "sign_failed",
            Self::VerifyFailed => "verify_failed",
            Self::NotImplemented => "not_implemented",
            Self::UnsupportedAlgorithm => "unsupported_algorithm",
            Self::InvalidEncoding => "invalid_encoding",
            Self::InvalidSignature => "invalid_signature",
            Self::ReadFailed => "read_failed",
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::NoKeyProvided => "neither a public key nor a private key was provided",
            Self::InvalidPublicKey => "invalid public key",
            Self::InvalidPrivateKey => "invalid private key",
            Self::KeyPairMismatch => "public key and private key do not match",
            Self::NoPrivateKey => "no private key available for signing",
            Self::NoPublicKey => "no public key available for verification",
            Self::SignFailed => "failed to sign the message",
            Self::VerifyFailed => "failed to verify the signature",
            Self::NotImplemented => "operation not implemented for this algorithm",
            Self::UnsupportedAlgorithm => "unsupported hash algorithm",
            Self::InvalidEncoding => "invalid text encoding",
            Self::InvalidSignature => "malformed ECDSA signature",
            Self::ReadFailed => "failed to read the input stream",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Error raised by this crate.
///
/// Every error carries an [`ErrorKind`], an ordered list of key/value pairs
/// describing the failure (for example `keyAlgo` or `expectedAlgo`), and
/// optionally the underlying error that triggered it.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    kind: ErrorKind,
    context: Vec<(&'static str, String)>,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    /// Create a new error of the given kind with no context.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: Vec::new(),
            source: None,
        }
    }

    /// Attach a key/value pair of context.
    pub fn with_context(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Attach the underlying error.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Context attached to this error, in insertion order.
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// Look up a context value by key.
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn unsupported(family: &'static str, algorithm: impl fmt::Display) -> Self {
        Self::new(ErrorKind::UnsupportedAlgorithm)
            .with_context("signAlgo", family)
            .with_context("hashAlgo", algorithm)
    }

    pub(crate) fn invalid_signature(reason: &'static str) -> Self {
        Self::new(ErrorKind::InvalidSignature).with_context("reason", reason)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}
