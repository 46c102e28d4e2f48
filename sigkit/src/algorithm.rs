//! Hash and signing algorithm identifiers.

use crate::{Error, ErrorKind};
use core::{fmt, str::FromStr};

/// Message digest algorithms understood by this crate.
///
/// Which of these a given signer family accepts is listed by the family's
/// `supported_algorithms` function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "&'static str"))]
pub enum HashAlgorithm {
    /// BLAKE2b with a 512-bit output.
    Blake2b512,
    /// BLAKE2s with a 256-bit output.
    Blake2s256,
    /// MD5.
    Md5,
    /// MD5 and SHA-1 digests concatenated, as used by TLS 1.0/1.1.
    Md5Sha1,
    /// RIPEMD-160.
    Ripemd160,
    /// SHA-1.
    Sha1,
    /// SHA-224.
    Sha224,
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
    /// SHA-512/224.
    Sha512_224,
    /// SHA-512/256.
    Sha512_256,
    /// SHA3-224.
    Sha3_224,
    /// SHA3-256.
    Sha3_256,
    /// SHA3-384.
    Sha3_384,
    /// SHA3-512.
    Sha3_512,
    /// SM3.
    Sm3,
}

impl HashAlgorithm {
    /// Every hash algorithm, in canonical-name order.
    pub const ALL: &'static [Self] = &[
        Self::Blake2b512,
        Self::Blake2s256,
        Self::Md5,
        Self::Md5Sha1,
        Self::Ripemd160,
        Self::Sha1,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
        Self::Sha512_224,
        Self::Sha512_256,
        Self::Sha3_224,
        Self::Sha3_256,
        Self::Sha3_384,
        Self::Sha3_512,
        Self::Sm3,
    ];

    /// Canonical lowercase name, e.g. `sha3-256`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blake2b512 => "blake2b512",
            Self::Blake2s256 => "blake2s256",
            Self::Md5 => "md5",
            Self::Md5Sha1 => "md5-sha1",
            Self::Ripemd160 => "ripemd160",
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Sha512_224 => "sha512-224",
            Self::Sha512_256 => "sha512-256",
            Self::Sha3_224 => "sha3-224",
            Self::Sha3_256 => "sha3-256",
            Self::Sha3_384 => "sha3-384",
            Self::Sha3_512 => "sha3-512",
            Self::Sm3 => "sm3",
        }
    }

    /// Size of the digest in bytes.
    pub fn output_size(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Ripemd160 | Self::Sha1 => 20,
            Self::Sha224 | Self::Sha512_224 | Self::Sha3_224 => 28,
            Self::Blake2s256 | Self::Sha256 | Self::Sha512_256 | Self::Sha3_256 | Self::Sm3 => 32,
            Self::Md5Sha1 => 36,
            Self::Sha384 | Self::Sha3_384 => 48,
            Self::Blake2b512 | Self::Sha512 | Self::Sha3_512 => 64,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Error> {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "ripemd" | "rmd160" => return Ok(Self::Ripemd160),
            "sha512/224" => return Ok(Self::Sha512_224),
            "sha512/256" => return Ok(Self::Sha512_256),
            _ => {}
        }

        Self::ALL
            .iter()
            .copied()
            .find(|algorithm| algorithm.as_str() == lower)
            .ok_or_else(|| {
                Error::new(ErrorKind::UnsupportedAlgorithm).with_context("hashAlgo", name)
            })
    }
}

impl TryFrom<String> for HashAlgorithm {
    type Error = Error;

    fn try_from(name: String) -> Result<Self, Error> {
        name.parse()
    }
}

impl From<HashAlgorithm> for &'static str {
    fn from(algorithm: HashAlgorithm) -> &'static str {
        algorithm.as_str()
    }
}

/// Signing algorithm families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignAlgorithm {
    /// Keyed-hash message authentication codes.
    Hmac,
    /// RSA signatures with PKCS#1 v1.5 or PSS padding.
    Rsa,
    /// Elliptic curve DSA over the NIST prime curves.
    Ecdsa,
    /// Edwards-curve DSA.
    Eddsa,
}

impl SignAlgorithm {
    /// Lowercase name of this family.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hmac => "hmac",
            Self::Rsa => "rsa",
            Self::Ecdsa => "ecdsa",
            Self::Eddsa => "eddsa",
        }
    }
}

impl fmt::Display for SignAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration of a signer: the digest it applies and the signing family.
///
/// For EdDSA the digest name is the key curve (`ed25519` or `ed448`), since
/// the message is hashed by the signature scheme itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Algorithm {
    /// Name of the digest algorithm.
    pub hash: &'static str,

    /// Signing family.
    pub sign: SignAlgorithm,
}

impl Algorithm {
    pub(crate) fn new(hash: &'static str, sign: SignAlgorithm) -> Self {
        Self { hash, sign }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.sign, self.hash)
    }
}
