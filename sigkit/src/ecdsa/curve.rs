//! NIST prime curves supported by the ECDSA signer.

use core::fmt;
use std::borrow::Cow;
use ecdsa_core::signature::{
    self,
    hazmat::{PrehashSigner, PrehashVerifier},
};
use elliptic_curve::sec1::ToEncodedPoint;
use pkcs8::{DecodePrivateKey, DecodePublicKey, ObjectIdentifier};

const P256_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const P384_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
const P521_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.35");

/// Named elliptic curve of an EC key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EcCurve {
    /// NIST P-256 (secp256r1, prime256v1).
    #[cfg_attr(feature = "serde", serde(rename = "P-256"))]
    P256,

    /// NIST P-384 (secp384r1).
    #[cfg_attr(feature = "serde", serde(rename = "P-384"))]
    P384,

    /// NIST P-521 (secp521r1).
    #[cfg_attr(feature = "serde", serde(rename = "P-521"))]
    P521,
}

impl EcCurve {
    /// Curve name as used by JOSE and NIST, e.g. `P-256`.
    pub fn name(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    /// Size in bytes of each of `r` and `s` in an IEEE P1363 signature.
    pub fn component_size(self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }

    /// Object identifier of the named curve.
    pub fn oid(self) -> ObjectIdentifier {
        match self {
            Self::P256 => P256_OID,
            Self::P384 => P384_OID,
            Self::P521 => P521_OID,
        }
    }

    /// Look up a curve by its object identifier.
    pub fn from_oid(oid: ObjectIdentifier) -> Option<Self> {
        [Self::P256, Self::P384, Self::P521]
            .into_iter()
            .find(|curve| curve.oid() == oid)
    }
}

impl fmt::Display for EcCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// EC private scalar on one of the supported curves.
#[derive(Clone)]
pub(crate) enum EcSecretKey {
    P256(p256::SecretKey),
    P384(p384::SecretKey),
    P521(p521::SecretKey),
}

impl EcSecretKey {
    pub(crate) fn from_pkcs8_der(curve: EcCurve, der: &[u8]) -> pkcs8::Result<Self> {
        Ok(match curve {
            EcCurve::P256 => Self::P256(p256::SecretKey::from_pkcs8_der(der)?),
            EcCurve::P384 => Self::P384(p384::SecretKey::from_pkcs8_der(der)?),
            EcCurve::P521 => Self::P521(p521::SecretKey::from_pkcs8_der(der)?),
        })
    }

    pub(crate) fn from_sec1_der(curve: EcCurve, der: &[u8]) -> elliptic_curve::Result<Self> {
        Ok(match curve {
            EcCurve::P256 => Self::P256(p256::SecretKey::from_sec1_der(der)?),
            EcCurve::P384 => Self::P384(p384::SecretKey::from_sec1_der(der)?),
            EcCurve::P521 => Self::P521(p521::SecretKey::from_sec1_der(der)?),
        })
    }

    pub(crate) fn curve(&self) -> EcCurve {
        match self {
            Self::P256(_) => EcCurve::P256,
            Self::P384(_) => EcCurve::P384,
            Self::P521(_) => EcCurve::P521,
        }
    }

    pub(crate) fn public_key(&self) -> EcPublicKey {
        match self {
            Self::P256(key) => EcPublicKey::P256(key.public_key()),
            Self::P384(key) => EcPublicKey::P384(key.public_key()),
            Self::P521(key) => EcPublicKey::P521(key.public_key()),
        }
    }

    /// Sign an already computed message digest, returning a DER signature.
    ///
    /// Nonces are derived deterministically per RFC 6979.
    pub(crate) fn sign_prehash_der(&self, prehash: &[u8]) -> signature::Result<Vec<u8>> {
        let prehash = &*pad_prehash(self.curve(), prehash);

        match self {
            Self::P256(key) => {
                let signing_key = p256::ecdsa::SigningKey::from_bytes(&key.to_bytes())?;
                let signature: p256::ecdsa::Signature = signing_key.sign_prehash(prehash)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            Self::P384(key) => {
                let signing_key = p384::ecdsa::SigningKey::from_bytes(&key.to_bytes())?;
                let signature: p384::ecdsa::Signature = signing_key.sign_prehash(prehash)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            Self::P521(key) => {
                let signing_key = p521::ecdsa::SigningKey::from_bytes(&key.to_bytes())?;
                let signature: p521::ecdsa::Signature = signing_key.sign_prehash(prehash)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
        }
    }
}

/// EC public point on one of the supported curves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum EcPublicKey {
    P256(p256::PublicKey),
    P384(p384::PublicKey),
    P521(p521::PublicKey),
}

impl EcPublicKey {
    pub(crate) fn from_public_key_der(curve: EcCurve, der: &[u8]) -> spki::Result<Self> {
        Ok(match curve {
            EcCurve::P256 => Self::P256(p256::PublicKey::from_public_key_der(der)?),
            EcCurve::P384 => Self::P384(p384::PublicKey::from_public_key_der(der)?),
            EcCurve::P521 => Self::P521(p521::PublicKey::from_public_key_der(der)?),
        })
    }

    pub(crate) fn curve(&self) -> EcCurve {
        match self {
            Self::P256(_) => EcCurve::P256,
            Self::P384(_) => EcCurve::P384,
            Self::P521(_) => EcCurve::P521,
        }
    }

    /// Check a DER signature over an already computed message digest.
    pub(crate) fn verify_prehash_der(&self, prehash: &[u8], der: &[u8]) -> signature::Result<()> {
        let prehash = &*pad_prehash(self.curve(), prehash);

        match self {
            Self::P256(key) => {
                let signature = p256::ecdsa::Signature::from_der(der)?;
                p256::ecdsa::VerifyingKey::from(key).verify_prehash(prehash, &signature)
            }
            Self::P384(key) => {
                let signature = p384::ecdsa::Signature::from_der(der)?;
                p384::ecdsa::VerifyingKey::from(key).verify_prehash(prehash, &signature)
            }
            Self::P521(key) => {
                let signature = p521::ecdsa::Signature::from_der(der)?;
                let point = key.to_encoded_point(false);
                p521::ecdsa::VerifyingKey::from_sec1_bytes(point.as_bytes())?
                    .verify_prehash(prehash, &signature)
            }
        }
    }
}

/// Left-pad a digest narrower than the curve's field with zeros.
///
/// The integer value of the digest is unchanged, so short digests such as
/// SHA-1 or SHA-256 on P-521 sign the same way OpenSSL does.
fn pad_prehash(curve: EcCurve, prehash: &[u8]) -> Cow<'_, [u8]> {
    let size = curve.component_size();

    if prehash.len() >= size {
        return Cow::Borrowed(prehash);
    }

    let mut padded = vec![0u8; size];
    padded[size - prehash.len()..].copy_from_slice(prehash);
    Cow::Owned(padded)
}

#[cfg(test)]
mod tests {
    use super::{EcCurve, pad_prehash};

    #[test]
    fn oid_round_trip() {
        for curve in [EcCurve::P256, EcCurve::P384, EcCurve::P521] {
            assert_eq!(EcCurve::from_oid(curve.oid()), Some(curve));
        }
    }

    #[test]
    fn component_sizes() {
        assert_eq!(EcCurve::P256.component_size(), 32);
        assert_eq!(EcCurve::P521.component_size(), 66);
        assert_eq!(EcCurve::P384.to_string(), "P-384");
    }

    #[test]
    fn short_prehash_is_left_padded() {
        let padded = pad_prehash(EcCurve::P521, &[0xab; 20]);
        assert_eq!(padded.len(), 66);
        assert!(padded[..46].iter().all(|&b| b == 0));
        assert_eq!(&padded[46..], &[0xab; 20]);

        let digest = [0xcd; 48];
        assert_eq!(&*pad_prehash(EcCurve::P256, &digest), &digest);
    }
}
