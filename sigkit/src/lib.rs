#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

//! ## `serde` support
//!
//! When the `serde` feature of this crate is enabled, `Serialize` and
//! `Deserialize` are impl'd for the algorithm identifiers, the
//! [`Encoding`] and the per-family options structs, so signer
//! configuration can be loaded from configuration files.

pub mod ecdsa;
pub mod eddsa;
pub mod encoding;
pub mod hash;
pub mod hmac;
pub mod jwa;
pub mod key;
pub mod rsa;
pub mod signer;

mod algorithm;
mod error;
mod stream;

pub use crate::{
    algorithm::{Algorithm, HashAlgorithm, SignAlgorithm},
    ecdsa::{EcCurve, EcdsaSigner, SignatureFormat, der_to_p1363, p1363_to_der},
    eddsa::{EddsaCurve, EddsaSigner},
    encoding::Encoding,
    error::{BoxError, Error, ErrorKind, Result},
    hash::DigestHasher,
    hmac::HmacSigner,
    jwa::{AnySigner, Jwa, JwaKey},
    key::{AsymmetricKeyType, KeyInput, KeyObject, KeyType},
    rsa::{RsaPadding, RsaSigner},
    signer::{Hasher, Signer},
};
