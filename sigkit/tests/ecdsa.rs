//! ECDSA tests

use hex_literal::hex;
use sigkit::{
    EcCurve, EcdsaSigner, Encoding, ErrorKind, HashAlgorithm, KeyInput, KeyObject, SignAlgorithm,
    SignatureFormat, Signer,
    ecdsa::{self, EcdsaOptions},
};
use tokio::io::AsyncReadExt;

const MESSAGE: &[u8] = b"Hello, how are you?";

const EC256_PRIV: &str = include_str!("examples/ec256-priv.pem");
const EC256_PUB: &str = include_str!("examples/ec256-pub.pem");
const EC256_SEC1: &str = include_str!("examples/ec256-sec1.pem");
const EC256_ENCRYPTED: &str = include_str!("examples/ec256-priv-encrypted.pem");
const EC256_PRIV_DER: &[u8] = include_bytes!("examples/ec256-priv.der");
const EC256_PUB_DER: &[u8] = include_bytes!("examples/ec256-pub.der");
const EC384_PRIV: &str = include_str!("examples/ec384-priv.pem");
const EC384_PUB: &str = include_str!("examples/ec384-pub.pem");
const EC384_SEC1: &str = include_str!("examples/ec384-sec1.pem");
const EC521_PRIV: &str = include_str!("examples/ec521-priv.pem");
const EC521_PUB: &str = include_str!("examples/ec521-pub.pem");
const RSA1024_PRIV: &str = include_str!("examples/rsa1024-priv.pem");

/// OpenSSL signatures over [`MESSAGE`].
const EC256_SHA256_DER: &[u8] = &hex!(
    "30450221008b15aa967d8b603f1b04d21610d96bd6b7a24d4449c12d292d9f40bfa3c6e505"
    "02202abd29f95bd09600f996074529f5ad908aab6c418643158489c8abdb391bceeb"
);
const EC384_SHA384_DER: &[u8] = &hex!(
    "3066023100d792583a2d2f5a93b4659bef2b6ce6329cf8eb0010ff1c711145e17b972a98f821abdc7bcb4e0705ec"
    "844b097840908c023100cf3fb30ad6d7edd1b180251909f257a57fc0e1a6c098fc17b5065278460ce8584ae5f491"
    "1e24e76ae81f3d0a81821db8"
);
const EC521_SHA512_DER: &[u8] = &hex!(
    "308188024201b6fb3fc2c9f684905d0787a0732caa63471e20fa31a7851a71b723b14cfaeb8ea90d4296dd41d822"
    "00a7caea9d479cdbfecff3db40813c01db8c9e15955f8d9531024200d2896d02ac538f279ee27b4fe92681224589"
    "b073448ca55555e51a5928c05c85bca5b3847c72a26fdd118a60788b2744b1478be05f3f4976b0dd54b386014827"
    "e6"
);

/// OpenSSL P-521 signature over [`MESSAGE`] with a SHA-1 digest.
const EC521_SHA1_DER: &[u8] = &hex!(
    "30818702416ef4e2537430f2f5e79dce13c66bf3d8a0359d034c9cb9f1fb193b8bab74f3074519262e46cf3d43e3"
    "fa1ff21b99d794aad22b194991c66bfcc5a09e154d18b023024201c9863269b0209b3de87f99b8f739f1d206fd1b"
    "929f6e2864ba473cb706e4468df920fb852c2b9c3b27946839a3192dbecfcf547eeb0665eab507c0b4d6d9ee4cad"
);

fn der() -> EcdsaOptions {
    EcdsaOptions::default().with_format(SignatureFormat::Der)
}

fn p1363() -> EcdsaOptions {
    EcdsaOptions::default().with_format(SignatureFormat::IeeeP1363)
}

fn signer(
    algorithm: HashAlgorithm,
    public: &str,
    private: &str,
    options: EcdsaOptions,
) -> EcdsaSigner {
    EcdsaSigner::new(
        algorithm,
        Some(public.into()),
        Some(private.into()),
        options,
    )
    .unwrap()
}

#[test]
fn verify_openssl_der_signatures() {
    let vectors = [
        (HashAlgorithm::Sha256, EC256_PUB, EC256_SHA256_DER),
        (HashAlgorithm::Sha384, EC384_PUB, EC384_SHA384_DER),
        (HashAlgorithm::Sha512, EC521_PUB, EC521_SHA512_DER),
    ];

    for (algorithm, public, signature) in vectors {
        assert!(ecdsa::verify(algorithm, public, MESSAGE, signature, &der()).unwrap());
        assert!(!ecdsa::verify(algorithm, public, b"Hello, who are you?", signature, &der()).unwrap());

        let fixed = ecdsa::der_to_p1363(signature).unwrap();
        assert!(ecdsa::verify(algorithm, public, MESSAGE, &fixed, &p1363()).unwrap());
    }
}

#[test]
fn sign_and_verify_each_curve() {
    let keys = [
        (EcCurve::P256, EC256_PUB, EC256_PRIV),
        (EcCurve::P384, EC384_PUB, EC384_PRIV),
        (EcCurve::P521, EC521_PUB, EC521_PRIV),
    ];

    for (curve, public, private) in keys {
        for algorithm in [HashAlgorithm::Sha384, HashAlgorithm::Sha512, HashAlgorithm::Sha3_384] {
            let signer = signer(algorithm, public, private, p1363());
            assert_eq!(signer.curve(), curve);
            assert_eq!(signer.hash_algorithm(), algorithm.as_str());
            assert_eq!(signer.sign_algorithm(), SignAlgorithm::Ecdsa);

            let signature = signer.sign(MESSAGE).unwrap();
            assert_eq!(signature.len(), curve.component_size() * 2);
            assert!(signer.verify(MESSAGE, &signature).unwrap());

            let encoded = ecdsa::p1363_to_der(&signature).unwrap();
            assert!(ecdsa::verify(algorithm, public, MESSAGE, &encoded, &der()).unwrap());
        }
    }
}

#[test]
fn der_signer_interoperates_with_free_functions() {
    let signer = signer(HashAlgorithm::Sha256, EC256_PUB, EC256_PRIV, der());
    assert_eq!(signer.format(), SignatureFormat::Der);

    let signature = signer.sign(MESSAGE).unwrap();
    assert_eq!(signature[0], 0x30);
    assert!(signer.verify(MESSAGE, EC256_SHA256_DER).unwrap());

    let free = ecdsa::sign(HashAlgorithm::Sha256, EC256_PRIV, MESSAGE, &der()).unwrap();
    assert!(signer.verify(MESSAGE, &free).unwrap());
}

#[test]
fn signatures_are_deterministic() {
    let a = ecdsa::sign(HashAlgorithm::Sha256, EC256_PRIV, MESSAGE, &p1363()).unwrap();
    let b = ecdsa::sign(HashAlgorithm::Sha256, EC256_SEC1, MESSAGE, &p1363()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn tampered_signatures_do_not_verify() {
    let signer = signer(HashAlgorithm::Sha384, EC384_PUB, EC384_PRIV, p1363());
    let mut signature = signer.sign(MESSAGE).unwrap();

    signature[10] ^= 0x01;
    assert!(!signer.verify(MESSAGE, &signature).unwrap());

    // wrong width for P-384
    assert!(!signer.verify(MESSAGE, &signature[..64]).unwrap());
    assert!(!signer.verify(MESSAGE, &[]).unwrap());
}

#[test]
fn malformed_der_does_not_verify() {
    let mut signature = EC256_SHA256_DER.to_vec();
    signature[1] = 0x7f;
    assert!(!ecdsa::verify(HashAlgorithm::Sha256, EC256_PUB, MESSAGE, &signature, &der()).unwrap());
}

#[test]
fn key_encodings() {
    let expected = ecdsa::sign(HashAlgorithm::Sha256, EC256_PRIV, MESSAGE, &der()).unwrap();

    let sec1 = ecdsa::sign(HashAlgorithm::Sha256, EC256_SEC1, MESSAGE, &der()).unwrap();
    assert_eq!(sec1, expected);

    let raw = ecdsa::sign(HashAlgorithm::Sha256, EC256_PRIV_DER, MESSAGE, &der()).unwrap();
    assert_eq!(raw, expected);

    let options = der().with_key_passphrase("hello-world");
    let encrypted = ecdsa::sign(HashAlgorithm::Sha256, EC256_ENCRYPTED, MESSAGE, &options).unwrap();
    assert_eq!(encrypted, expected);

    let input = KeyInput::encrypted(EC256_ENCRYPTED, "hello-world");
    let encrypted = ecdsa::sign(HashAlgorithm::Sha256, input, MESSAGE, &der()).unwrap();
    assert_eq!(encrypted, expected);

    assert!(ecdsa::verify(HashAlgorithm::Sha256, EC256_PUB_DER, MESSAGE, &expected, &der()).unwrap());

    // public half derived from private material
    assert!(ecdsa::verify(HashAlgorithm::Sha256, EC256_PRIV, MESSAGE, &expected, &der()).unwrap());
}

#[test]
fn encrypted_key_needs_passphrase() {
    let err = ecdsa::sign(HashAlgorithm::Sha256, EC256_ENCRYPTED, MESSAGE, &der()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPrivateKey);

    let options = der().with_key_passphrase("wrong");
    let err = ecdsa::sign(HashAlgorithm::Sha256, EC256_ENCRYPTED, MESSAGE, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPrivateKey);
}

#[test]
fn key_pair_curves_must_match() {
    let err = EcdsaSigner::new(
        HashAlgorithm::Sha256,
        Some(EC256_PUB.into()),
        Some(EC384_SEC1.into()),
        der(),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::KeyPairMismatch);
    assert_eq!(err.context_value("publicKeyCurve"), Some("P-256"));
    assert_eq!(err.context_value("privateKeyCurve"), Some("P-384"));
}

#[test]
fn half_key_signers() {
    let verifier =
        EcdsaSigner::new(HashAlgorithm::Sha256, Some(EC256_PUB.into()), None, der()).unwrap();
    assert!(verifier.verify(MESSAGE, EC256_SHA256_DER).unwrap());
    assert_eq!(verifier.sign(MESSAGE).unwrap_err().kind(), ErrorKind::NoPrivateKey);

    let signer =
        EcdsaSigner::new(HashAlgorithm::Sha256, None, Some(EC256_PRIV.into()), der()).unwrap();
    assert!(signer.sign(MESSAGE).is_ok());
    assert_eq!(
        signer.verify(MESSAGE, EC256_SHA256_DER).unwrap_err().kind(),
        ErrorKind::NoPublicKey
    );

    let err = EcdsaSigner::new(HashAlgorithm::Sha256, None, None, der()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoKeyProvided);
}

#[test]
fn wrong_key_family_rejected() {
    let err = ecdsa::sign(HashAlgorithm::Sha256, RSA1024_PRIV, MESSAGE, &der()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPrivateKey);
    assert_eq!(err.context_value("keyAlgo"), Some("rsa"));
    assert_eq!(err.context_value("expectedAlgo"), Some("ec"));

    let err = ecdsa::sign(HashAlgorithm::Sha256, EC256_PUB, MESSAGE, &der()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPrivateKey);

    let err = ecdsa::sign(HashAlgorithm::Sha256, "garbage", MESSAGE, &der()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPrivateKey);
}

#[test]
fn unsupported_digest() {
    let err = ecdsa::sign(HashAlgorithm::Md5, EC256_PRIV, MESSAGE, &der()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
    assert_eq!(err.context_value("hashAlgo"), Some("md5"));
}

#[test]
fn every_digest_on_every_curve() {
    let keys = [
        (EcCurve::P256, EC256_PUB, EC256_PRIV),
        (EcCurve::P384, EC384_PUB, EC384_PRIV),
        (EcCurve::P521, EC521_PUB, EC521_PRIV),
    ];

    for (curve, public, private) in keys {
        for &algorithm in ecdsa::supported_algorithms() {
            for options in [der(), p1363()] {
                let signature = ecdsa::sign(algorithm, private, MESSAGE, &options).unwrap();
                assert!(
                    ecdsa::verify(algorithm, public, MESSAGE, &signature, &options).unwrap(),
                    "{algorithm} on {curve}"
                );
                assert!(!ecdsa::verify(algorithm, public, b"Hello, who are you?", &signature, &options).unwrap());
            }
        }
    }
}

#[test]
fn short_digest_on_large_curve_matches_openssl() {
    assert!(ecdsa::verify(HashAlgorithm::Sha1, EC521_PUB, MESSAGE, EC521_SHA1_DER, &der()).unwrap());
    assert!(!ecdsa::verify(HashAlgorithm::Sha256, EC521_PUB, MESSAGE, EC521_SHA1_DER, &der()).unwrap());
    assert!(!ecdsa::verify(HashAlgorithm::Sha1, EC521_PUB, MESSAGE, EC521_SHA512_DER, &der()).unwrap());
}

#[test]
fn private_object_is_not_a_public_key() {
    let private = KeyObject::parse_private(EC256_PRIV, None).unwrap();

    let err = EcdsaSigner::new(
        HashAlgorithm::Sha256,
        Some(private.clone().into()),
        Some(private.clone().into()),
        der(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPublicKey);
    assert_eq!(err.context_value("keyType"), Some("private"));
    assert_eq!(err.context_value("keyAlgo"), Some("ec"));

    let err = ecdsa::verify(HashAlgorithm::Sha256, private.clone(), MESSAGE, EC256_SHA256_DER, &der())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPublicKey);

    // converting explicitly is fine
    let public = private.to_public();
    assert!(ecdsa::verify(HashAlgorithm::Sha256, public, MESSAGE, EC256_SHA256_DER, &der()).unwrap());
}

#[test]
fn encoded_signatures() {
    let signer = signer(
        HashAlgorithm::Sha256,
        EC256_PUB,
        EC256_PRIV,
        p1363().with_encoding(Encoding::Base64Url),
    );

    let text = signer.sign_encoded(MESSAGE).unwrap();
    assert_eq!(text.len(), 86);
    assert!(!text.contains('='));
    assert!(signer.verify_encoded(MESSAGE, &text).unwrap());
}

#[tokio::test]
async fn streams() {
    let signer = signer(HashAlgorithm::Sha384, EC384_PUB, EC384_PRIV, der());
    let expected = signer.sign(MESSAGE).unwrap();

    let signature = signer
        .sign_stream((&MESSAGE[..5]).chain(&MESSAGE[5..]))
        .await
        .unwrap();
    assert_eq!(signature, expected);
    assert!(signer.verify_stream(MESSAGE, &signature).await.unwrap());

    assert!(
        ecdsa::verify_stream(HashAlgorithm::Sha512, EC521_PUB, MESSAGE, EC521_SHA512_DER, &der())
            .await
            .unwrap()
    );

    let signature = ecdsa::sign_stream(HashAlgorithm::Sha256, EC256_PRIV, MESSAGE, &p1363())
        .await
        .unwrap();
    assert!(ecdsa::verify(HashAlgorithm::Sha256, EC256_PUB, MESSAGE, &signature, &p1363()).unwrap());
}
