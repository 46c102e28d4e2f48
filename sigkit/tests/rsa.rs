//! RSA tests

use hex_literal::hex;
use sigkit::{
    ErrorKind, HashAlgorithm, KeyInput, KeyObject, RsaPadding, RsaSigner, SignAlgorithm, Signer,
    rsa::{self, RsaOptions},
};
use tokio::io::AsyncReadExt;

const MESSAGE: &[u8] = b"Hello, how are you?";

const RSA1024_PRIV: &str = include_str!("examples/rsa1024-priv.pem");
const RSA1024_PUB: &str = include_str!("examples/rsa1024-pub.pem");
const RSA2048_PRIV: &str = include_str!("examples/rsa2048-priv.pem");
const RSA2048_PUB: &str = include_str!("examples/rsa2048-pub.pem");
const EC256_PRIV: &str = include_str!("examples/ec256-priv.pem");

/// OpenSSL RSASSA-PKCS1-v1_5 signature over [`MESSAGE`] with SHA-256.
const RSA2048_SHA256_PKCS1: [u8; 256] = hex!(
    "a05058a0c95bfe1513a2aad825fd1e94fb82437ca5b0b30f8743408eba07191c93c288e50a1a400ceca9ce2dc241fb0c"
    "6b01fb23133b6700b85176a8b3d1e324aa377ad1f1c8283964779365692510287638a8249440e12c1394ebe018fedaa5"
    "7bd053548da2669f8473ed0ed39ae8cc094c84ed5b4170d8e7fd959bfcba81203c438b0c7b57f6cf74257da5ecf2bc63"
    "f319f54a3d4a358f469872adad84ae4e4ead182ef6fd9ff87e783ee809b1c8a1996c53beea54726f72c876f2a435f1f2"
    "b054f0f2765c37194a847781988d3b5a1dacd225d216ba953d6d2d749376ed57ef5f0bdf0e3d24f6f43267cfe18f359a"
    "8068876cff9616417e3ddd928a8b4f43"
);

/// OpenSSL RSASSA-PSS signature over [`MESSAGE`] with SHA-256 and a 32 byte salt.
const RSA2048_SHA256_PSS: [u8; 256] = hex!(
    "74d5971b622ab018f916cd6327dd455133c226b72efa86c00b61327f1d0070897e2dd51b43716bdbb85e8634a0a15176"
    "cfc465d3d8884a516572776bc8b1ff40b026f9d98e89c503e2a22da62994499386a308ff309a3b7959ac85abf87916cc"
    "0aa6604b6fdde5844bbdbbfb469e4c9ff1fe73f5a777898eb75a892872d0b81b2255a64f51ecfae389b4cf172789c09d"
    "5c46f962a37ff939ab37a4d505ca34167bdee82f20c3abed06f1ae20aecccd4fe181f8924a1903e814419716dfa5719b"
    "9d734a946addeaf9aa65a033e6ac08a61e6464ea8796c1bf7b2ef4d9ab48f713c2c2413af93b38702db5b5d4c2eb6cfe"
    "fbc86efd6dbdf4920df35b2d96b4b784"
);

/// OpenSSL RSASSA-PSS signature over [`MESSAGE`] with SHA-512 and a 20 byte salt.
const RSA1024_SHA512_PSS20: [u8; 128] = hex!(
    "6e612cdfd5e310b453b6025821d01930bd8334935e4ac0f1e948cd7534b8d36a5733cf2cabaa88ce168d7486d01072614a"
    "fb63b714a1b585ae2a9d987fab449e4fe32e46936ee7d4cda36b1849e70696baa06f7cff5f467bc58dfa4253b7892bbc54"
    "f45246702d6861848e18e528176855739b3b6b387d4ad3f238bee7455b1d"
);

/// OpenSSL RSASSA-PSS signature over [`MESSAGE`] with SHA-256 and the
/// maximum (222 byte) salt.
const RSA2048_SHA256_PSS_MAX: [u8; 256] = hex!(
    "126e1e445fc47f7294cef1dd60c090023b9e957ce1b69399113db5793699391522f57bfd03eb395639f9bbd6f1bf72b2"
    "21e02816cd28d1fffcfd908abe1bdb0f225c384be69976f6026b45ee9eb63d4ff5e658aedd4f9f3879a718e6e9cc0685"
    "fd761977bc27bc4ea020b5dcd52df32d99c1ac116ddc3d39e786bef3ab86791074d84764e6b8712ca7b5e5b8397274c0"
    "1fd869dd543c0c4007dae68781d6425237b24d61445625551def460cada311a89163c11e65dd4a143d980d99be42ceda"
    "8aa3bebd2a6180547fb28bb393aecd17fb56e5652efda0a7956d1e33d7b54b49aa08959b17fe6defa862383e284acd5d"
    "8e95962cd77edf857bb2a9735918f753"
);

fn pss() -> RsaOptions {
    RsaOptions::default().with_padding(RsaPadding::PssMgf1)
}

#[test]
fn pkcs1v15_matches_openssl() {
    let signature =
        rsa::sign(HashAlgorithm::Sha256, RSA2048_PRIV, MESSAGE, &RsaOptions::default()).unwrap();
    assert_eq!(signature, RSA2048_SHA256_PKCS1);

    assert!(
        rsa::verify(
            HashAlgorithm::Sha256,
            RSA2048_PUB,
            MESSAGE,
            &RSA2048_SHA256_PKCS1,
            &RsaOptions::default()
        )
        .unwrap()
    );
}

#[test]
fn pkcs1v15_legacy_digests_match_openssl() {
    let vectors: &[(HashAlgorithm, [u8; 128])] = &[
        (
            HashAlgorithm::Md5,
            hex!(
                "00c692c6bbf47b31b59bca36c5a9950607a764551292fe5749c92226d3961331346424e83864a795c795b573b14a9e2c"
                "7113b590552678686471564716ae7afe2fa2d4a5e057367f36d6722566e9648baf389f3cdfdcae2217569e5e2f39991d"
                "dafad76eec019e5834bc4ed402dec6dc43170ed117c3ae7f4a0d6e49c2e09fc3"
            ),
        ),
        (
            HashAlgorithm::Ripemd160,
            hex!(
                "574cabde45cfa8f792f9af27f74a88ebaf4b7b35931f18947b59f145485234479c40908cb2325f4357ceab528df4e1f3"
                "163614b06ec56e6712ebf31fa4fc1213c64ae8b6986941b91036900ccb1bf3bfa89fa1c15df732c5a869df824cb2a7b8"
                "347e8f8662277cae898b7341180f2efe4885d0bb56db2305a0467b8e0449aba4"
            ),
        ),
        (
            HashAlgorithm::Sha1,
            hex!(
                "4aba60fe0e801417334a87d42972d79949f55c75c3450d327218e9a11900e5241f25f592e9cedbf258c3f6fca50638e1"
                "0c1322421a526348f08e28c601890b0e5fb664d08d4b85a78510f3a0f5916606967396c5660f4b65d6d0576457cbc2c6"
                "a314b0f01d7aa052b5f738fac75a714d4cb74e248a2d1b96a4dba612970f6993"
            ),
        ),
        (
            HashAlgorithm::Sha3_256,
            hex!(
                "62e17c8f1114b43083cef103d5b3a9e3da15e3db9ba77878f629575699ae03d90d8ddff009e2265e905fcc2a818208be"
                "df4b527a6cce0c51f94013c43761c506b73ca53c8f142325e195542962966c5a13371df4a66fab37bb92f487296b24ad"
                "e805567a7b237669ba1aa605c2a0cc7e8b753cd8a2c457017a5d1dcfd08c9838"
            ),
        ),
    ];

    let options = RsaOptions::default();

    for (algorithm, expected) in vectors {
        let signature = rsa::sign(*algorithm, RSA1024_PRIV, MESSAGE, &options).unwrap();
        assert_eq!(signature, expected, "{algorithm}");
        assert!(rsa::verify(*algorithm, RSA1024_PUB, MESSAGE, expected, &options).unwrap());
    }
}

#[test]
fn pss_verifies_openssl_signatures() {
    let options = pss().with_salt_length(32);
    assert!(
        rsa::verify(HashAlgorithm::Sha256, RSA2048_PUB, MESSAGE, &RSA2048_SHA256_PSS, &options)
            .unwrap()
    );

    let options = pss().with_salt_length(20);
    assert!(
        rsa::verify(HashAlgorithm::Sha512, RSA1024_PUB, MESSAGE, &RSA1024_SHA512_PSS20, &options)
            .unwrap()
    );

    // an explicit salt length must match
    let options = pss().with_salt_length(16);
    assert!(
        !rsa::verify(HashAlgorithm::Sha512, RSA1024_PUB, MESSAGE, &RSA1024_SHA512_PSS20, &options)
            .unwrap()
    );
}

#[test]
fn pss_salt_length_is_recovered_by_default() {
    let vectors: [(HashAlgorithm, &str, &[u8]); 3] = [
        (HashAlgorithm::Sha256, RSA2048_PUB, &RSA2048_SHA256_PSS_MAX),
        (HashAlgorithm::Sha256, RSA2048_PUB, &RSA2048_SHA256_PSS),
        (HashAlgorithm::Sha512, RSA1024_PUB, &RSA1024_SHA512_PSS20),
    ];

    for (algorithm, public, signature) in vectors {
        assert!(rsa::verify(algorithm, public, MESSAGE, signature, &pss()).unwrap());
        assert!(!rsa::verify(algorithm, public, b"Hello, who are you?", signature, &pss()).unwrap());
    }

    let options = pss().with_salt_length(222);
    assert!(
        rsa::verify(HashAlgorithm::Sha256, RSA2048_PUB, MESSAGE, &RSA2048_SHA256_PSS_MAX, &options)
            .unwrap()
    );

    let options = pss().with_salt_length(32);
    assert!(
        !rsa::verify(HashAlgorithm::Sha256, RSA2048_PUB, MESSAGE, &RSA2048_SHA256_PSS_MAX, &options)
            .unwrap()
    );

    let signer = RsaSigner::new(
        HashAlgorithm::Sha256,
        Some(RSA2048_PUB.into()),
        Some(RSA2048_PRIV.into()),
        pss(),
    )
    .unwrap();
    assert!(signer.verify(MESSAGE, &RSA2048_SHA256_PSS_MAX).unwrap());

    let signature = rsa::sign(HashAlgorithm::Sha256, RSA2048_PRIV, MESSAGE, &pss().with_salt_length(0))
        .unwrap();
    assert!(signer.verify(MESSAGE, &signature).unwrap());
}

#[test]
fn pss_round_trip() {
    let signer = RsaSigner::new(
        HashAlgorithm::Sha384,
        Some(RSA2048_PUB.into()),
        Some(RSA2048_PRIV.into()),
        pss(),
    )
    .unwrap();

    assert_eq!(signer.padding(), RsaPadding::PssMgf1);
    assert_eq!(signer.modulus_bits(), 2048);

    let a = signer.sign(MESSAGE).unwrap();
    let b = signer.sign(MESSAGE).unwrap();
    assert_eq!(a.len(), 256);
    assert_ne!(a, b, "PSS signatures are salted");

    assert!(signer.verify(MESSAGE, &a).unwrap());
    assert!(signer.verify(MESSAGE, &b).unwrap());
    assert!(!signer.verify(b"Hello, who are you?", &a).unwrap());
}

#[test]
fn pss_salt_too_long_for_key() {
    // SHA-512 with its default 64 byte salt does not fit a 1024-bit modulus
    let err = rsa::sign(HashAlgorithm::Sha512, RSA1024_PRIV, MESSAGE, &pss()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SignFailed);

    let options = pss().with_salt_length(20);
    let signature = rsa::sign(HashAlgorithm::Sha512, RSA1024_PRIV, MESSAGE, &options).unwrap();
    assert!(rsa::verify(HashAlgorithm::Sha512, RSA1024_PUB, MESSAGE, &signature, &options).unwrap());
}

#[test]
fn padding_mismatch_does_not_verify() {
    assert!(
        !rsa::verify(HashAlgorithm::Sha256, RSA2048_PUB, MESSAGE, &RSA2048_SHA256_PKCS1, &pss())
            .unwrap()
    );
}

#[test]
fn wrong_length_signature_does_not_verify() {
    let options = RsaOptions::default();
    assert!(
        !rsa::verify(HashAlgorithm::Sha256, RSA2048_PUB, MESSAGE, &RSA2048_SHA256_PKCS1[1..], &options)
            .unwrap()
    );
    assert!(!rsa::verify(HashAlgorithm::Sha256, RSA2048_PUB, MESSAGE, &[], &options).unwrap());
}

#[test]
fn modulus_lengths_must_match() {
    let err = RsaSigner::new(
        HashAlgorithm::Sha256,
        Some(RSA1024_PUB.into()),
        Some(RSA2048_PRIV.into()),
        RsaOptions::default(),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::KeyPairMismatch);
    assert_eq!(err.context_value("privateKeyLength"), Some("2048"));
    assert_eq!(err.context_value("publicKeyLength"), Some("1024"));
}

#[test]
fn signer_reports_algorithm() {
    let signer = RsaSigner::new(
        HashAlgorithm::Sha512,
        Some(RSA2048_PUB.into()),
        None,
        RsaOptions::default(),
    )
    .unwrap();

    assert_eq!(signer.hash_algorithm(), "sha512");
    assert_eq!(signer.sign_algorithm(), SignAlgorithm::Rsa);
    assert_eq!(signer.algorithm().to_string(), "rsa-sha512");
    assert_eq!(signer.sign(MESSAGE).unwrap_err().kind(), ErrorKind::NoPrivateKey);
}

#[test]
fn parsed_key_objects_are_accepted() {
    let private = KeyObject::parse_private(RSA2048_PRIV, None).unwrap();
    let public = private.to_public();
    assert_eq!(public.modulus_bits(), Some(2048));

    let signer = RsaSigner::new(
        HashAlgorithm::Sha256,
        Some(KeyInput::Object(public)),
        Some(private.into()),
        RsaOptions::default(),
    )
    .unwrap();

    assert_eq!(signer.sign(MESSAGE).unwrap(), RSA2048_SHA256_PKCS1);
}

#[test]
fn unsupported_and_foreign_keys() {
    let err = rsa::sign(HashAlgorithm::Sm3, RSA2048_PRIV, MESSAGE, &RsaOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);

    let err =
        rsa::sign(HashAlgorithm::Sha256, EC256_PRIV, MESSAGE, &RsaOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPrivateKey);
    assert_eq!(err.context_value("keyAlgo"), Some("ec"));

    let err = RsaSigner::new(HashAlgorithm::Sha256, None, None, RsaOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoKeyProvided);
}

#[tokio::test]
async fn streams() {
    let signer = RsaSigner::new(
        HashAlgorithm::Sha256,
        Some(RSA2048_PUB.into()),
        Some(RSA2048_PRIV.into()),
        RsaOptions::default(),
    )
    .unwrap();

    let signature = signer
        .sign_stream((&MESSAGE[..4]).chain(&MESSAGE[4..]))
        .await
        .unwrap();
    assert_eq!(signature, RSA2048_SHA256_PKCS1);
    assert!(signer.verify_stream(MESSAGE, &signature).await.unwrap());

    let options = pss().with_salt_length(32);
    assert!(
        rsa::verify_stream(HashAlgorithm::Sha256, RSA2048_PUB, MESSAGE, &RSA2048_SHA256_PSS, &options)
            .await
            .unwrap()
    );

    let signature = rsa::sign_stream(HashAlgorithm::Sha256, RSA2048_PRIV, MESSAGE, &options)
        .await
        .unwrap();
    assert!(rsa::verify(HashAlgorithm::Sha256, RSA2048_PUB, MESSAGE, &signature, &options).unwrap());
}
