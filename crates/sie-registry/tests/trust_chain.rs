//! End-to-end registry trust chain: build, write, load, resolve.

use chrono::Utc;
use sie_core::{KeyPair, VerificationError};
use sie_registry::{
    IssuerRecord, RegistryBuilder, RegistryClient, RegistryError, RevocationRecord,
    REGISTRY_FILE,
};

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

#[test]
fn built_registry_resolves_issuer() {
    let dir = tempfile::tempdir().unwrap();
    let root = KeyPair::generate();
    let issuer = KeyPair::generate();

    RegistryBuilder::new()
        .issuer(
            IssuerRecord::new("palxislabs", issuer.public_key_b64())
                .with_metadata("name", "Palxis Labs"),
        )
        .build(&root)
        .unwrap()
        .write_to(dir.path())
        .unwrap();

    let snapshot = RegistryClient::new(dir.path())
        .load_verified_snapshot()
        .unwrap();
    let key = snapshot.resolve_issuer_key("palxislabs", Utc::now()).unwrap();
    assert_eq!(key, issuer.public_key_b64());
}

#[test]
fn root_key_distinct_from_issuer_key() {
    let dir = tempfile::tempdir().unwrap();
    let root = KeyPair::generate();
    let issuer = KeyPair::generate();
    let artifacts = RegistryBuilder::new()
        .issuer(IssuerRecord::new("acme", issuer.public_key_b64()))
        .build(&root)
        .unwrap();
    artifacts.write_to(dir.path()).unwrap();
    assert_ne!(artifacts.root_public_key_b64, issuer.public_key_b64());
}

// ---------------------------------------------------------------------------
// Tampering
// ---------------------------------------------------------------------------

#[test]
fn flipped_byte_in_registry_json_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let root = KeyPair::generate();
    RegistryBuilder::new()
        .issuer(IssuerRecord::new("acme", KeyPair::generate().public_key_b64()))
        .build(&root)
        .unwrap()
        .write_to(dir.path())
        .unwrap();

    let path = dir.path().join(REGISTRY_FILE);
    let mut bytes = std::fs::read(&path).unwrap();
    let last = bytes.len() - 2;
    bytes[last] ^= 0x01;
    std::fs::write(&path, bytes).unwrap();

    let err = RegistryClient::new(dir.path())
        .load_verified_snapshot()
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidRegistrySignature));
}

#[test]
fn reformatted_registry_json_rejected() {
    // Signature covers the stored bytes, not the parsed value.
    let dir = tempfile::tempdir().unwrap();
    let root = KeyPair::generate();
    RegistryBuilder::new()
        .issuer(IssuerRecord::new("acme", KeyPair::generate().public_key_b64()))
        .build(&root)
        .unwrap()
        .write_to(dir.path())
        .unwrap();

    let path = dir.path().join(REGISTRY_FILE);
    let value: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    std::fs::write(&path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();

    assert!(matches!(
        RegistryClient::new(dir.path()).load_verified_snapshot(),
        Err(RegistryError::InvalidRegistrySignature)
    ));
}

#[test]
fn missing_directory_lists_all_files() {
    let dir = tempfile::tempdir().unwrap();
    let err = RegistryClient::new(dir.path().join("absent"))
        .load_verified_snapshot()
        .unwrap_err();
    match err {
        RegistryError::MissingRegistryFiles { missing, .. } => assert_eq!(missing.len(), 3),
        other => panic!("unexpected error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Revocation
// ---------------------------------------------------------------------------

#[test]
fn revocation_overrides_presence_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let root = KeyPair::generate();
    let issuer = KeyPair::generate();
    RegistryBuilder::new()
        .issuer(IssuerRecord::new("acme", issuer.public_key_b64()))
        .revoke(RevocationRecord::new("acme", issuer.public_key_b64()).with_reason("key leaked"))
        .build(&root)
        .unwrap()
        .write_to(dir.path())
        .unwrap();

    let snapshot = RegistryClient::new(dir.path())
        .load_verified_snapshot()
        .unwrap();
    assert!(snapshot.is_issuer_present("acme"));
    assert!(snapshot.is_key_revoked("acme", &issuer.public_key_b64()));
    assert_eq!(
        snapshot.resolve_issuer_key("acme", Utc::now()),
        Err(VerificationError::RevokedKey {
            issuer: "acme".into()
        })
    );
}

#[test]
fn revoking_old_key_keeps_rotated_key_valid() {
    let root = KeyPair::generate();
    let old = KeyPair::generate();
    let new = KeyPair::generate();
    let snapshot = RegistryBuilder::new()
        .revoke(RevocationRecord::new("acme", old.public_key_b64()))
        .issuer(IssuerRecord::new("acme", new.public_key_b64()))
        .build(&root)
        .unwrap()
        .verify()
        .unwrap();
    assert_eq!(
        snapshot.resolve_issuer_key("acme", Utc::now()).unwrap(),
        new.public_key_b64()
    );
}
