//! Throwaway key material for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::symm::Cipher;
use openssl::x509::{X509Builder, X509NameBuilder, X509};
use tempfile::TempDir;

/// Passphrase protecting `Material::encrypted_key`
pub const PASSPHRASE: &str = "hunter2";

/// Latin-1 passphrase protecting `Material::latin1_key`
pub const LATIN1_PASSPHRASE: &[u8] = b"caf\xe9";

/// Self-signed certificate with matching plain and encrypted keys
pub struct Material {
    pub dir: TempDir,
    pub cert: PathBuf,
    pub key: PathBuf,
    pub encrypted_key: PathBuf,
    pub latin1_key: PathBuf,
    pub ca_dir: PathBuf,
}

pub fn material() -> Material {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let pkey = generate_key();
    let cert = self_signed(&pkey, "localhost");

    let cert_path = dir.path().join("server.crt");
    let key_path = dir.path().join("server.key");
    let encrypted_key_path = dir.path().join("server.enc.key");
    let latin1_key_path = dir.path().join("server.latin1.key");
    let ca_dir = dir.path().join("ca");

    fs::write(&cert_path, cert.to_pem().unwrap()).unwrap();
    fs::write(&key_path, pkey.private_key_to_pem_pkcs8().unwrap()).unwrap();
    fs::write(
        &encrypted_key_path,
        pkey.private_key_to_pem_pkcs8_passphrase(Cipher::aes_256_cbc(), PASSPHRASE.as_bytes())
            .unwrap(),
    )
    .unwrap();
    fs::write(
        &latin1_key_path,
        pkey.private_key_to_pem_pkcs8_passphrase(Cipher::aes_256_cbc(), LATIN1_PASSPHRASE)
            .unwrap(),
    )
    .unwrap();
    fs::create_dir(&ca_dir).unwrap();

    Material {
        dir,
        cert: cert_path,
        key: key_path,
        encrypted_key: encrypted_key_path,
        latin1_key: latin1_key_path,
        ca_dir,
    }
}

fn generate_key() -> PKey<Private> {
    let rsa = Rsa::generate(2048).unwrap();
    PKey::from_rsa(rsa).unwrap()
}

fn self_signed(pkey: &PKey<Private>, common_name: &str) -> X509 {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", common_name).unwrap();
    let name = name.build();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(pkey).unwrap();
    builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
    builder.set_not_after(&Asn1Time::days_from_now(30).unwrap()).unwrap();
    builder.sign(pkey, MessageDigest::sha256()).unwrap();
    builder.build()
}
