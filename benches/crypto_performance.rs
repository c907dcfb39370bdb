//! Crypto hot-path benchmarks: password keying, the record cipher, and
//! digest signing. These sit on every login and every signed intent.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ledger_wallet::crypto::cipher;
use ledger_wallet::crypto::keying::{PasswordKeying, Sha256Keying};
use ledger_wallet::KeyCustodian;

fn bench_password_keying(c: &mut Criterion) {
    let keying = Sha256Keying;
    c.bench_function("verification_key", |b| {
        b.iter(|| keying.verification_key(black_box("correct horse battery")).unwrap());
    });
    c.bench_function("encryption_key", |b| {
        b.iter(|| keying.encryption_key(black_box("correct horse battery")).unwrap());
    });
}

fn bench_record_cipher(c: &mut Criterion) {
    let keying = Sha256Keying;
    let key = keying.encryption_key("correct horse battery").unwrap();
    let scalar = [0x5au8; 32];
    let ciphertext = cipher::encrypt_scalar(&scalar, &key);

    c.bench_function("encrypt_scalar", |b| {
        b.iter(|| cipher::encrypt_scalar(black_box(&scalar), black_box(&key)));
    });
    c.bench_function("decrypt_scalar", |b| {
        b.iter(|| cipher::decrypt_scalar(black_box(&ciphertext), black_box(&key)).unwrap());
    });
}

fn bench_sign_digest(c: &mut Criterion) {
    let custodian = KeyCustodian::generate();
    let digest = [0x21u8; 32];
    c.bench_function("sign_digest", |b| {
        b.iter(|| custodian.sign_digest(black_box(&digest)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_password_keying,
    bench_record_cipher,
    bench_sign_digest
);
criterion_main!(benches);
