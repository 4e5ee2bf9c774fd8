use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use chrono::{Duration, Utc};
use userhub_auth::{
    AccountOperation, Argon2Hasher, CredentialHasher, HashingParams, Identity, SigningSecret,
    TokenService, TokenSource, authorize, resolve_identity,
};
use userhub_core::{AccountId, AccountPatch, Role};

fn identity() -> Identity {
    Identity::new(
        AccountId::new(42).expect("positive id"),
        "bench@example.com",
        Role::User,
    )
}

fn bench_password_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("password");
    group.sample_size(10);

    for (label, params) in [
        (
            "light",
            HashingParams {
                memory_kib: 8 * 1024,
                iterations: 1,
                parallelism: 1,
            },
        ),
        ("default", HashingParams::default()),
    ] {
        let hasher = Argon2Hasher::new(params).expect("valid params");
        let hash = hasher.hash("password123").expect("hash");

        group.bench_with_input(BenchmarkId::new("hash", label), &hasher, |b, hasher| {
            b.iter(|| hasher.hash(black_box("password123")).expect("hash"))
        });
        group.bench_with_input(BenchmarkId::new("verify", label), &hasher, |b, hasher| {
            b.iter(|| {
                hasher
                    .verify(black_box("password123"), black_box(&hash))
                    .expect("verify")
            })
        });
    }

    group.finish();
}

fn bench_tokens(c: &mut Criterion) {
    let service = TokenService::new(
        &SigningSecret::new("bench-secret-bench-secret-bench-secret").expect("secret"),
        Duration::hours(1),
    );
    let token = service.issue(&identity()).expect("issue");
    let cookie = format!("theme=dark; token={token}");

    let mut group = c.benchmark_group("token");
    group.bench_function("issue", |b| {
        b.iter(|| service.issue(black_box(&identity())).expect("issue"))
    });
    group.bench_function("verify", |b| {
        b.iter(|| service.verify(black_box(&token)).expect("verify"))
    });
    group.bench_function("attach_from_cookie", |b| {
        b.iter(|| {
            let source = TokenSource::from_headers(Some(black_box(&cookie)), None);
            resolve_identity(&service, &source, Utc::now())
        })
    });
    group.finish();
}

fn bench_policy(c: &mut Criterion) {
    let actor = identity();
    let patch = AccountPatch {
        name: Some("Renamed".to_string()),
        ..AccountPatch::default()
    };

    c.bench_function("policy/authorize_update_self", |b| {
        b.iter(|| {
            authorize(
                Some(black_box(&actor)),
                black_box(actor.id),
                AccountOperation::Update { patch: &patch },
            )
        })
    });
}

criterion_group!(benches, bench_password_hashing, bench_tokens, bench_policy);
criterion_main!(benches);
