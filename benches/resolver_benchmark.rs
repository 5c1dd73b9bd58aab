use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use portray_api::models::{Identity, SignInMethod};
use portray_api::services::birthdate::{format_birthdate_input, validate_birthdate};
use portray_api::services::upload::content_hash;
use portray_api::services::{resolve_route, VerificationStatus};

fn benchmark_resolver(c: &mut Criterion) {
    let identity = Identity {
        uid: "bench-user".to_string(),
        email_verified: true,
        sign_in_method: SignInMethod::Password,
    };

    let statuses = [
        VerificationStatus {
            age_verified: false,
            terms_accepted: false,
        },
        VerificationStatus {
            age_verified: true,
            terms_accepted: false,
        },
        VerificationStatus {
            age_verified: true,
            terms_accepted: true,
        },
    ];

    c.bench_function("resolve_route_all_gates", |b| {
        b.iter(|| {
            for status in &statuses {
                black_box(resolve_route(black_box(Some(&identity)), status));
            }
        })
    });
}

fn benchmark_birthdate(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();

    c.bench_function("format_birthdate_input", |b| {
        b.iter(|| format_birthdate_input(black_box("15061990")))
    });

    c.bench_function("validate_birthdate", |b| {
        b.iter(|| validate_birthdate(black_box("15.06.1990"), black_box(today)))
    });
}

fn benchmark_content_hash(c: &mut Criterion) {
    // Typical phone photo size.
    let image = vec![0xABu8; 3 * 1024 * 1024];

    c.bench_function("content_hash_3mb", |b| {
        b.iter(|| content_hash(black_box(&image)))
    });
}

criterion_group!(
    benches,
    benchmark_resolver,
    benchmark_birthdate,
    benchmark_content_hash
);
criterion_main!(benches);
