use conjur::iam::{IamCredential, IdentitySigner};
use conjur_core::time::parse_rfc3339;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;

criterion_group!(benches, bench);
criterion_main!(benches);

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("iam");

    group.bench_function("signed_header", |b| {
        let signer = IdentitySigner::new();
        let cred = IamCredential::new(
            "access_key_id",
            "secret_access_key",
            "IQoJb3JpZ2luX2VjEEIaCXVzLWVhc3QtMSJGMEQCIFLWHwoJ6nGfJ7",
        );
        let now = parse_rfc3339("2022-03-13T07:20:04Z").expect("time must be valid");

        b.iter(|| {
            signer
                .signed_header_at(&cred, now)
                .expect("signing must succeed")
        })
    });

    group.finish();
}
