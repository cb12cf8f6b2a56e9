use criterion::{criterion_group, criterion_main, Criterion};

use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use service::rating::{average, submit_rating};

fn bench_average(c: &mut Criterion) {
    c.bench_function("rating_average", |b| {
        b.iter(|| average(criterion::black_box(17), criterion::black_box(8)));
    });
}

fn bench_submit(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (db, user_id) = rt.block_on(async {
        let db = connect_with_config(&DatabaseConfig::sqlite_memory()).await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let u = models::user::create(&db, "bench@example.com").await.unwrap();
        models::user_profile::create_for_user(&db, u.id, None).await.unwrap();
        (db, u.id)
    });

    // every iteration grows the rating table, so the recompute cost grows too
    c.bench_function("rating_submit_recompute", |b| {
        b.to_async(&rt).iter(|| async {
            submit_rating(&db, user_id, 4, None).await.unwrap();
        });
    });
}

criterion_group!(benches, bench_average, bench_submit);
criterion_main!(benches);
