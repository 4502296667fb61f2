use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::Barrier;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;

use governor::Quota;
use governor::RateLimiter;
use governor::clock::QuantaClock;
use governor::state::InMemoryState;
use governor::state::direct::NotKeyed;

use bucket_limit::LeakyBucket;
use bucket_limit::Limiter;
use bucket_limit::LimiterConfig;
use bucket_limit::TokenBucket;

// Wrapper to bridge Governor into the bucket-limit Limiter trait
#[derive(Debug)]
struct GovernorLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, QuantaClock>,
    capacity: i64,
}

impl Limiter for GovernorLimiter {
    fn take_available_with_now(&self, _now: i64) -> bool {
        self.take_available()
    }

    fn take_available(&self) -> bool {
        self.limiter.check().is_ok()
    }

    fn get_capacity(&self) -> i64 {
        self.capacity
    }

    fn get_legacy_capacity(&self) -> i64 {
        -1
    }
}

fn bench_single_limiter<L: Limiter>(group_name: &str, c: &mut Criterion, limiter: Arc<L>) {
    let mut group = c.benchmark_group(group_name);

    group.bench_function("single-threaded", |b| {
        b.iter(|| {
            let _ = black_box(limiter.as_ref()).take_available();
        })
    });

    group.finish();
}

fn bench_parallel_limiter<L: Limiter + 'static>(
    group_name: &str,
    c: &mut Criterion,
    limiter: Arc<L>,
) {
    let mut group = c.benchmark_group(group_name);

    for threads in [2, 4, 8].iter() {
        let num_threads = *threads;
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}-threads", num_threads)),
            &num_threads,
            |b, &n| {
                b.iter_custom(|iters| {
                    let barrier = Arc::new(Barrier::new(n + 1));
                    let mut handles = Vec::with_capacity(n);

                    for _ in 0..n {
                        let l = Arc::clone(&limiter);
                        let bar = Arc::clone(&barrier);
                        let iters_per_thread = iters / n as u64;

                        handles.push(thread::spawn(move || {
                            bar.wait();
                            for _ in 0..iters_per_thread {
                                let _ = black_box(l.take_available());
                            }
                        }));
                    }

                    barrier.wait();
                    let start = Instant::now();

                    for handle in handles {
                        let _ = handle.join();
                    }

                    start.elapsed()
                });
            },
        );
    }
    group.finish();
}

fn bench_dynamic_limiter(group_name: &str, c: &mut Criterion, limiter: Box<dyn Limiter>) {
    let mut group = c.benchmark_group(format!("Dynamic-{}", group_name));

    group.bench_function("single-threaded", |b| {
        b.iter(|| {
            let _ = black_box(limiter.as_ref()).take_available();
        })
    });

    group.finish();
}

fn run_all_benches(c: &mut Criterion) {
    let limit_val = 1_000_000;
    let period = Duration::from_secs(60);

    let lb = Arc::new(LeakyBucket::new(period, limit_val).unwrap());
    let tb = Arc::new(TokenBucket::new(period, limit_val).unwrap());

    let gov_quota = Quota::per_minute(NonZeroU32::new(limit_val as u32).unwrap());
    let gov = Arc::new(GovernorLimiter {
        limiter: RateLimiter::direct_with_clock(gov_quota, QuantaClock::default()),
        capacity: limit_val,
    });

    bench_single_limiter("LeakyBucket-Static", c, Arc::clone(&lb));
    bench_parallel_limiter("LeakyBucket-Static", c, lb);

    bench_single_limiter("TokenBucket-Static", c, Arc::clone(&tb));
    bench_parallel_limiter("TokenBucket-Static", c, tb);

    bench_single_limiter("Governor-Static", c, Arc::clone(&gov));
    bench_parallel_limiter("Governor-Static", c, gov);

    // The cost of going through `dyn Limiter`
    let configs = [
        ("LeakyBucket", LimiterConfig::leaky_bucket(period, limit_val)),
        ("TokenBucket", LimiterConfig::token_bucket(period, limit_val)),
    ];
    for (name, config) in configs {
        bench_dynamic_limiter(name, c, config.build().unwrap());
    }
}

criterion_group!(benches, run_all_benches);
criterion_main!(benches);
