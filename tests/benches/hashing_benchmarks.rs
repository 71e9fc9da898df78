//! # Account Block Hashing Benchmarks
//!
//! | Operation | Target |
//! |-----------|--------|
//! | Canonical encoding | < 1µs per block |
//! | Block hash | < 2µs per block |
//! | Hash with triggered sends | linear in child count |

use ab_01_block_hashing::{compute_account_block_hash, encode_account_block, pow_challenge};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use shared_types::{AccountBlock, Address, AddressKind, Amount, HashedBlock, Nonce, TokenId};
use std::time::Duration;

fn random_address(rng: &mut impl Rng) -> Address {
    let mut core = [0u8; 20];
    rng.fill(&mut core);
    Address::new(core, AddressKind::User)
}

fn random_transfer(rng: &mut impl Rng) -> AccountBlock {
    let mut previous = [0u8; 32];
    rng.fill(&mut previous);
    let mut block = AccountBlock::transfer(
        random_address(rng),
        random_address(rng),
        TokenId::vite(),
        Amount::from(rng.gen::<u64>()),
    )
    .with_data(b"benchmark payload".to_vec());
    block.height = rng.gen_range(1..1_000_000);
    block.previous_hash = Some(previous);
    block.nonce = Some(Nonce::from_u64(rng.gen()));
    block
}

fn bench_block_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("ab-01-block-hashing");
    group.measurement_time(Duration::from_secs(10));

    let mut rng = rand::thread_rng();
    let block = random_transfer(&mut rng);

    group.bench_function("encode_transfer", |b| {
        b.iter(|| black_box(encode_account_block(black_box(&block)).is_ok()))
    });

    group.bench_function("hash_transfer", |b| {
        b.iter(|| black_box(compute_account_block_hash(black_box(&block)).is_ok()))
    });

    group.bench_function("pow_challenge", |b| {
        b.iter(|| black_box(pow_challenge(&block.address, block.previous_hash.as_ref())))
    });

    for children in [1usize, 10, 100] {
        let mut parent = random_transfer(&mut rng);
        parent.triggered_send_blocks = (0..children)
            .map(|_| {
                let mut hash = [0u8; 32];
                rng.fill(&mut hash);
                HashedBlock {
                    block: random_transfer(&mut rng),
                    hash,
                }
            })
            .collect();

        group.throughput(Throughput::Elements(children as u64));
        group.bench_with_input(
            BenchmarkId::new("hash_with_triggered_sends", children),
            &parent,
            |b, parent| b.iter(|| black_box(compute_account_block_hash(parent).is_ok())),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_block_hashing);

criterion_main!(benches);
