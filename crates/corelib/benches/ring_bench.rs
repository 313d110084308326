use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shardring_core::partitioner::{Blake3Partitioner, SipPartitioner, Xxh3Partitioner};
use shardring_core::{HashRing, NodeId, Partitioner};

fn ring_with<P: Partitioner>(partitioner: P, nodes: usize, replicas: usize) -> HashRing<P> {
    let mut ring = HashRing::with_partitioner(partitioner, replicas).unwrap();
    for i in 0..nodes {
        ring.add_node(format!("node-{}", i), replicas).unwrap();
    }
    ring
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_node");
    for replicas in [3usize, 64, 256] {
        let ring = ring_with(Xxh3Partitioner, 16, replicas);
        group.bench_with_input(BenchmarkId::new("xxh3", replicas), &ring, |b, ring| {
            let mut i = 0u64;
            b.iter(|| {
                i = i.wrapping_add(1);
                black_box(ring.get_node(i.to_le_bytes()).unwrap());
            })
        });
    }

    let sip = ring_with(SipPartitioner::new(), 16, 64);
    group.bench_function("sip/64", |b| {
        b.iter(|| black_box(sip.get_node(b"user:12345").unwrap()))
    });
    let blake = ring_with(Blake3Partitioner, 16, 64);
    group.bench_function("blake3/64", |b| {
        b.iter(|| black_box(blake.get_node(b"user:12345").unwrap()))
    });
    group.finish();
}

fn bench_membership(c: &mut Criterion) {
    let base = ring_with(Xxh3Partitioner, 32, 128);
    let newcomer = NodeId::from("newcomer");
    c.bench_function("add_remove_node/128", |b| {
        let mut ring = base.clone();
        b.iter(|| {
            ring.add_node(newcomer.clone(), 128).unwrap();
            black_box(ring.remove_node(&newcomer));
        })
    });
}

criterion_group!(benches, bench_lookup, bench_membership);
criterion_main!(benches);
