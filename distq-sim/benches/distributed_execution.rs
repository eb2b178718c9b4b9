//! Distributed vs sequential execution on a variational workload

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use distq_gates::circuits::variational_layer;
use distq_sim::{DeviceConfig, DistributedCircuit, Simulator};

fn variational_queue(nqubits: usize) -> Vec<distq_core::GateOp> {
    let theta: Vec<f64> = (0..2 * nqubits).map(|i| 0.17 * (i + 1) as f64).collect();
    variational_layer(nqubits, &theta)
}

fn bench_execution(c: &mut Criterion) {
    let nqubits = 12;
    let queue = variational_queue(nqubits);

    c.bench_function("sequential_12q", |b| {
        let simulator = Simulator::new(nqubits);
        b.iter(|| simulator.run(black_box(&queue), None).unwrap())
    });

    let config = DeviceConfig::new(&[("dev:0", 2), ("dev:1", 2)], "mem");
    let mut circuit = DistributedCircuit::new(nqubits, config).unwrap();
    circuit.add_gates(queue.iter().cloned()).unwrap();

    c.bench_function("distributed_12q_4dev", |b| {
        b.iter(|| black_box(&circuit).execute(None, None).unwrap())
    });

    let fused = circuit.fuse().unwrap();
    c.bench_function("distributed_fused_12q_4dev", |b| {
        b.iter(|| black_box(&fused).execute(None, None).unwrap())
    });
}

criterion_group!(benches, bench_execution);
criterion_main!(benches);
