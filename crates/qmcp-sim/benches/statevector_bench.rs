use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use qmcp_ir::library::qft;
use qmcp_ir::{Circuit, QubitId};
use qmcp_sim::{DensityMatrix, Simulator, Statevector};

fn ghz(n: u32) -> Circuit {
    let mut circuit = Circuit::with_size("ghz", n, n);
    circuit.h(QubitId(0)).unwrap();
    for i in 0..n - 1 {
        circuit.cx(QubitId(i), QubitId(i + 1)).unwrap();
    }
    circuit.measure_all().unwrap();
    circuit
}

fn bench_qft_statevector(c: &mut Criterion) {
    let mut group = c.benchmark_group("qft_statevector");
    for n in [8, 12, 16] {
        let circuit = qft("qft", n, false).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &circuit, |b, circuit| {
            b.iter(|| Statevector::from_circuit(black_box(circuit)).unwrap());
        });
    }
    group.finish();
}

fn bench_ghz_sampling(c: &mut Criterion) {
    let sim = Simulator::new().with_seed(Some(0));
    let mut group = c.benchmark_group("ghz_sampling");
    for n in [4, 10, 16] {
        let circuit = ghz(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &circuit, |b, circuit| {
            b.iter(|| sim.run(black_box(circuit), 1000).unwrap());
        });
    }
    group.finish();
}

fn layered(n: u32, layers: u32) -> Circuit {
    let mut circuit = Circuit::with_size("layered", n, 0);
    for layer in 0..layers {
        for q in 0..n {
            circuit.ry(0.1 * f64::from(q + layer + 1), QubitId(q)).unwrap();
        }
        for q in 0..n - 1 {
            circuit.cx(QubitId(q), QubitId(q + 1)).unwrap();
        }
    }
    circuit
}

fn bench_entropy(c: &mut Criterion) {
    let state = Simulator::new().statevector(&layered(10, 3)).unwrap();
    let rho = DensityMatrix::from_statevector(&state);

    c.bench_function("entropy_half_trace_10q", |b| {
        b.iter(|| {
            let mut reduced = rho.clone();
            for q in (0..5).rev() {
                reduced = reduced.partial_trace(q).unwrap();
            }
            black_box(reduced.von_neumann_entropy().unwrap())
        });
    });
}

criterion_group!(benches, bench_qft_statevector, bench_ghz_sampling, bench_entropy);
criterion_main!(benches);
