use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use stick_runtime::{Channel, Encoder, Network, NeuronParams, Simulator};

fn build_relay_chain(length: usize) -> Network {
    let mut net = Network::root();
    let params = NeuronParams::default();
    let mut prev = net.create_neuron("relay_000", params.clone()).expect("neuron");
    for i in 1..length {
        let next = net
            .create_neuron(&format!("relay_{:03}", i), params.clone())
            .expect("neuron");
        net.connect(&prev, &next, Channel::V, params.vt, 1.0)
            .expect("synapse");
        prev = next;
    }
    net
}

fn bench_integration_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("stick_runtime_integration");
    // Short horizon to keep benches fast in CI
    let dt = 0.01; // ms
    let duration = 50.0; // ms

    for &n in &[8usize, 32, 128] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("relay_chain", n), &n, |b, &n| {
            let net = build_relay_chain(n);
            let head = net.all_neurons()[0].handle();
            b.iter(|| {
                let mut sim = Simulator::new(&net, Encoder::default(), dt).unwrap();
                sim.apply_input_value(0.25, &head, 0.0).unwrap();
                sim.simulate(duration).unwrap();
                sim.total_spikes()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_integration_loop);
criterion_main!(benches);
