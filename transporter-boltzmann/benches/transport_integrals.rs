use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use transporter_boltzmann::{
    bands::PrincipalAxis,
    integrals::{transport_integral, IntegrationSettings, Weight},
    scattering::ScatteringModel,
    sweep::{Abscissa, PropertyRequest, Sweep},
    assembly::Property,
};
use utilities::{
    construct_acoustic_scattering, construct_test_scattering_tree,
    structures::{construct_bipolar_structure, construct_single_band},
};

pub fn bench_transport_integral(c: &mut Criterion) {
    let structure = construct_single_band(0.1);
    let band = &structure.bands()[0];
    let scattering = ScatteringModel::constant(1e-14).unwrap();
    let settings = IntegrationSettings::default();

    let mut group = c.benchmark_group("transport_integral");

    for order in [0, 1, 2].into_iter() {
        group.bench_with_input(BenchmarkId::new("constant", order), &order, |b, &order| {
            b.iter(|| {
                transport_integral(
                    black_box(band),
                    black_box(0.1),
                    black_box(300.),
                    order,
                    Weight::Velocity(PrincipalAxis::First),
                    &scattering,
                    &settings,
                )
            })
        });
    }

    for depth in [1, 2, 3].into_iter() {
        let tree = construct_test_scattering_tree(depth, 3);
        group.bench_with_input(BenchmarkId::new("matthiessen", depth), &depth, |b, _| {
            b.iter(|| {
                transport_integral(
                    black_box(band),
                    black_box(0.1),
                    black_box(300.),
                    1,
                    Weight::Velocity(PrincipalAxis::First),
                    &tree,
                    &settings,
                )
            })
        });
    }
}

pub fn bench_bipolar_sweep(c: &mut Criterion) {
    let structure = construct_bipolar_structure(1.1);
    let scattering = construct_acoustic_scattering(1.1);

    let mut group = c.benchmark_group("bipolar_sweep");
    group.sample_size(10);

    for num_points in [4, 16, 64].into_iter() {
        let densities = (0..num_points)
            .map(|index| 1e20 * 10f64.powf(index as f64 * 6. / num_points as f64))
            .collect::<Vec<_>>();
        let sweep = Sweep::builder()
            .with_band_structure(&structure)
            .with_scattering_model(&scattering)
            .with_temperatures(vec![300.])
            .with_abscissa(Abscissa::CarrierDensities(densities))
            .with_properties(vec![
                PropertyRequest::new(Property::Conductivity),
                PropertyRequest::new(Property::Seebeck),
            ])
            .build()
            .unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(num_points),
            &num_points,
            |b, _| b.iter(|| sweep.run()),
        );
    }
}

criterion_group!(transport_integrals, bench_transport_integral, bench_bipolar_sweep);
criterion_main!(transport_integrals);
