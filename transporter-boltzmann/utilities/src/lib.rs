pub mod structures;

use rand::{thread_rng, Rng};
use transporter_boltzmann::{
    bands::CarrierType,
    scattering::{Acoustic, ScatteringModel},
};

/// A random leaf of a scattering tree, with times of order 1e-14 s
fn construct_test_leaf<R: Rng>(rng: &mut R) -> ScatteringModel {
    let scale = 1e-14;
    let leaf = match rng.gen_range(0..3) {
        0 => ScatteringModel::constant(scale * rng.gen_range(0.5..2.)),
        1 => ScatteringModel::impurity(
            rng.gen_range(-0.2..0.2),
            scale * rng.gen_range(0.5..2.),
            rng.gen_range(0.01..0.1),
        ),
        _ => ScatteringModel::temperature_power_law(
            scale * rng.gen_range(0.5..2.) * 300f64.powf(1.5),
            -1.5,
        ),
    };
    leaf.expect("Random leaf parameters are valid")
}

/// A random Matthiessen tree of the given depth with `branching` children per node
pub fn construct_test_scattering_tree(depth: usize, branching: usize) -> ScatteringModel {
    let mut rng = thread_rng();
    construct_subtree(&mut rng, depth, branching)
}

fn construct_subtree<R: Rng>(rng: &mut R, depth: usize, branching: usize) -> ScatteringModel {
    if depth == 0 {
        return construct_test_leaf(rng);
    }
    let models = (0..branching)
        .map(|_| construct_subtree(rng, depth - 1, branching))
        .collect();
    ScatteringModel::matthiessen(models, -1.).expect("Random trees are never empty")
}

/// Acoustic phonon scattering in the conduction band of the canned structures
pub fn construct_acoustic_scattering(band_minimum: f64) -> ScatteringModel {
    ScatteringModel::acoustic(
        Acoustic::new(band_minimum, CarrierType::Electron)
            .with_prefactor(1e-12)
            .with_maximum_time(1e-12),
    )
    .expect("Acoustic parameters are valid")
}
