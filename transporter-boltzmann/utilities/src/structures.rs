use nalgebra::Matrix3;
use transporter_boltzmann::bands::{BandStructure, CarrierType, EffectiveMass, ParabBand};

/// A single isotropic free-electron band with its edge at zero, referenced to `chemical_potential`
pub fn construct_single_band(chemical_potential: f64) -> BandStructure {
    let band = ParabBand::new(
        EffectiveMass::isotropic(1.).unwrap(),
        0.,
        CarrierType::Electron,
        1,
    )
    .unwrap();
    BandStructure::builder()
        .with_bands(vec![band])
        .at_temperature(300.)
        .with_chemical_potential(chemical_potential)
        .build()
        .unwrap()
}

/// A silicon-like structure: six rotated conduction valleys and a heavy and light hole band,
/// referenced to charge neutrality
pub fn construct_bipolar_structure(gap: f64) -> BandStructure {
    let conduction = [
        [0., 0., 0.],
        [0., std::f64::consts::FRAC_PI_2, 0.],
        [std::f64::consts::FRAC_PI_2, 0., 0.],
    ]
    .into_iter()
    .map(|angles| {
        ParabBand::new(
            EffectiveMass::with_euler_angles([0.19, 0.19, 0.98], angles).unwrap(),
            gap,
            CarrierType::Electron,
            2,
        )
        .unwrap()
    });
    let heavy = ParabBand::new(
        EffectiveMass::from_tensor(Matrix3::from_diagonal_element(0.49)).unwrap(),
        0.,
        CarrierType::Hole,
        1,
    )
    .unwrap();
    let light = ParabBand::new(
        EffectiveMass::isotropic(0.16).unwrap(),
        0.,
        CarrierType::Hole,
        1,
    )
    .unwrap();

    BandStructure::builder()
        .with_bands(conduction.chain([heavy, light]).collect())
        .at_temperature(300.)
        .with_carrier_density(0.)
        .build()
        .unwrap()
}
