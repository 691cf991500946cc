use approx::assert_relative_eq;
use transporter_boltzmann::{
    assembly::Property,
    scattering::ScatteringModel,
    sweep::{Abscissa, PropertyRequest, Sweep},
};
use utilities::{construct_test_scattering_tree, structures::construct_bipolar_structure};

#[test]
fn density_sweep_recovers_its_abscissa_and_the_sign_of_the_seebeck_coefficient() {
    let structure = construct_bipolar_structure(1.1);
    assert_relative_eq!(
        structure.carrier_density(),
        0.,
        epsilon = 1.
    );
    let scattering = ScatteringModel::constant(1e-14).unwrap();
    let densities = vec![-1e24, -1e22, 1e22, 1e24];

    let result = Sweep::builder()
        .with_band_structure(&structure)
        .with_scattering_model(&scattering)
        .with_temperatures(vec![300., 400.])
        .with_abscissa(Abscissa::CarrierDensities(densities.clone()))
        .with_properties(vec![
            PropertyRequest::new(Property::Concentration),
            PropertyRequest::new(Property::Seebeck),
        ])
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert!(result.is_complete());
    let concentration = result.grid(Property::Concentration).unwrap();
    let seebeck = result.grid(Property::Seebeck).unwrap();
    for i in 0..2 {
        for (j, &density) in densities.iter().enumerate() {
            let value = concentration.values[[i, j]].as_ref().unwrap().scalar();
            assert_relative_eq!(value, density, max_relative = 1e-6);
            // Holes are counted positive, so p-type points have a positive Seebeck coefficient
            let s = seebeck.values[[i, j]].as_ref().unwrap().scalar();
            assert_eq!(s.signum(), density.signum());
        }
    }
    // The chemical potential rises with the electron density
    let potentials = result.chemical_potentials.row(0).to_vec();
    assert!(potentials
        .windows(2)
        .all(|pair| pair[0].unwrap() > pair[1].unwrap()));
}

#[test]
fn random_scattering_trees_give_positive_conductivity() {
    let structure = construct_bipolar_structure(1.1);
    for _ in 0..5 {
        let scattering = construct_test_scattering_tree(2, 3);
        let result = Sweep::builder()
            .with_band_structure(&structure)
            .with_scattering_model(&scattering)
            .with_temperatures(vec![300.])
            .with_abscissa(Abscissa::ChemicalPotentials(vec![0.2, 0.55, 0.9]))
            .with_properties(vec![PropertyRequest::new(Property::Conductivity).with_full_tensor(true)])
            .build()
            .unwrap()
            .run()
            .unwrap();
        assert!(result.is_complete());
        for value in result.grid(Property::Conductivity).unwrap().values.iter() {
            let components = value.as_ref().unwrap().components();
            assert_eq!(components.len(), 9);
            // The diagonal of a conductivity tensor is positive
            for diagonal in [0, 4, 8] {
                assert!(components[diagonal] > 0.);
            }
        }
    }
}
