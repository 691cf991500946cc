// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

/// This module governs the high-level implementation of the command line application
mod configuration;
mod export;
mod styles;
mod telemetry;

pub(crate) use configuration::Configuration;

use crate::assembly::Property;
use crate::bands::BandStructure;
use crate::job::{BuildProblem, JobDescription};
use crate::sweep::{PropertyRequest, Sweep, SweepResult};
use clap::{ArgEnum, Parser};
use color_eyre::eyre::eyre;
use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use styles::Styles;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct App {
    /// The TOML description of the job
    file_path: Option<PathBuf>,
    #[clap(arg_enum, short, long, default_value = "info")]
    log_level: LogLevel,
    /// Evaluate the electrical conductivity
    #[clap(short = 'e', long)]
    conductivity: bool,
    /// Evaluate the Seebeck coefficient
    #[clap(short, long)]
    seebeck: bool,
    /// Evaluate the electronic thermal conductivity
    #[clap(short = 'k', long = "thermal")]
    thermal_conductivity: bool,
    /// Evaluate the net carrier concentration
    #[clap(short = 'n', long)]
    concentration: bool,
    /// Evaluate the Lorenz tensor
    #[clap(long)]
    lorenz: bool,
    /// Report every property as a full tensor
    #[clap(long)]
    full_tensor: bool,
    /// Directory for the tables and the log, defaults to a timestamped directory in `results`
    #[clap(short, long)]
    output: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ArgEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let level = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{level}")
    }
}

impl App {
    /// The properties switched on by flags
    fn flagged_properties(&self) -> Vec<Property> {
        [
            (self.conductivity, Property::Conductivity),
            (self.seebeck, Property::Seebeck),
            (self.thermal_conductivity, Property::ThermalConductivity),
            (self.concentration, Property::Concentration),
            (self.lorenz, Property::Lorenz),
        ]
        .into_iter()
        .filter_map(|(flag, property)| flag.then(|| property))
        .collect()
    }
}

/// Extend the requests of the job with those given on the command line
///
/// A flagged property already present in the job is exported, `full_tensor` applies to every request.
fn merge_requests(
    mut requests: Vec<PropertyRequest>,
    flagged: &[Property],
    full_tensor: bool,
) -> Vec<PropertyRequest> {
    for &property in flagged {
        match requests
            .iter_mut()
            .find(|request| request.property == property)
        {
            Some(request) => request.export_as_table = true,
            None => requests.push(PropertyRequest::new(property)),
        }
    }
    if full_tensor {
        for request in requests.iter_mut() {
            request.full_tensor = true;
        }
    }
    requests
}

/// Parse the command line, run the described job and export its tables
pub fn run() -> color_eyre::Result<()> {
    let cli = App::parse();

    let output = cli
        .output
        .clone()
        .unwrap_or_else(export::default_output_directory);
    std::fs::create_dir_all(&output)?;

    let (subscriber, _guard) = telemetry::get_subscriber(cli.log_level, &output);
    telemetry::init_subscriber(subscriber)?;

    let config = Configuration::build()?;
    let settings = config.sweep_settings();

    let path = cli
        .file_path
        .clone()
        .ok_or(eyre!("A file path needs to be passed."))?;
    let job = JobDescription::build(&path)?;

    let band_structure =
        job.build_band_structure(&settings.integration, &settings.root_finding)?;
    let scattering = job.build_scattering_model()?;
    let requests = merge_requests(
        job.build_requests(),
        &cli.flagged_properties(),
        cli.full_tensor,
    );

    let mut builder = Sweep::builder()
        .with_band_structure(&band_structure)
        .with_scattering_model(&scattering)
        .with_temperatures(job.build_temperatures()?)
        .with_properties(requests)
        .with_settings(settings);
    if let Some(abscissa) = job.build_abscissa()? {
        builder = builder.with_abscissa(abscissa);
    }
    let sweep = builder.build()?;
    let result = sweep.run()?;

    let styles = Styles::for_stdout();
    print_summary(&styles, &band_structure, &result);
    let written = export::write_tables(&output, &result)?;
    println!(
        "{} {} table(s) in {}",
        "Wrote".style(styles.heading_style),
        written.len(),
        output.display()
    );
    Ok(())
}

fn print_summary(styles: &Styles, band_structure: &BandStructure, result: &SweepResult) {
    println!(
        "{} {} band(s), μ = {:.6} eV, n = {:.4e} m^-3 at {} K",
        "Band structure".style(styles.heading_style),
        band_structure.bands().len(),
        band_structure.chemical_potential(),
        band_structure.carrier_density(),
        band_structure.temperature(),
    );
    for grid in &result.grids {
        let values = grid
            .values
            .iter()
            .flatten()
            .map(|tensor| tensor.scalar())
            .collect::<Vec<_>>();
        let (minimum, maximum) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &value| {
                (lo.min(value), hi.max(value))
            });
        let property = grid.request.property;
        if values.is_empty() {
            println!(
                "{:>34}: {}",
                property.style(styles.property_style),
                "no points evaluated".style(styles.failure_style)
            );
        } else {
            println!(
                "{:>34}: {} points, {} to {} {}",
                property.style(styles.property_style),
                values.len(),
                format!("{minimum:.4e}").style(styles.value_style),
                format!("{maximum:.4e}").style(styles.value_style),
                property.unit()
            );
        }
    }
    if !result.is_complete() {
        println!(
            "{} {} failed slot(s)",
            "Failures".style(styles.failure_style),
            result.failures.len()
        );
        for failure in &result.failures {
            println!(
                "  {} at T = {} K, abscissa = {:e}: {}",
                failure.property,
                failure.temperature,
                failure.abscissa,
                failure.error
            );
        }
    }
}

#[cfg(test)]
mod test {
    use super::merge_requests;
    use crate::assembly::Property;
    use crate::sweep::PropertyRequest;

    #[test]
    fn flags_extend_the_requests_of_the_job() {
        let job = vec![PropertyRequest {
            property: Property::Seebeck,
            full_tensor: false,
            export_as_table: false,
        }];
        let merged = merge_requests(job, &[Property::Seebeck, Property::Lorenz], true);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].property, Property::Seebeck);
        assert!(merged[0].export_as_table);
        assert_eq!(merged[1].property, Property::Lorenz);
        assert!(merged.iter().all(|request| request.full_tensor));
    }

    #[test]
    fn without_flags_the_job_is_unchanged() {
        let job = vec![PropertyRequest::new(Property::Conductivity)];
        assert_eq!(merge_requests(job.clone(), &[], false), job);
    }
}
