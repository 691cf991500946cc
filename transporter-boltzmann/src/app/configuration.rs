// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::bands::RootFindingSettings;
use crate::integrals::IntegrationSettings;
use crate::sweep::SweepSettings;
use color_eyre::eyre::eyre;
use config::{Config, File};
use serde::Deserialize;
use std::env;

/// Numerical settings shared by every job
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Configuration {
    pub(crate) quadrature: IntegrationSettings,
    pub(crate) root_finding: RootFindingSettings,
    pub(crate) sweep: SweepConfiguration,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SweepConfiguration {
    /// Size of the worker pool, zero uses the global rayon pool
    pub(crate) number_of_threads: usize,
}

impl Configuration {
    pub(crate) fn build() -> color_eyre::Result<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // The default settings, looked up from the workspace root or a member crate
            .add_source(File::with_name(".config/default").required(false))
            .add_source(File::with_name("../.config/default").required(false))
            // The override settings which may be set by the user, optional
            .add_source(File::with_name(&format!(".config/{}", run_mode)).required(false))
            .add_source(File::with_name(&format!("../.config/{}", run_mode)).required(false))
            .build()?;

        s.try_deserialize()
            .map_err(|e| eyre!(format!("Failed to deserialize the config file: {:?}", e)))
    }

    pub(crate) fn sweep_settings(&self) -> SweepSettings {
        SweepSettings {
            integration: self.quadrature,
            root_finding: self.root_finding,
            number_of_threads: match self.sweep.number_of_threads {
                0 => None,
                threads => Some(threads),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::Configuration;
    use config::{Config, File, FileFormat};

    #[test]
    fn partial_configuration_falls_back_to_defaults() {
        let configuration: Configuration = Config::builder()
            .add_source(File::from_str(
                "[quadrature]\nrelative_tolerance = 1e-6\n[sweep]\nnumber_of_threads = 4\n",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        let settings = configuration.sweep_settings();
        assert_eq!(settings.integration.relative_tolerance, 1e-6);
        assert_eq!(settings.integration.maximum_subdivisions, 500);
        assert_eq!(settings.root_finding.maximum_iterations, 200);
        assert_eq!(settings.number_of_threads, Some(4));
    }

    #[test]
    fn zero_threads_uses_the_global_pool() {
        assert_eq!(Configuration::default().sweep_settings().number_of_threads, None);
    }
}
