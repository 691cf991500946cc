// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use super::{Abscissa, PropertyRequest};
use crate::assembly::{Property, PropertyTensor};
use crate::error::TransportError;
use ndarray::Array2;

const TENSOR_COMPONENTS: [&str; 9] = ["xx", "xy", "xz", "yx", "yy", "yz", "zx", "zy", "zz"];

#[derive(Clone, Debug, PartialEq)]
/// A numerical failure at a single grid point
pub struct PointFailure {
    /// The property whose slot was left empty
    pub property: Property,
    /// The (temperature, abscissa) indices of the point
    pub indices: (usize, usize),
    /// Temperature in K
    pub temperature: f64,
    /// The chemical potential in eV or net carrier density in m^-3 of the point
    pub abscissa: f64,
    /// Why the point failed
    pub error: TransportError,
}

#[derive(Clone, Debug)]
/// The values of one requested property over the (temperature, abscissa) grid
pub struct PropertyGrid {
    /// The request the grid answers
    pub request: PropertyRequest,
    /// Indexed by (temperature, abscissa), `None` where the evaluation failed
    pub values: Array2<Option<PropertyTensor>>,
}

#[derive(Clone, Debug, PartialEq)]
/// A rectangular table with one row per grid point, missing cells are `None`
pub struct Table {
    /// Column headers with units
    pub columns: Vec<String>,
    /// One row per grid point
    pub rows: Vec<Vec<Option<f64>>>,
}

#[derive(Clone, Debug)]
/// The outcome of a completed sweep
pub struct SweepResult {
    /// Temperatures in K
    pub temperatures: Vec<f64>,
    /// The second axis
    pub abscissa: Abscissa,
    /// The chemical potential in eV at each point, `None` where the density could not be converted
    pub chemical_potentials: Array2<Option<f64>>,
    /// One grid per request
    pub grids: Vec<PropertyGrid>,
    /// Points which failed, in no particular order
    pub failures: Vec<PointFailure>,
}

impl SweepResult {
    /// The grid of the first request for `property`
    pub fn grid(&self, property: Property) -> Option<&PropertyGrid> {
        self.grids
            .iter()
            .find(|grid| grid.request.property == property)
    }

    /// Whether every slot of every grid was filled
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Tabulate `grid` with one row per point, temperature varying slowest
    pub fn table(&self, grid: &PropertyGrid) -> Table {
        let mut columns = vec!["temperature_K".to_string(), "chemical_potential_eV".to_string()];
        if let Abscissa::CarrierDensities(_) = self.abscissa {
            columns.push("carrier_density_m-3".to_string());
        }
        let symbol = grid.request.property.symbol();
        let tensor_valued =
            grid.request.full_tensor && grid.request.property.needs_transport_moments();
        if tensor_valued {
            columns.extend(
                TENSOR_COMPONENTS
                    .iter()
                    .map(|component| format!("{symbol}_{component}")),
            );
        } else {
            columns.push(symbol.to_string());
        }
        let width = if tensor_valued { 9 } else { 1 };

        let rows = grid
            .values
            .indexed_iter()
            .map(|((i, j), value)| {
                let mut row = vec![Some(self.temperatures[i]), self.chemical_potentials[[i, j]]];
                if let Abscissa::CarrierDensities(densities) = &self.abscissa {
                    row.push(Some(densities[j]));
                }
                match value {
                    Some(tensor) => row.extend(tensor.components().into_iter().map(Some)),
                    None => row.extend(std::iter::repeat(None).take(width)),
                }
                row
            })
            .collect();

        Table { columns, rows }
    }

    /// Tables of every grid whose request asked for tabular export
    pub fn tables(&self) -> Vec<(&PropertyGrid, Table)> {
        self.grids
            .iter()
            .filter(|grid| grid.request.export_as_table)
            .map(|grid| (grid, self.table(grid)))
            .collect()
    }
}
