//! Simulated annealing entry points.
//!
//! None of these are implemented yet. Each returns
//! [`Error::NotImplemented`] so callers can tell a missing feature apart from
//! a failed solve. Use [`crate::solve`] for exact answers on small models.
use crate::error::{Error, Result};
use crate::matrix::{Ising, Qubo};

#[derive(Clone, Debug, PartialEq)]
pub struct AnnealParams {
	pub samples: usize,
	pub beta_count: usize,
	pub sweeps_per_beta: usize,
	pub seed: Option<u64>,
}

impl Default for AnnealParams {
	fn default() -> Self {
		Self {
			samples: rayon::current_num_threads(),
			beta_count: 100,
			sweeps_per_beta: 30,
			seed: None,
		}
	}
}

/// One annealing run's final state and its energy.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
	pub energy: f64,
	pub state: Vec<i8>,
}

fn not_implemented(name: &'static str) -> Result<Vec<Sample>> {
	tracing::warn!(entry_point = name, "annealing requested but not available");
	Err(Error::NotImplemented(name))
}

pub fn anneal_qubo(_qubo: &Qubo, _params: &AnnealParams) -> Result<Vec<Sample>> {
	not_implemented("anneal_qubo")
}

pub fn anneal_quso(_ising: &Ising, _params: &AnnealParams) -> Result<Vec<Sample>> {
	not_implemented("anneal_quso")
}

/// Quadratic models are the degree-2 case of a PUBO.
pub fn anneal_pubo(_pubo: &Qubo, _params: &AnnealParams) -> Result<Vec<Sample>> {
	not_implemented("anneal_pubo")
}

pub fn anneal_puso(_puso: &Ising, _params: &AnnealParams) -> Result<Vec<Sample>> {
	not_implemented("anneal_puso")
}
