//! Exhaustive reference solvers.
//!
//! States are enumerated lexicographically over the bit vector with
//! variable 0 as the most significant bit, so `00…0` comes first and `11…1`
//! last. A spin takes `-1` where the bit is 0 and `+1` where it is 1.
//! Energies within a relative 1e-9 of the minimum count as ties; ties keep
//! enumeration order. Evaluation runs on the rayon pool but the results are
//! the same as a sequential scan.
//!
//! These exist to verify reductions. The cost is `2^n` evaluations.
use crate::error::{Error, Result};
use crate::matrix::{Domain, Ising, Matrix, Qubo};
use rayon::prelude::*;

pub const MAX_VARIABLES: usize = 30;
const TOLERANCE: f64 = 1.0e-9;

#[inline]
fn is_tie(energy: f64, best: f64) -> bool {
	(energy - best).abs() <= TOLERANCE * best.abs().max(1.0)
}

/// Bit `i` of state `k` out of `n`, counting from the most significant end.
#[inline]
pub(crate) fn bit(k: usize, n: usize, i: usize) -> usize {
	(k >> (n - 1 - i)) & 1
}

fn state_of<D: Domain>(k: usize, n: usize) -> Vec<i8> {
	(0..n).map(|i| D::VALUES[bit(k, n, i)]).collect()
}

/// Visit all `2^n` states, let `f` score them (`None` drops a state) and
/// return the minimum together with every state reaching it, in order.
/// With no scored state the list is empty and the minimum is infinite.
pub(crate) fn enumerate<F>(n: usize, f: F) -> Result<(f64, Vec<usize>)>
where
	F: Fn(usize) -> Option<f64> + Sync,
{
	if n > MAX_VARIABLES {
		return Err(Error::TooLarge(n));
	}
	let count = 1usize << n;
	tracing::trace!(variables = n, states = count, "enumerating");
	let best = (0..count)
		.into_par_iter()
		.filter_map(|k| f(k))
		.reduce(|| f64::INFINITY, f64::min);
	if !best.is_finite() {
		return Ok((best, Vec::new()));
	}
	let ties = (0..count)
		.into_par_iter()
		.filter(|k| f(*k).map_or(false, |e| is_tie(e, best)))
		.collect::<Vec<_>>();
	Ok((best, ties))
}

fn num_variables<D: Domain>(m: &Matrix<D>) -> usize {
	m.max_index().map_or(0, |i| i + 1)
}

pub(crate) fn bruteforce<D: Domain>(m: &Matrix<D>) -> Result<(f64, Vec<i8>)> {
	let n = num_variables(m);
	if n > MAX_VARIABLES {
		return Err(Error::TooLarge(n));
	}
	let count = 1usize << n;
	let best = (0..count)
		.into_par_iter()
		.map(|k| m.energy(&state_of::<D>(k, n)))
		.reduce(|| f64::INFINITY, f64::min);
	let first = (0..count)
		.into_par_iter()
		.find_first(|k| is_tie(m.energy(&state_of::<D>(*k, n)), best))
		.unwrap_or(0);
	Ok((best, state_of::<D>(first, n)))
}

pub(crate) fn bruteforce_all<D: Domain>(m: &Matrix<D>) -> Result<(f64, Vec<Vec<i8>>)> {
	let n = num_variables(m);
	let (best, ks) = enumerate(n, |k| Some(m.energy(&state_of::<D>(k, n))))?;
	Ok((best, ks.into_iter().map(|k| state_of::<D>(k, n)).collect()))
}

/// Minimal energy of `qubo` and the first state reaching it.
pub fn solve_qubo_bruteforce(qubo: &Qubo) -> Result<(f64, Vec<i8>)> {
	bruteforce(qubo)
}

/// Minimal energy of `qubo` and every state reaching it.
pub fn solve_qubo_bruteforce_all(qubo: &Qubo) -> Result<(f64, Vec<Vec<i8>>)> {
	bruteforce_all(qubo)
}

pub fn solve_ising_bruteforce(ising: &Ising) -> Result<(f64, Vec<i8>)> {
	bruteforce(ising)
}

pub fn solve_ising_bruteforce_all(ising: &Ising) -> Result<(f64, Vec<Vec<i8>>)> {
	bruteforce_all(ising)
}

#[test]
fn order_test() {
	assert_eq!(state_of::<crate::matrix::Binary>(1, 3), vec![0, 0, 1]);
	assert_eq!(state_of::<crate::matrix::Spin>(6, 3), vec![1, 1, -1]);
	let (e, ks) = enumerate(2, |k| if k == 0 { None } else { Some(1.0) }).unwrap();
	assert_eq!(e, 1.0);
	assert_eq!(ks, vec![1, 2, 3]);
}

#[test]
fn empty_test() {
	let mut q = Qubo::new();
	q += 4.0;
	assert_eq!(solve_qubo_bruteforce(&q).unwrap(), (4.0, vec![]));
	assert!(enumerate(MAX_VARIABLES + 1, |_| Some(0.0)).is_err());
}
