use crate::error::Result;
use crate::matrix::{Ising, Qubo};

/// A combinatorial problem with a QUBO reduction.
///
/// The models are derived once and then borrowed, so implementors are
/// expected to cache them.
pub trait Problem {
	/// Structured answer recovered from a variable assignment.
	type Solution;

	fn num_binary_variables(&self) -> usize;

	fn to_qubo(&self) -> &Qubo;

	/// Must agree with `to_qubo` under `x = (1 + s) / 2`.
	fn to_ising(&self) -> &Ising;

	/// Decode a full state, either all 0/1 or all -1/+1.
	fn convert_solution(&self, state: &[i8]) -> Result<Self::Solution>;

	fn is_solution_valid(&self, solution: &Self::Solution) -> bool;

	/// Exact optimum of the original objective. Exponential.
	fn solve_bruteforce(&self) -> Result<Self::Solution>;

	fn solve_bruteforce_all(&self) -> Result<Vec<Self::Solution>>;
}
