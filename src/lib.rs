//! qubo_reduce turns combinatorial problems into QUBO and Ising models,
//! and turns solver output back into structured answers.
//!
//! # Examples
//!
//! ## Job sequencing
//! ```
//! # extern crate qubo_reduce;
//! # use qubo_reduce::{JobSequencing, Problem};
//! # use qubo_reduce::solve::solve_qubo_bruteforce;
//! let problem = JobSequencing::new(vec![("job1", 2.0), ("job2", 3.0), ("job3", 1.0)], 2).unwrap();
//! let (energy, state) = solve_qubo_bruteforce(problem.to_qubo()).unwrap();
//! let solution = problem.convert_solution(&state).unwrap();
//! // displays 3, {0: {"job2"}, 1: {"job1", "job3"}}
//! println!("{}, {:?}", energy, &solution);
//! # assert!(problem.is_solution_valid(&solution));
//! # assert!((energy - 3.0).abs() < 1e-9);
//! # assert_eq!(problem.makespan(&solution), 3.0);
//! ```
//!
//! ## Building a QUBO by hand
//! ```
//! # extern crate qubo_reduce;
//! # use qubo_reduce::Qubo;
//! let qubo = Qubo::from_terms(vec![
//! 	(vec![0, 1], 1.0),
//! 	(vec![1, 2], 1.0),
//! 	(vec![1, 1], -1.0),
//! 	(vec![2], -2.0),
//! ])
//! .unwrap();
//! let (e, x) = qubo.solve_bruteforce().unwrap();
//! // [0, 0, 1], [0, 1, 1] and [1, 0, 1] tie; the first in enumeration order wins
//! // displays -2, [0, 0, 1]
//! println!("{}, {:?}", e, &x);
//! # assert_eq!(x, vec![0, 0, 1]);
//! # assert_eq!(e, -2.0);
//! let ising = qubo.to_ising();
//! # assert_eq!(ising.value(&[-1, -1, 1]).unwrap(), -2.0);
//! ```
use std::cmp::Ord;
use std::fmt::Debug;
use std::hash::Hash;

extern crate rayon;

/// Bounds a job identifier must satisfy.
pub trait JobLabel: PartialEq + Eq + Clone + Debug + Hash + Ord + Send + Sync {}

impl<T> JobLabel for T where T: PartialEq + Eq + Clone + Debug + Hash + Ord + Send + Sync {}

pub mod anneal;
mod error;
mod job_sequencing;
mod matrix;
mod problem;
mod solution;
pub mod solve;
mod variables;

pub use error::{Error, Result};
pub use job_sequencing::{JobSequencing, MAX_CAPACITY, MAX_UNARY_CAPACITY};
pub use matrix::{Binary, Domain, Ising, Key, Matrix, Qubo, Spin};
pub use problem::Problem;
pub use solution::Assignment;
pub use variables::{Variable, VariableTable};

#[test]
fn label_test() {
	fn is_label<J: JobLabel>() {}
	is_label::<&str>();
	is_label::<(String, u32)>();
}
