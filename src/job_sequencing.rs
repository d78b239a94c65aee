//! Job sequencing as a QUBO.
//!
//! Given job lengths `L_i` and `m` identical workers, find the assignment
//! minimising the largest total length on any single worker (the makespan).
//! Following Lucas, "Ising formulations of many NP problems" (2014), §6.3,
//! worker 0 is a reference worker that must carry the largest load, and its
//! load is what gets minimised:
//!
//! ```text
//! H = A sum_i (1 - sum_a x[i,a])^2
//!   + A sum_{a>0} (sum_n w_n y[n,a] + sum_i L_i (x[i,a] - x[i,0]))^2
//!   + B sum_i L_i x[i,0]
//! ```
//!
//! `x[i,a]` puts job `i` on worker `a`. The slack bits `y[n,a]` with weights
//! `w_n` spell out the non-negative gap between worker 0 and worker `a`. They
//! must be able to reach every gap up to the total length `C`. Without the
//! log trick that takes `C` bits of weight 1 per worker; with it, the
//! `bit_length(C)` powers of two.
use crate::error::{Error, Result};
use crate::matrix::{Ising, Key, Qubo};
use crate::problem::Problem;
use crate::solution::Assignment;
use crate::solve;
use crate::variables::{Variable, VariableTable};
use crate::JobLabel;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::OnceLock;

/// Largest total job length; every load stays an exact integer in `f64`.
pub const MAX_CAPACITY: f64 = 9_007_199_254_740_991.0;
/// Largest total job length allowed without the log trick.
pub const MAX_UNARY_CAPACITY: f64 = 65_536.0;

#[derive(Clone)]
pub struct JobSequencing<J: JobLabel> {
	/// Sorted by job; a job's position is its index in the encoding.
	jobs: Vec<(J, f64)>,
	num_workers: usize,
	log_trick: bool,
	variables: VariableTable,
	slack_weights: Vec<f64>,
	qubo: OnceLock<Qubo>,
	ising: OnceLock<Ising>,
}

impl<J: JobLabel> JobSequencing<J> {
	/// Build the reduction with the log trick enabled.
	///
	/// Lengths must be positive integers, job ids unique, the job set
	/// non-empty and `num_workers` at least 1.
	pub fn new<I>(job_lengths: I, num_workers: usize) -> Result<Self>
	where
		I: IntoIterator<Item = (J, f64)>,
	{
		if num_workers < 1 {
			return Err(Error::Config("num_workers must be at least 1".into()));
		}
		let mut jobs = job_lengths.into_iter().collect::<Vec<_>>();
		if jobs.is_empty() {
			return Err(Error::Config("job set is empty".into()));
		}
		jobs.sort_by(|a, b| a.0.cmp(&b.0));
		for w in jobs.windows(2) {
			if w[0].0 == w[1].0 {
				return Err(Error::Config(format!("duplicate job {:?}", w[0].0)));
			}
		}
		for (job, length) in jobs.iter() {
			if !(length.is_finite() && *length > 0.0 && length.fract() == 0.0) {
				return Err(Error::Config(format!(
					"job {:?} has length {}, lengths must be positive integers",
					job, length
				)));
			}
		}
		let total = jobs.iter().map(|(_, l)| *l).sum::<f64>();
		if total > MAX_CAPACITY {
			return Err(Error::Config(format!(
				"total job length {} exceeds {}",
				total, MAX_CAPACITY
			)));
		}
		Ok(Self::build(jobs, num_workers, true))
	}

	/// Switch between the log trick and plain unary slack bits. Unary slack
	/// takes one bit per unit of total length, so it is refused above
	/// `MAX_UNARY_CAPACITY`.
	pub fn with_log_trick(self, log_trick: bool) -> Result<Self> {
		if log_trick == self.log_trick {
			return Ok(self);
		}
		if !log_trick && self.num_workers > 1 && self.capacity() > MAX_UNARY_CAPACITY {
			return Err(Error::Config(format!(
				"total job length {} needs more than {} unary slack bits, use the log trick",
				self.capacity(),
				MAX_UNARY_CAPACITY
			)));
		}
		Ok(Self::build(self.jobs, self.num_workers, log_trick))
	}

	fn build(jobs: Vec<(J, f64)>, num_workers: usize, log_trick: bool) -> Self {
		let capacity = jobs.iter().map(|(_, l)| *l).sum::<f64>() as u64;
		let slack_weights = if num_workers < 2 {
			Vec::new()
		} else if log_trick {
			let bits = 64 - capacity.leading_zeros() as usize;
			(0..bits).map(|b| (1u64 << b) as f64).collect()
		} else {
			vec![1.0; capacity as usize]
		};
		let mut variables = VariableTable::new();
		for job in 0..jobs.len() {
			for worker in 0..num_workers {
				variables.allocate(Variable::Assign { job, worker });
			}
		}
		for worker in 1..num_workers {
			for bit in 0..slack_weights.len() {
				variables.allocate(Variable::Slack { worker, bit });
			}
		}
		Self {
			jobs,
			num_workers,
			log_trick,
			variables,
			slack_weights,
			qubo: OnceLock::new(),
			ising: OnceLock::new(),
		}
	}

	pub fn job_lengths(&self) -> &[(J, f64)] {
		&self.jobs
	}

	pub fn num_workers(&self) -> usize {
		self.num_workers
	}

	pub fn log_trick(&self) -> bool {
		self.log_trick
	}

	pub fn variables(&self) -> &VariableTable {
		&self.variables
	}

	/// Sum of all job lengths; no load gap can exceed it.
	pub fn capacity(&self) -> f64 {
		self.jobs.iter().map(|(_, l)| l).sum()
	}

	/// `(A, B)` used by `to_qubo`. Any broken constraint costs at least `A`,
	/// which exceeds every feasible makespan times `B`.
	pub fn default_weights(&self) -> (f64, f64) {
		let b = 1.0;
		(b * (self.capacity() + 1.0), b)
	}

	fn index(&self, v: Variable) -> usize {
		match self.variables.index(&v) {
			Some(i) => i,
			None => unreachable!("{:?} is allocated at construction", v),
		}
	}

	fn assign_index(&self, job: usize, worker: usize) -> usize {
		self.index(Variable::Assign { job, worker })
	}

	/// The QUBO for constraint weight `a` and objective weight `b`. Not
	/// cached; `to_qubo` is this with `default_weights`.
	pub fn to_qubo_weighted(&self, a: f64, b: f64) -> Qubo {
		let mut qubo = Qubo::new();
		for job in 0..self.jobs.len() {
			let row = (0..self.num_workers)
				.map(|w| (self.assign_index(job, w), 1.0))
				.collect::<Vec<_>>();
			qubo.add_square(a, -1.0, &row);
		}
		for worker in 1..self.num_workers {
			let mut gap = self
				.slack_weights
				.iter()
				.enumerate()
				.map(|(bit, w)| (self.index(Variable::Slack { worker, bit }), *w))
				.collect::<Vec<_>>();
			for (job, (_, length)) in self.jobs.iter().enumerate() {
				gap.push((self.assign_index(job, worker), *length));
				gap.push((self.assign_index(job, 0), -*length));
			}
			qubo.add_square(a, 0.0, &gap);
		}
		for (job, (_, length)) in self.jobs.iter().enumerate() {
			qubo.add_key(Key::Linear(self.assign_index(job, 0)), b * length);
		}
		tracing::debug!(
			jobs = self.jobs.len(),
			workers = self.num_workers,
			log_trick = self.log_trick,
			variables = self.variables.len(),
			terms = qubo.len(),
			"built job sequencing QUBO"
		);
		qubo
	}

	/// Load of each worker, counting a job once per group it appears in.
	/// Unknown jobs weigh nothing.
	pub fn loads(&self, solution: &Assignment<J>) -> Vec<f64> {
		solution
			.groups()
			.iter()
			.map(|g| {
				g.iter()
					.filter_map(|j| self.length_of(j))
					.sum::<f64>()
			})
			.collect()
	}

	/// Largest worker load: the quantity being minimised.
	pub fn makespan(&self, solution: &Assignment<J>) -> f64 {
		self.loads(solution).into_iter().fold(0.0, f64::max)
	}

	fn length_of(&self, job: &J) -> Option<f64> {
		self.jobs
			.binary_search_by(|(j, _)| j.cmp(job))
			.ok()
			.map(|i| self.jobs[i].1)
	}

	/// Binary state for `solution`, slack bits included. The inverse of
	/// `convert_solution` for partitions whose worker 0 is the most loaded;
	/// at that state the QUBO's value is the makespan.
	pub fn encode_solution(&self, solution: &Assignment<J>) -> Result<Vec<i8>> {
		if !self.is_solution_valid(solution) {
			return Err(Error::Encode("groups are not a partition of the jobs".into()));
		}
		let loads = self.loads(solution);
		if loads.iter().any(|l| *l > loads[0]) {
			return Err(Error::Encode(format!(
				"worker 0 must carry the largest load, loads are {:?}",
				loads
			)));
		}
		let mut state = vec![0i8; self.variables.len()];
		for (job, (label, _)) in self.jobs.iter().enumerate() {
			if let Some(worker) = solution.worker_of(label) {
				state[self.assign_index(job, worker)] = 1;
			}
		}
		for worker in 1..self.num_workers {
			let gap = (loads[0] - loads.get(worker).cloned().unwrap_or(0.0)) as u64;
			for bit in 0..self.slack_weights.len() {
				let set = if self.log_trick {
					(gap >> bit) & 1 == 1
				} else {
					(bit as u64) < gap
				};
				if set {
					state[self.index(Variable::Slack { worker, bit })] = 1;
				}
			}
		}
		Ok(state)
	}

	/// Makespan of the assignment spelled by the first `jobs * workers` bits
	/// of `k`, if every job sits on exactly one worker.
	fn score_bits(&self, k: usize, n: usize) -> Option<f64> {
		let mut loads = vec![0.0; self.num_workers];
		for (job, (_, length)) in self.jobs.iter().enumerate() {
			let mut on = None;
			for worker in 0..self.num_workers {
				if solve::bit(k, n, self.assign_index(job, worker)) == 1 {
					if on.is_some() {
						return None;
					}
					on = Some(worker);
				}
			}
			loads[on?] += length;
		}
		Some(loads.into_iter().fold(0.0, f64::max))
	}

	fn assignment_of_bits(&self, k: usize, n: usize) -> Assignment<J> {
		let mut ret = Assignment::new(self.num_workers);
		for (job, (label, _)) in self.jobs.iter().enumerate() {
			for worker in 0..self.num_workers {
				if solve::bit(k, n, self.assign_index(job, worker)) == 1 {
					ret.insert(worker, label.clone());
				}
			}
		}
		ret
	}

	/// Optimal assignments in enumeration order. Slack bits never change a
	/// decoded assignment, so only the assignment bits are enumerated.
	fn bruteforce(&self) -> Result<Vec<Assignment<J>>> {
		let n = self.jobs.len() * self.num_workers;
		let (best, ks) = solve::enumerate(n, |k| self.score_bits(k, n))?;
		tracing::debug!(makespan = best, optima = ks.len(), "job sequencing solved");
		Ok(ks
			.into_iter()
			.map(|k| self.assignment_of_bits(k, n))
			.collect())
	}
}

impl<J: JobLabel> Problem for JobSequencing<J> {
	type Solution = Assignment<J>;

	fn num_binary_variables(&self) -> usize {
		self.variables.len()
	}

	fn to_qubo(&self) -> &Qubo {
		self.qubo.get_or_init(|| {
			let (a, b) = self.default_weights();
			self.to_qubo_weighted(a, b)
		})
	}

	fn to_ising(&self) -> &Ising {
		self.ising.get_or_init(|| self.to_qubo().to_ising())
	}

	/// Any `-1` marks a spin state. A job joins every group whose bit is
	/// set; slack bits are not read.
	fn convert_solution(&self, state: &[i8]) -> Result<Assignment<J>> {
		if state.len() != self.variables.len() {
			return Err(Error::Decode(format!(
				"expected {} values, got {}",
				self.variables.len(),
				state.len()
			)));
		}
		let allowed = if state.contains(&-1) { [-1, 1] } else { [0, 1] };
		if let Some(v) = state.iter().find(|v| !allowed.contains(*v)) {
			return Err(Error::Decode(format!("{} is not one of {:?}", v, allowed)));
		}
		let mut ret = Assignment::new(self.num_workers);
		for (job, (label, _)) in self.jobs.iter().enumerate() {
			for worker in 0..self.num_workers {
				if state[self.assign_index(job, worker)] == 1 {
					ret.insert(worker, label.clone());
				}
			}
		}
		Ok(ret)
	}

	fn is_solution_valid(&self, solution: &Assignment<J>) -> bool {
		// trailing workers may be left out; they hold no jobs
		if solution.num_workers() > self.num_workers {
			return false;
		}
		let mut seen = BTreeSet::new();
		for (job, _) in solution.jobs() {
			if self.length_of(job).is_none() || !seen.insert(job) {
				return false;
			}
		}
		seen.len() == self.jobs.len()
	}

	fn solve_bruteforce(&self) -> Result<Assignment<J>> {
		self.bruteforce()?
			.into_iter()
			.next()
			// validated input always has a partition: everything on worker 0
			.ok_or_else(|| Error::Config("no valid assignment exists".into()))
	}

	fn solve_bruteforce_all(&self) -> Result<Vec<Assignment<J>>> {
		self.bruteforce()
	}
}

impl<J: JobLabel> PartialEq for JobSequencing<J> {
	fn eq(&self, other: &Self) -> bool {
		self.jobs == other.jobs
			&& self.num_workers == other.num_workers
			&& self.log_trick == other.log_trick
	}
}

impl<J: JobLabel> std::fmt::Debug for JobSequencing<J> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("JobSequencing")
			.field("jobs", &self.jobs)
			.field("num_workers", &self.num_workers)
			.field("log_trick", &self.log_trick)
			.finish()
	}
}

#[derive(Serialize)]
struct ReprRef<'a, J> {
	jobs: &'a [(J, f64)],
	num_workers: usize,
	log_trick: bool,
}

#[derive(Deserialize)]
struct Repr<J> {
	jobs: Vec<(J, f64)>,
	num_workers: usize,
	log_trick: bool,
}

/// Canonical JSON: `{"jobs":[[id,length],…],"num_workers":n,"log_trick":b}`.
impl<J: JobLabel + Serialize> std::fmt::Display for JobSequencing<J> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let repr = ReprRef {
			jobs: &self.jobs,
			num_workers: self.num_workers,
			log_trick: self.log_trick,
		};
		let s = serde_json::to_string(&repr).map_err(|_| std::fmt::Error)?;
		f.write_str(&s)
	}
}

impl<J: JobLabel + DeserializeOwned> FromStr for JobSequencing<J> {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let repr: Repr<J> = serde_json::from_str(s)?;
		Self::new(repr.jobs, repr.num_workers)?.with_log_trick(repr.log_trick)
	}
}

#[test]
fn slack_size_test() {
	let p = JobSequencing::new(vec![("a", 4.0), ("b", 1.0)], 3).unwrap();
	// capacity 5 fits in 3 bits
	assert_eq!(p.slack_weights, vec![1.0, 2.0, 4.0]);
	assert_eq!(p.num_binary_variables(), 2 * 3 + 2 * 3);
	let p = p.with_log_trick(false).unwrap();
	assert_eq!(p.slack_weights.len(), 5);
	assert_eq!(p.num_binary_variables(), 2 * 3 + 2 * 5);
	let p = JobSequencing::new(vec![("a", 4.0)], 1).unwrap();
	assert!(p.slack_weights.is_empty());
	assert_eq!(p.num_binary_variables(), 1);
}

#[test]
fn index_layout_test() {
	let p = JobSequencing::new(vec![("b", 1.0), ("a", 2.0)], 2).unwrap();
	assert_eq!(p.job_lengths()[0], ("a", 2.0));
	assert_eq!(p.assign_index(1, 0), 2);
	assert_eq!(
		p.variables().variable(4),
		Some(Variable::Slack { worker: 1, bit: 0 })
	);
}
