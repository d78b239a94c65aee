use crate::JobLabel;
use std::collections::BTreeSet;

/// Jobs grouped by the worker they run on.
///
/// Decoding never rejects a state, so a job may sit in several groups or in
/// none. `JobSequencing::is_solution_valid` tells whether the groups form a
/// partition.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Assignment<J: JobLabel>(Vec<BTreeSet<J>>);

impl<J: JobLabel> std::fmt::Debug for Assignment<J> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_map().entries(self.0.iter().enumerate()).finish()
	}
}

impl<J: JobLabel> Assignment<J> {
	/// `num_workers` empty groups.
	pub fn new(num_workers: usize) -> Self {
		Self(vec![BTreeSet::new(); num_workers])
	}

	pub fn from_groups(groups: Vec<BTreeSet<J>>) -> Self {
		Self(groups)
	}

	/// Build from `(job, worker)` pairs. Groups are added as needed to hold
	/// the largest worker index seen.
	pub fn from_workers<I>(jobs: I, num_workers: usize) -> Self
	where
		I: IntoIterator<Item = (J, usize)>,
	{
		let mut ret = Self::new(num_workers);
		for (job, worker) in jobs {
			ret.insert(worker, job);
		}
		ret
	}

	pub fn insert(&mut self, worker: usize, job: J) {
		if worker >= self.0.len() {
			self.0.resize(worker + 1, BTreeSet::new());
		}
		self.0[worker].insert(job);
	}

	pub fn num_workers(&self) -> usize {
		self.0.len()
	}

	pub fn groups(&self) -> &[BTreeSet<J>] {
		&self.0
	}

	/// First worker holding `job`.
	pub fn worker_of(&self, job: &J) -> Option<usize> {
		self.0.iter().position(|g| g.contains(job))
	}

	/// Every `(job, worker)` pair, by worker.
	pub fn jobs(&self) -> impl Iterator<Item = (&J, usize)> {
		self.0
			.iter()
			.enumerate()
			.flat_map(|(w, g)| g.iter().map(move |j| (j, w)))
	}

	pub fn into_groups(self) -> Vec<BTreeSet<J>> {
		self.0
	}
}

impl<J: JobLabel> std::ops::Index<usize> for Assignment<J> {
	type Output = BTreeSet<J>;

	fn index(&self, worker: usize) -> &Self::Output {
		&self.0[worker]
	}
}

#[test]
fn assignment_test() {
	let a = Assignment::from_workers(vec![("a", 1), ("b", 0), ("c", 3)], 2);
	assert_eq!(a.num_workers(), 4);
	assert_eq!(a.worker_of(&"c"), Some(3));
	assert!(a[2].is_empty());
	assert_eq!(
		a.jobs().collect::<Vec<_>>(),
		vec![(&"b", 0), (&"a", 1), (&"c", 3)]
	);
	assert_eq!(format!("{:?}", a), r#"{0: {"b"}, 1: {"a"}, 2: {}, 3: {"c"}}"#);
}
