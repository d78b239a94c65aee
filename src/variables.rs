use std::collections::HashMap;

/// What a binary variable of the job sequencing encoding stands for.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Variable {
	/// Job `job` runs on worker `worker`.
	Assign { job: usize, worker: usize },
	/// Bit `bit` of the load gap between worker 0 and `worker`.
	Slack { worker: usize, bit: usize },
}

/// Dense, bijective numbering of variables, fixed once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariableTable {
	variables: Vec<Variable>,
	indices: HashMap<Variable, usize>,
}

impl VariableTable {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Index of `v`, allocating the next free one on first use.
	pub(crate) fn allocate(&mut self, v: Variable) -> usize {
		let next = self.variables.len();
		let variables = &mut self.variables;
		*self.indices.entry(v).or_insert_with(|| {
			variables.push(v);
			next
		})
	}

	pub fn index(&self, v: &Variable) -> Option<usize> {
		self.indices.get(v).cloned()
	}

	pub fn variable(&self, index: usize) -> Option<Variable> {
		self.variables.get(index).cloned()
	}

	pub fn len(&self) -> usize {
		self.variables.len()
	}

	pub fn is_empty(&self) -> bool {
		self.variables.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (usize, &Variable)> {
		self.variables.iter().enumerate()
	}
}

#[test]
fn allocate_test() {
	let mut table = VariableTable::new();
	let a = Variable::Assign { job: 0, worker: 1 };
	let s = Variable::Slack { worker: 1, bit: 0 };
	assert_eq!(table.allocate(a), 0);
	assert_eq!(table.allocate(s), 1);
	assert_eq!(table.allocate(a), 0);
	assert_eq!(table.len(), 2);
	assert_eq!(table.variable(1), Some(s));
	assert_eq!(table.index(&s), Some(1));
	assert_eq!(table.variable(2), None);
}
