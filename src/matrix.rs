use crate::error::{Error, Result};
use crate::solve;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Display};
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// A normalized term: the constant, one variable, or an ordered pair `i < j`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Key {
	Offset,
	Linear(usize),
	Quadratic(usize, usize),
}

impl Key {
	fn from_squashed(indices: Vec<usize>) -> Result<Self> {
		match indices.as_slice() {
			[] => Ok(Key::Offset),
			[i] => Ok(Key::Linear(*i)),
			[i, j] => Ok(Key::Quadratic(*i, *j)),
			_ => Err(Error::Key(indices)),
		}
	}

	pub fn degree(&self) -> usize {
		match self {
			Key::Offset => 0,
			Key::Linear(_) => 1,
			Key::Quadratic(_, _) => 2,
		}
	}

	pub fn variables(&self) -> impl Iterator<Item = usize> {
		let (a, b) = match *self {
			Key::Offset => (None, None),
			Key::Linear(i) => (Some(i), None),
			Key::Quadratic(i, j) => (Some(i), Some(j)),
		};
		a.into_iter().chain(b)
	}
}

impl Display for Key {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Key::Offset => f.write_str("()"),
			Key::Linear(i) => write!(f, "({},)", i),
			Key::Quadratic(i, j) => write!(f, "({}, {})", i, j),
		}
	}
}

/// The value set of the variables and the algebra that goes with it.
pub trait Domain: Clone + Copy + Debug + Default + PartialEq + Send + Sync + 'static {
	/// Allowed variable values, in enumeration order.
	const VALUES: [i8; 2];

	/// Reduce a product of variables to its canonical sorted index list.
	fn squash(indices: &[usize]) -> Vec<usize>;

	fn key(indices: &[usize]) -> Result<Key> {
		Key::from_squashed(Self::squash(indices))
	}

	fn pair(i: usize, j: usize) -> Key;
}

/// Variables in {0, 1}; `x * x = x`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Binary;

/// Variables in {-1, +1}; `s * s = 1`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Spin;

impl Domain for Binary {
	const VALUES: [i8; 2] = [0, 1];

	fn squash(indices: &[usize]) -> Vec<usize> {
		let set: BTreeSet<usize> = indices.iter().cloned().collect();
		set.into_iter().collect()
	}

	fn pair(i: usize, j: usize) -> Key {
		if i == j {
			Key::Linear(i)
		} else {
			Key::Quadratic(i.min(j), i.max(j))
		}
	}
}

impl Domain for Spin {
	const VALUES: [i8; 2] = [-1, 1];

	fn squash(indices: &[usize]) -> Vec<usize> {
		let mut counts = BTreeMap::new();
		for i in indices {
			*counts.entry(*i).or_insert(0usize) += 1;
		}
		counts
			.into_iter()
			.filter_map(|(i, c)| if c % 2 == 1 { Some(i) } else { None })
			.collect()
	}

	fn pair(i: usize, j: usize) -> Key {
		if i == j {
			Key::Offset
		} else {
			Key::Quadratic(i.min(j), i.max(j))
		}
	}
}

/// Sparse objective of degree at most two over variables `0..`.
///
/// Terms are kept upper triangular and a coefficient that reaches zero is
/// dropped, so two matrices describing the same polynomial compare equal.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Matrix<D: Domain> {
	terms: BTreeMap<Key, f64>,
	_domain: PhantomData<D>,
}

/// Quadratic unconstrained binary optimization problem.
pub type Qubo = Matrix<Binary>;
/// Ising model: `h` are the linear terms, `J` the quadratic ones.
pub type Ising = Matrix<Spin>;

impl<D: Domain> Matrix<D> {
	pub fn new() -> Self {
		Self {
			terms: BTreeMap::new(),
			_domain: PhantomData,
		}
	}

	pub fn from_terms<I, K>(terms: I) -> Result<Self>
	where
		I: IntoIterator<Item = (K, f64)>,
		K: AsRef<[usize]>,
	{
		let mut ret = Self::new();
		for (k, v) in terms {
			ret.add_term(k.as_ref(), v)?;
		}
		Ok(ret)
	}

	/// Add `coeff` times the product of the variables in `indices`.
	pub fn add_term(&mut self, indices: &[usize], coeff: f64) -> Result<()> {
		let key = D::key(indices)?;
		self.add_key(key, coeff);
		Ok(())
	}

	pub(crate) fn add_key(&mut self, key: Key, coeff: f64) {
		if coeff == 0.0 {
			return;
		}
		match self.terms.entry(key) {
			Entry::Occupied(mut e) => {
				*e.get_mut() += coeff;
				if *e.get() == 0.0 {
					e.remove();
				}
			}
			Entry::Vacant(e) => {
				e.insert(coeff);
			}
		}
	}

	/// Add `weight * (constant + sum coeff * v)^2`.
	pub(crate) fn add_square(&mut self, weight: f64, constant: f64, linear: &[(usize, f64)]) {
		self.add_key(Key::Offset, weight * constant * constant);
		for (i, a) in linear.iter() {
			self.add_key(Key::Linear(*i), 2.0 * weight * constant * a);
			for (j, b) in linear.iter() {
				self.add_key(D::pair(*i, *j), weight * a * b);
			}
		}
	}

	pub fn coefficient(&self, indices: &[usize]) -> Result<f64> {
		let key = D::key(indices)?;
		Ok(self.get(&key))
	}

	pub fn get(&self, key: &Key) -> f64 {
		self.terms.get(key).cloned().unwrap_or(0.0)
	}

	pub fn offset(&self) -> f64 {
		self.get(&Key::Offset)
	}

	pub fn terms(&self) -> impl Iterator<Item = (&Key, &f64)> {
		self.terms.iter()
	}

	pub fn linear(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
		self.terms.iter().filter_map(|(k, v)| match k {
			Key::Linear(i) => Some((*i, *v)),
			_ => None,
		})
	}

	pub fn quadratic(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
		self.terms.iter().filter_map(|(k, v)| match k {
			Key::Quadratic(i, j) => Some(((*i, *j), *v)),
			_ => None,
		})
	}

	pub fn degree(&self) -> usize {
		self.terms.keys().map(Key::degree).max().unwrap_or(0)
	}

	pub fn variables(&self) -> BTreeSet<usize> {
		self.terms.keys().flat_map(Key::variables).collect()
	}

	pub fn num_binary_variables(&self) -> usize {
		self.variables().len()
	}

	pub fn max_index(&self) -> Option<usize> {
		self.terms.keys().flat_map(Key::variables).max()
	}

	pub fn len(&self) -> usize {
		self.terms.len()
	}

	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
	}

	/// Energy of `state`, offset included. `state[i]` is the value of
	/// variable `i`.
	pub fn value(&self, state: &[i8]) -> Result<f64> {
		if let Some(max) = self.max_index() {
			if state.len() <= max {
				return Err(Error::Value(format!(
					"state has {} entries but variable {} is used",
					state.len(),
					max
				)));
			}
		}
		if let Some(v) = state.iter().find(|v| !D::VALUES.contains(*v)) {
			return Err(Error::Value(format!(
				"{} is not one of {:?}",
				v,
				D::VALUES
			)));
		}
		Ok(self.energy(state))
	}

	/// `value` without the checks; `state` must cover every variable.
	pub(crate) fn energy(&self, state: &[i8]) -> f64 {
		self.terms
			.iter()
			.map(|(k, v)| match *k {
				Key::Offset => *v,
				Key::Linear(i) => *v * state[i] as f64,
				Key::Quadratic(i, j) => *v * (state[i] * state[j]) as f64,
			})
			.sum()
	}

	/// Exhaustively find a minimal-energy state. See [`crate::solve`].
	pub fn solve_bruteforce(&self) -> Result<(f64, Vec<i8>)> {
		solve::bruteforce(self)
	}

	pub fn solve_bruteforce_all(&self) -> Result<(f64, Vec<Vec<i8>>)> {
		solve::bruteforce_all(self)
	}

	fn scale(&mut self, factor: f64) {
		for v in self.terms.values_mut() {
			*v *= factor;
		}
		self.terms.retain(|_, v| *v != 0.0);
	}
}

impl Matrix<Binary> {
	/// Substitute `x = (1 + s) / 2`. Energies agree state for state.
	pub fn to_ising(&self) -> Ising {
		let mut ret = Ising::new();
		for (k, v) in self.terms.iter() {
			match *k {
				Key::Offset => ret.add_key(Key::Offset, *v),
				Key::Linear(i) => {
					ret.add_key(Key::Offset, v / 2.0);
					ret.add_key(Key::Linear(i), v / 2.0);
				}
				Key::Quadratic(i, j) => {
					let q = v / 4.0;
					ret.add_key(Key::Offset, q);
					ret.add_key(Key::Linear(i), q);
					ret.add_key(Key::Linear(j), q);
					ret.add_key(Key::Quadratic(i, j), q);
				}
			}
		}
		ret
	}
}

impl Matrix<Spin> {
	/// Substitute `s = 2x - 1`. Energies agree state for state.
	pub fn to_qubo(&self) -> Qubo {
		let mut ret = Qubo::new();
		for (k, v) in self.terms.iter() {
			match *k {
				Key::Offset => ret.add_key(Key::Offset, *v),
				Key::Linear(i) => {
					ret.add_key(Key::Offset, -v);
					ret.add_key(Key::Linear(i), 2.0 * v);
				}
				Key::Quadratic(i, j) => {
					ret.add_key(Key::Offset, *v);
					ret.add_key(Key::Linear(i), -2.0 * v);
					ret.add_key(Key::Linear(j), -2.0 * v);
					ret.add_key(Key::Quadratic(i, j), 4.0 * v);
				}
			}
		}
		ret
	}

	pub fn h(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
		self.linear()
	}

	pub fn j(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
		self.quadratic()
	}
}

impl<D: Domain> Display for Matrix<D> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("{")?;
		for (n, (k, v)) in self.terms.iter().enumerate() {
			if n > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{}: {}", k, v)?;
		}
		f.write_str("}")
	}
}

impl<D: Domain> AddAssign<Matrix<D>> for Matrix<D> {
	#[inline]
	fn add_assign(&mut self, other: Self) {
		for (k, v) in other.terms {
			self.add_key(k, v);
		}
	}
}

impl<D: Domain> SubAssign<Matrix<D>> for Matrix<D> {
	#[inline]
	fn sub_assign(&mut self, other: Self) {
		for (k, v) in other.terms {
			self.add_key(k, -v);
		}
	}
}

impl<D: Domain> AddAssign<f64> for Matrix<D> {
	#[inline]
	fn add_assign(&mut self, other: f64) {
		self.add_key(Key::Offset, other);
	}
}

impl<D: Domain> SubAssign<f64> for Matrix<D> {
	#[inline]
	fn sub_assign(&mut self, other: f64) {
		self.add_key(Key::Offset, -other);
	}
}

impl<D: Domain> MulAssign<f64> for Matrix<D> {
	#[inline]
	fn mul_assign(&mut self, other: f64) {
		self.scale(other);
	}
}

impl<D: Domain> DivAssign<f64> for Matrix<D> {
	#[inline]
	fn div_assign(&mut self, other: f64) {
		self.scale(1.0 / other);
	}
}

macro_rules! impl_binary_op {
	($trait:ident, $fun:ident, $assign:ident, $rhs:ty) => {
		impl<D: Domain> $trait<$rhs> for Matrix<D> {
			type Output = Self;
			#[inline]
			fn $fun(mut self, other: $rhs) -> Self::Output {
				self.$assign(other);
				self
			}
		}
	};
}

impl_binary_op!(Add, add, add_assign, Matrix<D>);
impl_binary_op!(Sub, sub, sub_assign, Matrix<D>);
impl_binary_op!(Add, add, add_assign, f64);
impl_binary_op!(Sub, sub, sub_assign, f64);
impl_binary_op!(Mul, mul, mul_assign, f64);
impl_binary_op!(Div, div, div_assign, f64);

impl<D: Domain> Mul<Matrix<D>> for f64 {
	type Output = Matrix<D>;
	#[inline]
	fn mul(self, other: Matrix<D>) -> Self::Output {
		other * self
	}
}

impl<D: Domain> Neg for Matrix<D> {
	type Output = Self;
	#[inline]
	fn neg(self) -> Self::Output {
		self * -1.0
	}
}

#[test]
fn squash_test() {
	assert_eq!(Binary::key(&[0, 0]).unwrap(), Key::Linear(0));
	assert_eq!(Binary::key(&[3, 1, 3]).unwrap(), Key::Quadratic(1, 3));
	assert_eq!(Spin::key(&[0, 0]).unwrap(), Key::Offset);
	assert_eq!(
		Spin::key(&[0, 4, 0, 3, 3, 2, 3]).unwrap_err().to_string(),
		"invalid key [2, 3, 4]: at most two distinct variables per term"
	);
	assert_eq!(Spin::key(&[0, 1, 1, 2, 2, 2]).unwrap(), Key::Quadratic(0, 2));
	assert!(Binary::key(&[0, 1, 2]).is_err());
}

#[test]
fn zero_removal_test() {
	let mut d = Qubo::new();
	d.add_term(&[0, 0], 1.0).unwrap();
	assert_eq!(d.coefficient(&[0]).unwrap(), 1.0);
	d.add_term(&[0, 0], -1.0).unwrap();
	assert!(d.is_empty());
	assert_eq!(d.degree(), 0);
	assert_eq!(d.num_binary_variables(), 0);
	assert_eq!(d.max_index(), None);
}

#[test]
fn to_ising_test() {
	let q = Qubo::from_terms(vec![(vec![0, 1], 1.0), (vec![1], -1.0), (vec![], 2.0)]).unwrap();
	let i = q.to_ising();
	for x in [[0, 0], [0, 1], [1, 0], [1, 1]].iter() {
		let s = x.iter().map(|v| 2 * v - 1).collect::<Vec<i8>>();
		assert!((q.value(x).unwrap() - i.value(&s).unwrap()).abs() < 1e-12);
	}
	assert_eq!(i.to_qubo(), q);
}
