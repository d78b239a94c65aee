extern crate qubo_reduce;
extern crate rand;
use qubo_reduce::{Assignment, JobSequencing, Problem};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

fn random_problem<R: Rng>(r: &mut R) -> JobSequencing<usize> {
	let jobs = r.gen_range(1, 5);
	let workers = r.gen_range(1, 4);
	let lengths = (0..jobs)
		.map(|j| (j, r.gen_range(1, 5) as f64))
		.collect::<Vec<_>>();
	JobSequencing::new(lengths, workers).unwrap()
}

/// Every partition of the jobs, with the heaviest group moved to worker 0.
fn partitions(p: &JobSequencing<usize>) -> Vec<Assignment<usize>> {
	let n = p.job_lengths().len();
	let m = p.num_workers();
	(0..m.pow(n as u32))
		.map(|code| {
			let a = Assignment::from_workers(
				(0..n).map(|j| (j, (code / m.pow(j as u32)) % m)),
				m,
			);
			let loads = p.loads(&a);
			let heaviest = (0..m)
				.fold(0, |best, w| if loads[w] > loads[best] { w } else { best });
			let mut groups = a.into_groups();
			groups.swap(0, heaviest);
			Assignment::from_groups(groups)
		})
		.collect()
}

fn ising_variables(p: &JobSequencing<usize>) -> BTreeSet<usize> {
	let ising = p.to_ising();
	ising
		.j()
		.flat_map(|((i, j), _)| vec![i, j])
		.chain(ising.h().map(|(i, _)| i))
		.collect()
}

#[test]
fn variable_counts() {
	let mut r = SmallRng::seed_from_u64(11);
	for _ in 0..40 {
		let p = random_problem(&mut r);
		let unary = p.clone().with_log_trick(false).unwrap();
		for q in [&p, &unary].iter() {
			assert_eq!(q.to_qubo().num_binary_variables(), q.num_binary_variables());
			assert_eq!(ising_variables(q).len(), q.num_binary_variables());
		}
		assert!(p.num_binary_variables() <= unary.num_binary_variables());
	}
}

#[test]
fn energy_is_makespan() {
	let mut r = SmallRng::seed_from_u64(5);
	for _ in 0..25 {
		let p = random_problem(&mut r);
		for q in vec![p.clone(), p.with_log_trick(false).unwrap()] {
			for a in partitions(&q) {
				assert!(q.is_solution_valid(&a));
				let makespan = q.makespan(&a);
				let x = q.encode_solution(&a).unwrap();
				assert_eq!(q.convert_solution(&x).unwrap(), a);
				assert!((q.to_qubo().value(&x).unwrap() - makespan).abs() < 1e-9);
				let s = x.iter().map(|v| 2 * v - 1).collect::<Vec<i8>>();
				assert!((q.to_ising().value(&s).unwrap() - makespan).abs() < 1e-9);
			}
		}
	}
}

#[test]
fn qubo_minimum_matches_bruteforce() {
	let mut r = SmallRng::seed_from_u64(3);
	let mut checked = 0;
	while checked < 12 {
		let p = random_problem(&mut r);
		if p.num_binary_variables() > 16 {
			continue;
		}
		checked += 1;
		let best = p.solve_bruteforce().unwrap();
		assert!(p.is_solution_valid(&best));
		let (e, x) = p.to_qubo().solve_bruteforce().unwrap();
		let decoded = p.convert_solution(&x).unwrap();
		assert!(p.is_solution_valid(&decoded));
		assert!((e - p.makespan(&best)).abs() < 1e-9);
		assert!((e - p.makespan(&decoded)).abs() < 1e-9);
		let (ei, _) = p.to_ising().solve_bruteforce().unwrap();
		assert!((ei - e).abs() < 1e-9);
		for other in p.solve_bruteforce_all().unwrap() {
			assert_eq!(p.makespan(&other), p.makespan(&best));
		}
	}
}
