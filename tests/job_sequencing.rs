extern crate qubo_reduce;
use qubo_reduce::solve::{solve_ising_bruteforce, solve_qubo_bruteforce};
use qubo_reduce::{Assignment, Error, JobSequencing, Problem, MAX_CAPACITY, MAX_UNARY_CAPACITY};
use std::collections::BTreeSet;

const OBJ_VAL: f64 = 3.0;

fn job_lengths() -> Vec<(String, f64)> {
	vec![
		("job1".to_string(), 2.0),
		("job2".to_string(), 3.0),
		("job3".to_string(), 1.0),
	]
}

fn problem() -> JobSequencing<String> {
	JobSequencing::new(job_lengths(), 2)
		.unwrap()
		.with_log_trick(false)
		.unwrap()
}

fn problem_log() -> JobSequencing<String> {
	JobSequencing::new(job_lengths(), 2).unwrap()
}

fn group(jobs: &[&str]) -> BTreeSet<String> {
	jobs.iter().map(|j| j.to_string()).collect()
}

fn solutions() -> Vec<Assignment<String>> {
	vec![
		Assignment::from_groups(vec![group(&["job1", "job3"]), group(&["job2"])]),
		Assignment::from_groups(vec![group(&["job2"]), group(&["job1", "job3"])]),
	]
}

fn ising_variables(p: &JobSequencing<String>) -> BTreeSet<usize> {
	p.to_ising()
		.j()
		.flat_map(|((i, j), _)| vec![i, j])
		.chain(p.to_ising().h().map(|(i, _)| i))
		.collect()
}

#[test]
fn jobsequencing_str() {
	for p in vec![problem(), problem_log()] {
		let parsed: JobSequencing<String> = p.to_string().parse().unwrap();
		assert_eq!(parsed, p);
	}
	assert_ne!(problem(), problem_log());
}

#[test]
fn jobsequencing_bruteforce() {
	let solutions = solutions();
	for p in vec![problem(), problem_log()] {
		assert!(solutions.contains(&p.solve_bruteforce().unwrap()));
		let all = p.solve_bruteforce_all().unwrap();
		let reversed = solutions.iter().rev().cloned().collect::<Vec<_>>();
		assert!(all == solutions || all == reversed);
	}
}

#[test]
fn jobsequencing_qubo_logtrick_solve() {
	let p = problem_log();
	let (e, sol) = solve_qubo_bruteforce(p.to_qubo()).unwrap();
	let solution = p.convert_solution(&sol).unwrap();
	assert!(p.is_solution_valid(&solution));
	assert!(solutions().contains(&solution));
	assert!((e - OBJ_VAL).abs() < 1e-9);
}

#[test]
fn jobsequencing_qubo_solve() {
	let p = problem();
	let (e, sol) = solve_qubo_bruteforce(p.to_qubo()).unwrap();
	let solution = p.convert_solution(&sol).unwrap();
	assert!(p.is_solution_valid(&solution));
	assert!(solutions().contains(&solution));
	assert!((e - OBJ_VAL).abs() < 1e-9);
}

#[test]
fn jobsequencing_ising_logtrick_solve() {
	let p = problem_log();
	let (e, sol) = solve_ising_bruteforce(p.to_ising()).unwrap();
	let solution = p.convert_solution(&sol).unwrap();
	assert!(p.is_solution_valid(&solution));
	assert!(solutions().contains(&solution));
	assert!((e - OBJ_VAL).abs() < 1e-9);
}

#[test]
fn jobsequencing_ising_solve() {
	let p = problem();
	let (e, sol) = solve_ising_bruteforce(p.to_ising()).unwrap();
	let solution = p.convert_solution(&sol).unwrap();
	assert!(p.is_solution_valid(&solution));
	assert!(solutions().contains(&solution));
	assert!((e - OBJ_VAL).abs() < 1e-9);
}

#[test]
fn jobsequencing_numvars() {
	for p in vec![problem(), problem_log()] {
		assert_eq!(p.to_qubo().num_binary_variables(), p.num_binary_variables());
		assert_eq!(ising_variables(&p).len(), p.num_binary_variables());
	}
	assert_eq!(problem().num_binary_variables(), 6 + 6);
	assert_eq!(problem_log().num_binary_variables(), 6 + 3);
}

#[test]
fn jobsequencing_cached() {
	let p = problem_log();
	assert!(std::ptr::eq(p.to_qubo(), p.to_qubo()));
	assert!(std::ptr::eq(p.to_ising(), p.to_ising()));
	assert_eq!(*p.to_ising(), p.to_qubo().to_ising());
}

#[test]
fn jobsequencing_encode() {
	let solutions = solutions();
	for p in vec![problem(), problem_log()] {
		let solution = &solutions[0];
		let x = p.encode_solution(solution).unwrap();
		assert_eq!(&p.convert_solution(&x).unwrap(), solution);
		assert!((p.to_qubo().value(&x).unwrap() - OBJ_VAL).abs() < 1e-9);
		let s = x.iter().map(|v| 2 * v - 1).collect::<Vec<i8>>();
		assert!((p.to_ising().value(&s).unwrap() - OBJ_VAL).abs() < 1e-9);
		assert_eq!(&p.convert_solution(&s).unwrap(), solution);
	}
	let p = problem();
	let lighter_first =
		Assignment::from_groups(vec![group(&["job3"]), group(&["job1", "job2"])]);
	assert!(p.is_solution_valid(&lighter_first));
	assert!(matches!(p.encode_solution(&lighter_first), Err(Error::Encode(_))));
}

#[test]
fn jobsequencing_decode_errors() {
	let p = problem_log();
	let n = p.num_binary_variables();
	assert!(matches!(p.convert_solution(&vec![0; n - 1]), Err(Error::Decode(_))));
	let mut mixed = vec![0; n];
	mixed[0] = -1;
	assert!(matches!(p.convert_solution(&mixed), Err(Error::Decode(_))));
	let mut out_of_range = vec![0; n];
	out_of_range[1] = 2;
	assert!(matches!(p.convert_solution(&out_of_range), Err(Error::Decode(_))));
}

#[test]
fn jobsequencing_decode_permissive() {
	let p = problem_log();
	// every bit set: every job on both workers, slack ignored
	let solution = p.convert_solution(&vec![1; p.num_binary_variables()]).unwrap();
	assert_eq!(solution[0], group(&["job1", "job2", "job3"]));
	assert_eq!(solution[1], group(&["job1", "job2", "job3"]));
	assert!(!p.is_solution_valid(&solution));
	let solution = p.convert_solution(&vec![-1; p.num_binary_variables()]).unwrap();
	assert!(solution[0].is_empty() && solution[1].is_empty());
	assert!(!p.is_solution_valid(&solution));
}

#[test]
fn jobsequencing_validity() {
	let p = problem();
	assert!(p.is_solution_valid(&solutions()[1]));
	let missing = Assignment::from_groups(vec![group(&["job1"]), group(&["job2"])]);
	assert!(!p.is_solution_valid(&missing));
	let unknown = Assignment::from_groups(vec![
		group(&["job1", "job3", "job4"]),
		group(&["job2"]),
	]);
	assert!(!p.is_solution_valid(&unknown));
	let extra_worker = Assignment::from_groups(vec![
		group(&["job1", "job3"]),
		group(&["job2"]),
		group(&[]),
	]);
	assert!(!p.is_solution_valid(&extra_worker));
}

#[test]
fn jobsequencing_config_errors() {
	let config_err = |r: qubo_reduce::Result<JobSequencing<&str>>| matches!(r, Err(Error::Config(_)));
	assert!(config_err(JobSequencing::new(vec![("a", 1.0)], 0)));
	assert!(config_err(JobSequencing::new(vec![("a", 0.0)], 1)));
	assert!(config_err(JobSequencing::new(vec![("a", -2.0)], 1)));
	assert!(config_err(JobSequencing::new(vec![("a", 1.5)], 1)));
	assert!(config_err(JobSequencing::new(vec![("a", f64::NAN)], 1)));
	assert!(config_err(JobSequencing::new(vec![("a", 1.0), ("a", 2.0)], 1)));
	assert!(config_err(JobSequencing::new(Vec::new(), 1)));
	assert!(config_err(JobSequencing::new(vec![("a", 1e19), ("b", 1.0)], 2)));
}

#[test]
fn jobsequencing_large_lengths() {
	let at_limit = JobSequencing::new(vec![("a", MAX_CAPACITY)], 2).unwrap();
	assert_eq!(at_limit.num_binary_variables(), 2 + 53);
	let p = JobSequencing::new(vec![("a", MAX_UNARY_CAPACITY + 1.0)], 2).unwrap();
	assert!(matches!(p.clone().with_log_trick(false), Err(Error::Config(_))));
	assert!(p.with_log_trick(true).is_ok());
	let single = JobSequencing::new(vec![("a", MAX_UNARY_CAPACITY + 1.0)], 1).unwrap();
	assert_eq!(single.with_log_trick(false).unwrap().num_binary_variables(), 1);
}

#[test]
fn jobsequencing_trailing_workers_omitted() {
	let everything = Assignment::from_groups(vec![group(&["job1", "job2", "job3"])]);
	for p in vec![problem(), problem_log()] {
		assert!(p.is_solution_valid(&everything));
		assert_eq!(p.makespan(&everything), 6.0);
		let x = p.encode_solution(&everything).unwrap();
		assert!((p.to_qubo().value(&x).unwrap() - 6.0).abs() < 1e-9);
		let decoded = p.convert_solution(&x).unwrap();
		assert_eq!(decoded[0], everything[0]);
		assert!(decoded[1].is_empty());
	}
}

#[test]
fn jobsequencing_parse_errors() {
	assert!(matches!(
		"not json".parse::<JobSequencing<String>>(),
		Err(Error::Parse(_))
	));
	assert!(matches!(
		r#"{"jobs":[["a",1.0]],"num_workers":0,"log_trick":true}"#.parse::<JobSequencing<String>>(),
		Err(Error::Config(_))
	));
}

#[test]
fn single_job_single_worker() {
	for log_trick in vec![true, false] {
		let p = JobSequencing::new(vec![("only", 5.0)], 1)
			.unwrap()
			.with_log_trick(log_trick)
			.unwrap();
		assert_eq!(p.num_binary_variables(), 1);
		let (e, x) = solve_qubo_bruteforce(p.to_qubo()).unwrap();
		assert_eq!(x, vec![1]);
		assert!((e - 5.0).abs() < 1e-9);
		let solution = p.solve_bruteforce().unwrap();
		assert_eq!(solution[0].len(), 1);
		assert_eq!(p.makespan(&solution), 5.0);
	}
}

#[test]
fn more_workers_than_jobs() {
	let p = JobSequencing::new(vec![("a", 1.0), ("b", 1.0)], 3).unwrap();
	let (e, x) = solve_qubo_bruteforce(p.to_qubo()).unwrap();
	let solution = p.convert_solution(&x).unwrap();
	assert!(p.is_solution_valid(&solution));
	assert!((e - 1.0).abs() < 1e-9);
	assert_eq!(p.makespan(&solution), 1.0);
	assert_eq!(solution.groups().iter().filter(|g| g.is_empty()).count(), 1);
	// 2 jobs on 3 workers: 3 * 2 ways to put them on distinct workers
	assert_eq!(p.solve_bruteforce_all().unwrap().len(), 6);
}

#[test]
fn duplicate_lengths_are_distinct_jobs() {
	let p = JobSequencing::new(vec![(1u32, 2.0), (2u32, 2.0)], 2).unwrap();
	let all = p.solve_bruteforce_all().unwrap();
	assert_eq!(all.len(), 2);
	for solution in all.iter() {
		assert!(p.is_solution_valid(solution));
		assert_eq!(p.makespan(solution), 2.0);
		assert_ne!(solution.worker_of(&1), solution.worker_of(&2));
	}
}
