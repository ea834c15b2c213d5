//! Concurrent resolution behavior
//!
//! Slots hold their lock for the whole check-construct-publish sequence, so
//! first-time resolution racing across threads must converge on exactly one
//! construction and exactly one observable instance.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use beanbox::{BeanContainer, BeanRegistry, ConstructionError, DiResult, Injectable};
use rstest::rstest;
use serial_test::serial;

static SLOW_CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

// Construction is slow on purpose, to widen the race window.
struct SlowService;

impl Injectable for SlowService {
	fn construct() -> Result<Self, ConstructionError> {
		SLOW_CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
		thread::sleep(Duration::from_millis(20));
		Ok(Self)
	}
}

#[rstest]
#[case(2)]
#[case(8)]
#[serial] // cases share the construction counter
fn test_racing_first_resolution_constructs_once(#[case] threads: usize) {
	let beans = Arc::new(BeanContainer::new());
	beans.register::<SlowService>();

	let constructed_before = SLOW_CONSTRUCTIONS.load(Ordering::SeqCst);
	let barrier = Arc::new(Barrier::new(threads));

	let handles: Vec<_> = (0..threads)
		.map(|_| {
			let beans = Arc::clone(&beans);
			let barrier = Arc::clone(&barrier);
			thread::spawn(move || {
				barrier.wait();
				beans.get_one::<SlowService>().unwrap()
			})
		})
		.collect();

	let instances: Vec<Arc<SlowService>> =
		handles.into_iter().map(|h| h.join().unwrap()).collect();

	// Exactly one final slot value: every thread got the same instance.
	for instance in &instances[1..] {
		assert!(Arc::ptr_eq(&instances[0], instance));
	}
	// And exactly one construction, not one winner among several.
	assert_eq!(SLOW_CONSTRUCTIONS.load(Ordering::SeqCst) - constructed_before, 1);
}

static ROTOR_CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);
static DRONE_CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

struct Rotor;

impl Injectable for Rotor {
	fn construct() -> Result<Self, ConstructionError> {
		ROTOR_CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
		thread::sleep(Duration::from_millis(10));
		Ok(Self)
	}
}

struct Drone {
	rotor: Option<Arc<Rotor>>,
}

impl Injectable for Drone {
	fn construct() -> Result<Self, ConstructionError> {
		DRONE_CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
		Ok(Self { rotor: None })
	}

	fn wire(&mut self, beans: &BeanContainer) -> DiResult<()> {
		beans.wire_field(&mut self.rotor)
	}
}

#[test]
fn test_racing_through_a_dependency_graph() {
	let beans = Arc::new(BeanContainer::new());
	beans.register::<Rotor>();
	beans.register::<Drone>();

	let threads = 8;
	let barrier = Arc::new(Barrier::new(threads));

	// Half the threads resolve the dependent, half the dependency.
	let handles: Vec<_> = (0..threads)
		.map(|i| {
			let beans = Arc::clone(&beans);
			let barrier = Arc::clone(&barrier);
			thread::spawn(move || {
				barrier.wait();
				if i % 2 == 0 {
					let drone = beans.get_one::<Drone>().unwrap();
					Arc::clone(drone.rotor.as_ref().unwrap())
				} else {
					beans.get_one::<Rotor>().unwrap()
				}
			})
		})
		.collect();

	let rotors: Vec<Arc<Rotor>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

	// Every path through the graph observed the same rotor.
	for rotor in &rotors[1..] {
		assert!(Arc::ptr_eq(&rotors[0], rotor));
	}
	assert_eq!(ROTOR_CONSTRUCTIONS.load(Ordering::SeqCst), 1);
	assert_eq!(DRONE_CONSTRUCTIONS.load(Ordering::SeqCst), 1);
}

#[derive(Default)]
struct Beacon;

impl Injectable for Beacon {
	fn construct() -> Result<Self, ConstructionError> {
		Ok(Self::default())
	}
}

#[test]
fn test_registration_is_safe_during_lookups() {
	let beans = Arc::new(BeanContainer::new());
	beans.register::<Beacon>();

	let barrier = Arc::new(Barrier::new(4));
	let handles: Vec<_> = (0..4)
		.map(|i| {
			let beans = Arc::clone(&beans);
			let barrier = Arc::clone(&barrier);
			thread::spawn(move || {
				barrier.wait();
				for _ in 0..50 {
					if i == 0 {
						// Destructive re-registration, concurrent with reads.
						beans.register::<Beacon>();
					} else {
						// May observe different instances across
						// re-registrations, but must never fail.
						let _ = beans.get_one::<Beacon>().unwrap();
					}
				}
			})
		})
		.collect();

	for handle in handles {
		handle.join().unwrap();
	}
	assert_eq!(beans.registered_len(), 1);
}
