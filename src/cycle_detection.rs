//! Thread-local circular dependency detection
//!
//! Tracks the chain of bean types currently being wired on this thread.
//! Re-entry into a type that is already on the chain is a cycle and fails
//! fast instead of recursing until the call stack is exhausted. A depth
//! limit backs the set up for pathological non-cyclic chains.
//!
//! The state is thread-local: one resolution chain runs on one thread from
//! entry to publication, so the in-progress set never needs to cross
//! threads.

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashSet;

/// Maximum wiring depth for a single resolution chain.
const MAX_RESOLUTION_DEPTH: usize = 100;

struct CycleState {
	/// Types currently being wired on this thread (O(1) re-entry check).
	in_progress: HashSet<TypeId>,
	/// Wiring order, kept for rendering the cycle path in error messages.
	path: Vec<(TypeId, &'static str)>,
}

impl CycleState {
	fn new() -> Self {
		Self {
			in_progress: HashSet::new(),
			path: Vec::new(),
		}
	}
}

thread_local! {
	static CYCLE_STATE: RefCell<CycleState> = RefCell::new(CycleState::new());
}

/// Records the start of wiring for `type_id`.
///
/// Returns a RAII guard that removes the entry once wiring for the type
/// completes (or fails). Fails with [`CycleError::CircularDependency`] when
/// `type_id` is already on this thread's resolution chain, and with
/// [`CycleError::MaxDepthExceeded`] when the chain has grown past
/// `MAX_RESOLUTION_DEPTH`.
pub(crate) fn begin_resolution(
	type_id: TypeId,
	type_name: &'static str,
) -> Result<ResolutionGuard, CycleError> {
	CYCLE_STATE.with(|state| {
		let mut s = state.borrow_mut();
		if s.in_progress.contains(&type_id) {
			return Err(CycleError::CircularDependency {
				type_name: type_name.to_string(),
				path: render_cycle_path(&s.path, type_id, type_name),
			});
		}
		if s.path.len() >= MAX_RESOLUTION_DEPTH {
			return Err(CycleError::MaxDepthExceeded(s.path.len() + 1));
		}
		s.in_progress.insert(type_id);
		s.path.push((type_id, type_name));
		Ok(ResolutionGuard { type_id })
	})
}

/// RAII guard: removes the tracked type from the in-progress chain on drop.
#[derive(Debug)]
pub(crate) struct ResolutionGuard {
	type_id: TypeId,
}

impl Drop for ResolutionGuard {
	fn drop(&mut self) {
		// try_with: the thread-local may already be torn down during thread exit.
		let _ = CYCLE_STATE.try_with(|state| {
			let mut s = state.borrow_mut();
			s.in_progress.remove(&self.type_id);
			if let Some(pos) = s.path.iter().rposition(|(id, _)| *id == self.type_id) {
				s.path.remove(pos);
			}
		});
	}
}

/// Renders the cycle as `A -> B -> A`, starting from the first occurrence of
/// the re-entered type on the chain.
fn render_cycle_path(
	path: &[(TypeId, &'static str)],
	type_id: TypeId,
	type_name: &'static str,
) -> String {
	if let Some(start) = path.iter().position(|(id, _)| *id == type_id) {
		let chain: Vec<&str> = path[start..].iter().map(|(_, name)| *name).collect();
		format!("{} -> {}", chain.join(" -> "), type_name)
	} else {
		type_name.to_string()
	}
}

/// Cycle detection failures, converted into
/// [`DiError`](crate::DiError) at the container boundary.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
	/// A resolution chain re-entered a type it is already wiring.
	#[error("circular dependency detected while wiring `{type_name}`\n  path: {path}")]
	CircularDependency {
		/// The type that was re-entered.
		type_name: String,
		/// The cycle, rendered as `A -> B -> A`.
		path: String,
	},

	/// The resolution chain grew past the wiring depth limit.
	#[error("maximum wiring depth exceeded ({0}); the dependency chain is extremely deep or cyclic")]
	MaxDepthExceeded(usize),
}
