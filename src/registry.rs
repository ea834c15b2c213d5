//! Capability surface for bean registration and lookup

use std::sync::Arc;

use crate::error::DiResult;
use crate::injectable::Injectable;

/// The three operations framework code uses to obtain wired beans.
///
/// Requests are keyed by type: `Q` may be a concrete bean type or a trait
/// object type the bean exposed at registration (see
/// [`Injectable::expose`]). A registered type is compatible with a request
/// when the requested key is its own type or one of its exposed interfaces.
pub trait BeanRegistry {
	/// Records `T` as resolvable, installing a fresh empty slot for it.
	///
	/// Re-registration is destructive on purpose: a previously wired
	/// instance under the same key is discarded, and the next request wires
	/// a new one. Never fails.
	fn register<T: Injectable>(&self);

	/// Returns the unique wired instance compatible with `Q`, lazily wiring
	/// it (and its dependencies, recursively) on first request.
	///
	/// Fails with [`DiError::NotFound`](crate::DiError::NotFound) when no
	/// registered type is compatible, and with
	/// [`DiError::Ambiguous`](crate::DiError::Ambiguous) when more than one
	/// is.
	fn get_one<Q>(&self) -> DiResult<Arc<Q>>
	where
		Q: ?Sized + Send + Sync + 'static;

	/// Returns the wired instances of every registered type compatible with
	/// `Q`, in no defined order.
	///
	/// A request nothing matches is not an error: the result is simply
	/// empty. Wiring failures while materializing a match still propagate.
	fn get_many<Q>(&self) -> DiResult<Vec<Arc<Q>>>
	where
		Q: ?Sized + Send + Sync + 'static;
}
