//! Singleton bean container: type-keyed registry plus lazy recursive wiring

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, trace};

use crate::cycle_detection;
use crate::error::{DiError, DiResult, PoisonedCell};
use crate::injectable::{AnyHandle, BeanHandle, Binder, CastFn, Injectable};
use crate::registry::BeanRegistry;

/// Everything the container keeps per registered bean type.
struct Registration {
	/// `TypeId` of the concrete bean type; also the cycle detection key.
	key: TypeId,
	type_name: &'static str,
	/// The single-instance holder. `None` until first successful wiring.
	slot: Mutex<Option<BeanHandle>>,
	/// Monomorphized construct-and-wire entry point for the concrete type.
	wire: fn(&BeanContainer) -> DiResult<BeanHandle>,
	/// Keys this registration satisfies: the concrete type plus every
	/// interface declared in [`Injectable::expose`].
	exposes: HashMap<TypeId, CastFn>,
}

impl Registration {
	fn of<T: Injectable>() -> Self {
		let mut binder = Binder::<T>::new();
		T::expose(&mut binder);

		let mut exposes: HashMap<TypeId, CastFn> = HashMap::new();
		// A bean always satisfies requests for its own concrete type.
		exposes.insert(
			TypeId::of::<T>(),
			Box::new(|handle: &BeanHandle| {
				let concrete = handle.clone().downcast::<T>().ok()?;
				Some(Box::new(concrete) as AnyHandle)
			}),
		);
		for (key, cast) in binder.bindings {
			exposes.insert(key, cast);
		}

		Self {
			key: TypeId::of::<T>(),
			type_name: type_name::<T>(),
			slot: Mutex::new(None),
			wire: wire_bean::<T>,
			exposes,
		}
	}
}

/// Construct-then-wire, in that order. Publication is the caller's job and
/// happens only after this returns `Ok`, so a wiring failure never leaves a
/// half-wired instance observable.
fn wire_bean<T: Injectable>(beans: &BeanContainer) -> DiResult<BeanHandle> {
	let mut bean = T::construct().map_err(|source| DiError::ConstructionFailed {
		type_name: type_name::<T>(),
		source,
	})?;
	bean.wire(beans)?;
	Ok(Arc::new(bean) as BeanHandle)
}

/// Lazy singleton container implementing [`BeanRegistry`].
///
/// Holds one slot per registered type. A bean is constructed on the first
/// request that needs it, its declared dependencies are wired recursively
/// (reusing already-wired slots), and the finished instance is published
/// into its slot for every later request.
///
/// The container is safe to share across threads. Each slot is guarded by
/// its own lock for the whole check-construct-publish sequence, so
/// concurrent first-time requests for the same type converge on a single
/// construction: one caller wires, the rest block briefly and then observe
/// the published instance. Slot locks are acquired in dependency order,
/// which cannot deadlock for acyclic graphs; cyclic graphs are rejected
/// before any slot lock is taken.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use beanbox::{BeanContainer, BeanRegistry, ConstructionError, DiResult, Injectable};
///
/// #[derive(Default)]
/// struct Engine;
///
/// impl Injectable for Engine {
/// 	fn construct() -> Result<Self, ConstructionError> {
/// 		Ok(Self::default())
/// 	}
/// }
///
/// struct Car {
/// 	engine: Option<Arc<Engine>>,
/// }
///
/// impl Injectable for Car {
/// 	fn construct() -> Result<Self, ConstructionError> {
/// 		Ok(Self { engine: None })
/// 	}
///
/// 	fn wire(&mut self, beans: &BeanContainer) -> DiResult<()> {
/// 		beans.wire_field(&mut self.engine)
/// 	}
/// }
///
/// let beans = BeanContainer::new();
/// beans.register::<Engine>();
/// beans.register::<Car>();
///
/// let car = beans.get_one::<Car>()?;
/// let engine = beans.get_one::<Engine>()?;
///
/// // The car holds the same engine instance the container hands out.
/// assert!(Arc::ptr_eq(car.engine.as_ref().unwrap(), &engine));
/// # Ok::<(), beanbox::DiError>(())
/// ```
pub struct BeanContainer {
	registrations: RwLock<HashMap<TypeId, Arc<Registration>>>,
}

impl BeanContainer {
	/// Creates an empty container.
	pub fn new() -> Self {
		Self {
			registrations: RwLock::new(HashMap::new()),
		}
	}

	/// Returns `true` when at least one registered type satisfies `Q`,
	/// without wiring anything.
	pub fn contains<Q>(&self) -> bool
	where
		Q: ?Sized + 'static,
	{
		let key = TypeId::of::<Q>();
		let map = self
			.registrations
			.read()
			.unwrap_or_else(PoisonError::into_inner);
		map.values().any(|reg| reg.exposes.contains_key(&key))
	}

	/// Number of registered bean types.
	pub fn registered_len(&self) -> usize {
		self.registrations
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.len()
	}

	/// Returns `true` when no bean type has been registered.
	pub fn is_empty(&self) -> bool {
		self.registered_len() == 0
	}

	/// Resolves a dependency into `field`, unless the caller already
	/// populated it.
	///
	/// This is the building block for [`Injectable::wire`] implementations:
	/// a field the constructor pre-populated is left untouched, an absent
	/// one is filled through [`get_one`](BeanRegistry::get_one) with the
	/// same `NotFound`/`Ambiguous` semantics.
	pub fn wire_field<Q>(&self, field: &mut Option<Arc<Q>>) -> DiResult<()>
	where
		Q: ?Sized + Send + Sync + 'static,
	{
		if field.is_none() {
			*field = Some(self.get_one::<Q>()?);
		}
		Ok(())
	}

	/// Resolves a dependency into a shared interior cell.
	///
	/// Mirrors [`wire_field`](Self::wire_field) for beans that keep a
	/// dependency behind a `Mutex`, e.g. when the handle has already been
	/// shared before wiring runs. A cell whose lock was poisoned by a
	/// panicking writer fails with
	/// [`DiError::FieldNotAccessible`], carrying the field name and cause.
	pub fn wire_shared_field<Q>(
		&self,
		field: &'static str,
		cell: &Mutex<Option<Arc<Q>>>,
	) -> DiResult<()>
	where
		Q: ?Sized + Send + Sync + 'static,
	{
		let mut slot = cell.lock().map_err(|_| DiError::FieldNotAccessible {
			field,
			source: Box::new(PoisonedCell),
		})?;
		if slot.is_none() {
			*slot = Some(self.get_one::<Q>()?);
		}
		Ok(())
	}

	/// Snapshot of every registration compatible with `key`.
	///
	/// Collected under the read lock and resolved afterwards, so wiring can
	/// re-enter the map for recursive lookups.
	fn compatible(&self, key: TypeId) -> Vec<Arc<Registration>> {
		let map = self
			.registrations
			.read()
			.unwrap_or_else(PoisonError::into_inner);
		map.values()
			.filter(|reg| reg.exposes.contains_key(&key))
			.cloned()
			.collect()
	}

	/// Lazy wiring for one registration.
	///
	/// Cycle check first, then the slot lock for the whole
	/// check-construct-publish sequence. A wiring failure propagates with
	/// the slot still empty.
	fn resolve(&self, reg: &Registration) -> DiResult<BeanHandle> {
		let _guard = cycle_detection::begin_resolution(reg.key, reg.type_name)?;

		let mut slot = reg.slot.lock().unwrap_or_else(PoisonError::into_inner);
		if let Some(handle) = slot.as_ref() {
			trace!(bean = reg.type_name, "slot already wired, reusing instance");
			return Ok(Arc::clone(handle));
		}

		let handle = (reg.wire)(self)?;
		*slot = Some(Arc::clone(&handle));
		debug!(bean = reg.type_name, "bean wired and published");
		Ok(handle)
	}

	/// Resolves `reg` and casts the published handle to the requested key.
	fn materialize<Q>(&self, reg: &Registration) -> DiResult<Arc<Q>>
	where
		Q: ?Sized + Send + Sync + 'static,
	{
		let handle = self.resolve(reg)?;
		reg.exposes
			.get(&TypeId::of::<Q>())
			.and_then(|cast| cast(&handle))
			.and_then(|boxed| boxed.downcast::<Arc<Q>>().ok())
			.map(|arc| *arc)
			.ok_or(DiError::NotFound {
				type_name: type_name::<Q>(),
			})
	}
}

impl Default for BeanContainer {
	fn default() -> Self {
		Self::new()
	}
}

impl BeanRegistry for BeanContainer {
	fn register<T: Injectable>(&self) {
		let reg = Arc::new(Registration::of::<T>());
		let mut map = self
			.registrations
			.write()
			.unwrap_or_else(PoisonError::into_inner);
		// Destructive on purpose: replacing the registration drops any
		// previously wired instance under this key.
		map.insert(TypeId::of::<T>(), reg);
		debug!(bean = type_name::<T>(), "bean type registered");
	}

	fn get_one<Q>(&self) -> DiResult<Arc<Q>>
	where
		Q: ?Sized + Send + Sync + 'static,
	{
		let matches = self.compatible(TypeId::of::<Q>());
		trace!(
			requested = type_name::<Q>(),
			candidates = matches.len(),
			"compatibility scan"
		);
		match matches.as_slice() {
			[] => Err(DiError::NotFound {
				type_name: type_name::<Q>(),
			}),
			[reg] => self.materialize::<Q>(reg),
			many => Err(DiError::Ambiguous {
				type_name: type_name::<Q>(),
				count: many.len(),
			}),
		}
	}

	fn get_many<Q>(&self) -> DiResult<Vec<Arc<Q>>>
	where
		Q: ?Sized + Send + Sync + 'static,
	{
		let matches = self.compatible(TypeId::of::<Q>());
		let mut wired = Vec::with_capacity(matches.len());
		for reg in &matches {
			wired.push(self.materialize::<Q>(reg)?);
		}
		Ok(wired)
	}
}
