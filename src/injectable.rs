//! Injectable trait: how a bean constructs itself and declares what it needs

use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::BeanContainer;
use crate::error::{ConstructionError, DiResult};

/// Type-erased shared handle to a wired bean.
pub(crate) type BeanHandle = Arc<dyn Any + Send + Sync>;

/// A boxed, type-erased `Arc<Q>` produced by a cast, downcast back to
/// `Arc<Q>` at the request site.
pub(crate) type AnyHandle = Box<dyn Any + Send + Sync>;

/// Converts a concrete bean handle into the handle for one exposed key.
pub(crate) type CastFn = Box<dyn Fn(&BeanHandle) -> Option<AnyHandle> + Send + Sync>;

/// A type the container can construct and wire as a singleton bean.
///
/// The three methods split a bean's lifecycle the way the container needs it:
///
/// 1. [`construct`](Self::construct) is the no-argument construction path.
///    It produces a fresh instance with every dependency field still absent
///    (unless the constructor deliberately pre-populates one).
/// 2. [`wire`](Self::wire) declares the bean's dependencies by resolving them
///    through the container and assigning them into the fresh instance.
///    The default implementation declares no dependencies.
/// 3. [`expose`](Self::expose) declares which interface types the bean
///    satisfies besides its own concrete type. The default implementation
///    exposes nothing extra.
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
/// assert!(car.engine.is_some());
/// # Ok::<(), beanbox::DiError>(())
/// ```
pub trait Injectable: Any + Send + Sync + Sized {
	/// Produces a fresh, unwired instance.
	fn construct() -> Result<Self, ConstructionError>;

	/// Populates the declared dependency fields of a freshly constructed
	/// bean.
	///
	/// Runs after [`construct`](Self::construct) and before the instance is
	/// published into its slot; an error here aborts the chain and leaves the
	/// slot empty. Implementations should resolve each dependency with
	/// [`BeanContainer::wire_field`] (or `get_one` directly) so that a field
	/// the constructor already populated is left untouched.
	fn wire(&mut self, beans: &BeanContainer) -> DiResult<()> {
		let _ = beans;
		Ok(())
	}

	/// Declares which interface types this bean satisfies besides its own.
	fn expose(binder: &mut Binder<Self>) {
		let _ = binder;
	}
}

/// Collects the interface bindings a bean declares in [`Injectable::expose`].
///
/// Each binding makes the bean compatible with requests for one more type
/// key, typically a trait object type.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use beanbox::{BeanContainer, BeanRegistry, Binder, ConstructionError, Injectable};
///
/// trait Vehicle: Send + Sync {
/// 	fn wheels(&self) -> u8;
/// }
///
/// #[derive(Default)]
/// struct Motorcycle;
///
/// impl Vehicle for Motorcycle {
/// 	fn wheels(&self) -> u8 {
/// 		2
/// 	}
/// }
///
/// impl Injectable for Motorcycle {
/// 	fn construct() -> Result<Self, ConstructionError> {
/// 		Ok(Self::default())
/// 	}
///
/// 	fn expose(binder: &mut Binder<Self>) {
/// 		binder.bind::<dyn Vehicle>(|bean| bean);
/// 	}
/// }
///
/// let beans = BeanContainer::new();
/// beans.register::<Motorcycle>();
///
/// let vehicle = beans.get_one::<dyn Vehicle>()?;
/// assert_eq!(vehicle.wheels(), 2);
/// # Ok::<(), beanbox::DiError>(())
/// ```
pub struct Binder<T: Injectable> {
	pub(crate) bindings: Vec<(TypeId, CastFn)>,
	_marker: PhantomData<fn() -> T>,
}

impl<T: Injectable> Binder<T> {
	pub(crate) fn new() -> Self {
		Self {
			bindings: Vec::new(),
			_marker: PhantomData,
		}
	}

	/// Declares that the bean satisfies requests for `I`.
	///
	/// `cast` performs the unsizing coercion from the concrete bean handle to
	/// the interface handle; `|bean| bean` is enough, the coercion is implied
	/// by the target type.
	pub fn bind<I>(&mut self, cast: fn(Arc<T>) -> Arc<I>)
	where
		I: ?Sized + Send + Sync + 'static,
	{
		let cast_fn: CastFn = Box::new(move |handle| {
			let concrete = handle.clone().downcast::<T>().ok()?;
			Some(Box::new(cast(concrete)) as AnyHandle)
		});
		self.bindings.push((TypeId::of::<I>(), cast_fn));
	}
}
