//! # beanbox
//!
//! Lazy singleton bean container with trait-declared dependency wiring.
//!
//! Framework code registers candidate bean types up front and later obtains
//! fully-wired service instances by requesting a type, without hand-written
//! bootstrap code. The container keeps one slot per registered type,
//! constructs a bean on the first request that needs it, wires its declared
//! dependencies recursively, and hands out the same instance ever after.
//!
//! ## Features
//!
//! - **Type-keyed registry**: register concrete types, resolve by concrete
//!   type or by an exposed trait object type
//! - **Lazy wiring**: nothing is constructed until first requested;
//!   dependencies are wired before their dependents
//! - **Single-writer slots**: concurrent first-time requests for one type
//!   converge on exactly one construction
//! - **Fail-fast cycle detection**: mutually dependent beans are rejected
//!   with a rendered `A -> B -> A` path instead of exhausting the stack
//! - **Destructive re-registration**: registering a type again discards its
//!   wired instance and starts over
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use beanbox::{BeanContainer, BeanRegistry, ConstructionError, DiResult, Injectable};
//!
//! #[derive(Default)]
//! struct Engine;
//!
//! impl Injectable for Engine {
//! 	fn construct() -> Result<Self, ConstructionError> {
//! 		Ok(Self::default())
//! 	}
//! }
//!
//! struct Car {
//! 	engine: Option<Arc<Engine>>,
//! }
//!
//! impl Injectable for Car {
//! 	fn construct() -> Result<Self, ConstructionError> {
//! 		Ok(Self { engine: None })
//! 	}
//!
//! 	fn wire(&mut self, beans: &BeanContainer) -> DiResult<()> {
//! 		beans.wire_field(&mut self.engine)
//! 	}
//! }
//!
//! let beans = BeanContainer::new();
//! beans.register::<Engine>();
//! beans.register::<Car>();
//!
//! let car = beans.get_one::<Car>()?;
//! let engine = beans.get_one::<Engine>()?;
//! assert!(Arc::ptr_eq(car.engine.as_ref().unwrap(), &engine));
//! # Ok::<(), beanbox::DiError>(())
//! ```

mod container;
mod cycle_detection;
mod error;
mod injectable;
mod registry;

pub use container::BeanContainer;
pub use cycle_detection::CycleError;
pub use error::{ConstructionError, DiError, DiResult, PoisonedCell};
pub use injectable::{Binder, Injectable};
pub use registry::BeanRegistry;
