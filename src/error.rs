//! Error types for bean registration and wiring

use std::error::Error;

use crate::cycle_detection::CycleError;

/// Result alias used across the container API.
pub type DiResult<T> = Result<T, DiError>;

/// Failure raised by a bean's no-argument construction path.
///
/// The container never inspects this beyond attaching it as the source of
/// [`DiError::ConstructionFailed`] for the failing type.
///
/// # Examples
///
/// ```
/// use beanbox::ConstructionError;
///
/// let err = ConstructionError::new("connection pool exhausted");
/// assert_eq!(err.to_string(), "connection pool exhausted");
/// ```
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct ConstructionError {
	reason: String,
	#[source]
	source: Option<Box<dyn Error + Send + Sync>>,
}

impl ConstructionError {
	/// Creates a construction failure from a plain message.
	pub fn new(reason: impl Into<String>) -> Self {
		Self {
			reason: reason.into(),
			source: None,
		}
	}

	/// Creates a construction failure with an underlying cause attached.
	pub fn with_source(
		reason: impl Into<String>,
		source: impl Error + Send + Sync + 'static,
	) -> Self {
		Self {
			reason: reason.into(),
			source: Some(Box::new(source)),
		}
	}
}

/// Errors surfaced by [`BeanRegistry`](crate::BeanRegistry) operations.
///
/// Every error aborts the operation that triggered it and propagates to the
/// immediate caller; there is no retry and no partial result. A bean whose
/// wiring fails is never published, so its slot stays empty rather than
/// holding a half-wired instance.
#[derive(Debug, thiserror::Error)]
pub enum DiError {
	/// No registered type is compatible with a single-result request.
	#[error("no bean is registered for type `{type_name}`")]
	NotFound {
		/// The requested type.
		type_name: &'static str,
	},

	/// More than one registered type is compatible with a single-result
	/// request.
	#[error("{count} beans satisfy type `{type_name}`; a single-result request requires exactly one")]
	Ambiguous {
		/// The requested type.
		type_name: &'static str,
		/// How many registered types matched.
		count: usize,
	},

	/// The instantiation collaborator could not produce an instance.
	#[error("failed to construct bean `{type_name}`")]
	ConstructionFailed {
		/// The bean type whose construction failed.
		type_name: &'static str,
		#[source]
		source: ConstructionError,
	},

	/// A declared dependency field could not be written.
	#[error("dependency field `{field}` is not accessible")]
	FieldNotAccessible {
		/// Name of the field that rejected the write.
		field: &'static str,
		#[source]
		source: Box<dyn Error + Send + Sync>,
	},

	/// A resolution chain re-entered a type it is already wiring, or ran
	/// deeper than the wiring depth limit.
	#[error(transparent)]
	CircularDependency(#[from] CycleError),
}

/// Cause attached to [`DiError::FieldNotAccessible`] when a dependency cell's
/// lock was poisoned by a panicking writer.
#[derive(Debug, thiserror::Error)]
#[error("the dependency cell's lock is poisoned")]
pub struct PoisonedCell;
