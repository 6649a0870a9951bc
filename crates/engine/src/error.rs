use crate::pair::TypePair;

/// Recoverable mapping failures.
///
/// Configuration bugs (double declarations, type-mismatched erased calls)
/// panic instead; see the crate docs.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
	/// No type map was declared for the requested pair.
	#[error("no type map declared for {0}")]
	MissingTypeMap(TypePair),
	/// No pipeline strategy accepted the request.
	#[error("no strategy accepted the collection request for {0}")]
	NoApplicableStrategy(TypePair),
}
