//! Registry trait for implementations selectable by name.

/// Ties a configuration name to a factory function.
///
/// Each pluggable implementation module exposes a `Registry` struct
/// implementing this trait, so the set of available implementations can be
/// listed without hand-maintained string tables.
pub trait ImplementationRegistry {
	/// The key used in configuration, e.g. `"http"` for
	/// `[client.implementations.http]`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	fn factory() -> Self::Factory;
}
