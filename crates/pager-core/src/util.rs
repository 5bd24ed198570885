//! Utility macros shared across the engine.

/// Log failures for best-effort operations that are allowed to fail.
///
/// Used for persistence and other fire-and-forget writes: the failure is
/// recorded at warn level and otherwise ignored.
///
/// # Example
///
/// ```ignore
/// best_effort!(store.set(&key, &json), "persisting pager state");
/// ```
macro_rules! best_effort {
    ($expr:expr, $context:literal) => {
        if let Err(e) = $expr {
            tracing::warn!(error = %e, concat!("Best-effort failed: ", $context));
        }
    };
}
pub(crate) use best_effort;
