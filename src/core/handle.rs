//! Atomically swappable reference to the current context.

use super::context::Context;
use crate::error::Result;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Process-wide handle to "the current context".
///
/// Reads are lock-free and always see a fully built [`Context`]. A context is
/// never changed in place: [`rebuild`](Self::rebuild) builds a brand-new one
/// and swaps it in atomically. Rebuilds are serialized, so two rebuilds never
/// interleave; readers holding the previous `Arc<Context>` keep a consistent
/// snapshot until they drop it.
///
/// # Examples
///
/// ```rust
/// use condarc_context::prelude::*;
///
/// let handle = ContextHandle::new(Context::builder().without_env().build());
/// assert!(!handle.get().get_bool("quiet").unwrap());
///
/// // e.g. after plugins registered additional defaults
/// handle
///     .rebuild(|_previous| {
///         Ok(Context::builder()
///             .without_env()
///             .with_args(ParsedArgs::new().set("quiet", true))
///             .build())
///     })
///     .unwrap();
/// assert!(handle.get().get_bool("quiet").unwrap());
/// ```
#[derive(Clone)]
pub struct ContextHandle {
    /// The current context, wrapped in ArcSwap for atomic replacement
    current: Arc<ArcSwap<Context>>,
    /// Serializes writers
    rebuild_lock: Arc<Mutex<()>>,
}

impl ContextHandle {
    /// Create a handle holding `initial`.
    pub fn new(initial: Context) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(initial)),
            rebuild_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Get a reference-counted handle to the current context.
    ///
    /// This is lock-free; readers never block writers or other readers.
    pub fn get(&self) -> Arc<Context> {
        self.current.load_full()
    }

    /// Replace the current context, returning the previous one.
    pub fn replace(&self, context: Context) -> Arc<Context> {
        let _guard = self.rebuild_lock.lock();
        let previous = self.current.swap(Arc::new(context));
        tracing::debug!("replaced configuration context");
        previous
    }

    /// Build a new context from the current one and swap it in.
    ///
    /// `build` runs while holding the rebuild lock, so concurrent rebuilds
    /// run one after another. If `build` fails the current context is kept.
    ///
    /// # Errors
    ///
    /// Returns whatever error `build` returned.
    pub fn rebuild<F>(&self, build: F) -> Result<()>
    where
        F: FnOnce(&Context) -> Result<Context>,
    {
        let _guard = self.rebuild_lock.lock();
        let current = self.current.load_full();

        let next = build(&current).inspect_err(|err| {
            tracing::warn!(error = %err, "context rebuild failed, keeping current context");
        })?;

        self.current.store(Arc::new(next));
        tracing::debug!("rebuilt configuration context");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SystemDefaults;
    use crate::error::ContextError;
    use crate::sources::ParsedArgs;
    use std::thread;

    fn context(quiet: bool) -> Context {
        Context::builder()
            .without_env()
            .with_args(ParsedArgs::new().set("quiet", quiet))
            .with_system_defaults(SystemDefaults::new("linux", "x86_64", "base"))
            .build()
    }

    #[test]
    fn test_create_and_read() {
        let handle = ContextHandle::new(context(true));
        assert!(handle.get().get_bool("quiet").unwrap());
    }

    #[test]
    fn test_replace_returns_previous() {
        let handle = ContextHandle::new(context(true));
        let previous = handle.replace(context(false));
        assert!(previous.get_bool("quiet").unwrap());
        assert!(!handle.get().get_bool("quiet").unwrap());
    }

    #[test]
    fn test_failed_rebuild_keeps_current() {
        let handle = ContextHandle::new(context(true));
        let result = handle.rebuild(|_| {
            Err(ContextError::KeyNotFound {
                key: "solver".to_string(),
                consulted: Vec::new(),
            })
        });
        assert!(result.is_err());
        assert!(handle.get().get_bool("quiet").unwrap());
    }

    #[test]
    fn test_clones_share_state() {
        let handle = ContextHandle::new(context(true));
        let other = handle.clone();
        other.replace(context(false));
        assert!(!handle.get().get_bool("quiet").unwrap());
    }

    #[test]
    fn test_concurrent_readers_see_whole_contexts() {
        let handle = ContextHandle::new(context(true));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let handle = handle.clone();
                thread::spawn(move || {
                    for _ in 0..200 {
                        let ctx = handle.get();
                        // Both reads come from the same snapshot.
                        assert_eq!(
                            ctx.get_bool("quiet").unwrap(),
                            ctx.get_bool("quiet").unwrap()
                        );
                    }
                })
            })
            .collect();

        for i in 0..20 {
            handle.rebuild(|_| Ok(context(i % 2 == 0))).unwrap();
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
