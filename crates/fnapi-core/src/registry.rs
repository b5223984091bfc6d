use std::cell::RefCell;
use std::sync::LazyLock;
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::ReentrantMutex;

use crate::error::RegistryError;
use crate::metadata::HandlerMetadata;

/// How long a snapshot waits for the registry lock before giving up.
pub const SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(5);

/// Anything the compiler can read handler metadata from.
pub trait MetadataSource {
    /// A point-in-time copy of every entry, in registration order.
    fn snapshot(&self) -> Result<IndexMap<String, HandlerMetadata>, RegistryError>;
}

/// Concurrency-safe store of handler metadata keyed by handler name.
///
/// Every mutation and every copy-out runs under one re-entrant lock, so
/// registration may happen from several initialization threads at once.
#[derive(Default)]
pub struct Registry {
    entries: ReentrantMutex<RefCell<IndexMap<String, HandlerMetadata>>>,
}

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, for hosts that cannot thread an explicit
    /// registry through to their composition point.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Insert or replace the entry for `name`.
    ///
    /// When the current entry under `name` belongs to a different handler
    /// (different `handler_id`), it is first preserved under its own
    /// `handler_id`, unless that key is already taken. Re-registering the same
    /// handler simply overwrites it.
    pub fn register(&self, name: &str, metadata: HandlerMetadata) {
        let guard = self.entries.lock();
        let mut entries = guard.borrow_mut();

        if let Some(existing) = entries.get(name) {
            if existing.handler_id != metadata.handler_id
                && !entries.contains_key(&existing.handler_id)
            {
                let preserved = existing.clone();
                log::debug!(
                    "handler '{}' is replaced by '{}'; keeping the old entry under '{}'",
                    name,
                    metadata.handler_id,
                    preserved.handler_id
                );
                entries.insert(preserved.handler_id.clone(), preserved);
            }
        }

        entries.insert(name.to_string(), metadata);
        log::debug!("registered OpenAPI metadata for handler '{name}'");
    }

    /// A defensive copy of every entry.
    pub fn get_all(&self) -> IndexMap<String, HandlerMetadata> {
        let guard = self.entries.lock();
        let entries = guard.borrow();
        entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetadataSource for Registry {
    fn snapshot(&self) -> Result<IndexMap<String, HandlerMetadata>, RegistryError> {
        let guard = self
            .entries
            .try_lock_for(SNAPSHOT_TIMEOUT)
            .ok_or(RegistryError::LockTimeout(SNAPSHOT_TIMEOUT))?;
        let entries = guard.borrow();
        Ok(entries.clone())
    }
}

impl<T: MetadataSource + ?Sized> MetadataSource for &T {
    fn snapshot(&self) -> Result<IndexMap<String, HandlerMetadata>, RegistryError> {
        (**self).snapshot()
    }
}

impl<T: MetadataSource + ?Sized> MetadataSource for std::sync::Arc<T> {
    fn snapshot(&self) -> Result<IndexMap<String, HandlerMetadata>, RegistryError> {
        (**self).snapshot()
    }
}
