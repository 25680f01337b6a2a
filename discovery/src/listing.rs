//! Listing snapshots and the caller-owned listing cache.
//!
//! A [`ListingSnapshot`] is an immutable picture of the installed modules
//! and, optionally, each module's commands. [`ListingCache`] holds the
//! latest snapshot for a display layer: a refresh builds a whole new
//! snapshot and swaps it in; nothing is patched in place.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use psform_core::{Command, Module};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::introspector::Introspector;
use crate::runner::CancelToken;

/// Options for [`ListingSnapshot::capture`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureOptions {
    /// Also list every module's commands.
    pub with_commands: bool,
    /// Parallel command-listing jobs; `None` picks a default.
    pub jobs: Option<usize>,
}

/// Immutable module/command listing taken at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSnapshot {
    pub captured_at: DateTime<Utc>,
    pub modules: Vec<Module>,
    /// Commands per module name. Only filled when commands were requested.
    #[serde(default)]
    pub commands: BTreeMap<String, Vec<Command>>,
    /// Modules whose command listing failed, with the error message.
    #[serde(default)]
    pub failures: BTreeMap<String, String>,
}

impl ListingSnapshot {
    /// Lists modules and, if requested, their commands in parallel.
    ///
    /// A failing command listing is recorded in [`Self::failures`] instead
    /// of failing the snapshot.
    ///
    /// # Errors
    ///
    /// Module listing failures.
    pub fn capture(
        introspector: &Introspector,
        options: CaptureOptions,
        cancel: &CancelToken,
    ) -> Result<Self> {
        let captured_at = Utc::now();
        let modules = introspector.list_modules_with_cancel(cancel)?;

        let mut commands = BTreeMap::new();
        let mut failures = BTreeMap::new();
        if options.with_commands && !modules.is_empty() {
            let jobs = options
                .jobs
                .filter(|jobs| *jobs > 0)
                .unwrap_or_else(|| default_parallel_jobs(modules.len()));
            let list_one = |module: &Module| {
                let result = introspector.list_commands_with_cancel(&module.name, cancel);
                (module.name.clone(), result)
            };
            let results: Vec<_> = match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
                Ok(pool) => pool.install(|| modules.par_iter().map(list_one).collect()),
                Err(e) => {
                    warn!(error = %e, "Failed to build thread pool, listing commands sequentially");
                    modules.iter().map(list_one).collect()
                }
            };
            for (name, result) in results {
                match result {
                    Ok(list) => {
                        commands.insert(name, list);
                    }
                    Err(e) => {
                        warn!(module = %name, error = %e, "Command listing failed");
                        failures.insert(name, e.to_string());
                    }
                }
            }
        }

        info!(
            modules = modules.len(),
            listed = commands.len(),
            failed = failures.len(),
            "Captured listing snapshot"
        );
        Ok(Self {
            captured_at,
            modules,
            commands,
            failures,
        })
    }

    /// Commands of `module`, if they were listed.
    pub fn commands_of(&self, module: &str) -> Option<&[Command]> {
        self.commands.get(module).map(Vec::as_slice)
    }
}

/// Parallelism for process-spawning work: bounded so that a large module
/// list does not launch one interpreter per core all at once.
fn default_parallel_jobs(items: usize) -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    cpus.min(4).min(items).max(1)
}

/// Caller-owned holder of the latest [`ListingSnapshot`].
///
/// # Examples
///
/// ```
/// use psform_discovery::{CancelToken, Introspector, ListingCache};
/// use psform_discovery::runner::ScriptedRunner;
///
/// let runner = ScriptedRunner::new("pwsh").respond("Name Version\n---- -------\nPester 5.5.0\n");
/// let introspector = Introspector::new(Box::new(runner));
///
/// let mut cache = ListingCache::new();
/// assert!(cache.current().is_none());
/// let snapshot = cache
///     .refresh(&introspector, Default::default(), &CancelToken::new())
///     .unwrap();
/// assert_eq!(snapshot.modules.len(), 1);
/// cache.invalidate();
/// assert!(cache.current().is_none());
/// ```
#[derive(Debug, Default)]
pub struct ListingCache {
    current: Option<Arc<ListingSnapshot>>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest snapshot, unless invalidated.
    pub fn current(&self) -> Option<Arc<ListingSnapshot>> {
        self.current.clone()
    }

    /// Captures a new snapshot and makes it current.
    ///
    /// On failure, including cancellation through `cancel`, the previous
    /// snapshot stays current.
    ///
    /// # Errors
    ///
    /// Module listing failures.
    pub fn refresh(
        &mut self,
        introspector: &Introspector,
        options: CaptureOptions,
        cancel: &CancelToken,
    ) -> Result<Arc<ListingSnapshot>> {
        let snapshot = Arc::new(ListingSnapshot::capture(introspector, options, cancel)?);
        self.current = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Drops the current snapshot.
    pub fn invalidate(&mut self) {
        self.current = None;
    }
}
