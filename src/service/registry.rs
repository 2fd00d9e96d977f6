// SPDX-License-Identifier: MIT OR Apache-2.0

//! The configuration registry.
//!
//! A [`Registry`] binds one [`Loader`] and holds the root of the most recently loaded
//! tree. Readers share the lock and always observe a complete tree. A reload does its
//! I/O and parsing without holding the lock and only takes exclusive access to swap
//! the root pointer, so readers keep seeing the previous tree until the swap.
//!
//! Most applications use the process-wide instance through [`global`] and the free
//! functions of this module.

use crate::domain::{ConfigError, Result, Value};
use crate::ports::Loader;
use crate::service::path_resolver;
use once_cell::sync::Lazy;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct State {
    loader: Option<Arc<dyn Loader>>,
    root: Option<Arc<Value>>,
}

/// Holds the active loader and the active configuration tree.
///
/// # Examples
///
/// ```rust
/// # #[cfg(feature = "json")]
/// # fn main() -> cfgtree::domain::Result<()> {
/// use cfgtree::adapters::JsonLoader;
/// use cfgtree::service::Registry;
/// use std::io::Write;
///
/// let mut file = tempfile::NamedTempFile::new().unwrap();
/// write!(file, r#"{{"port": 8080, "name": "svc"}}"#).unwrap();
///
/// let registry = Registry::new();
/// registry.use_loader(JsonLoader::new())?;
/// registry.load_configs(file.path())?;
///
/// assert_eq!(registry.lookup(["port"]).unwrap().as_i64()?, 8080);
/// assert!(registry.lookup(["missing"]).is_none());
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "json"))]
/// # fn main() {}
/// ```
#[derive(Default)]
pub struct Registry {
    state: RwLock<State>,
}

impl Registry {
    /// Creates a registry with no loader and no configuration.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Binds `loader`, replacing any previously bound loader.
    ///
    /// See [`Registry::use_shared`].
    pub fn use_loader<L: Loader + 'static>(&self, loader: L) -> Result<()> {
        self.use_shared(Arc::new(loader))
    }

    /// Binds a shared loader, replacing any previously bound loader.
    ///
    /// The loader's registration hook, if any, runs under exclusive access. If it fails
    /// the binding is aborted with [`ConfigError::LoaderRegistrationFailed`] and the
    /// registry keeps its previous loader. The replaced loader is not cleared and the
    /// current configuration stays installed until the next load.
    pub fn use_shared(&self, loader: Arc<dyn Loader>) -> Result<()> {
        let mut state = self.write();

        if let Some(hook) = loader.register_hook() {
            hook.on_register().map_err(|e| {
                tracing::warn!(
                    "Loader '{}' rejected registration: {}",
                    loader.loader_type(),
                    e
                );
                ConfigError::LoaderRegistrationFailed {
                    loader: loader.loader_type().to_string(),
                    source: Box::new(e),
                }
            })?;
        }

        tracing::info!("Using the {} configuration loader", loader.loader_type());
        state.loader = Some(loader);
        Ok(())
    }

    /// Returns the type of the bound loader.
    pub fn loader_type(&self) -> Option<String> {
        self.read()
            .loader
            .as_ref()
            .map(|loader| loader.loader_type().to_string())
    }

    /// Returns `true` once a configuration has been installed.
    pub fn is_loaded(&self) -> bool {
        self.read().root.is_some()
    }

    fn bound_loader(&self) -> Result<Arc<dyn Loader>> {
        self.read().loader.clone().ok_or(ConfigError::LoaderUndefined)
    }

    /// Loads `path` with the bound loader and returns the tree without installing it.
    pub fn load_from_path(&self, path: impl AsRef<Path>) -> Result<Value> {
        let loader = self.bound_loader()?;
        path_resolver::load_from_path(loader.as_ref(), path)
    }

    /// Loads `path` with the bound loader and installs the result as the active tree.
    ///
    /// Loading happens without holding the lock. On failure the previously installed
    /// tree stays active.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LoaderUndefined`] if no loader is bound, or any error of
    /// [`path_resolver::load_from_path`].
    pub fn load_configs(&self, path: impl AsRef<Path>) -> Result<()> {
        let root = Arc::new(self.load_from_path(path.as_ref())?);
        self.write().root = Some(root);
        tracing::info!("Loaded configuration from '{}'", path.as_ref().display());
        Ok(())
    }

    /// Loads the OS-appropriate configuration directory of an application.
    ///
    /// See [`path_resolver::default_config_dir`].
    pub fn load_default_location(&self, app_name: &str, qualifier: &str) -> Result<()> {
        let dir = path_resolver::default_config_dir(app_name, qualifier)?;
        self.load_configs(dir)
    }

    /// Looks up a path in the active tree.
    ///
    /// Returns `None` when nothing is loaded or the path does not resolve.
    pub fn lookup<I>(&self, path: I) -> Option<Value>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.read().root.as_ref()?.lookup(path).cloned()
    }

    /// Returns the active tree, or `None` before the first successful load.
    ///
    /// The returned tree stays valid after later reloads; it is simply no longer
    /// the active one.
    pub fn root(&self) -> Option<Arc<Value>> {
        self.read().root.clone()
    }

    /// Unbinds the loader and drops the active tree.
    ///
    /// The loader's own `clear` runs under exclusive access.
    pub fn clear(&self) {
        let mut state = self.write();
        if let Some(loader) = state.loader.take() {
            loader.clear();
            tracing::info!("Cleared the {} configuration loader", loader.loader_type());
        }
        state.root = None;
    }
}

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// Returns the process-wide registry.
pub fn global() -> &'static Registry {
    &GLOBAL
}

/// Binds `loader` to the process-wide registry.
pub fn use_loader<L: Loader + 'static>(loader: L) -> Result<()> {
    global().use_loader(loader)
}

/// Loads `path` into the process-wide registry.
pub fn load_configs(path: impl AsRef<Path>) -> Result<()> {
    global().load_configs(path)
}

/// Looks up a path in the process-wide registry.
pub fn lookup<I>(path: I) -> Option<Value>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    global().lookup(path)
}

/// Returns the active tree of the process-wide registry.
pub fn root() -> Option<Arc<Value>> {
    global().root()
}

/// Clears the process-wide registry.
pub fn clear() {
    global().clear()
}
