use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use log::debug;

use crate::error::Error;
use crate::styles::StyleCatalog;

/// Shared owner of the current [`StyleCatalog`].
///
/// A render pass takes a [`snapshot`](StyleHandle::snapshot) and keeps using
/// it even if the catalog is reloaded meanwhile. Reloads parse outside the
/// lock and swap the whole catalog in one write.
#[derive(Clone, Debug, Default)]
pub struct StyleHandle {
    current: Arc<RwLock<Arc<StyleCatalog>>>,
}

impl StyleHandle {
    pub fn new(catalog: StyleCatalog) -> Self {
        StyleHandle {
            current: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    pub fn bundled() -> Self {
        Self::new(StyleCatalog::bundled())
    }

    pub fn snapshot(&self) -> Arc<StyleCatalog> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn replace(&self, catalog: StyleCatalog) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(catalog);
    }

    /// Parses `source` and installs it. The current catalog stays in place
    /// when parsing fails.
    pub fn reload(&self, source: &str) -> Result<(), Error> {
        let mut catalog = StyleCatalog::new();
        catalog.reload(source)?;
        debug!("Installing reloaded catalog with {} styles", catalog.len());
        self.replace(catalog);
        Ok(())
    }

    pub fn reload_from_path(&self, path: &Path) -> Result<(), Error> {
        let mut catalog = StyleCatalog::new();
        catalog.reload_from_path(path)?;
        self.replace(catalog);
        Ok(())
    }
}
