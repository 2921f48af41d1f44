//! Dynamic plugin loader using `libloading` (feature-gated).

#[cfg(feature = "dynamic")]
pub mod dynamic_loader {
    use std::path::Path;

    use tracing::info;

    use crate::error::TemplateError;
    use crate::library::Library;

    /// Type of the registration function exported by dynamic plugins.
    ///
    /// Dynamic plugins must export: `extern "C" fn register(lib: *mut Library)`,
    /// built against the same version of this crate.
    pub type RegisterSymbol = unsafe extern "C" fn(*mut Library);

    /// Exported symbol name.
    pub const REGISTER_SYMBOL: &[u8] = b"register\0";

    /// Loads plugins from shared libraries (.so / .dll / .dylib).
    pub struct DynamicLoader {
        /// Loaded libraries (kept alive for the lifetime of the loader).
        libraries: Vec<libloading::Library>,
    }

    impl DynamicLoader {
        /// Creates a new dynamic loader.
        pub fn new() -> Self {
            Self {
                libraries: Vec::new(),
            }
        }

        /// Loads a shared library and runs its `register` function on `library`.
        ///
        /// # Safety
        /// This function loads arbitrary code from a shared library.
        /// Only load trusted plugins.
        pub unsafe fn register_from_path(
            &mut self,
            path: &Path,
            library: &mut Library,
        ) -> Result<(), TemplateError> {
            let lib = unsafe { libloading::Library::new(path) }.map_err(|e| {
                TemplateError::invalid_plugin_with_source(
                    path.display(),
                    "cannot load shared library",
                    e,
                )
            })?;

            {
                let register: libloading::Symbol<RegisterSymbol> =
                    unsafe { lib.get(REGISTER_SYMBOL) }.map_err(|e| {
                        TemplateError::invalid_plugin_with_source(
                            path.display(),
                            "does not expose `register`",
                            e,
                        )
                    })?;
                unsafe { register(library as *mut Library) };
            }

            info!(path = %path.display(), "Dynamic plugin loaded");

            self.libraries.push(lib);
            Ok(())
        }
    }

    impl Default for DynamicLoader {
        fn default() -> Self {
            Self::new()
        }
    }

    impl std::fmt::Debug for DynamicLoader {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("DynamicLoader")
                .field("loaded_count", &self.libraries.len())
                .finish()
        }
    }
}

/// Stub loader when dynamic feature is not enabled.
#[cfg(not(feature = "dynamic"))]
pub mod dynamic_loader {
    use std::path::Path;

    use crate::error::TemplateError;
    use crate::library::Library;

    /// Stub dynamic loader.
    #[derive(Debug)]
    pub struct DynamicLoader;

    impl DynamicLoader {
        /// Creates a stub loader.
        pub fn new() -> Self {
            Self
        }

        /// Always fails: shared library plugins need the `dynamic` feature.
        ///
        /// # Safety
        /// Mirrors the signature of the real loader; loads nothing.
        pub unsafe fn register_from_path(
            &mut self,
            path: &Path,
            _library: &mut Library,
        ) -> Result<(), TemplateError> {
            Err(TemplateError::invalid_plugin(
                path.display(),
                "shared library plugins need the `dynamic` feature",
            ))
        }
    }

    impl Default for DynamicLoader {
        fn default() -> Self {
            Self::new()
        }
    }
}

pub use dynamic_loader::DynamicLoader;

/// File extensions recognized as shared library plugins.
pub const SHARED_LIBRARY_EXTENSIONS: &[&str] = &["so", "dll", "dylib"];
