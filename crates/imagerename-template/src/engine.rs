//! Plugin engine — turns plugin locations into libraries.
//!
//! A location is `builtin:<name>` for a plugin linked into the binary, a
//! `*.toml` manifest, or a shared library exposing `register` (feature
//! `dynamic`). Locations are loaded in order; the first failure aborts the
//! load so no partial plugin set is ever merged.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use imagerename_core::config::plugin::{LoadOrder, PluginConfig};
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::{panic_message, TemplateError};
use crate::library::Library;
use crate::loader::{DynamicLoader, SHARED_LIBRARY_EXTENSIONS};
use crate::manifest::load_manifest;
use crate::plugins;

/// Registration entry point of a statically linked plugin.
pub type RegisterFn = fn(&mut Library);

const BUILTIN_SCHEME: &str = "builtin:";

/// Where a plugin comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PluginLocation {
    /// A plugin from the in-process registry.
    Builtin(String),
    /// A manifest or shared library on disk.
    Path(PathBuf),
}

impl PluginLocation {
    /// Parses `builtin:<name>` or a filesystem path.
    pub fn parse(value: &str) -> Self {
        match value.strip_prefix(BUILTIN_SCHEME) {
            Some(name) => Self::Builtin(name.to_string()),
            None => Self::Path(PathBuf::from(value)),
        }
    }
}

impl std::fmt::Display for PluginLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin(name) => write!(f, "{BUILTIN_SCHEME}{name}"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<&str> for PluginLocation {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<PathBuf> for PluginLocation {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

/// A statically linked plugin.
#[derive(Debug, Clone, Copy)]
pub struct StaticPlugin {
    /// Registry name, addressed as `builtin:<name>`.
    pub name: &'static str,
    /// Registration entry point.
    pub register: RegisterFn,
}

/// Loads plugin locations into libraries.
#[derive(Debug)]
pub struct Engine {
    registry: IndexMap<String, RegisterFn>,
    builtins: Vec<PluginLocation>,
    user: Vec<PluginLocation>,
    order: LoadOrder,
    asset_dir: Option<PathBuf>,
    loader: DynamicLoader,
}

impl Engine {
    /// Creates an engine with the builtin plugins registered and enabled.
    pub fn new() -> Self {
        let mut engine = Self::empty();
        for plugin in plugins::BUILTINS {
            engine.register_static(*plugin);
        }
        engine.builtins = plugins::builtin_locations();
        engine
    }

    /// Creates an engine with no plugins at all.
    pub fn empty() -> Self {
        Self {
            registry: IndexMap::new(),
            builtins: Vec::new(),
            user: Vec::new(),
            order: LoadOrder::default(),
            asset_dir: None,
            loader: DynamicLoader::new(),
        }
    }

    /// Creates an engine from the plugin configuration.
    ///
    /// User locations are the configured paths followed by the sorted
    /// contents of the plugin directory.
    pub fn from_config(config: &PluginConfig) -> Result<Self, TemplateError> {
        let mut engine = Self::new()
            .with_load_order(config.load_order)
            .with_asset_dir(&config.asset_dir);
        if !config.builtins {
            engine.builtins.clear();
        }

        engine.user = config.paths.iter().map(|path| PluginLocation::parse(path)).collect();
        if let Some(dir) = &config.directory {
            engine.user.extend(scan_directory(Path::new(dir))?);
        }

        info!(
            builtins = engine.builtins.len(),
            user = engine.user.len(),
            load_order = ?engine.order,
            "Plugin engine configured"
        );
        Ok(engine)
    }

    /// Adds a plugin to the in-process registry without enabling it.
    pub fn register_static(&mut self, plugin: StaticPlugin) {
        debug!(plugin = %plugin.name, "Static plugin registered");
        self.registry.insert(plugin.name.to_string(), plugin.register);
    }

    /// Replaces the enabled builtin locations.
    pub fn with_builtins(mut self, builtins: impl IntoIterator<Item = PluginLocation>) -> Self {
        self.builtins = builtins.into_iter().collect();
        self
    }

    /// Replaces the user plugin locations.
    pub fn with_user_plugins(mut self, user: impl IntoIterator<Item = PluginLocation>) -> Self {
        self.user = user.into_iter().collect();
        self
    }

    /// Sets whether builtins or user plugins are merged first.
    pub fn with_load_order(mut self, order: LoadOrder) -> Self {
        self.order = order;
        self
    }

    /// Sets the base directory for builtin plugin assets.
    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = Some(dir.into());
        self
    }

    /// Names of plugins in the in-process registry.
    pub fn registered(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    /// All enabled locations in load order.
    pub fn locations(&self) -> Vec<PluginLocation> {
        let (first, second) = match self.order {
            LoadOrder::BuiltinsFirst => (&self.builtins, &self.user),
            LoadOrder::UserFirst => (&self.user, &self.builtins),
        };
        first.iter().chain(second.iter()).cloned().collect()
    }

    /// Loads every enabled location.
    pub fn load(&mut self) -> Result<Vec<Library>, TemplateError> {
        let locations = self.locations();
        self.load_locations(&locations)
    }

    /// Loads the given locations in order.
    ///
    /// Fails on the first location that cannot be executed or does not
    /// expose `register`; nothing is returned in that case.
    pub fn load_locations(&mut self, locations: &[PluginLocation]) -> Result<Vec<Library>, TemplateError> {
        let mut libraries = Vec::with_capacity(locations.len());
        for location in locations {
            let library = self.load_one(location)?;
            info!(
                plugin = %location,
                library = %library.name(),
                hotkeys = library.hotkeys().len(),
                panels = library.panels().len(),
                toolbars = library.toolbars().len(),
                "Plugin loaded"
            );
            libraries.push(library);
        }
        Ok(libraries)
    }

    fn load_one(&mut self, location: &PluginLocation) -> Result<Library, TemplateError> {
        match location {
            PluginLocation::Builtin(name) => {
                let register = *self.registry.get(name).ok_or_else(|| {
                    TemplateError::invalid_plugin(location, "no builtin plugin by that name")
                })?;
                let mut library = Library::new(name.as_str());
                if let Some(dir) = &self.asset_dir {
                    library = library.with_base_dir(dir);
                }
                run_register(location, library, |library| register(library))
            }
            PluginLocation::Path(path) => {
                if !path.exists() {
                    return Err(TemplateError::invalid_plugin(location, "file not found"));
                }
                match extension(path).as_deref() {
                    Some("toml") => load_manifest(path),
                    Some(ext) if SHARED_LIBRARY_EXTENSIONS.contains(&ext) => {
                        let library = Library::new(stem(path)).with_base_dir(parent(path));
                        let loader = &mut self.loader;
                        run_register(location, library, |library| {
                            // SAFETY: plugin locations come from the operator's configuration.
                            unsafe { loader.register_from_path(path, library) }
                        })
                    }
                    _ => Err(TemplateError::invalid_plugin(
                        location,
                        "unsupported plugin type (expected .toml or a shared library)",
                    )),
                }
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a plugin's register code, turning a panic into `InvalidPlugin`.
fn run_register<F, R>(location: &PluginLocation, mut library: Library, register: F) -> Result<Library, TemplateError>
where
    F: FnOnce(&mut Library) -> R,
    R: IntoRegisterResult,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| register(&mut library)));
    match outcome {
        Ok(result) => result.into_register_result()?,
        Err(payload) => {
            return Err(TemplateError::invalid_plugin(
                location,
                format!("register panicked: {}", panic_message(payload.as_ref())),
            ));
        }
    }
    Ok(library)
}

/// Return types accepted from register code.
trait IntoRegisterResult {
    fn into_register_result(self) -> Result<(), TemplateError>;
}

impl IntoRegisterResult for () {
    fn into_register_result(self) -> Result<(), TemplateError> {
        Ok(())
    }
}

impl IntoRegisterResult for Result<(), TemplateError> {
    fn into_register_result(self) -> Result<(), TemplateError> {
        self
    }
}

/// Lists plugin files in a directory, sorted by file name.
pub fn scan_directory(dir: &Path) -> Result<Vec<PluginLocation>, TemplateError> {
    let entries = std::fs::read_dir(dir).map_err(|e| TemplateError::Scan {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            extension(path).is_some_and(|ext| ext == "toml" || SHARED_LIBRARY_EXTENSIONS.contains(&ext.as_str()))
        })
        .collect();
    paths.sort();

    debug!(directory = %dir.display(), found = paths.len(), "Plugin directory scanned");
    Ok(paths.into_iter().map(PluginLocation::Path).collect())
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "plugin".to_string())
}

fn parent(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use imagerename_core::AppResult;

    use super::*;
    use crate::host::app::App;

    fn commit(_app: &mut App) -> AppResult<()> {
        Ok(())
    }

    fn register_a(lib: &mut Library) {
        lib.hotkey("<Return>").decorate(commit);
    }

    fn register_panics(_lib: &mut Library) {
        panic!("plugin bug");
    }

    fn engine() -> Engine {
        let mut engine = Engine::empty();
        engine.register_static(StaticPlugin { name: "a", register: register_a });
        engine.register_static(StaticPlugin { name: "panics", register: register_panics });
        engine
    }

    #[test]
    fn test_location_parse_and_display() {
        assert_eq!(PluginLocation::parse("builtin:x"), PluginLocation::Builtin("x".to_string()));
        assert_eq!(
            PluginLocation::parse("plugins/x.toml"),
            PluginLocation::Path(PathBuf::from("plugins/x.toml"))
        );
        assert_eq!(PluginLocation::parse("builtin:x").to_string(), "builtin:x");
    }

    #[test]
    fn test_load_order() {
        let engine = Engine::empty()
            .with_builtins([PluginLocation::parse("builtin:b")])
            .with_user_plugins([PluginLocation::parse("u.toml")]);
        assert_eq!(
            engine.locations(),
            vec![PluginLocation::parse("builtin:b"), PluginLocation::parse("u.toml")]
        );
        let engine = engine.with_load_order(LoadOrder::UserFirst);
        assert_eq!(
            engine.locations(),
            vec![PluginLocation::parse("u.toml"), PluginLocation::parse("builtin:b")]
        );
    }

    #[test]
    fn test_builtin_loads_with_asset_dir() {
        let mut engine = engine().with_asset_dir("/assets");
        let libraries = engine
            .load_locations(&[PluginLocation::parse("builtin:a")])
            .expect("load");
        assert_eq!(libraries.len(), 1);
        assert_eq!(libraries[0].name(), "a");
        assert_eq!(libraries[0].base_dir(), Some(Path::new("/assets")));
    }

    #[test]
    fn test_unknown_builtin_is_invalid_plugin() {
        let err = engine()
            .load_locations(&[PluginLocation::parse("builtin:nope")])
            .unwrap_err();
        assert_eq!(err.location(), Some("builtin:nope"));
    }

    #[test]
    fn test_panicking_register_is_invalid_plugin() {
        let err = engine()
            .load_locations(&[PluginLocation::parse("builtin:a"), PluginLocation::parse("builtin:panics")])
            .unwrap_err();
        assert_eq!(err.location(), Some("builtin:panics"));
        assert!(err.to_string().contains("plugin bug"));
    }

    #[test]
    fn test_missing_and_unsupported_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let text = dir.path().join("notes.txt");
        std::fs::write(&text, "hello").expect("write");

        let mut engine = engine();
        let err = engine
            .load_locations(&[PluginLocation::Path(dir.path().join("gone.toml"))])
            .unwrap_err();
        assert!(err.to_string().contains("file not found"));

        let err = engine.load_locations(&[PluginLocation::Path(text)]).unwrap_err();
        assert!(err.to_string().contains("unsupported plugin type"));
    }

    #[cfg(not(feature = "dynamic"))]
    #[test]
    fn test_shared_library_needs_dynamic_feature() {
        let dir = tempfile::tempdir().expect("tempdir");
        let lib = dir.path().join("libplugin.so");
        std::fs::write(&lib, b"not really a library").expect("write");
        let err = engine().load_locations(&[PluginLocation::Path(lib)]).unwrap_err();
        assert!(err.to_string().contains("dynamic"));
    }

    #[test]
    fn test_scan_directory_sorted_and_filtered() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["b.toml", "a.toml", "readme.md", "c.so"] {
            std::fs::write(dir.path().join(name), "").expect("write");
        }
        let found = scan_directory(dir.path()).expect("scan");
        assert_eq!(
            found,
            vec![
                PluginLocation::Path(dir.path().join("a.toml")),
                PluginLocation::Path(dir.path().join("b.toml")),
                PluginLocation::Path(dir.path().join("c.so")),
            ]
        );
    }

    #[test]
    fn test_scan_missing_directory() {
        let err = scan_directory(Path::new("/nonexistent/plugins")).unwrap_err();
        assert!(matches!(err, TemplateError::Scan { .. }));
    }

    #[test]
    fn test_default_engine_knows_builtins() {
        let engine = Engine::new();
        let registered: Vec<&str> = engine.registered().collect();
        assert_eq!(registered, vec!["default_hotkeys", "default_panels", "default_toolbars"]);
        assert_eq!(engine.locations().len(), 3);
    }
}
