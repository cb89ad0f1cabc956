//! N-API surface. The JS plugin shim constructs an [`OdooModuleSession`] per
//! project and forwards host calls into it; rewriting and path helpers are
//! also exported as free functions.

use crate::config::Config;
use crate::detect::detect_modules;
use crate::host::{ModuleResolver, RefreshCounter, ResolutionOutcome};
use crate::native::NativeFileSystem;
use crate::rewrite::synthesize;
use crate::session::PluginSession;
use crate::virtual_path::{decode, encode};
use napi_derive::napi;
use tracing_subscriber::EnvFilter;

/// Default filter when neither the caller nor `RUST_LOG` sets one.
const DEFAULT_LOG_FILTER: &str = "odoo=info";

// ═══════════════════════════════════════════════════════════════════════════════
// FREE FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Install the stderr log subscriber. Returns false when one is already installed.
#[napi]
pub fn init_logging_native(filter: Option<String>) -> bool {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[napi]
pub fn synthesize_module_native(file: String, alias: String) -> String {
    synthesize(&file, &alias)
}

#[napi]
pub fn encode_virtual_path_native(physical_path: String, alias: String, ext: String) -> String {
    encode(&physical_path, &alias, &ext)
}

#[napi]
pub fn decode_virtual_path_native(path: String) -> serde_json::Value {
    let decoded = decode(&path);
    serde_json::json!({
        "physicalPath": decoded.physical_path,
        "alias": decoded.alias,
    })
}

#[napi]
pub fn detect_module_aliases_native(contents: String) -> Vec<String> {
    detect_modules(&contents)
        .map(|detected| detected.aliases().into_iter().map(str::to_string).collect())
        .unwrap_or_default()
}

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════════════

/// The JS side performs its own fallback resolution when this returns nothing.
struct NoFallback;

impl ModuleResolver for NoFallback {
    type Options = ();

    fn resolve_module_name(&self, _name: &str, _containing_file: &str, _options: &()) -> ResolutionOutcome {
        ResolutionOutcome::default()
    }
}

fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[napi]
pub struct OdooModuleSession {
    inner: PluginSession<NativeFileSystem, RefreshCounter>,
}

#[napi]
impl OdooModuleSession {
    #[napi(constructor)]
    pub fn new(project_root: String, config_json: Option<String>) -> napi::Result<Self> {
        let config = Config::from_json(config_json.as_deref().unwrap_or_default()).map_err(to_napi_error)?;
        let fs = NativeFileSystem::new(&project_root).map_err(to_napi_error)?;
        let root = fs.project_root().to_string_lossy().to_string();
        Ok(Self {
            inner: PluginSession::new(fs, RefreshCounter::default(), &root, config),
        })
    }

    #[napi]
    pub fn read_file(&mut self, path: String) -> Option<String> {
        self.inner.read_file(&path)
    }

    #[napi]
    pub fn file_exists(&self, path: String) -> bool {
        self.inner.file_exists(&path)
    }

    /// Alias and scoped-import resolution only; `null` defers to the host.
    #[napi]
    pub fn resolve(&self, name: String, containing_file: String) -> napi::Result<serde_json::Value> {
        let outcome = self
            .inner
            .resolve_module_name(&NoFallback, &name, &containing_file, &());
        serde_json::to_value(outcome).map_err(to_napi_error)
    }

    /// Process queued file events. Returns how many diagnostics refreshes the
    /// host owes since the last call.
    #[napi]
    pub fn pump_events(&mut self) -> u32 {
        self.inner.pump_events();
        self.inner.diagnostics_mut().take()
    }

    #[napi]
    pub fn update_configuration(&mut self, config_json: String) -> napi::Result<u32> {
        let config = Config::from_json(&config_json).map_err(to_napi_error)?;
        self.inner.update_configuration(config);
        Ok(self.inner.diagnostics_mut().take())
    }

    #[napi]
    pub fn aliases(&self) -> napi::Result<serde_json::Value> {
        let entries: Vec<_> = self.inner.cache().iter().collect();
        serde_json::to_value(entries).map_err(to_napi_error)
    }

    #[napi]
    pub fn completions(&self, include_import_statements: bool) -> napi::Result<serde_json::Value> {
        serde_json::to_value(self.inner.import_completions(include_import_statements)).map_err(to_napi_error)
    }

    #[napi]
    pub fn refactors(&self, file_name: String, start: u32, end: Option<u32>) -> napi::Result<serde_json::Value> {
        let refactors = self
            .inner
            .applicable_refactors(&file_name, start as usize, end.map(|e| e as usize));
        serde_json::to_value(refactors).map_err(to_napi_error)
    }

    #[napi]
    pub fn refactor_edits(
        &self,
        file_name: String,
        start: u32,
        end: Option<u32>,
        action: String,
    ) -> napi::Result<serde_json::Value> {
        let edits = self
            .inner
            .edits_for_refactor(&file_name, start as usize, end.map(|e| e as usize), &action)
            .map_err(to_napi_error)?;
        serde_json::to_value(edits).map_err(to_napi_error)
    }

    #[napi]
    pub fn close(&mut self) {
        self.inner.shutdown();
    }
}
