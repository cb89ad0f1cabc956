//! # Odoo Module Native
//!
//! Code intelligence for Odoo's legacy `odoo.define(...)` modules. Classic
//! modules are presented to the language service as ES modules:
//!
//! 1. **Alias cache**: every script under the addon roots is scanned for
//!    `odoo.define("alias", ...)` declarations and `@odoo-module alias=` pragmas.
//! 2. **Virtual paths**: a file declaring several classic modules exposes
//!    each one at `<file>#<alias><ext>`.
//! 3. **Rewriting on read**: the factory's final `return` becomes
//!    `module.exports=`, so the compiler sees the module's export.
//! 4. **Resolution**: aliases resolve to the declaring file, `@addon/path`
//!    imports to `<addons>/addon/static/src/path`.
//!
//! Everything above is synchronous and host-agnostic; [`native`] and the
//! N-API bridge supply a real filesystem and a JS surface.

mod alias_cache;
mod config;
mod delimited;
mod detect;
mod error;
mod host;
mod memo;
mod native;
mod refactor;
mod resolve;
mod rewrite;
mod scanner;
mod session;
mod terminal_return;
mod virtual_path;
mod watch;

#[cfg(feature = "napi")]
mod bridge;

#[cfg(test)]
mod native_tests;

pub use alias_cache::{AliasCache, CacheEntry, CacheUpdate};
pub use config::{Config, DEFAULT_ADDONS_DIR};
pub use delimited::{delimited, TextSpan};
pub use detect::{detect_modules, mentions_odoo_module, DetectedModules};
pub use error::{BridgeError, RefactorError};
pub use host::{
    DiagnosticsSink, DirectoryWatch, HostFileSystem, ModuleResolver, RefreshCounter,
    ResolutionOutcome, ResolvedModule,
};
pub use memo::{MemoReport, RewriteCache};
pub use native::{NativeFileSystem, NativeWatch};
pub use refactor::{
    applicable_refactors, apply_text_changes, edits_for_refactor, ApplicableRefactor,
    FileTextChanges, RefactorAction, RefactorEdits, TextChange,
};
pub use rewrite::{synthesize, EXPORT_PREFIX};
pub use scanner::{Scanner, SyntaxKind};
pub use session::{CompletionEntry, PluginSession};
pub use terminal_return::find_final_return;
pub use virtual_path::{decode, encode, encode_for, is_virtual, DecodedPath, VIRTUAL_MARKER};
pub use watch::WatchRegistry;

#[cfg(feature = "napi")]
pub use bridge::*;
