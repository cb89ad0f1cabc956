//! Legacy-Form Detector
//!
//! Regex pre-filter deciding whether a file declares Odoo modules and under
//! which aliases. It never decides where to edit; the token scanner does.

use lazy_static::lazy_static;
use regex::Regex;

/// Pragma marking a file as a native (non-classic) Odoo module.
pub const ODOO_PRAGMA: &str = "@odoo-module";

/// Call that declares a classic module.
pub const ODOO_CLASSIC_DEFINE: &str = "odoo.define";

lazy_static! {
    /// `/** @odoo-module alias=web.core */`
    static ref PRAGMA_ALIAS_RE: Regex =
        Regex::new(r"@odoo-module\s+alias=(?P<module>[^\s*]+)").unwrap();

    /// `odoo.define('web.core', ...)`, tolerant of whitespace around the dot and paren.
    static ref CLASSIC_DEFINE_RE: Regex =
        Regex::new(r#"odoo\s*\.define\s*\(\s*['"](?P<classic>[^'"]+)['"]"#).unwrap();
}

/// Module declarations found in a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectedModules {
    /// A pragma alias; one module for the whole file.
    Pragma(String),
    /// Every `odoo.define` alias, in source order.
    Classic(Vec<String>),
}

impl DetectedModules {
    pub fn aliases(&self) -> Vec<&str> {
        match self {
            DetectedModules::Pragma(alias) => vec![alias.as_str()],
            DetectedModules::Classic(aliases) => aliases.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_classic(&self) -> bool {
        matches!(self, DetectedModules::Classic(_))
    }

    pub fn is_multi_module(&self) -> bool {
        matches!(self, DetectedModules::Classic(aliases) if aliases.len() > 1)
    }
}

/// Detect module declarations. A pragma alias always wins over classic defines.
pub fn detect_modules(contents: &str) -> Option<DetectedModules> {
    if let Some(cap) = PRAGMA_ALIAS_RE.captures(contents) {
        return Some(DetectedModules::Pragma(cap["module"].to_string()));
    }

    let aliases: Vec<String> = CLASSIC_DEFINE_RE
        .captures_iter(contents)
        .map(|cap| cap["classic"].to_string())
        .collect();

    if aliases.is_empty() {
        None
    } else {
        Some(DetectedModules::Classic(aliases))
    }
}

/// One `odoo.define(...)` call located in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefineSite<'a> {
    /// Offset of the `odoo` identifier starting the call.
    pub call_start: usize,
    /// Offset of the quote opening the alias argument.
    pub alias_quote: usize,
    pub alias: &'a str,
}

/// Every classic define call in `contents`, in source order.
pub fn define_sites(contents: &str) -> Vec<DefineSite<'_>> {
    CLASSIC_DEFINE_RE
        .captures_iter(contents)
        .filter_map(|cap| {
            let call = cap.get(0)?;
            let alias = cap.name("classic")?;
            Some(DefineSite {
                call_start: call.start(),
                alias_quote: alias.start() - 1,
                alias: alias.as_str(),
            })
        })
        .collect()
}

/// True when `src` contains any of `needles`.
pub fn search(src: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| src.contains(needle))
}

/// Whether a file mentions either Odoo module convention.
pub fn mentions_odoo_module(src: &str) -> bool {
    search(src, &[ODOO_PRAGMA, ODOO_CLASSIC_DEFINE])
}
