//! Rewrite Engine
//!
//! Turns a classic `odoo.define` module into something the language service
//! reads as a CommonJS module by swapping the terminal `return` keyword for
//! an export assignment. Only the keyword changes; the exported expression
//! and everything around it stay byte-identical.

use crate::detect::define_sites;
use crate::terminal_return::{find_final_return, RETURN_KEYWORD_LEN};

/// Text substituted for the terminal `return` keyword.
pub const EXPORT_PREFIX: &str = "module.exports=";

/// Marker whose repetition means the buffer hosts several modules.
const NAMESPACE_MARKER: &str = "odoo";

const ARROW: &str = "=>";

/// Synthesize module text for `alias` out of `file`.
///
/// Falls back to rewriting the last arrow when no terminal return exists
/// (expression-bodied factories). Text that cannot be rewritten is returned
/// unchanged.
pub fn synthesize(file: &str, alias: &str) -> String {
    if file.find(NAMESPACE_MARKER) != file.rfind(NAMESPACE_MARKER) {
        return virtual_module(file, alias);
    }
    rewrite_module(file)
}

fn rewrite_module(file: &str) -> String {
    match find_final_return(file) {
        Some(pos) => splice_export(file, pos),
        None => replace_last(file, ARROW, "=>module.exports="),
    }
}

fn splice_export(file: &str, pos: usize) -> String {
    let mut out = String::with_capacity(file.len() + EXPORT_PREFIX.len());
    out.push_str(&file[..pos]);
    out.push_str(EXPORT_PREFIX);
    out.push_str(&file[pos + RETURN_KEYWORD_LEN..]);
    out
}

/// Rewrite only the module declared as `alias` in a multi-module buffer.
///
/// The module's region runs from the quote of its alias argument up to the
/// next define call, so neither a later module's return nor its arrow is
/// touched.
fn virtual_module(file: &str, alias: &str) -> String {
    let Some((start, end)) = module_region(file, alias) else {
        return file.to_string();
    };

    let rewritten = rewrite_module(&file[start..end]);

    let mut out = String::with_capacity(file.len() + EXPORT_PREFIX.len());
    out.push_str(&file[..start]);
    out.push_str(&rewritten);
    out.push_str(&file[end..]);
    out
}

/// Byte range of the module declared as `alias`. Falls back to the earliest
/// quoted occurrence of the alias, running to the end of the buffer, when no
/// define call names it.
fn module_region(file: &str, alias: &str) -> Option<(usize, usize)> {
    let sites = define_sites(file);
    if let Some(i) = sites.iter().position(|site| site.alias == alias) {
        let end = sites.get(i + 1).map_or(file.len(), |next| next.call_start);
        return Some((sites[i].alias_quote, end));
    }
    quoted_alias_offset(file, alias).map(|start| (start, file.len()))
}

/// Offset of the opening quote of the earliest quoted occurrence of `alias`.
fn quoted_alias_offset(file: &str, alias: &str) -> Option<usize> {
    if alias.is_empty() {
        return None;
    }
    ['\'', '"', '`']
        .iter()
        .filter_map(|quote| file.find(&format!("{quote}{alias}{quote}")))
        .min()
}

/// Replace the last occurrence of `needle` in `src`.
pub fn replace_last(src: &str, needle: &str, replacement: &str) -> String {
    match src.rfind(needle) {
        Some(idx) => {
            let mut out = String::with_capacity(src.len() + replacement.len());
            out.push_str(&src[..idx]);
            out.push_str(replacement);
            out.push_str(&src[idx + needle.len()..]);
            out
        }
        None => src.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_last_only_touches_final_occurrence() {
        assert_eq!(replace_last("a=>b=>c", "=>", "->"), "a=>b->c");
        assert_eq!(replace_last("abc", "=>", "->"), "abc");
    }

    #[test]
    fn test_quoted_alias_prefers_earliest_quote() {
        let file = "x; odoo.define(\"web.a\", f); odoo.define('web.a', g);";
        assert_eq!(quoted_alias_offset(file, "web.a"), Some(15));
        assert_eq!(quoted_alias_offset(file, "web"), None);
        assert_eq!(quoted_alias_offset(file, ""), None);
    }

    #[test]
    fn test_module_is_found_by_its_define_not_an_earlier_require() {
        let file = "odoo.define('a', function (require) { var b = require('b'); if (x) { y(); } return b; });\nodoo.define('b', function (require) { return 2; });";
        assert_eq!(
            synthesize(file, "b"),
            "odoo.define('a', function (require) { var b = require('b'); if (x) { y(); } return b; });\nodoo.define('b', function (require) { module.exports= 2; });"
        );
    }

    #[test]
    fn test_arrow_fallback_stays_inside_its_module() {
        let file = "odoo.define('a', function (require) { init(); });\nodoo.define('b', (require) => 2);";
        assert_eq!(synthesize(file, "a"), file);
        assert_eq!(
            synthesize(file, "b"),
            "odoo.define('a', function (require) { init(); });\nodoo.define('b', (require) =>module.exports= 2);"
        );
    }

    #[test]
    fn test_unicode_body_is_not_rewritten_at_an_inner_arrow() {
        let file = "odoo.define('a', function (require) { var caf\u{e9} = 1; var f = () => 1; return {f: f}; });";
        assert_eq!(
            synthesize(file, "a"),
            "odoo.define('a', function (require) { var caf\u{e9} = 1; var f = () => 1; module.exports= {f: f}; });"
        );
    }
}
