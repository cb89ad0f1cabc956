//! Virtual Path Codec
//!
//! One physical file may declare several classic modules. Each of them gets
//! its own path, `<physical>#<alias><ext>`, so the language service can open
//! them independently. The marker is searched from the right: aliases may
//! contain it, physical paths must not (a directory layout constraint that is
//! not checked).

use std::path::Path;

/// Reserved character separating the physical path from the alias.
pub const VIRTUAL_MARKER: char = '#';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPath<'a> {
    pub physical_path: &'a str,
    pub alias: Option<&'a str>,
}

/// Node-style `extname`: the last `.suffix` of the final path component,
/// empty for dotfiles and extensionless names.
pub fn extname(path: &str) -> &str {
    let base_start = path.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let base = &path[base_start..];
    match base.rfind('.') {
        Some(0) | None => "",
        Some(dot) => &base[dot..],
    }
}

/// Virtual path for `alias` inside `physical_path`.
pub fn encode(physical_path: &str, alias: &str, ext: &str) -> String {
    format!("{physical_path}{VIRTUAL_MARKER}{alias}{ext}")
}

/// Virtual path using the physical file's own extension.
pub fn encode_for(physical_path: &str, alias: &str) -> String {
    encode(physical_path, alias, extname(physical_path))
}

/// Split a path into its physical file and, for virtual paths, the alias.
///
/// The trailing extension is stripped using the physical file's extension
/// when the tail ends with it, which keeps dotted aliases such as
/// `web.core` intact. Otherwise the tail's own extension is stripped.
pub fn decode(path: &str) -> DecodedPath<'_> {
    let Some(marker) = path.rfind(VIRTUAL_MARKER) else {
        return DecodedPath {
            physical_path: path,
            alias: None,
        };
    };

    let physical_path = &path[..marker];
    let tail = &path[marker + VIRTUAL_MARKER.len_utf8()..];
    let physical_ext = extname(physical_path);
    let alias = match tail.strip_suffix(physical_ext) {
        Some(alias) if !alias.is_empty() => alias,
        _ => &tail[..tail.len() - extname(tail).len()],
    };

    DecodedPath {
        physical_path,
        alias: Some(alias),
    }
}

pub fn is_virtual(path: &str) -> bool {
    path.contains(VIRTUAL_MARKER)
}

/// Whether `path` may be used as a physical path without being mistaken
/// for a virtual one.
pub fn is_addressable_physical(path: &Path) -> bool {
    !path.to_string_lossy().contains(VIRTUAL_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extname() {
        assert_eq!(extname("/a/b/c.js"), ".js");
        assert_eq!(extname("/a/b.d/c"), "");
        assert_eq!(extname("/a/.hidden"), "");
        assert_eq!(extname("x.tar.gz"), ".gz");
    }

    #[test]
    fn test_plain_path_is_not_virtual() {
        let decoded = decode("/addons/web/static/src/core.js");
        assert_eq!(decoded.physical_path, "/addons/web/static/src/core.js");
        assert_eq!(decoded.alias, None);
        assert!(!is_virtual("/addons/web/static/src/core.js"));
    }

    #[test]
    fn test_round_trip_with_dotted_alias() {
        for physical in ["/addons/web/static/src/boot.js", "/srv/mod.ts", "/srv/noext"] {
            for alias in ["web.core", "a", "web.Widget.extra"] {
                let encoded = encode_for(physical, alias);
                let decoded = decode(&encoded);
                assert_eq!(decoded.physical_path, physical);
                assert_eq!(decoded.alias, Some(alias));
            }
        }
    }

    #[test]
    fn test_round_trip_with_foreign_extension() {
        let encoded = encode("/srv/boot.js", "core", ".ts");
        assert_eq!(encoded, "/srv/boot.js#core.ts");
        let decoded = decode(&encoded);
        assert_eq!(decoded.physical_path, "/srv/boot.js");
        assert_eq!(decoded.alias, Some("core"));
    }

    #[test]
    fn test_last_marker_is_authoritative() {
        let decoded = decode("/srv/boot.js#a#b.js");
        assert_eq!(decoded.physical_path, "/srv/boot.js#a");
        assert_eq!(decoded.alias, Some("b"));
    }

    #[test]
    fn test_physical_path_validation() {
        assert!(is_addressable_physical(Path::new("/srv/boot.js")));
        assert!(!is_addressable_physical(Path::new("/srv/#tmp/boot.js")));
    }
}
