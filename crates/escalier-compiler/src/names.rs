//! Path and namespace naming conventions.
//!
//! A file's default namespace comes from its directory path relative to
//! the package root: `math/vector.esc` lands in namespace `math`, root
//! files land in the root namespace. Output module names mirror the
//! namespace hierarchy: the root namespace becomes the package's default
//! module `index`; nested namespaces become directory-style names.

use std::path::{Component, Path};

/// The dotted namespace a source file's declarations default into.
pub fn path_to_namespace(path: &str) -> String {
    let path = Path::new(path);
    let mut parts: Vec<String> = Vec::new();
    if let Some(parent) = path.parent() {
        for component in parent.components() {
            if let Component::Normal(segment) = component {
                if let Some(segment) = segment.to_str() {
                    parts.push(segment.to_string());
                }
            }
        }
    }
    parts.join(".")
}

/// The output module name for a namespace path.
pub fn module_name(namespace_path: &str) -> String {
    if namespace_path.is_empty() {
        "index".to_string()
    } else {
        namespace_path.replace('.', "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_files_have_empty_namespace() {
        assert_eq!(path_to_namespace("main.esc"), "");
        assert_eq!(path_to_namespace("utils.esc"), "");
    }

    #[test]
    fn directories_become_dotted_namespaces() {
        assert_eq!(path_to_namespace("math/vector.esc"), "math");
        assert_eq!(path_to_namespace("a/b/c/d.esc"), "a.b.c");
    }

    #[test]
    fn module_names_mirror_the_hierarchy() {
        assert_eq!(module_name(""), "index");
        assert_eq!(module_name("math"), "math");
        assert_eq!(module_name("a.b.c"), "a/b/c");
    }
}
