//! Project discovery: the pages root, the configuration module, and the
//! pattern lists handed to every per-file transform.

use std::io;
use std::path::{Path, PathBuf};
use std::{env, fs};

use walkdir::WalkDir;

use crate::config::{extract_config_patterns, ConfigPatterns};

/// Basename of the project configuration module, any supported extension.
pub const CONFIG_BASENAME: &str = "next.load";

const POSSIBLE_PAGE_DIRS: [&str; 2] = ["app", "src/app"];

const DEFAULT_CONFIG_SOURCE: &str = "export default {
  example: {
    pages: ['/example', new RegExp('^/')],
    load: async () => 'Modify the next.load.(js|ts) file to change the pages data',
  }
}";

/// Project root, overridable through the NEXT_LOAD_PATH environment
/// variable (relative paths resolve against the working directory).
pub fn project_root() -> PathBuf {
    let base = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match env::var("NEXT_LOAD_PATH") {
        Ok(path) if !path.is_empty() => base.join(path),
        _ => base,
    }
}

/// First existing candidate among `app` and `src/app`.
pub fn find_pages_dir(root: &Path) -> Option<PathBuf> {
    POSSIBLE_PAGE_DIRS
        .iter()
        .map(|dir| root.join(dir))
        .find(|path| path.is_dir())
}

/// Locate `next.load.<ext>` directly under the root.
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    let prefix = format!("{}.", CONFIG_BASENAME);
    WalkDir::new(root)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .map(|name| name.starts_with(&prefix))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
}

/// Return the existing configuration module, scaffolding an example as
/// `next.load.js` when none exists yet.
pub fn create_config_file_if_not_exists(root: &Path) -> io::Result<PathBuf> {
    if let Some(existing) = find_config_file(root) {
        return Ok(existing);
    }
    let path = root.join(format!("{}.js", CONFIG_BASENAME));
    fs::write(&path, DEFAULT_CONFIG_SOURCE)?;
    Ok(path)
}

/// Read the configuration module and flatten it into the two pattern lists.
/// A missing or unreadable config degrades to empty lists.
pub fn load_pattern_lists(root: &Path) -> ConfigPatterns {
    let Some(config_path) = find_config_file(root) else {
        return ConfigPatterns::default();
    };
    match fs::read_to_string(&config_path) {
        Ok(source) => extract_config_patterns(&source),
        Err(_) => ConfigPatterns::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!(
            "next-load-discovery-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_find_pages_dir_prefers_app() {
        let root = scratch_dir("pages");
        fs::create_dir_all(root.join("app")).unwrap();
        fs::create_dir_all(root.join("src/app")).unwrap();
        assert_eq!(find_pages_dir(&root), Some(root.join("app")));

        fs::remove_dir_all(root.join("app")).unwrap();
        assert_eq!(find_pages_dir(&root), Some(root.join("src/app")));
    }

    #[test]
    fn test_find_pages_dir_absent() {
        let root = scratch_dir("nopages");
        assert_eq!(find_pages_dir(&root), None);
    }

    #[test]
    fn test_config_scaffold_and_rediscovery() {
        let root = scratch_dir("scaffold");
        assert!(find_config_file(&root).is_none());

        let created = create_config_file_if_not_exists(&root).unwrap();
        assert_eq!(created, root.join("next.load.js"));
        let body = fs::read_to_string(&created).unwrap();
        assert!(body.contains("pages: ['/example', new RegExp('^/')]"));

        // A second call returns the existing file instead of rewriting it.
        fs::write(&created, "export default {}").unwrap();
        let again = create_config_file_if_not_exists(&root).unwrap();
        assert_eq!(again, created);
        assert_eq!(fs::read_to_string(&created).unwrap(), "export default {}");
    }

    #[test]
    fn test_existing_ts_config_wins_over_scaffold() {
        let root = scratch_dir("tsconfig");
        fs::write(root.join("next.load.ts"), "export default {}").unwrap();
        let found = create_config_file_if_not_exists(&root).unwrap();
        assert_eq!(found, root.join("next.load.ts"));
    }

    #[test]
    fn test_load_pattern_lists_from_config() {
        let root = scratch_dir("lists");
        fs::write(
            root.join("next.load.js"),
            "export default { user: { pages: ['/about'], load: () => 1, hydrate: (u) => u } };",
        )
        .unwrap();
        let lists = load_pattern_lists(&root);
        assert_eq!(lists.loaders.len(), 1);
        assert_eq!(lists.hydraters.len(), 1);
    }

    #[test]
    fn test_load_pattern_lists_missing_config_is_empty() {
        let root = scratch_dir("empty");
        assert!(load_pattern_lists(&root).is_empty());
    }
}
