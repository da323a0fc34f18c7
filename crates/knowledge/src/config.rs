//! On-disk layout of the knowledge store.

use docqa_core::config::DATA_DIR_NAME;
use std::path::{Path, PathBuf};

/// Directory holding persisted indexes.
pub fn get_index_dir(workspace: &Path) -> PathBuf {
    workspace.join(DATA_DIR_NAME).join("index")
}

/// Directory of a named index.
pub fn get_index_path(workspace: &Path, index_name: &str) -> PathBuf {
    get_index_dir(workspace).join(index_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_path() {
        let path = get_index_path(Path::new("/work"), "vector_index");
        assert_eq!(path, PathBuf::from("/work/.docqa/index/vector_index"));
    }
}
