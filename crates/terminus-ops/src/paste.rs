//! Paste planning.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use terminus_core::FileSystem;

use crate::conflict::{destination_in, non_conflicting_path};
use crate::{ClipboardSnapshot, OperationItem};

/// How a paste treats a destination that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PastePolicy {
    /// Leave the destination alone and report the item as failed.
    #[default]
    Fail,
    /// Replace the destination.
    Overwrite,
    /// Pick a free sibling name such as "name (1).ext".
    #[serde(rename = "rename")]
    AutoRename,
}

/// Build one [`OperationItem`] per clipboard entry, in clipboard order,
/// each targeting `target_dir/basename(entry)`.
pub fn build_paste_items(
    fs: &dyn FileSystem,
    clipboard: &ClipboardSnapshot,
    target_dir: &Path,
    policy: PastePolicy,
) -> Vec<OperationItem> {
    let mut reserved = HashSet::new();

    clipboard
        .items
        .iter()
        .map(|source| {
            let destination = destination_in(target_dir, source);
            match policy {
                PastePolicy::Fail => OperationItem::new(source, destination),
                PastePolicy::Overwrite => {
                    OperationItem::new(source, destination).with_overwrite(true)
                }
                PastePolicy::AutoRename => {
                    // Pasting an item back into its own folder is a
                    // duplicate, never a no-op.
                    let destination = non_conflicting_path(fs, &destination, &reserved);
                    reserved.insert(destination.clone());
                    OperationItem::new(source, destination)
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClipboardMode;
    use std::path::PathBuf;
    use terminus_core::LocalFs;

    fn snapshot(items: Vec<PathBuf>) -> ClipboardSnapshot {
        ClipboardSnapshot {
            mode: ClipboardMode::Copy,
            items,
            generation: 1,
        }
    }

    #[test]
    fn test_items_follow_clipboard_order() {
        let clipboard = snapshot(vec!["/src/b.txt".into(), "/src/a.txt".into()]);
        let items = build_paste_items(&LocalFs, &clipboard, Path::new("/dst"), PastePolicy::Fail);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].destination, PathBuf::from("/dst/b.txt"));
        assert_eq!(items[1].destination, PathBuf::from("/dst/a.txt"));
        assert!(items.iter().all(|item| !item.overwrite));
    }

    #[test]
    fn test_overwrite_policy_sets_flag() {
        let clipboard = snapshot(vec!["/src/a.txt".into()]);
        let items =
            build_paste_items(&LocalFs, &clipboard, Path::new("/dst"), PastePolicy::Overwrite);
        assert!(items[0].overwrite);
    }

    #[test]
    fn test_auto_rename_reserves_names_within_batch() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), b"x").unwrap();

        let clipboard = snapshot(vec![
            temp.path().join("a.txt"),
            PathBuf::from("/elsewhere/a.txt"),
        ]);
        let items =
            build_paste_items(&LocalFs, &clipboard, temp.path(), PastePolicy::AutoRename);

        assert_eq!(items[0].destination, temp.path().join("a (1).txt"));
        assert_eq!(items[1].destination, temp.path().join("a (2).txt"));
    }

    #[test]
    fn test_policy_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: PastePolicy,
        }
        let parsed: Wrapper = toml::from_str("policy = \"rename\"").unwrap();
        assert_eq!(parsed.policy, PastePolicy::AutoRename);
    }
}
