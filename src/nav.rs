// Folder navigator: tracks the operator's position in the remote Documents
// tree and builds the per-level menu. Everything here is pure so the menu
// composition and path rules are unit-testable; the actual prompting lives
// in `ui` and the listing call in `main`'s loop.

use crate::api::TreeItem;

pub const PROCESS_LABEL: &str = "***Process Current Directory***";
pub const ASCEND_LABEL: &str = "../";

/// Root-anchored sequence of folder segments. Empty means root.
#[derive(Debug, Clone, Default)]
pub struct PathStack {
    segments: Vec<String>,
}

impl PathStack {
    pub fn new() -> PathStack {
        PathStack::default()
    }

    /// The path as sent to the remote tree-listing call. Root renders as "/".
    pub fn remote_path(&self) -> String {
        if self.segments.is_empty() {
            "/".to_string()
        } else {
            self.segments.join("/")
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn descend(&mut self, folder: &str) {
        self.segments.push(folder.to_string());
    }

    /// Pop one segment. Refused at root; ascend is never offered there, but
    /// the guard keeps the stack root-anchored regardless of the caller.
    pub fn ascend(&mut self) {
        self.segments.pop();
    }
}

/// The server spells root a few different ways depending on how the path was
/// produced; all of them mean "top of the tree".
pub fn is_root_path(path: &str) -> bool {
    matches!(path, "/" | "./" | "" | ".")
}

/// What one level of the tree looks like to the operator: how many documents
/// sit directly in the folder, and which subfolders it has. Recomputed fresh
/// on every navigation step, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderListing {
    pub document_count: usize,
    pub folders: Vec<String>,
}

impl FolderListing {
    /// Split a depth-1 tree level into subfolder names and a document count.
    pub fn from_items(items: &[TreeItem]) -> FolderListing {
        let mut document_count = 0;
        let mut folders = Vec::new();
        for item in items {
            if item.is_folder() {
                folders.push(item.name.clone());
            } else {
                document_count += 1;
            }
        }
        FolderListing {
            document_count,
            folders,
        }
    }

    /// Ids of the documents directly in this level, in enumeration order.
    pub fn document_ids(items: &[TreeItem]) -> Vec<String> {
        items
            .iter()
            .filter(|item| !item.is_folder())
            .map(|item| item.id.clone())
            .collect()
    }
}

/// One row of the navigation menu. `Info` rows are presented but not
/// selectable (separators and the document-count line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Info(String),
    Process,
    Ascend,
    Folder(String),
}

/// The operator's choice for one navigation round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Process,
    Ascend,
    Descend(String),
}

/// Build the menu for one level: separator, process-current, ascend (withheld
/// at root), the document count, a separator, then the subfolders in listing
/// order.
pub fn build_menu(listing: &FolderListing, current_path: &str) -> Vec<MenuEntry> {
    let mut entries = vec![MenuEntry::Info(String::new()), MenuEntry::Process];
    if !is_root_path(current_path) {
        entries.push(MenuEntry::Ascend);
    }
    entries.push(MenuEntry::Info(format!(
        "Number of documents: {}",
        listing.document_count
    )));
    entries.push(MenuEntry::Info(String::new()));
    for folder in &listing.folders {
        entries.push(MenuEntry::Folder(folder.clone()));
    }
    entries
}

/// Apply a selection to the path stack. Processing leaves the path alone;
/// the caller runs the pipeline and comes back to the same level.
pub fn apply_selection(selection: &Selection, path: &mut PathStack) {
    match selection {
        Selection::Process => {}
        Selection::Ascend => path.ascend(),
        Selection::Descend(folder) => path.descend(folder),
    }
}
