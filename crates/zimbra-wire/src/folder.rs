//! Folder hierarchy model.

use serde::{Deserialize, Serialize};

/// A mail folder with its sub-folders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Folder {
    /// Folder id.
    pub id: String,
    /// Folder name.
    #[serde(default)]
    pub name: String,
    /// Absolute path, e.g. `/Inbox/Projects`.
    #[serde(default, rename(deserialize = "absFolderPath"))]
    pub path: String,
    /// Parent folder id.
    #[serde(default, rename(deserialize = "l"))]
    pub parent_id: Option<String>,
    /// Number of messages.
    #[serde(default, rename(deserialize = "n"))]
    pub message_count: Option<u64>,
    /// Number of unread messages.
    #[serde(default, rename(deserialize = "u"))]
    pub unread_count: Option<u64>,
    /// Default item type (`message`, `contact`, `appointment`, ...).
    #[serde(default)]
    pub view: Option<String>,
    /// Sub-folders.
    #[serde(default, rename(deserialize = "folder"))]
    pub children: Vec<Folder>,
}

impl Folder {
    /// Iterates over this folder and all descendants, depth-first.
    pub fn iter(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let folder = stack.pop()?;
            stack.extend(folder.children.iter().rev());
            Some(folder)
        })
    }

    /// Finds a folder by absolute path (case-insensitive, like the server).
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&Self> {
        self.iter().find(|folder| folder.path.eq_ignore_ascii_case(path))
    }
}
