//! Inline keyboard actions
//!
//! Callback data is decoded into an [`Action`] once, at the Telegram boundary.

use sha2::{Digest, Sha256};

/// Callback data for the file listing button
pub const LIST_CALLBACK: &str = "LIST";
/// Prefix for a selection that carries the file name verbatim
pub const FILE_NAME_PREFIX: &str = "GETFILE::";
/// Prefix for a selection that carries a file name digest
pub const FILE_DIGEST_PREFIX: &str = "GETHASH::";
/// Telegram rejects callback data longer than this many bytes
pub const CALLBACK_DATA_LIMIT: usize = 64;

const DIGEST_HEX_LEN: usize = 16;

/// Reference to a document carried by a selection button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRef {
    /// Exact file name
    Name(String),
    /// Truncated SHA-256 of a file name too long for callback data
    Digest(String),
}

impl FileRef {
    /// Builds the shortest reference that fits into callback data
    #[must_use]
    pub fn for_file(file_name: &str) -> Self {
        if FILE_NAME_PREFIX.len() + file_name.len() <= CALLBACK_DATA_LIMIT {
            Self::Name(file_name.to_string())
        } else {
            Self::Digest(name_digest(file_name))
        }
    }

    /// Returns true if this reference points at `file_name`
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            Self::Name(name) => name == file_name,
            Self::Digest(digest) => *digest == name_digest(file_name),
        }
    }
}

/// Action requested through an inline keyboard button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Show the list of available files
    ListFiles,
    /// Deliver the referenced file
    SelectFile(FileRef),
}

impl Action {
    /// Encodes the action as Telegram callback data
    ///
    /// # Examples
    ///
    /// ```
    /// use resource_bot::bot::actions::{Action, FileRef};
    ///
    /// let action = Action::SelectFile(FileRef::for_file("guide.pdf"));
    /// assert_eq!(action.encode(), "GETFILE::guide.pdf");
    /// assert_eq!(Action::decode(&action.encode()), Some(action));
    /// ```
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::ListFiles => LIST_CALLBACK.to_string(),
            Self::SelectFile(FileRef::Name(name)) => format!("{FILE_NAME_PREFIX}{name}"),
            Self::SelectFile(FileRef::Digest(digest)) => format!("{FILE_DIGEST_PREFIX}{digest}"),
        }
    }

    /// Decodes Telegram callback data; returns `None` for unknown payloads
    #[must_use]
    pub fn decode(data: &str) -> Option<Self> {
        if data == LIST_CALLBACK {
            return Some(Self::ListFiles);
        }
        if let Some(name) = data.strip_prefix(FILE_NAME_PREFIX) {
            if name.is_empty() {
                return None;
            }
            return Some(Self::SelectFile(FileRef::Name(name.to_string())));
        }
        if let Some(digest) = data.strip_prefix(FILE_DIGEST_PREFIX) {
            let valid = digest.len() == DIGEST_HEX_LEN
                && digest.chars().all(|c| c.is_ascii_hexdigit());
            if !valid {
                return None;
            }
            return Some(Self::SelectFile(FileRef::Digest(digest.to_lowercase())));
        }
        None
    }
}

fn name_digest(file_name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(file_name.as_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(DIGEST_HEX_LEN);
    hex
}
