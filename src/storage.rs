// SPDX-License-Identifier: GPL-3.0-only

//! Photo directory management

use crate::constants::DEFAULT_SAVE_FOLDER;
use std::path::PathBuf;

/// Default directory for saved photos.
///
/// `~/Pictures/<folder>`, falling back to the home directory and finally
/// the working directory when the XDG lookup fails.
pub fn default_photo_dir(folder: &str) -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(folder)
}

/// Default photo directory using the built-in folder name
pub fn photo_dir() -> PathBuf {
    default_photo_dir(DEFAULT_SAVE_FOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_dir_ends_with_save_folder() {
        assert!(photo_dir().ends_with(DEFAULT_SAVE_FOLDER));
    }
}
