//! File picking and persistence collaborators.
//!
//! The application never touches the file system directly; it hands bytes to
//! a [`FileService`]. A dismissed dialog is a normal outcome
//! ([`FileOutcome::Cancelled`]), not an error.

use std::future::Future;
use std::io;

/// Result of a file operation the user may abort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome<T> {
    Completed(T),
    /// The user dismissed the dialog.
    Cancelled,
}

impl<T> FileOutcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Cancelled => None,
        }
    }
}

/// Reads and writes project files on behalf of the application.
pub trait FileService {
    /// Where a saved file lives, reused to overwrite it on the next save.
    type Handle: Clone;

    /// Let the user pick a file and return its contents.
    fn open_for_read(&mut self) -> impl Future<Output = io::Result<FileOutcome<Vec<u8>>>>;

    /// Write `bytes` to `existing` if given, otherwise ask the user where to
    /// save, proposing `suggested_name`.
    fn save(
        &mut self,
        bytes: Vec<u8>,
        suggested_name: &str,
        existing: Option<&Self::Handle>,
    ) -> impl Future<Output = io::Result<FileOutcome<Self::Handle>>>;
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::NativeFileService;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::io;
    use std::path::PathBuf;

    use super::{FileOutcome, FileService};
    use crate::format::ProjectFormat;

    /// [`FileService`] using native file dialogs and `std::fs`.
    #[derive(Debug, Clone, Default)]
    pub struct NativeFileService {
        /// Folder dialogs open in, updated after every pick.
        directory: Option<PathBuf>,
    }

    impl NativeFileService {
        pub fn new() -> Self {
            Self::default()
        }

        fn dialog(&self) -> rfd::AsyncFileDialog {
            let dialog = rfd::AsyncFileDialog::new()
                .add_filter("Pinpoint project", &[ProjectFormat::EXTENSION]);
            match &self.directory {
                Some(dir) => dialog.set_directory(dir),
                None => dialog,
            }
        }

        fn remember_directory(&mut self, path: &std::path::Path) {
            self.directory = path.parent().map(PathBuf::from);
        }
    }

    impl FileService for NativeFileService {
        type Handle = PathBuf;

        async fn open_for_read(&mut self) -> io::Result<FileOutcome<Vec<u8>>> {
            let Some(file) = self.dialog().pick_file().await else {
                log::debug!("Open dialog cancelled");
                return Ok(FileOutcome::Cancelled);
            };
            let path = file.path().to_path_buf();
            self.remember_directory(&path);

            log::info!("Reading {:?}", path);
            Ok(FileOutcome::Completed(std::fs::read(&path)?))
        }

        async fn save(
            &mut self,
            bytes: Vec<u8>,
            suggested_name: &str,
            existing: Option<&PathBuf>,
        ) -> io::Result<FileOutcome<PathBuf>> {
            let path = match existing {
                Some(path) => path.clone(),
                None => {
                    let Some(file) = self.dialog().set_file_name(suggested_name).save_file().await
                    else {
                        log::debug!("Save dialog cancelled");
                        return Ok(FileOutcome::Cancelled);
                    };
                    file.path().to_path_buf()
                }
            };
            self.remember_directory(&path);

            log::info!("Writing {} bytes to {:?}", bytes.len(), path);
            std::fs::write(&path, &bytes)?;
            Ok(FileOutcome::Completed(path))
        }
    }

}
