use std::path::{Path, PathBuf};

use crate::models::FileRef;
use crate::status::Status;
use crate::{AppError, Result};

/// Fetches the bytes behind a private Slack file URL.
pub trait FileFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Downloads with the user's token as a bearer credential.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    token: String,
}

impl HttpFetcher {
    pub fn new(token: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            token: token.to_string(),
        }
    }
}

impl FileFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Http(format!("HTTP {} for {}", status, url)));
        }

        Ok(response.bytes()?.to_vec())
    }
}

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded,
    Overwritten,
    AlreadyExists,
}

/// Destination of `file` inside `dir`. The Slack file name is reduced to a
/// single path component; nameless files use their ID.
pub fn local_path(dir: &Path, file: &FileRef) -> PathBuf {
    let name: String = file
        .display_name()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    let name = match name.as_str() {
        "" | "." | ".." if !file.id.is_empty() => file.id.clone(),
        "" | "." | ".." => "unnamed".to_string(),
        _ => name,
    };
    dir.join(name)
}

pub struct Files<F: FileFetcher> {
    fetcher: F,
    dir: PathBuf,
    overwrite: bool,
}

impl<F: FileFetcher> Files<F> {
    pub fn new(fetcher: F, dir: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            fetcher,
            dir: dir.into(),
            overwrite,
        }
    }

    pub fn download_file(&self, file: &FileRef) -> Result<DownloadOutcome> {
        let path = local_path(&self.dir, file);
        let exists = path.exists();

        if exists && !self.overwrite {
            tracing::debug!(path = %path.display(), "File already exists, skipping");
            return Ok(DownloadOutcome::AlreadyExists);
        }

        let url = file.download_url().ok_or_else(|| AppError::Download {
            name: file.display_name().to_string(),
            reason: "no download URL".to_string(),
        })?;

        let bytes = self.fetcher.fetch(url).map_err(|e| AppError::Download {
            name: file.display_name().to_string(),
            reason: e.to_string(),
        })?;

        std::fs::create_dir_all(&self.dir).map_err(|e| AppError::WriteFile {
            path: self.dir.display().to_string(),
            source: e,
        })?;
        std::fs::write(&path, &bytes).map_err(|e| AppError::WriteFile {
            path: path.display().to_string(),
            source: e,
        })?;

        println!("Downloaded {}", path.display());
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Saved file");

        Ok(if exists {
            DownloadOutcome::Overwritten
        } else {
            DownloadOutcome::Downloaded
        })
    }

    /// Download every file, tallying the results into `status`. Failures are
    /// printed and counted; they never stop the loop.
    pub fn download_files(&self, files: &[FileRef], status: &mut Status) {
        if files.is_empty() {
            return;
        }

        println!();
        for file in files {
            match self.download_file(file) {
                Ok(DownloadOutcome::Downloaded) => status.tot_files += 1,
                Ok(DownloadOutcome::Overwritten) => {
                    status.tot_files += 1;
                    status.files_overwritten += 1;
                }
                Ok(DownloadOutcome::AlreadyExists) => status.files_already_exist += 1,
                Err(e) => {
                    println!("{}", e);
                    status.file_failures += 1;
                }
            }
        }

        println!("File download complete");
        if self.overwrite && status.files_overwritten > 0 {
            println!("{} files were overwritten", status.files_overwritten);
        } else if !self.overwrite && status.files_already_exist > 0 {
            println!(
                "{} files were not downloaded as files with the same name already existed",
                status.files_already_exist
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Serves canned bodies by URL and records every request.
    #[derive(Default)]
    struct FakeFetcher {
        bodies: HashMap<String, Vec<u8>>,
        requests: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        fn with(url: &str, body: &[u8]) -> Self {
            let mut fetcher = Self::default();
            fetcher.bodies.insert(url.to_string(), body.to_vec());
            fetcher
        }
    }

    impl FileFetcher for FakeFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.requests.borrow_mut().push(url.to_string());
            self.bodies
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::Http(format!("HTTP 404 Not Found for {}", url)))
        }
    }

    fn file_ref(id: &str, name: &str, url: Option<&str>) -> FileRef {
        let mut value = serde_json::json!({ "id": id, "name": name });
        if let Some(url) = url {
            value["url_private_download"] = serde_json::json!(url);
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_download_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("files");
        let files = Files::new(
            FakeFetcher::with("https://files/a", b"new"),
            &target,
            false,
        );
        let mut status = Status::default();

        files.download_files(&[file_ref("F1", "a.txt", Some("https://files/a"))], &mut status);

        assert_eq!(std::fs::read(target.join("a.txt")).unwrap(), b"new");
        assert_eq!(status.tot_files, 1);
        assert_eq!(status.file_failures, 0);
        assert_eq!(status.files_already_exist, 0);
    }

    #[test]
    fn test_existing_file_preserved_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"original").unwrap();
        let files = Files::new(
            FakeFetcher::with("https://files/a", b"new"),
            dir.path(),
            false,
        );
        let mut status = Status::default();

        files.download_files(&[file_ref("F1", "a.txt", Some("https://files/a"))], &mut status);

        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), b"original");
        assert_eq!(status.files_already_exist, 1);
        assert_eq!(status.tot_files, 0);
        assert!(files.fetcher.requests.borrow().is_empty());
    }

    #[test]
    fn test_existing_file_replaced_with_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"original").unwrap();
        let files = Files::new(
            FakeFetcher::with("https://files/a", b"new"),
            dir.path(),
            true,
        );
        let mut status = Status::default();

        files.download_files(&[file_ref("F1", "a.txt", Some("https://files/a"))], &mut status);

        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), b"new");
        assert_eq!(status.files_already_exist, 0);
        assert_eq!(status.files_overwritten, 1);
        assert_eq!(status.tot_files, 1);
    }

    #[test]
    fn test_failures_are_counted_and_loop_continues() {
        let dir = tempfile::tempdir().unwrap();
        let files = Files::new(
            FakeFetcher::with("https://files/ok", b"ok"),
            dir.path(),
            false,
        );
        let mut status = Status::default();

        files.download_files(
            &[
                file_ref("F1", "missing.txt", Some("https://files/missing")),
                file_ref("F2", "nourl.txt", None),
                file_ref("F3", "ok.txt", Some("https://files/ok")),
            ],
            &mut status,
        );

        assert_eq!(status.file_failures, 2);
        assert_eq!(status.tot_files, 1);
        assert!(dir.path().join("ok.txt").exists());
        assert!(!dir.path().join("missing.txt").exists());
    }

    #[test]
    fn test_download_file_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let files = Files::new(FakeFetcher::default(), dir.path(), false);

        let err = files
            .download_file(&file_ref("F1", "gone.png", Some("https://files/gone")))
            .unwrap_err();

        assert!(matches!(err, AppError::Download { .. }));
        assert!(err.to_string().contains("gone.png"));
    }

    #[test]
    fn test_empty_list_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("never-created");
        let files = Files::new(FakeFetcher::default(), &target, false);
        let mut status = Status::default();

        files.download_files(&[], &mut status);

        assert!(!target.exists());
        assert_eq!(status, Status::default());
    }

    #[test]
    fn test_local_path_stays_inside_dir() {
        let dir = Path::new("out");
        assert_eq!(
            local_path(dir, &file_ref("F1", "../etc/passwd", None)),
            dir.join(".._etc_passwd")
        );
        assert_eq!(local_path(dir, &file_ref("F2", "..", None)), dir.join("F2"));
        assert_eq!(local_path(dir, &file_ref("F3", "", None)), dir.join("F3"));
    }
}
