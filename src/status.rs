use std::fmt;

/// Counters accumulated over one archive run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub tot_files: usize,
    pub file_failures: usize,
    pub files_already_exist: usize,
    pub files_overwritten: usize,
    pub export_json_failed: bool,
    pub export_text_failed: bool,
}

impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings().is_empty()
    }

    /// One line per failure or warning, empty when the run was clean.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.export_json_failed {
            warnings.push("Failed to export raw json".to_string());
        }
        if self.export_text_failed {
            warnings.push("Failed to export text".to_string());
        }
        if self.file_failures > 0 {
            warnings.push(format!("{} file(s) failed to download", self.file_failures));
        }
        if self.files_already_exist > 0 {
            warnings.push(format!(
                "{} file(s) were skipped as they already existed",
                self.files_already_exist
            ));
        }
        warnings
    }

    pub fn print_warnings(&self) {
        let warnings = self.warnings();
        if warnings.is_empty() {
            return;
        }
        println!("\nWarnings:");
        for warning in warnings {
            println!("  - {}", warning);
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Files: {} downloaded, {} failed, {} already existed, {} overwritten",
            self.tot_files, self.file_failures, self.files_already_exist, self.files_overwritten
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_run_has_no_warnings() {
        let status = Status::new();
        assert!(!status.has_warnings());
        assert!(status.warnings().is_empty());
    }

    #[test]
    fn test_export_failures_are_warnings() {
        let status = Status {
            export_json_failed: true,
            export_text_failed: true,
            ..Status::default()
        };
        assert_eq!(
            status.warnings(),
            vec!["Failed to export raw json", "Failed to export text"]
        );
    }

    #[test]
    fn test_file_counters_are_warnings() {
        let status = Status {
            tot_files: 4,
            file_failures: 2,
            files_already_exist: 1,
            ..Status::default()
        };
        let warnings = status.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("2 file(s) failed"));
        assert!(warnings[1].contains("1 file(s) were skipped"));
    }

    #[test]
    fn test_overwrites_alone_are_not_warnings() {
        let status = Status {
            tot_files: 3,
            files_overwritten: 3,
            ..Status::default()
        };
        assert!(!status.has_warnings());
    }

    #[test]
    fn test_display() {
        let status = Status {
            tot_files: 5,
            file_failures: 1,
            files_already_exist: 2,
            files_overwritten: 0,
            ..Status::default()
        };
        assert_eq!(
            status.to_string(),
            "Files: 5 downloaded, 1 failed, 2 already existed, 0 overwritten"
        );
    }
}
