use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::models::Message;
use crate::{AppError, Result};

/// Write `data` to `output_dir/file`, creating missing directories and
/// replacing any existing file.
pub fn write_to_file(output_dir: &Path, file: &str, data: &str) -> Result<PathBuf> {
    let path = output_dir.join(file);
    println!("Saving data to {}", path.display());

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| AppError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    fs::write(&path, data).map_err(|e| AppError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(path)
}

/// Serialize messages as pretty JSON with a four space indent.
pub fn messages_to_json(messages: &[Message]) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    messages
        .serialize(&mut serializer)
        .map_err(|e| AppError::JsonSerialize(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| AppError::JsonSerialize(e.to_string()))
}

/// Read back a raw JSON dump written by [`messages_to_json`].
pub fn load_messages(path: &Path) -> Result<Vec<Message>> {
    let file = File::open(path).map_err(|e| AppError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| AppError::JsonParse(e.to_string()))
}
