use crate::{GridError, PathExtension};
use std::path::Path;

/// Data file formats the loader can read, keyed by file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileExtension {
    Csv,
    Json,
    /// Newline-delimited JSON (`.ndjson`).
    NDJson,
    Parquet,
    /// Any other extension, lowercased.
    Unknown(String),
    /// The path has no extension.
    Missing,
}

impl FileExtension {
    /// Determines the format from the (case-insensitive) extension of `path`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension_as_lowercase().as_deref() {
            Some("csv") => FileExtension::Csv,
            Some("json") => FileExtension::Json,
            Some("ndjson" | "jsonl") => FileExtension::NDJson,
            Some("parquet") => FileExtension::Parquet,
            Some(ext) => FileExtension::Unknown(ext.to_owned()),
            None => FileExtension::Missing,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, FileExtension::Unknown(_) | FileExtension::Missing)
    }

    /// `GridError::FileType` describing why `path` cannot be loaded.
    pub fn unsupported(&self, path: &Path) -> GridError {
        let reason = match self {
            FileExtension::Unknown(ext) => format!("Unsupported extension: `{ext}`"),
            FileExtension::Missing => "Missing extension".to_string(),
            supported => format!("{supported:?} is supported"),
        };
        GridError::FileType(format!("{reason} for file: `{}`", path.display()))
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// `cargo test -- --show-output tests_file_extension`
#[cfg(test)]
mod tests_file_extension {
    use super::*;

    #[test]
    fn recognizes_supported_formats() {
        let cases = [
            ("data.CSV", FileExtension::Csv),
            ("data.json", FileExtension::Json),
            ("events.jsonl", FileExtension::NDJson),
            ("table.Parquet", FileExtension::Parquet),
        ];
        for (path, expected) in cases {
            let extension = FileExtension::from_path(Path::new(path));
            assert_eq!(extension, expected);
            assert!(extension.is_supported());
        }
    }

    #[test]
    fn unsupported_formats_explain_themselves() {
        let path = Path::new("sheet.xlsx");
        let extension = FileExtension::from_path(path);
        assert_eq!(extension, FileExtension::Unknown("xlsx".to_string()));

        let message = extension.unsupported(path).to_string();
        assert!(message.contains("`xlsx`"));
        assert_eq!(FileExtension::from_path(Path::new("README")), FileExtension::Missing);
    }
}
