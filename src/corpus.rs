//! Corpus record access.
//!
//! Workshop corpora are JSON-Lines files of `{"file", "message"}` records
//! living under the corpus directory.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub file: String,
    pub message: String,
}

/// Reduce a requested corpus filename to its final path component, so a
/// request can never name a file outside the corpus directory.
pub fn sanitize_filename(filename: &str) -> Result<String, ApiError> {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    if name.is_empty() || name == ".." {
        return Err(ApiError::BadRequest(format!(
            "invalid corpus filename: {}",
            filename
        )));
    }

    Ok(name.to_string())
}

/// Load every record from a corpus file. Blank lines are skipped; a
/// malformed line is an error naming its position.
pub fn load_records(path: &Path) -> Result<Vec<CorpusRecord>, ApiError> {
    if !path.exists() {
        return Err(ApiError::NotFound(format!(
            "corpus file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(ApiError::internal)?;
    let mut records = Vec::new();

    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: CorpusRecord = serde_json::from_str(line).map_err(|err| {
            ApiError::Internal(format!(
                "corrupt corpus {} line {}: {}",
                path.display(),
                number + 1,
                err
            ))
        })?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_filename("emails.jsonl").unwrap(), "emails.jsonl");
    }

    #[test]
    fn sanitize_rejects_empty_names() {
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename("..").is_err());
    }

    #[test]
    fn loads_records_and_skips_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus.jsonl");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, r#"{{"file":"a.txt","message":"hello"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"file":"b.txt","message":"world"}}"#).unwrap();

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].file, "a.txt");
        assert_eq!(records[1].message, "world");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = load_records(&dir.path().join("missing.jsonl")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn malformed_line_names_its_position() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus.jsonl");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, r#"{{"file":"a.txt","message":"ok"}}"#).unwrap();
        writeln!(file, "not json").unwrap();

        let err = load_records(&path).unwrap_err();
        match err {
            ApiError::Internal(msg) => assert!(msg.contains("line 2")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
