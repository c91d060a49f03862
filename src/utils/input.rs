use crate::utils::error::{GptApiError, Result};
use std::io::ErrorKind;
use std::path::Path;

/// Reads the prompt text from `path`, optionally trimming surrounding whitespace.
pub fn read_prompt<P: AsRef<Path>>(path: P, trim: bool) -> Result<String> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(content) if trim => Ok(content.trim().to_string()),
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::error!("The file {} does not exist.", path.display());
            Err(GptApiError::InputNotFound {
                path: path.display().to_string(),
            })
        }
        Err(e) => {
            tracing::error!(
                "An error occurred while reading the file {}: {}",
                path.display(),
                e
            );
            Err(GptApiError::Io(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_prompt_keeps_whitespace_by_default() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"  Plan a consulting firm.\n").unwrap();

        assert_eq!(
            read_prompt(file.path(), false).unwrap(),
            "  Plan a consulting firm.\n"
        );
        assert_eq!(
            read_prompt(file.path(), true).unwrap(),
            "Plan a consulting firm."
        );
    }

    #[test]
    fn test_read_prompt_missing_file() {
        let err = read_prompt("/definitely/not/here/input.txt", false).unwrap_err();
        assert!(matches!(err, GptApiError::InputNotFound { .. }));
    }
}
