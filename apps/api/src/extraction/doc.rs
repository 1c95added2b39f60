//! Legacy Word (.doc) extraction through an external converter.
//!
//! The binary format is not parsed here. The bytes go to a temp file and the
//! configured converter (default `antiword`) prints the text on stdout.

use std::io::Write;
use std::process::Stdio;

use tokio::process::Command;

use super::{ExtractionError, EXTRACTION_TIMEOUT};

pub async fn convert_doc(converter: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut temp_file = tempfile::Builder::new().suffix(".doc").tempfile()?;
    temp_file.write_all(bytes)?;
    temp_file.flush()?;

    let child = Command::new(converter)
        .arg(temp_file.path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ExtractionError::Converter(format!("failed to start '{converter}': {e}")))?;

    let output = tokio::time::timeout(EXTRACTION_TIMEOUT, child.wait_with_output())
        .await
        .map_err(|_| ExtractionError::Converter(format!("'{converter}' timed out")))??;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractionError::Converter(format!(
            "'{converter}' exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8(output.stdout)?.trim().to_string())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_converter_stdout_becomes_text() {
        // `cat` stands in for a converter that prints the file unchanged.
        let text = convert_doc("cat", b"  Name: Jane Doe\n").await.unwrap();
        assert_eq!(text, "Name: Jane Doe");
    }

    #[tokio::test]
    async fn test_failing_converter_is_error() {
        let err = convert_doc("false", b"whatever").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Converter(_)));
    }

    #[tokio::test]
    async fn test_missing_converter_is_error() {
        let err = convert_doc("definitely-not-a-real-converter-binary", b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Converter(ref msg) if msg.contains("failed to start")));
    }
}
