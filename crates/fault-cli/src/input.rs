//! Reading error envelopes from a file or stdin.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, bail};
use fault_core::ServiceError;

use crate::cli::InputArgs;

/// Read the raw input bytes. `None` or `-` reads stdin. Bytes are decoded
/// by the parser so bad encodings are reported as malformed input.
pub fn read_source(file: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match file {
        Some(path) if path != Path::new("-") => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        _ => {
            let mut bytes = Vec::new();
            std::io::stdin()
                .read_to_end(&mut bytes)
                .context("failed to read stdin")?;
            Ok(bytes)
        }
    }
}

/// Parse `bytes` as an envelope. Strict parsing reports the reason input is
/// malformed; lenient parsing only reports that no error was found.
pub fn parse(bytes: &[u8], lenient: bool) -> anyhow::Result<ServiceError> {
    match ServiceError::parse_json_bytes(bytes, !lenient) {
        Ok(Some(error)) => Ok(error),
        Ok(None) => bail!("input does not contain an error envelope"),
        Err(malformed) => Err(malformed).context("malformed error envelope"),
    }
}

/// Read and parse the envelope named by `args`.
pub fn load(args: &InputArgs) -> anyhow::Result<ServiceError> {
    let bytes = read_source(args.file.as_deref())?;
    tracing::debug!(bytes = bytes.len(), lenient = args.lenient, "parsing envelope");
    parse(&bytes, args.lenient)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use pretty_assertions::assert_eq;

    const ENVELOPE: &str = r#"{"error": {"message": "denied", "code": "access_denied", "http_status_code": 403}}"#;

    #[test]
    fn reads_envelope_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ENVELOPE.as_bytes()).unwrap();

        let args = InputArgs {
            file: Some(file.path().to_path_buf()),
            lenient: false,
        };
        let error = load(&args).unwrap();
        assert_eq!(error.error_code(), "access_denied");
        assert_eq!(error.http_status_code(), Some(403));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let error = read_source(Some(&path)).unwrap_err();
        assert!(format!("{error:#}").contains("absent.json"));
    }

    #[test]
    fn strict_parse_explains_malformed_input() {
        let error = parse(br#"{"error": {"message": "m"}}"#, false).unwrap_err();
        let text = format!("{error:#}");
        assert!(text.starts_with("malformed error envelope"));
        assert!(text.contains("code"));
    }

    #[test]
    fn lenient_parse_only_reports_absence() {
        let error = parse(b"not json", true).unwrap_err();
        assert_eq!(error.to_string(), "input does not contain an error envelope");
    }

    fn file_with(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn invalid_utf8_is_malformed_not_a_read_failure() {
        let file = file_with(b"{\"error\": {\"message\": \"\xff\xfe\", \"code\": \"c\"}}");

        let lenient = InputArgs {
            file: Some(file.path().to_path_buf()),
            lenient: true,
        };
        let error = load(&lenient).unwrap_err();
        assert_eq!(error.to_string(), "input does not contain an error envelope");

        let strict = InputArgs {
            file: Some(file.path().to_path_buf()),
            lenient: false,
        };
        let error = format!("{:#}", load(&strict).unwrap_err());
        assert!(error.starts_with("malformed error envelope"));
        assert!(error.contains("not valid UTF-8"));
    }
}
