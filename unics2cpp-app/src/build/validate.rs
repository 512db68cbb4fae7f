//! Command line path validation

use std::path::{Path, PathBuf};

use super::types::{ExitCode, WorkRequest};

/// Validate the raw `--input`/`--output` values.
///
/// Checks run in a fixed order and the first failure wins: missing input,
/// missing output, relative input, relative output, identical paths
/// (compared case-insensitively). Nothing touches the filesystem.
pub fn validate(input: Option<&str>, output: Option<&str>) -> Result<WorkRequest, ExitCode> {
    let input = input.filter(|s| !s.is_empty()).ok_or(ExitCode::InputMissing)?;
    let output = output.filter(|s| !s.is_empty()).ok_or(ExitCode::OutputMissing)?;

    if !Path::new(input).is_absolute() {
        return Err(ExitCode::InputNotAbsolute);
    }
    if !Path::new(output).is_absolute() {
        return Err(ExitCode::OutputNotAbsolute);
    }
    if input.to_lowercase() == output.to_lowercase() {
        return Err(ExitCode::SamePath);
    }

    Ok(WorkRequest {
        input: PathBuf::from(input),
        output: PathBuf::from(output),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    const IN: &str = "/work/Hello.cs";
    #[cfg(unix)]
    const OUT: &str = "/work/out/Hello.cpp";
    #[cfg(windows)]
    const IN: &str = "C:\\work\\Hello.cs";
    #[cfg(windows)]
    const OUT: &str = "C:\\work\\out\\Hello.cpp";

    #[test]
    fn test_missing_arguments() {
        assert_eq!(validate(None, Some(OUT)), Err(ExitCode::InputMissing));
        assert_eq!(validate(Some(""), Some(OUT)), Err(ExitCode::InputMissing));
        assert_eq!(validate(None, None).unwrap_err().code(), 11);
        assert_eq!(validate(Some(IN), None).unwrap_err().code(), 12);
    }

    #[test]
    fn test_relative_paths() {
        assert_eq!(validate(Some("Hello.cs"), Some(OUT)).unwrap_err().code(), 21);
        assert_eq!(validate(Some(IN), Some("out/Hello.cpp")).unwrap_err().code(), 22);
        // input is checked before output
        assert_eq!(validate(Some("a.cs"), Some("b.cpp")).unwrap_err().code(), 21);
    }

    #[test]
    fn test_same_path_ignores_case() {
        let upper = IN.to_uppercase();
        assert_eq!(validate(Some(IN), Some(&upper)).unwrap_err().code(), 30);
        assert_eq!(validate(Some(IN), Some(IN)).unwrap_err().code(), 30);
        // absoluteness is checked first
        assert_eq!(validate(Some("same.cs"), Some("SAME.cs")).unwrap_err().code(), 21);
    }

    #[test]
    fn test_valid_request() {
        let request = validate(Some(IN), Some(OUT)).unwrap();
        assert_eq!(request.input, PathBuf::from(IN));
        assert_eq!(request.output, PathBuf::from(OUT));
    }
}
