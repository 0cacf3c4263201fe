use crate::errors::HookError;
use crate::hooks::{current, v1_0_0};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use validator::Validate;

/// Decodes one schema version into the current hook representation.
pub type Reader = fn(&[u8]) -> Result<current::Hook, serde_json::Error>;

// a new schema version registers its reader here, nothing downstream changes
static READERS: Lazy<HashMap<&'static str, Reader>> =
    Lazy::new(|| HashMap::from([(v1_0_0::VERSION, v1_0_0::read as Reader)]));

pub const JSON_SUFFIX: &str = "json";

#[derive(Deserialize)]
struct Versioned {
    #[serde(default)]
    version: String,
}

pub fn is_supported(version: &str) -> bool {
    READERS.contains_key(version)
}

/// Decodes and validates a single hook definition.
pub fn read(path: &Path, content: &[u8], extension_stages: &[String]) -> Result<current::Hook, HookError> {
    let versioned: Versioned = serde_json::from_slice(content).map_err(|e| HookError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let reader = READERS
        .get(versioned.version.as_str())
        .ok_or_else(|| HookError::UnsupportedVersion {
            path: path.to_path_buf(),
            version: versioned.version.clone(),
        })?;

    let hook = reader(content).map_err(|e| HookError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    hook.validate().map_err(|e| HookError::MalformedDefinition {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if let Some(stage) = hook.unknown_stage(extension_stages) {
        return Err(HookError::MalformedDefinition {
            path: path.to_path_buf(),
            reason: format!("unknown stage {:?}", stage),
        });
    }

    Ok(hook)
}

pub async fn read_file(path: &Path, extension_stages: &[String]) -> Result<current::Hook, HookError> {
    let content = tokio::fs::read(path).await.map_err(|e| HookError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    read(path, &content, extension_stages)
}

#[cfg(test)]
mod tests {
    use crate::errors::HookError;
    use crate::version::{is_supported, read, read_file};
    use std::path::Path;

    #[test]
    fn test_is_supported() {
        let conditions = &[("1.0.0", true), ("-1", false), ("", false), ("1.0", false), ("2.0.0", false)];
        for (input, expect) in conditions {
            assert_eq!(is_supported(input), *expect, "input: {}", input);
        }
    }

    #[test]
    fn test_unsupported_version() {
        let err = read(Path::new("/etc/hooks/a.json"), br#"{"version": "-1"}"#, &[]).unwrap_err();
        assert!(matches!(err, HookError::UnsupportedVersion { ref version, .. } if version == "-1"));
        assert_eq!(
            err.to_string(),
            r#"parsing hook "/etc/hooks/a.json": unrecognized hook version: "-1""#
        );

        let err = read(Path::new("b.json"), br#"{"hook": {"path": "/bin/true"}}"#, &[]).unwrap_err();
        assert!(matches!(err, HookError::UnsupportedVersion { ref version, .. } if version.is_empty()));
    }

    #[test]
    fn test_parse_errors() {
        let conditions: &[&[u8]] = &[
            b"not json",
            br#"{"version": 1}"#,
            br#"{"version": "1.0.0", "hook": {"path": 3}, "stages": ["prestart"]}"#,
            br#"{"version": "1.0.0", "stages": ["prestart"]}"#,
        ];
        for input in conditions {
            let result = read(Path::new("a.json"), input, &[]);
            assert!(matches!(result, Err(HookError::Parse { .. })), "input: {}", String::from_utf8_lossy(input));
        }
    }

    #[test]
    fn test_malformed() {
        let conditions: &[&[u8]] = &[
            br#"{"version": "1.0.0", "hook": {"path": ""}, "stages": ["prestart"]}"#,
            br#"{"version": "1.0.0", "hook": {"path": "/bin/true"}, "stages": []}"#,
            br#"{"version": "1.0.0", "hook": {"path": "/bin/true", "timeout": 0}, "stages": ["prestart"]}"#,
            br#"{"version": "1.0.0", "hook": {"path": "/bin/true"}, "stages": ["does-not-exist"]}"#,
        ];
        for input in conditions {
            let result = read(Path::new("a.json"), input, &[]);
            assert!(
                matches!(result, Err(HookError::MalformedDefinition { .. })),
                "input: {}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn test_extension_stage_accepted() {
        let content = br#"{"version": "1.0.0", "hook": {"path": "/bin/true"}, "stages": ["prestart", "precreate"]}"#;
        assert!(read(Path::new("a.json"), content, &[]).is_err());
        let hook = read(Path::new("a.json"), content, &["precreate".to_string()]).unwrap();
        assert_eq!(hook.stages, vec!["prestart", "precreate"]);
    }

    #[test]
    fn test_bad_pattern_loads() {
        // patterns are compiled when matched, not when read
        let content = br#"{"version": "1.0.0", "hook": {"path": "/bin/true"}, "when": {"command": "["}, "stages": ["prestart"]}"#;
        let hook = read(Path::new("a.json"), content, &[]).unwrap();
        assert_eq!(hook.when.commands, vec!["["]);
    }

    #[tokio::test]
    async fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, br#"{"version": "1.0.0", "hook": {"path": "/bin/true"}, "stages": ["poststop"]}"#).unwrap();

        let hook = read_file(&path, &[]).await.unwrap();
        assert_eq!(hook.hook.path, "/bin/true");

        let missing = read_file(&dir.path().join("missing.json"), &[]).await;
        assert!(matches!(missing, Err(HookError::Read { .. })));
    }
}
