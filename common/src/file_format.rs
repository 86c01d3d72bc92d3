use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum FileExtensionError {
    #[error("Failed to get file extension")]
    MissingFileExtension,
    #[error("Unsupported file extension for file: {0}")]
    UnsupportedFileExtension(String),
}

pub type FileFormatResult<T> = Result<T, FileExtensionError>;

#[derive(Debug, thiserror::Error)]
pub enum SerdeFormatError {
    #[error("YAML serialization failed")]
    Yaml(#[from] serde_yml::Error),
    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),
}

pub type SerdeFormatResult<T> = Result<T, SerdeFormatError>;

pub fn get_file_extension(filename: &str) -> Option<&str> {
    Path::new(filename)
        .extension()
        .and_then(|os_str| os_str.to_str())
}

/// Text formats accepted for parameter sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerdeFormat {
    Yaml,
    Json,
}

impl SerdeFormat {
    pub fn from_file_name(file_name: &str) -> FileFormatResult<Self> {
        let ext = get_file_extension(file_name).ok_or(FileExtensionError::MissingFileExtension)?;

        if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") {
            Ok(Self::Yaml)
        } else if ext.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else {
            Err(FileExtensionError::UnsupportedFileExtension(
                file_name.to_string(),
            ))
        }
    }
}

pub fn serialize<T: Serialize>(value: &T, format: SerdeFormat) -> SerdeFormatResult<String> {
    let text = match format {
        SerdeFormat::Yaml => serde_yml::to_string(value)?,
        SerdeFormat::Json => serde_json::to_string_pretty(value)?,
    };
    Ok(text)
}

pub fn deserialize<T: DeserializeOwned + 'static>(text: &str, format: SerdeFormat) -> SerdeFormatResult<T> {
    match format {
        SerdeFormat::Yaml => Ok(serde_yml::from_str(text)?),
        SerdeFormat::Json => Ok(serde_json::from_str(text)?),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Params {
        #[serde(rename = "P")]
        p: f32,
        #[serde(default)]
        seed: Option<u64>,
    }

    #[test]
    fn format_from_file_name() {
        assert_eq!(
            SerdeFormat::from_file_name("indexing.yaml").unwrap(),
            SerdeFormat::Yaml
        );
        assert_eq!(
            SerdeFormat::from_file_name("indexing.YML").unwrap(),
            SerdeFormat::Yaml
        );
        assert_eq!(
            SerdeFormat::from_file_name("indexing.json").unwrap(),
            SerdeFormat::Json
        );
        assert!(matches!(
            SerdeFormat::from_file_name("indexing"),
            Err(FileExtensionError::MissingFileExtension)
        ));
        assert!(matches!(
            SerdeFormat::from_file_name("indexing.toml"),
            Err(FileExtensionError::UnsupportedFileExtension(_))
        ));
    }

    #[test]
    fn yaml_and_json_parse_same_params() {
        let from_yaml: Params = deserialize("P: 0.1\nseed: 7\n", SerdeFormat::Yaml).unwrap();
        let from_json: Params = deserialize(r#"{"P": 0.1, "seed": 7}"#, SerdeFormat::Json).unwrap();
        assert_eq!(from_yaml, from_json);

        let text = serialize(&from_json, SerdeFormat::Json).unwrap();
        assert!(text.contains("\"P\""));
    }

    #[test]
    fn malformed_text_is_an_error() {
        let result: SerdeFormatResult<Params> = deserialize("{not json", SerdeFormat::Json);
        assert!(matches!(result, Err(SerdeFormatError::Json(_))));
    }
}
