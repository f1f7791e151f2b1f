use super::typed::ConfigProperties;
use super::{ConfigError, DocrepoConfig};

/// One key that is missing or has the wrong type.
#[derive(Debug)]
pub struct MissingKeyError {
    /// Prefix of the section that needs the key.
    pub section: String,
    pub key: String,
    pub expected_type: String,
    pub env_hint: String,
    pub description: Option<String>,
}

impl std::fmt::Display for MissingKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "  - [{}] '{}' ({}): set env var `{}`",
            self.section, self.key, self.expected_type, self.env_hint
        )?;
        if let Some(desc) = &self.description {
            write!(f, " ({desc})")?;
        }
        Ok(())
    }
}

/// All problems found in one section.
#[derive(Debug)]
pub struct ConfigValidationError {
    pub errors: Vec<MissingKeyError>,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Invalid configuration:")?;
        for err in &self.errors {
            writeln!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigValidationError {}

/// Check that every required key of `C` is present and that `C` builds.
///
/// Unlike `C::from_config`, which stops at the first problem, this reports
/// every missing required key at once.
pub fn validate_section<C: ConfigProperties>(
    config: &DocrepoConfig,
) -> Result<(), ConfigValidationError> {
    let section = C::prefix().to_string();
    let mut errors: Vec<MissingKeyError> = C::keys()
        .into_iter()
        .filter(|p| p.required && !config.contains_key(p.key))
        .map(|p| MissingKeyError {
            section: section.clone(),
            key: p.key.to_string(),
            expected_type: p.type_name.to_string(),
            env_hint: p.env_var(),
            description: p.description.map(str::to_string),
        })
        .collect();

    if errors.is_empty() {
        match C::from_config(config) {
            Err(ConfigError::TypeMismatch { key, expected }) => errors.push(MissingKeyError {
                section,
                env_hint: key.to_uppercase().replace('.', "_"),
                key,
                expected_type: expected.to_string(),
                description: Some("type mismatch".to_string()),
            }),
            // Present but rejected by the section, e.g. an empty string.
            Err(ConfigError::NotFound(key)) => {
                let type_name = C::keys()
                    .into_iter()
                    .find(|p| p.key == key)
                    .map_or("String", |p| p.type_name);
                errors.push(MissingKeyError {
                    section,
                    env_hint: key.to_uppercase().replace('.', "_"),
                    expected_type: type_name.to_string(),
                    description: Some("empty or missing".to_string()),
                    key,
                });
            }
            _ => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigValidationError { errors })
    }
}
