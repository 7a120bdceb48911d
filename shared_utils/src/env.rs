use std::str::FromStr;

use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// An environment variable is set but its value could not be parsed.
#[derive(Debug, Error)]
#[error("Invalid value for environment variable {name}: {value:?}")]
pub struct InvalidEnvVarError {
    pub name: String,
    pub value: String,
}

/// Reads an environment variable, returning a structured error if it's missing.
///
/// Empty values count as missing, so `APCA_API_KEY_ID=` in a `.env` file
/// fails the same way as an unset variable.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(MissingEnvVarError(name.to_string())),
    }
}

/// Reads an optional environment variable and parses it.
///
/// Returns `Ok(None)` when the variable is unset or empty.
pub fn parse_env_var<T: FromStr>(name: &str) -> Result<Option<T>, InvalidEnvVarError> {
    let Ok(value) = get_env_var(name) else {
        return Ok(None);
    };
    value
        .trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| InvalidEnvVarError {
            name: name.to_string(),
            value,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_var_names_the_variable() {
        let err = get_env_var("SHARED_UTILS_SURELY_UNSET_VAR").unwrap_err();
        assert_eq!(err.0, "SHARED_UTILS_SURELY_UNSET_VAR");
        assert!(err.to_string().contains("SHARED_UTILS_SURELY_UNSET_VAR"));
    }

    #[test]
    fn unset_var_parses_to_none() {
        let parsed: Option<u32> = parse_env_var("SHARED_UTILS_SURELY_UNSET_VAR").unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn path_is_always_present() {
        // PATH is set in every test environment we run in.
        assert!(get_env_var("PATH").is_ok());
    }
}
