//! Loader settings.
//!
//! [`LoadOptions`] is a `confique` config struct: compiled defaults, overridable
//! by `TDRP_*` environment variables or a sparse TOML file.

use std::path::Path;

use confique::Config;

use crate::error::TdrpError;

#[derive(Config, Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Expand `$(VAR)` references in tokens and string values. When off,
    /// non-string values with references are stored as deferred.
    #[config(default = true, env = "TDRP_EXPAND_ENV")]
    pub expand_env: bool,

    /// Trace every token before loading.
    #[config(default = false, env = "TDRP_DEBUG")]
    pub debug: bool,

    /// Warn about `name = ...` statements that match no table entry.
    #[config(default = true, env = "TDRP_WARN_EXTRA_PARAMS")]
    pub warn_extra_params: bool,

    /// Fail the load when any value is out of range.
    #[config(default = true, env = "TDRP_RANGE_CHECK_FATAL")]
    pub range_check_fatal: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            expand_env: true,
            debug: false,
            warn_extra_params: true,
            range_check_fatal: true,
        }
    }
}

impl LoadOptions {
    /// Defaults overridden by `TDRP_*` environment variables.
    pub fn from_env() -> Result<Self, TdrpError> {
        Ok(Self::builder().env().load()?)
    }

    /// Defaults overridden by a sparse TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, TdrpError> {
        let layer: <Self as Config>::Layer =
            toml::from_str(content).map_err(|source| TdrpError::OptionsParse { source })?;
        Ok(Self::builder().preloaded(layer).load()?)
    }

    /// Environment variables, then the TOML file at `path`, then defaults.
    /// A missing file is skipped.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TdrpError> {
        Ok(Self::builder().env().file(path.as_ref()).load()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builder_defaults_match_default_impl() {
        let opts = LoadOptions::builder().load().unwrap();
        assert_eq!(opts, LoadOptions::default());
    }

    #[test]
    fn sparse_toml_overrides_one_field() {
        let opts = LoadOptions::from_toml_str("expand_env = false\n").unwrap();
        assert!(!opts.expand_env);
        assert!(opts.warn_extra_params);
        assert!(opts.range_check_fatal);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(LoadOptions::from_toml_str("").unwrap(), LoadOptions::default());
    }

    #[test]
    fn wrong_type_is_parse_error() {
        let err = LoadOptions::from_toml_str("debug = \"yes please\"\n").unwrap_err();
        assert!(matches!(err, TdrpError::OptionsParse { .. }));
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "range_check_fatal = false").unwrap();
        let opts = LoadOptions::from_file(file.path()).unwrap();
        assert!(!opts.range_check_fatal);
    }

    #[test]
    fn from_file_missing_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let opts = LoadOptions::from_file(dir.path().join("absent.toml")).unwrap();
        assert!(opts.expand_env);
    }
}
