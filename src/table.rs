//! The parameter table and the whole-stream load pipeline.
//!
//! [`ParamTable::load_tokens`] applies one token stream (a parameter file, or
//! an override list, already tokenized) to every entry:
//!
//! 1. Expand `$(VAR)` references in every token (if enabled)
//! 2. For each entry whose label appears, read it with the reader for its
//!    shape; private entries are skipped with a warning
//! 3. Range-check every entry
//! 4. Warn about statements that match no entry
//! 5. Expand references left in committed string values (if enabled)
//!
//! A failed entry never stops the others from loading. All hard errors are
//! returned together once every entry has been tried.

use std::borrow::Cow;

use tracing::{trace, warn};

use crate::decode::{self, ENV_MARKER};
use crate::entry::{ParamEntry, Payload};
use crate::env;
use crate::error::TdrpError;
use crate::options::LoadOptions;
use crate::range::{self, Violation};
use crate::read;
use crate::syntax;
use crate::token::{Location, Token};
use crate::types::EntryType;
use crate::value::TypedValue;

/// Soft findings from a successful load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Out-of-range values (only populated when range checks are advisory).
    pub violations: Vec<Violation>,
    /// Labels in the stream that match no entry, with where they appeared.
    pub unknown_params: Vec<(String, Location)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamTable {
    entries: Vec<ParamEntry>,
}

impl ParamTable {
    pub fn new(entries: Vec<ParamEntry>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, entry: ParamEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ParamEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&ParamEntry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ParamEntry> {
        self.entries.iter_mut().find(|e| e.name() == name)
    }

    /// Load from tokens, expanding references from the process environment.
    pub fn load_tokens(&mut self, tokens: &[Token], opts: &LoadOptions) -> Result<LoadReport, TdrpError> {
        self.load_tokens_with(tokens, opts, |name| std::env::var(name).ok())
    }

    /// Load from tokens, expanding references through `lookup`.
    pub fn load_tokens_with(
        &mut self,
        tokens: &[Token],
        opts: &LoadOptions,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<LoadReport, TdrpError> {
        let tokens: Cow<'_, [Token]> = if opts.expand_env {
            Cow::Owned(
                tokens
                    .iter()
                    .map(|tok| Token {
                        text: env::expand_env_refs(&tok.text, &lookup).into_owned(),
                        ..tok.clone()
                    })
                    .collect(),
            )
        } else {
            Cow::Borrowed(tokens)
        };

        if opts.debug {
            for (index, tok) in tokens.iter().enumerate() {
                trace!(index, line = tok.line, text = %tok.text, quoted = tok.is_string, "token");
            }
        }

        let mut errors = Vec::new();
        let mut violations = Vec::new();
        for entry in &mut self.entries {
            if let Some(at) = syntax::find_label(&tokens, entry.name()) {
                if entry.is_private() {
                    warn!(
                        param = %entry.name(),
                        location = %Location::at(&tokens, at),
                        "param is private, cannot override default; ignored"
                    );
                } else if let Err(err) = read::read_entry(entry, &tokens, opts.expand_env) {
                    errors.push(err);
                }
            }
            violations.extend(range::check_value_range(entry));
        }

        let unknown_params = self.unknown_params(&tokens);
        if opts.warn_extra_params {
            for (name, location) in &unknown_params {
                warn!(param = %name, %location, "param is not relevant, remove it to suppress this warning");
            }
        }

        if opts.expand_env {
            self.expand_strings(&lookup);
        }

        if !errors.is_empty() {
            return Err(TdrpError::Multiple(errors));
        }
        if opts.range_check_fatal && !violations.is_empty() {
            return Err(TdrpError::OutOfRange(violations));
        }
        Ok(LoadReport {
            violations,
            unknown_params,
        })
    }

    fn unknown_params(&self, tokens: &[Token]) -> Vec<(String, Location)> {
        syntax::assignment_labels(tokens)
            .into_iter()
            .filter(|leaf| self.get(leaf.text()).is_none())
            .map(|leaf| (leaf.text().to_string(), leaf.location()))
            .collect()
    }

    /// Expand `$(VAR)` references in every committed string value.
    pub fn expand_strings(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for entry in &mut self.entries {
            for value in entry.payload_mut().values_mut() {
                if let TypedValue::String(s) = value
                    && s.contains(ENV_MARKER)
                {
                    let expanded = env::expand_env_refs(s, &lookup).into_owned();
                    *s = expanded;
                }
            }
        }
    }

    /// Re-decode every deferred value after expanding its references.
    ///
    /// Each entry is rebuilt in a scratch copy and installed only if all of its
    /// deferred values decode; references that still cannot be expanded stay
    /// deferred. Returns the number of values resolved.
    pub fn resolve_deferred(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<usize, TdrpError> {
        let mut errors = Vec::new();
        let mut resolved = 0;
        for entry in &mut self.entries {
            if !entry.payload().has_deferred() {
                continue;
            }
            match resolve_entry(entry, &lookup) {
                Ok((payload, n)) => {
                    entry.install(payload);
                    resolved += n;
                }
                Err(err) => errors.push(err),
            }
        }
        if errors.is_empty() {
            Ok(resolved)
        } else {
            Err(TdrpError::Multiple(errors))
        }
    }

    /// Names of public entries no load has set yet.
    pub fn unset_params(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| !e.is_set() && !e.is_private())
            .map(ParamEntry::name)
            .collect()
    }

    /// Entries still holding deferred values.
    pub fn provisional_params(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.is_provisional())
            .map(ParamEntry::name)
            .collect()
    }
}

fn resolve_entry(
    entry: &ParamEntry,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<(Payload, usize), TdrpError> {
    let mut payload = entry.payload().clone();
    let mut resolved = 0;
    for (i, value) in payload.values_mut().iter_mut().enumerate() {
        let TypedValue::Deferred(raw) = value else {
            continue;
        };
        let (kind, enum_def) = match entry.entry_type() {
            EntryType::Value { kind, enum_def } => (*kind, enum_def.as_ref()),
            EntryType::Record(def) => {
                let field = &def.fields[i % def.field_count()];
                (field.kind, field.enum_def.as_ref())
            }
        };
        let expanded = env::expand_env_refs(raw, lookup);
        let decoded = decode::decode_text(&expanded, kind, enum_def, false).map_err(|failure| {
            TdrpError::Unresolved {
                label: entry.name().to_string(),
                text: expanded.to_string(),
                expected: failure.expected,
            }
        })?;
        if !decoded.is_deferred() {
            resolved += 1;
        }
        *value = decoded;
    }
    Ok((payload, resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::fixtures::test::{sample_table, station_record, toks};
    use crate::range::Side;
    use crate::record::Records;
    use crate::types::ScalarKind;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn lenient() -> LoadOptions {
        LoadOptions {
            range_check_fatal: false,
            ..LoadOptions::default()
        }
    }

    #[test]
    fn loads_every_entry_present() {
        let mut table = sample_table();
        let tokens = toks(
            "debug = TRUE ;\n\
             nbeams = 720 ;\n\
             color = BLUE ;\n\
             levels = { 1 , 2 , 3 } ;",
        );
        let report = table.load_tokens_with(&tokens, &lenient(), no_env).unwrap();
        assert!(report.violations.is_empty());
        assert_eq!(
            table.get("nbeams").unwrap().payload(),
            &Payload::Scalar(TypedValue::Int(720))
        );
        assert!(table.get("debug").unwrap().is_set());
        assert!(!table.get("data_dir").unwrap().is_set());
    }

    #[test]
    fn failed_entry_does_not_stop_others() {
        let mut table = sample_table();
        let tokens = toks("nbeams = lots ; color = RED ; debug = maybe ;");
        let err = table.load_tokens_with(&tokens, &lenient(), no_env).unwrap_err();
        match err {
            TdrpError::Multiple(errs) => {
                assert_eq!(errs.len(), 2);
                assert!(errs.iter().all(|e| e.category() == ErrorCategory::Type));
            }
            other => panic!("Expected Multiple, got: {other:?}"),
        }
        assert!(table.get("color").unwrap().is_set());
        assert_eq!(
            table.get("nbeams").unwrap().payload(),
            &Payload::Scalar(TypedValue::Int(360))
        );
    }

    #[test]
    fn later_statement_overrides_earlier() {
        let mut table = sample_table();
        let tokens = toks("nbeams = 10 ; nbeams = 20 ;");
        table.load_tokens_with(&tokens, &lenient(), no_env).unwrap();
        assert_eq!(
            table.get("nbeams").unwrap().payload(),
            &Payload::Scalar(TypedValue::Int(20))
        );
    }

    #[test]
    fn private_entry_keeps_default() {
        let mut table = sample_table();
        let tokens = toks("secret = 99 ;");
        table.load_tokens_with(&tokens, &lenient(), no_env).unwrap();
        let secret = table.get("secret").unwrap();
        assert!(!secret.is_set());
        assert_eq!(secret.payload(), &Payload::Scalar(TypedValue::Int(7)));
    }

    #[test]
    fn unknown_params_are_reported() {
        let mut table = sample_table();
        let tokens = toks("nbeams = 10 ;\ntypo_param = 3 ;");
        let report = table.load_tokens_with(&tokens, &lenient(), no_env).unwrap();
        assert_eq!(report.unknown_params.len(), 1);
        assert_eq!(report.unknown_params[0].0, "typo_param");
        assert_eq!(report.unknown_params[0].1.line, 2);
    }

    #[test]
    fn range_violations_fatal_by_default() {
        let mut table = sample_table();
        let tokens = toks("levels = { 5 , 12 , -1 } ;");
        let err = table
            .load_tokens_with(&tokens, &LoadOptions::default(), no_env)
            .unwrap_err();
        match err {
            TdrpError::OutOfRange(v) => {
                assert_eq!(v.len(), 2);
                assert_eq!(v[0].side, Side::Above);
                assert_eq!(v[1].side, Side::Below);
            }
            other => panic!("Expected OutOfRange, got: {other:?}"),
        }
        // The value is still committed.
        assert!(table.get("levels").unwrap().is_set());
    }

    #[test]
    fn range_violations_advisory_when_configured() {
        let mut table = sample_table();
        let tokens = toks("levels = { 5 , 12 , -1 } ;");
        let report = table.load_tokens_with(&tokens, &lenient(), no_env).unwrap();
        assert_eq!(report.violations.len(), 2);
    }

    #[test]
    fn tokens_are_expanded_before_decoding() {
        let mut table = sample_table();
        let tokens = toks("nbeams = $(NBEAMS) ;");
        let lookup = |name: &str| (name == "NBEAMS").then(|| "180".to_string());
        table.load_tokens_with(&tokens, &lenient(), lookup).unwrap();
        assert_eq!(
            table.get("nbeams").unwrap().payload(),
            &Payload::Scalar(TypedValue::Int(180))
        );
    }

    #[test]
    fn unexpanded_reference_defers_when_expansion_off() {
        let mut table = sample_table();
        let opts = LoadOptions {
            expand_env: false,
            ..lenient()
        };
        let tokens = toks("nbeams = $(NBEAMS) ; data_dir = $(HOME)/data ;");
        table.load_tokens_with(&tokens, &opts, no_env).unwrap();
        assert_eq!(table.provisional_params(), ["nbeams"]);
        assert_eq!(
            table.get("data_dir").unwrap().payload(),
            &Payload::Scalar(TypedValue::String("$(HOME)/data".into()))
        );
    }

    #[test]
    fn resolve_deferred_installs_decoded_values() {
        let mut table = sample_table();
        let opts = LoadOptions {
            expand_env: false,
            ..lenient()
        };
        let tokens = toks("nbeams = $(NBEAMS) ; levels = { 1 , $(TOP) } ;");
        table.load_tokens_with(&tokens, &opts, no_env).unwrap();
        let lookup = |name: &str| match name {
            "NBEAMS" => Some("90".to_string()),
            "TOP" => Some("8".to_string()),
            _ => None,
        };
        assert_eq!(table.resolve_deferred(lookup).unwrap(), 2);
        assert!(table.provisional_params().is_empty());
        assert_eq!(
            table.get("levels").unwrap().payload(),
            &Payload::Array(vec![TypedValue::Int(1), TypedValue::Int(8)])
        );
    }

    #[test]
    fn resolve_deferred_failure_leaves_entry() {
        let mut table = sample_table();
        let opts = LoadOptions {
            expand_env: false,
            ..lenient()
        };
        let tokens = toks("levels = { $(A) , $(B) } ;");
        table.load_tokens_with(&tokens, &opts, no_env).unwrap();
        let before = table.get("levels").unwrap().payload().clone();
        let lookup = |name: &str| match name {
            "A" => Some("1".to_string()),
            "B" => Some("two".to_string()),
            _ => None,
        };
        let err = table.resolve_deferred(lookup).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Type);
        match err {
            TdrpError::Multiple(errs) => {
                assert!(matches!(&errs[0], TdrpError::Unresolved { text, .. } if text == "two"));
                assert!(errs[0].location().is_none());
            }
            other => panic!("Expected Multiple, got: {other:?}"),
        }
        assert_eq!(table.get("levels").unwrap().payload(), &before);
    }

    #[test]
    fn resolve_deferred_record_fields_use_their_own_kind() {
        let mut table = ParamTable::new(vec![ParamEntry::records(
            "stations",
            station_record(),
            true,
            Records::empty(),
        )]);
        let opts = LoadOptions {
            expand_env: false,
            ..lenient()
        };
        let tokens = toks("stations = { { A , $(LAT) , $(COL) } , { B , 2.0 , RED } } ;");
        table.load_tokens_with(&tokens, &opts, no_env).unwrap();
        assert_eq!(table.provisional_params(), ["stations"]);

        let lookup = |name: &str| match name {
            "LAT" => Some("1.5".to_string()),
            "COL" => Some("BLUE".to_string()),
            _ => None,
        };
        assert_eq!(table.resolve_deferred(lookup).unwrap(), 2);
        let stations = table.get("stations").unwrap();
        assert!(!stations.is_provisional());
        assert_eq!(
            stations.payload().values()[..3],
            [
                TypedValue::String("A".into()),
                TypedValue::Double(1.5),
                TypedValue::Enum {
                    name: "BLUE".into(),
                    value: 2
                },
            ]
        );
    }

    #[test]
    fn expand_strings_covers_arrays_and_record_fields() {
        let mut table = ParamTable::new(vec![ParamEntry::array("paths", ScalarKind::String, vec![])]);
        table.push(ParamEntry::records(
            "stations",
            station_record(),
            true,
            Records::empty(),
        ));
        let opts = LoadOptions {
            expand_env: false,
            ..lenient()
        };
        let tokens = toks(
            "paths = { $(ROOT)/a , $(ROOT)/b } ;\n\
             stations = { { $(ROOT)/k , 39.5 , RED } , { KCYS , 41.1 , BLUE } } ;",
        );
        table.load_tokens_with(&tokens, &opts, no_env).unwrap();

        table.expand_strings(|name| (name == "ROOT").then(|| "/data".to_string()));
        assert_eq!(
            table.get("paths").unwrap().payload(),
            &Payload::Array(vec![
                TypedValue::String("/data/a".into()),
                TypedValue::String("/data/b".into()),
            ])
        );
        let stations = table.get("stations").unwrap().payload().values();
        assert_eq!(stations[0], TypedValue::String("/data/k".into()));
        assert_eq!(stations[3], TypedValue::String("KCYS".into()));
    }

    #[test]
    fn missing_terminator_names_the_swallowed_label() {
        let mut table = sample_table();
        let tokens = toks("debug = TRUE nbeams = 5 ;");
        let err = table.load_tokens_with(&tokens, &lenient(), no_env).unwrap_err();
        let TdrpError::Multiple(errs) = err else {
            panic!("Expected Multiple");
        };
        assert_eq!(errs.len(), 1);
        assert!(errs[0].to_string().contains("'nbeams = ...'"), "{}", errs[0]);
        assert!(!table.get("nbeams").unwrap().is_set());
    }

    #[test]
    fn string_values_expanded_after_load() {
        let mut table = sample_table();
        let mut tokens = toks("data_dir = X ;");
        tokens[2] = Token::quoted("$(ROOT)/radar", 1);
        let lookup = |name: &str| (name == "ROOT").then(|| "/data".to_string());
        table.load_tokens_with(&tokens, &lenient(), lookup).unwrap();
        assert_eq!(
            table.get("data_dir").unwrap().payload(),
            &Payload::Scalar(TypedValue::String("/data/radar".into()))
        );
    }

    #[test]
    fn unset_params_lists_public_unset_entries() {
        let mut table = sample_table();
        table
            .load_tokens_with(&toks("nbeams = 1 ;"), &lenient(), no_env)
            .unwrap();
        let unset = table.unset_params();
        assert!(!unset.contains(&"nbeams"));
        assert!(unset.contains(&"debug"));
        assert!(!unset.contains(&"secret"));
    }
}
