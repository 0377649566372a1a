#[cfg(test)]
pub mod test {
    use crate::entry::ParamEntry;
    use crate::table::ParamTable;
    use crate::token::Token;
    use crate::types::{EnumDef, FieldDef, RecordDef, ScalarKind};
    use crate::value::TypedValue;

    /// Whitespace-split tokens, one line per source line. A word wrapped in
    /// double quotes becomes a quoted token without its quotes.
    pub fn toks(src: &str) -> Vec<Token> {
        src.lines()
            .enumerate()
            .flat_map(|(i, line)| {
                line.split_whitespace().map(move |word| {
                    match word.strip_prefix('"').and_then(|w| w.strip_suffix('"')) {
                        Some(inner) => Token::quoted(inner, i + 1),
                        None => Token::new(word, i + 1),
                    }
                })
            })
            .collect()
    }

    pub fn colors() -> EnumDef {
        EnumDef::new("color_t", [("RED", 0), ("GREEN", 1), ("BLUE", 2)])
    }

    pub fn station_record() -> RecordDef {
        RecordDef::new(
            "station_t",
            vec![
                FieldDef::new("name", ScalarKind::String),
                FieldDef::new("lat", ScalarKind::Double),
                FieldDef::with_enum("color", colors()),
            ],
        )
    }

    /// A small table covering the scalar, enum, bounded array and private
    /// cases.
    pub fn sample_table() -> ParamTable {
        ParamTable::new(vec![
            ParamEntry::scalar("debug", ScalarKind::Bool, TypedValue::Bool(false)),
            ParamEntry::scalar("nbeams", ScalarKind::Int, TypedValue::Int(360)),
            ParamEntry::scalar(
                "color",
                ScalarKind::Enum,
                TypedValue::Enum {
                    name: "RED".into(),
                    value: 0,
                },
            )
            .with_enum(colors()),
            ParamEntry::array("levels", ScalarKind::Int, vec![])
                .min(TypedValue::Int(0))
                .max(TypedValue::Int(10)),
            ParamEntry::scalar("data_dir", ScalarKind::String, TypedValue::String(".".into())),
            ParamEntry::scalar("secret", ScalarKind::Int, TypedValue::Int(7)).private(true),
        ])
    }

    #[test]
    fn toks_tracks_lines_and_quotes() {
        let tokens = toks("a = \"x\" ;\nb = 2 ;");
        assert_eq!(tokens[2], Token::quoted("x", 1));
        assert_eq!(tokens[4], Token::new("b", 2));
    }

    #[test]
    fn sample_table_starts_unset() {
        let table = sample_table();
        assert!(table.entries().iter().all(|e| !e.is_set()));
    }
}
