//! Grammar edge cases, valid and invalid, checked through the public API.

use unreal_toml::diagnostic::{Category, DiagnosticKind};
use unreal_toml::{from_str, Datetime, DatetimeKind, IntegerBase, Offset, StringStyle, Value};

fn value_of(source: &str) -> Value {
    let doc = from_str(source).unwrap_or_else(|e| panic!("{:?} failed:\n{}", source, e));
    doc.get("v").cloned().unwrap()
}

fn first_error(source: &str) -> DiagnosticKind {
    from_str(source)
        .expect_err(source)
        .first_error()
        .map(|d| d.kind.clone())
        .unwrap()
}

// ---- keys ----

#[test]
fn test_keys_that_look_like_values() {
    let doc = from_str("true = 1\n123 = 2\ninf = 3\n1.2 = 4\n-_- = 5").unwrap();
    assert_eq!(doc.get_as::<i64>("true").unwrap(), 1);
    assert_eq!(doc.get_as::<i64>("123").unwrap(), 2);
    assert_eq!(doc.get_as::<i64>("inf").unwrap(), 3);
    assert_eq!(doc.at_path_as::<i64>("1.2").unwrap(), 4);
    assert_eq!(doc.get_as::<i64>("-_-").unwrap(), 5);
}

#[test]
fn test_quoted_and_spaced_keys() {
    let doc = from_str("\"a.b\" = 1\n'c d' . e = 2\n[ x . \"y\" ]\nz = 3").unwrap();
    assert_eq!(doc.get_as::<i64>("a.b").unwrap(), 1);
    assert_eq!(doc.at_path_as::<i64>("\"c d\".e").unwrap(), 2);
    assert_eq!(doc.at_path_as::<i64>("x.y.z").unwrap(), 3);
}

#[test]
fn test_bare_key_rules() {
    assert_eq!(first_error("a b = 1"), DiagnosticKind::Expected {
        expected: "`=`",
        found: "a bare key",
    });
    assert_eq!(first_error("é = 1"), DiagnosticKind::InvalidKeyChar('é'));
    assert!(matches!(
        first_error("a. = 1"),
        DiagnosticKind::Expected { expected: "a key", .. }
    ));
}

// ---- strings ----

#[test]
fn test_string_forms() {
    assert_eq!(
        value_of("v = \"\\u00e9\\U0001F600\\\\\""),
        Value::from("é😀\\")
    );
    assert_eq!(
        value_of("v = \"\"\"\nfirst\n\"\"\"").as_str(),
        Some("first\n")
    );
    assert_eq!(
        value_of("v = \"\"\"\\\n   trimmed \\\n\n  out\"\"\"").as_str(),
        Some("trimmed out")
    );
    assert_eq!(value_of("v = '''a''''").as_str(), Some("a'"));
    assert_eq!(value_of("v = \"\"\"a\"\"\"\"\"").as_str(), Some("a\"\""));
    assert_eq!(
        value_of("v = 'C:\\Users'").string_style(),
        Some(StringStyle::Literal)
    );
}

#[test]
fn test_string_errors() {
    assert_eq!(first_error("v = \"\\x41\""), DiagnosticKind::InvalidEscape('x'));
    assert!(matches!(
        first_error("v = \"\\uD800\""),
        DiagnosticKind::InvalidUnicodeEscape(_)
    ));
    assert_eq!(first_error("v = \"a\nb\""), DiagnosticKind::NewlineInString);
    assert_eq!(first_error("v = 'open"), DiagnosticKind::UnterminatedString);
    assert_eq!(
        first_error("v = '''open\n"),
        DiagnosticKind::UnterminatedMultilineString
    );
    assert_eq!(first_error("v = \"a\u{1}\""), DiagnosticKind::ControlChar('\u{1}'));
    assert_eq!(
        first_error("v = 1 # bell \u{7}"),
        DiagnosticKind::ControlChar('\u{7}')
    );
}

#[test]
fn test_invalid_escape_position() {
    let err = from_str("v = \"ab\\qc\"").unwrap_err();
    let d = err.first_error().unwrap();
    assert_eq!(d.category(), Category::Lexical);
    assert_eq!(d.position.column, 8);
}

// ---- numbers ----

#[test]
fn test_integer_forms() {
    assert_eq!(value_of("v = +99"), Value::from(99));
    assert_eq!(value_of("v = -0"), Value::from(0));
    assert_eq!(value_of("v = 0xDEAD_beef").as_integer(), Some(0xdead_beef));
    assert_eq!(
        value_of("v = 0o755").integer_base(),
        Some(IntegerBase::Octal)
    );
    assert_eq!(value_of("v = 0b1101_0110").as_integer(), Some(0b1101_0110));
    assert_eq!(
        value_of("v = -9223372036854775808").as_integer(),
        Some(i64::MIN)
    );
}

#[test]
fn test_integer_errors() {
    for bad in ["v = 01", "v = _1", "v = 1_", "v = 1__2", "v = 0x", "v = 0xG", "v = +0x1", "v = 0X1"] {
        assert_eq!(
            from_str(bad).unwrap_err().first_error().unwrap().category(),
            Category::Lexical,
            "{}",
            bad
        );
    }
    assert!(matches!(
        first_error("v = 9223372036854775808"),
        DiagnosticKind::IntegerOutOfRange(_)
    ));
}

#[test]
fn test_float_forms() {
    assert_eq!(value_of("v = 3.14_15").as_float(), Some(3.1415));
    assert_eq!(value_of("v = -2E-2").as_float(), Some(-0.02));
    assert_eq!(value_of("v = 5e+22").as_float(), Some(5e22));
    assert_eq!(value_of("v = +inf").as_float(), Some(f64::INFINITY));
    assert!(value_of("v = -nan").as_float().unwrap().is_nan());
    // an integer-valued float stays a float
    assert!(value_of("v = 1.0").is_float());
}

#[test]
fn test_float_errors() {
    for bad in ["v = .5", "v = 5.", "v = 1.e2", "v = 1e", "v = 01.5", "v = 1._5", "v = infinity"] {
        assert!(from_str(bad).is_err(), "{}", bad);
    }
}

// ---- booleans and bare words ----

#[test]
fn test_bare_words_are_not_strings() {
    assert_eq!(value_of("v = true"), Value::Boolean(true));
    assert_eq!(
        first_error("v = yes"),
        DiagnosticKind::UnquotedValue("yes".to_string())
    );
    assert!(matches!(first_error("v = True"), DiagnosticKind::UnquotedValue(_)));
}

// ---- date-times ----

#[test]
fn test_datetime_forms() {
    let dt = value_of("v = 1979-05-27T00:32:00.999999-07:00");
    let dt = dt.as_datetime().unwrap();
    assert_eq!(dt.kind(), DatetimeKind::OffsetDateTime);
    assert_eq!(dt.offset(), Some(Offset::Minutes(-420)));

    let dt = value_of("v = 1979-05-27 07:32:00Z");
    assert_eq!(dt.as_datetime().unwrap().offset(), Some(Offset::Z));

    assert_eq!(
        value_of("v = 1979-05-27t07:32:00").as_datetime().map(Datetime::kind),
        Some(DatetimeKind::LocalDateTime)
    );
    assert_eq!(
        value_of("v = 1979-05-27").as_datetime().map(Datetime::kind),
        Some(DatetimeKind::LocalDate)
    );
    assert_eq!(
        value_of("v = 00:32:00.5").as_datetime().map(Datetime::kind),
        Some(DatetimeKind::LocalTime)
    );
}

#[test]
fn test_datetime_calendar_validation() {
    for bad in [
        "v = 2021-02-29",
        "v = 2021-04-31",
        "v = 2021-00-10",
        "v = 1979-05-27T24:00:00",
        "v = 1979-05-27T07:60:00",
        "v = 1979-05-27T07:32:00+24:00",
        "v = 07:32",
    ] {
        let err = from_str(bad).unwrap_err();
        assert!(
            matches!(
                err.first_error().map(|d| d.category()),
                Some(Category::Semantic | Category::Lexical)
            ),
            "{}",
            bad
        );
    }
    assert!(from_str("v = 2024-02-29").is_ok());
}

// ---- arrays and inline tables ----

#[test]
fn test_array_layouts() {
    let v = value_of("v = [\n  # leading comment\n  1,\n\n  2, # trailing\n]");
    assert_eq!(v.as_array().unwrap().len(), 2);
    assert!(value_of("v = [ ]").as_array().unwrap().is_empty());
    assert!(from_str("v = [,]").is_err());
    assert!(from_str("v = [1,,2]").is_err());
}

#[test]
fn test_inline_table_rules() {
    assert!(value_of("v = {}").as_table().unwrap().is_empty());
    assert_eq!(
        first_error("v = { a = 1, }"),
        DiagnosticKind::TrailingCommaInInlineTable
    );
    assert_eq!(first_error("v = {\n}"), DiagnosticKind::NewlineInInlineTable);
    assert!(matches!(
        first_error("v = { a.b = 1, a = 2 }"),
        DiagnosticKind::DuplicateKey { .. }
    ));
    // arrays inside inline tables may still span lines
    let v = value_of("v = { a = [\n1,\n2\n] }");
    assert_eq!(v.as_table().unwrap().get_homogeneous_array::<i64>("a").unwrap(), [1, 2]);
}

// ---- tables ----

#[test]
fn test_header_forms() {
    let doc = from_str("[a.b.c]\n[a]\nx = 1\n[a.\"b\".d]\n").unwrap();
    assert_eq!(doc.at_path_as::<i64>("a.x").unwrap(), 1);
    assert!(doc.at_path("a.b.d").is_ok());
}

#[test]
fn test_array_of_tables_rules() {
    assert!(matches!(
        first_error("a = []\n[[a]]"),
        DiagnosticKind::StaticArrayExtended { .. }
    ));
    assert!(matches!(
        first_error("[a]\n[[a]]"),
        DiagnosticKind::KeyTypeConflict { .. }
    ));
    assert!(matches!(
        first_error("[[a]]\n[a]"),
        DiagnosticKind::KeyTypeConflict { .. }
    ));
    assert!(matches!(
        first_error("[[a.b]]\n[a]\nb = 1"),
        DiagnosticKind::DuplicateKey { .. }
    ));
    assert_eq!(first_error("[[a]"), DiagnosticKind::UnterminatedArrayHeader);
}

#[test]
fn test_newlines() {
    let doc = from_str("a = 1\r\nb = 2\r\n").unwrap();
    assert_eq!(doc.len(), 2);
    assert!(doc.has_trailing_newline());
    assert_eq!(first_error("a = 1\rb = 2"), DiagnosticKind::LoneCarriageReturn);
    assert!(from_str("a = 1 b = 2").is_err());
}

#[test]
fn test_empty_and_comment_only_documents() {
    assert!(from_str("").unwrap().is_empty());
    assert!(from_str("# nothing\n\n   \t\n# here").unwrap().is_empty());
}
