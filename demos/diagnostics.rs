//! What malformed input reports.
//!
//! Run with: cargo run --example diagnostics

use unreal_toml::{diagnostic, from_str, load_str};

const CASES: &[(&str, &str)] = &[
    ("duplicate key", "speed = 1\nspeed = 2\n"),
    ("type conflict", "a = 1\n[a]\nb = 2\n"),
    ("unterminated header", "[server\nport = 80\n"),
    ("bad escape", "path = \"C:\\Levels\"\n"),
    ("impossible date", "release = 2023-02-30\n"),
    ("closed inline table", "pos = { x = 1 }\npos.y = 2\n"),
    ("unquoted string", "mode = fast\n"),
];

fn main() {
    for (label, source) in CASES {
        println!("== {} ==", label);
        match from_str(source) {
            Ok(_) => println!("parsed"),
            Err(diagnostics) => {
                for d in diagnostics.iter() {
                    println!("{}", diagnostic::format(d));
                }
            }
        }
        println!();
    }

    // Warnings never stop a parse
    let doc = from_str("mixed = [1, \"two\"]\n").expect("warnings are not errors");
    for warning in doc.warnings() {
        println!("{}", warning);
    }

    // load_str logs through `tracing` and returns None
    assert!(load_str("broken = ").is_none());
}
