//! Customizing TOML output with SerializeOptions.
//!
//! Run with: cargo run --example custom_options

use unreal_toml::{from_str, to_string, to_string_with_options, QuoteStyle, SerializeOptions};

const INPUT: &str = r#"
zone = 'C:\Levels\Main'
notes = """
Line one
Line two"""

[physics]
gravity = -9.81
substeps = 4

[physics.solver]
iterations = 8
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let doc = from_str(INPUT)?;

    println!("Default:");
    println!("{}", to_string(&doc));

    println!("Indented and sorted:");
    let pretty = SerializeOptions::pretty().with_sort_keys(true);
    println!("{}", to_string_with_options(&doc, &pretty));

    println!("Literal strings where possible:");
    let literal = SerializeOptions::new().with_quote_style(QuoteStyle::Literal);
    println!("{}", to_string_with_options(&doc, &literal));

    println!("Original string styles:");
    let preserve = SerializeOptions::new().with_quote_style(QuoteStyle::Preserve);
    let text = to_string_with_options(&doc, &preserve);
    println!("{}", text);

    // formatting never changes the values
    assert_eq!(from_str(&text)?, doc);

    Ok(())
}
