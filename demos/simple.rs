//! Read a document, query it, change it and write it back.
//!
//! Run with: cargo run --example simple

use std::error::Error;
use unreal_toml::{from_str, to_string, Value};

const PROJECT: &str = r#"
# Project settings
name = "ShooterGame"
engine = "5.3"

[window]
width = 1280
height = 720
fullscreen = false

[[maps]]
name = "Lobby"
players = 8

[[maps]]
name = "Arena"
players = 16
"#;

fn main() -> Result<(), Box<dyn Error>> {
    let mut doc = from_str(PROJECT)?;

    let name: &str = doc.get_as("name")?;
    let width: i64 = doc.at_path_as("window.width")?;
    println!("{} runs at {} px wide", name, width);

    for map in doc.get_array("maps")? {
        let map = map.as_table().ok_or("map entry is not a table")?;
        println!(
            "  map {} for {} players",
            map.get_as::<&str>("name")?,
            map.get_as::<i64>("players")?
        );
    }

    if let Some(Value::Table(window)) = doc.get_mut("window") {
        window.insert("fullscreen", true);
    }

    let text = to_string(&doc);
    println!("\nRewritten:\n{}", text);

    assert_eq!(from_str(&text)?, doc);
    println!("✓ Round-trip successful");

    Ok(())
}
