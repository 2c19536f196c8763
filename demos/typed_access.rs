//! Typed accessors, defaults and path lookups.
//!
//! Run with: cargo run --example typed_access

use std::error::Error;
use unreal_toml::{from_str, Datetime, Error as TomlError};

const SERVERS: &str = r#"
region = "eu-west"
build = 2024-03-01T12:30:00Z
tick_rates = [30, 60, 120]

[[servers]]
host = "10.0.0.1"
port = 7777

[[servers]]
host = "10.0.0.2"
port = "seven"
"#;

fn main() -> Result<(), Box<dyn Error>> {
    let doc = from_str(SERVERS)?;

    // Required values propagate errors with `?`
    let region: &str = doc.get_as("region")?;
    let build: &Datetime = doc.get_as("build")?;
    let ticks: Vec<i64> = doc.get_homogeneous_array("tick_rates")?;
    println!("region {} built {} ticks {:?}", region, build, ticks);

    // Optional values fall back to a default
    let max_players = doc.get_or("max_players", 64_i64);
    println!("max players: {}", max_players);

    // Paths reach into nested tables and arrays of tables
    let first = doc.table_at_path("servers[0]")?;
    println!("first server: {}:{}", first.get_as::<&str>("host")?, first.get_as::<i32>("port")?);

    // Caller errors are plain values to inspect
    match doc.at_path_as::<i64>("servers[1].port") {
        Err(TomlError::TypeMismatch { key, expected, found }) => {
            println!("{}: wanted {}, config has a {}", key, expected, found);
        }
        other => println!("unexpected: {:?}", other),
    }
    match doc.at_path("servers[5]") {
        Err(e) => println!("servers[5]: {}", e),
        Ok(v) => println!("servers[5] = {}", v),
    }

    Ok(())
}
