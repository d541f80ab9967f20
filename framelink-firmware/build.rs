//! Build script for framelink-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates pipeline.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

/// Known keys per section, with the smallest and largest accepted value
const SCHEMA: &[(&str, &[(&str, i64, i64)])] = &[
    (
        "reassembler",
        &[
            ("chunk_size", 1, u32::MAX as i64),
            ("min_header_bytes", 1, 4),
            ("idle_poll_us", 0, u32::MAX as i64),
            ("unmounted_poll_ms", 0, u32::MAX as i64),
            ("stall_max_attempts", 1, u32::MAX as i64),
            ("stall_delay_us", 0, u32::MAX as i64),
        ],
    ),
    ("presenter", &[("report_interval_ms", 1, u32::MAX as i64)]),
    ("touch", &[("retry_delay_ms", 0, u32::MAX as i64)]),
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    // Linker scripts for cortex-m-rt, defmt and the RP2040 boot2 section
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}

/// Validate pipeline.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=pipeline.toml");

    let content = match fs::read_to_string("pipeline.toml") {
        Ok(content) => content,
        Err(e) => fail("cannot read pipeline.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail("pipeline.toml is not valid TOML", &[e.to_string()]),
    };

    let errors = validate_sections(&config);
    if !errors.is_empty() {
        fail("pipeline.toml has invalid settings", &errors);
    }
}

/// Abort the build with one line per problem
fn fail(title: &str, details: &[String]) -> ! {
    let mut msg = format!("\n{}:", title);
    for line in details.iter().flat_map(|d| d.lines()) {
        msg.push_str("\n  - ");
        msg.push_str(line);
    }
    panic!("{}", msg);
}

/// Check every section and key against [`SCHEMA`]
fn validate_sections(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let root = match config.as_table() {
        Some(t) => t,
        None => return errors,
    };

    for (name, section) in root {
        let keys = match SCHEMA.iter().find(|(s, _)| *s == name.as_str()) {
            Some((_, keys)) => *keys,
            None => {
                errors.push(format!("unknown section [{}]", name));
                continue;
            }
        };

        let section = match section {
            toml::Value::Table(t) => t,
            _ => {
                errors.push(format!("[{}] must be a table", name));
                continue;
            }
        };

        for (key, value) in section {
            let (_, min, max) = match keys.iter().find(|(k, _, _)| *k == key.as_str()) {
                Some(entry) => *entry,
                None => {
                    errors.push(format!("[{}] unknown key '{}'", name, key));
                    continue;
                }
            };

            match value {
                toml::Value::Integer(n) if (min..=max).contains(n) => {}
                toml::Value::Integer(_) => {
                    errors.push(format!("[{}] {} must be {}-{}", name, key, min, max));
                }
                _ => {
                    errors.push(format!("[{}] {} must be an integer", name, key));
                }
            }
        }
    }

    errors
}
