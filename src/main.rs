/*!
 * graphwire CLI - Sample Tooling
 *
 * Small inspector over the codec:
 * - `dump` decodes a document and prints a JSON rendering
 * - `convert` re-encodes a document into the other wire form
 *
 * Decoding runs registry-less with unknown-class placeholders enabled, so
 * any well-formed document can be inspected without its class descriptors.
 */

use graphwire::{fsio, value, DecodeOptions, Decoded, EncodeOptions};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
graphwire - object-graph codec inspector

USAGE:
    graphwire dump [--text] <path>
    graphwire convert [--from-text] (--to-text | --to-binary) <input> <output>

    dump       decode a document (binary form unless --text) and print JSON
    convert    decode a document and re-encode it into the requested form
";

fn main() -> ExitCode {
    // Initialize structured tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    match args.first().map(String::as_str) {
        Some("dump") => dump(&args[1..]),
        Some("convert") => convert(&args[1..]),
        _ => {
            eprint!("{USAGE}");
            Err("expected a subcommand".into())
        }
    }
}

/// Lenient decode options for inspection
fn inspect_options() -> DecodeOptions {
    DecodeOptions::new().allow_unknown_classes()
}

fn read_document(path: &str, textual: bool) -> Result<Decoded, String> {
    let decoded = if textual {
        fsio::read_text_file(path, None, &inspect_options())
    } else {
        fsio::read_binary_file(path, None, &inspect_options())
    };
    decoded.map_err(|e| format!("{path}: {e}"))
}

fn dump(args: &[String]) -> Result<(), String> {
    let mut textual = false;
    let mut path = None;
    for arg in args {
        match arg.as_str() {
            "--text" => textual = true,
            other if path.is_none() => path = Some(other.to_string()),
            other => return Err(format!("unexpected argument {other:?}")),
        }
    }
    let path = path.ok_or_else(|| "dump needs a path".to_string())?;

    info!(path = %path, textual, "decoding document");
    let decoded = read_document(&path, textual)?;
    let rendered = value::to_json_string_pretty(&decoded.graph, &decoded.root)
        .map_err(|e| e.to_string())?;
    println!("{rendered}");
    Ok(())
}

fn convert(args: &[String]) -> Result<(), String> {
    let mut from_text = false;
    let mut to_text = None;
    let mut paths = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--from-text" => from_text = true,
            "--to-text" => to_text = Some(true),
            "--to-binary" => to_text = Some(false),
            other => paths.push(other.to_string()),
        }
    }
    let to_text = to_text.ok_or_else(|| "convert needs --to-text or --to-binary".to_string())?;
    let [input, output] = paths.as_slice() else {
        return Err("convert needs an input and an output path".into());
    };

    info!(input = %input, output = %output, from_text, to_text, "converting document");
    let decoded = read_document(input, from_text)?;

    // Placeholder instances re-encode under their original names
    let options = EncodeOptions::new().allow_unknown_classes();
    let written = if to_text {
        fsio::write_text_file(output, &decoded.graph, &decoded.root, None, &options)
    } else {
        fsio::write_binary_file(output, &decoded.graph, &decoded.root, None, &options)
    };
    written.map_err(|e| format!("{output}: {e}"))?;

    info!(output = %output, "conversion complete");
    Ok(())
}
