//! I/O utilities for delimited-text reading and script writing.
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.csv` →
//!   comma, `.tsv` → tab) with manual override, plus the named-delimiter
//!   parser shared by the CLI and job descriptors.
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **stdin**: the `-` path convention reads standard input.
//! - **Script artifacts**: generated statements join with `;\n` and carry no
//!   terminator after the final statement.

use std::{
    fs::File,
    io::{BufReader, Read, Write},
    path::Path,
};

use encoding_rs::{Encoding, UTF_8};

use crate::error::{ImportError, Result};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| ImportError::config(format!("Unknown encoding '{value}'")))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

/// Parses a delimiter argument: a single ASCII character or one of the
/// names `comma`, `tab`, `pipe`, `semicolon`.
pub fn parse_delimiter(value: &str) -> std::result::Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

fn decode_field(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(ImportError::config(format!(
            "Failed to decode input field with encoding {}",
            encoding.name()
        )))
    } else {
        Ok(text.into_owned())
    }
}

fn read_records<R: Read>(
    reader: R,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    // Flexible so short or long rows reach the projector instead of erroring;
    // header handling stays manual so the first record decodes like any other.
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(reader);

    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for record in csv_reader.byte_records() {
        let record = record?;
        let decoded = record
            .iter()
            .map(|field| decode_field(field, encoding))
            .collect::<Result<Vec<String>>>()?;
        if header.is_none() {
            header = Some(decoded);
        } else {
            rows.push(decoded);
        }
    }
    let header = header.ok_or_else(|| ImportError::config("Input contains no header row"))?;
    Ok((header, rows))
}

/// Reads an entire delimited file (or stdin via `-`): header first, then the
/// data rows. Input order is preserved; insertion order may carry meaning for
/// the destination.
pub fn read_delimited_path(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(File::open(path)?))
    };
    read_records(reader, delimiter, encoding)
}

/// Reads delimited text already held in memory (always UTF-8).
pub fn read_delimited_str(
    content: &str,
    delimiter: u8,
) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    read_records(content.as_bytes(), delimiter, UTF_8)
}

/// Joins generated statements with `;\n` into one script artifact. The final
/// statement carries no closing semicolon; batch execution adds terminators
/// only when statements are joined.
pub fn render_script(statements: &[String]) -> String {
    statements.join(";\n")
}

pub fn write_script(path: &Path, statements: &[String]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(render_script(statements).as_bytes())?;
    file.flush()?;
    Ok(())
}
