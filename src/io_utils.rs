//! Text decoding and CSV reader construction shared by the ingestion adapters.
//!
//! - **Delimiter resolution**: `.tsv` files default to tab, everything else to
//!   comma, with a manual override.
//! - **Encoding**: uploaded files are decoded through `encoding_rs`, defaulting
//!   to UTF-8 (a leading BOM is honoured).
//! - **Readers**: CSV readers are strict about field counts so that ragged
//!   input surfaces as a parse error instead of silently shifted columns.

use std::{io::Read, path::Path};

use encoding_rs::{Encoding, UTF_8};

use crate::ingest::IngestError;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding, IngestError> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| IngestError::Encoding(format!("Unknown encoding '{value}'"))),
        None => Ok(UTF_8),
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String, IngestError> {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(IngestError::Encoding(format!(
            "Failed to decode text with encoding {}",
            used.name()
        )))
    } else {
        Ok(text.into_owned())
    }
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false);
    builder.from_reader(reader)
}

pub fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
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
