//! Loading listing files into a DataFrame.
//!
//! The file is decoded up front with `encoding_rs` and then handed to the
//! polars CSV reader. Schema inference is disabled, so every column arrives
//! as `String`; typed columns are produced later by numeric coercion.

use crate::config::TextEncoding;
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode raw bytes, failing on any sequence invalid under `encoding`.
///
/// Latin-1 maps each byte to the code point of the same value, so it never
/// fails.
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<Cow<'_, str>> {
    match encoding {
        TextEncoding::Latin1 => Ok(encoding_rs::mem::decode_latin1(bytes)),
        TextEncoding::Utf8 => {
            let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
            encoding_rs::UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .ok_or(PipelineError::Decode {
                    encoding: encoding.label(),
                })
        }
    }
}

/// Load a listing file with its original headers.
///
/// # Errors
///
/// - [`PipelineError::FileAccess`] if the file does not exist or cannot be read
/// - [`PipelineError::Decode`] if the bytes are invalid under `encoding`
/// - [`PipelineError::Polars`] if the decoded text is not valid CSV
pub fn load_listings(path: impl AsRef<Path>, encoding: TextEncoding) -> Result<DataFrame> {
    let path = path.as_ref();
    info!("Loading listings from: {}", path.display());

    let bytes = std::fs::read(path).map_err(|source| PipelineError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes, decoding as {}", bytes.len(), encoding);

    let df = load_listings_from_bytes(&bytes, encoding)?;
    info!("Listings loaded: {:?}", df.shape());
    Ok(df)
}

/// Load listings from an in-memory CSV document.
pub fn load_listings_from_bytes(bytes: &[u8], encoding: TextEncoding) -> Result<DataFrame> {
    let text = decode(bytes, encoding)?;
    let cursor = Cursor::new(text.into_owned());

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(cursor)
        .finish()?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_latin1_bytes_decode() {
        // "Käfer" with a single-byte umlaut
        let bytes = b"name,price\nK\xE4fer,\"$1,500\"\n";
        let df = load_listings_from_bytes(bytes, TextEncoding::Latin1).unwrap();

        assert_eq!(df.shape(), (1, 2));
        let name = df.column("name").unwrap().as_materialized_series().str().unwrap().get(0);
        assert_eq!(name, Some("Käfer"));
    }

    #[test]
    fn test_latin1_bytes_map_to_same_code_points() {
        let text = decode(b"A\x80B\x9F", TextEncoding::Latin1).unwrap();
        assert_eq!(text, "A\u{80}B\u{9F}");
    }

    #[test]
    fn test_all_columns_are_strings() {
        let bytes = b"price,yearOfRegistration\n\"$5,000\",2004\n\"$700\",1999\n";
        let df = load_listings_from_bytes(bytes, TextEncoding::Utf8).unwrap();

        for column in df.get_columns() {
            assert_eq!(column.dtype(), &DataType::String);
        }
        let price = df.column("price").unwrap().as_materialized_series().str().unwrap().get(0);
        assert_eq!(price, Some("$5,000"));
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let bytes = b"name\nK\xE4fer\n";
        let error = load_listings_from_bytes(bytes, TextEncoding::Utf8).unwrap_err();

        assert!(matches!(error, PipelineError::Decode { encoding: "UTF-8" }));
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let bytes = b"\xEF\xBB\xBFname\nGolf\n";
        let df = load_listings_from_bytes(bytes, TextEncoding::Utf8).unwrap();
        assert!(df.column("name").is_ok());
    }

    #[test]
    fn test_missing_file_is_file_access_error() {
        let error = load_listings("/definitely/not/here/autos.csv", TextEncoding::Latin1)
            .unwrap_err();

        assert_eq!(error.error_code(), "FILE_ACCESS");
        assert!(error.to_string().contains("autos.csv"));
    }
}
