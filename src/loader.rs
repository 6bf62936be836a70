use crate::errors::DegError;
use calamine::{Reader, Xls, Xlsx};
use flate2::bufread::MultiGzDecoder;
use polars::prelude::*;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, trace};

/// A named byte stream, as handed over by the upload/IO layer.
///
/// The filename is used only to infer the format of the bytes (spreadsheet
/// vs delimited text) and to derive the suggested output names; it is never
/// interpreted as a path to read from.
#[derive(Debug, Clone)]
pub struct TableSource {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl TableSource {
    pub fn new<S: Into<String>>(name: S, bytes: Vec<u8>) -> TableSource {
        TableSource {
            name: name.into(),
            bytes,
        }
    }

    /// The filename without directories and without its final extension,
    /// used as the base for suggested artifact names.
    pub fn base_name(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}

/// Delimiter candidates probed by [sniff_delimiter], in preference order.
const DELIMITER_CANDIDATES: [u8; 3] = [b',', b'\t', b';'];

const GZIP_MAGIC_NUMBER: [u8; 2] = [0x1f, 0x8b];

/// Number of leading non-empty lines examined when sniffing the delimiter.
const SNIFF_LINES: usize = 16;

fn is_spreadsheet(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".xls") || lower.ends_with(".xlsx")
}

fn is_gzipped(bytes: &[u8]) -> bool {
    bytes.get(..2) == Some(&GZIP_MAGIC_NUMBER)
}

/// Picks the most plausible delimiter from the leading lines of `text`.
///
/// A candidate that occurs the same number of times on every sampled line
/// wins (the highest such count breaking ties between candidates). If no
/// candidate is consistent, the one with the largest per-line minimum count
/// is taken. Returns [None] when no candidate occurs at all, in which case
/// the caller falls back to whitespace-run splitting.
fn sniff_delimiter(text: &str) -> Option<u8> {
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();
    if lines.is_empty() {
        return None;
    }

    let mut consistent: Option<(u8, usize)> = None;
    let mut fallback: Option<(u8, usize)> = None;
    for cand in DELIMITER_CANDIDATES {
        let counts: Vec<usize> = lines
            .iter()
            .map(|l| l.bytes().filter(|&b| b == cand).count())
            .collect();
        let min = *counts.iter().min().unwrap_or(&0);
        if min == 0 {
            continue;
        }
        if counts.iter().all(|&c| c == counts[0])
            && consistent.map_or(true, |(_, n)| counts[0] > n)
        {
            consistent = Some((cand, counts[0]));
        }
        if fallback.map_or(true, |(_, n)| min > n) {
            fallback = Some((cand, min));
        }
    }
    consistent.or(fallback).map(|(c, _)| c)
}

fn is_index_column(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name.starts_with("Unnamed")
}

/// Drops auto-generated index placeholder columns (empty-named headers and
/// the `Unnamed…` columns a prior export step serializes).
fn drop_index_columns(mut df: DataFrame) -> PolarsResult<DataFrame> {
    let doomed: Vec<String> = df
        .get_column_names()
        .iter()
        .filter(|n| is_index_column(n))
        .map(|n| n.to_string())
        .collect();
    for name in doomed {
        trace!("dropping auto-generated index column {:?}", name);
        df = df.drop(&name)?;
    }
    Ok(df)
}

fn cell_to_string(cell: &calamine::DataType) -> Option<String> {
    use calamine::DataType as Ct;
    match cell {
        Ct::Empty => None,
        Ct::String(s) => Some(s.clone()),
        Ct::Bool(b) => Some(b.to_string()),
        Ct::Error(e) => Some(format!("ERR({e:?})")),
        Ct::Float(n) | Ct::Duration(n) => Some(n.to_string()),
        Ct::Int(i) => Some(i.to_string()),
        Ct::DateTime(f) => Some(f.to_string()),
        Ct::DateTimeIso(s) | Ct::DurationIso(s) => Some(s.clone()),
    }
}

fn cell_to_f64(cell: &calamine::DataType) -> Option<f64> {
    use calamine::DataType as Ct;
    match cell {
        Ct::Int(i) => Some(*i as f64),
        Ct::Float(f) | Ct::Duration(f) | Ct::DateTime(f) => Some(*f),
        _ => None,
    }
}

/// Converts the first worksheet of an xls/xlsx workbook into a [DataFrame],
/// first row as header. A column becomes Float64 when every non-empty cell
/// is numeric, and Utf8 otherwise.
fn spreadsheet_to_df(source: &TableSource) -> Result<DataFrame, DegError> {
    let range = read_first_worksheet(source)?;
    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| DegError::malformed(&source.name, "the worksheet is empty"))?
        .iter()
        .map(|c| cell_to_string(c).unwrap_or_default())
        .collect();
    debug!("worksheet header = {:?}", headers);

    let mut columns: Vec<Series> = Vec::with_capacity(headers.len());
    for (col_idx, header) in headers.iter().enumerate() {
        let cells = || range.rows().skip(1).map(move |row| row.get(col_idx));
        let numeric = cells().any(|c| c.is_some_and(|c| cell_to_f64(c).is_some()))
            && cells().all(|c| match c {
                None | Some(calamine::DataType::Empty) => true,
                Some(c) => cell_to_f64(c).is_some(),
            });
        if numeric {
            let values: Vec<Option<f64>> = cells().map(|c| c.and_then(cell_to_f64)).collect();
            columns.push(Series::new(header, values));
        } else {
            let values: Vec<Option<String>> =
                cells().map(|c| c.and_then(cell_to_string)).collect();
            columns.push(Series::new(header, values));
        }
    }

    DataFrame::new(columns).map_err(|e| DegError::malformed(&source.name, e))
}

fn read_first_worksheet(
    source: &TableSource,
) -> Result<calamine::Range<calamine::DataType>, DegError> {
    let cursor = Cursor::new(source.bytes.clone());
    let sheet = if source.name.to_lowercase().ends_with(".xls") {
        let mut workbook =
            Xls::new(cursor).map_err(|e| DegError::malformed(&source.name, e))?;
        workbook
            .worksheet_range_at(0)
            .map(|r| r.map_err(|e| DegError::malformed(&source.name, e)))
    } else {
        let mut workbook =
            Xlsx::new(cursor).map_err(|e| DegError::malformed(&source.name, e))?;
        workbook
            .worksheet_range_at(0)
            .map(|r| r.map_err(|e| DegError::malformed(&source.name, e)))
    };
    sheet.ok_or_else(|| DegError::malformed(&source.name, "the workbook has no worksheets"))?
}

/// Parses a delimited text stream into a [DataFrame], first row as header.
/// Gzip-compressed input is detected by its magic bytes and decompressed
/// transparently; the delimiter is sniffed from the leading lines.
fn delimited_to_df(source: &TableSource) -> Result<DataFrame, DegError> {
    let raw = if is_gzipped(&source.bytes) {
        trace!("auto-detected gzipped input - reading via decompression");
        let mut decoded = Vec::new();
        MultiGzDecoder::new(&source.bytes[..])
            .read_to_end(&mut decoded)
            .map_err(|e| DegError::malformed(&source.name, e))?;
        decoded
    } else {
        source.bytes.clone()
    };

    let text = String::from_utf8(raw)
        .map_err(|_| DegError::malformed(&source.name, "input is not valid UTF-8 text"))?;

    let (text, separator) = match sniff_delimiter(&text) {
        Some(sep) => (text, sep),
        None => {
            // no candidate found; treat runs of whitespace as the delimiter
            let collapsed: Vec<String> = text
                .lines()
                .map(|l| l.split_whitespace().collect::<Vec<_>>().join("\t"))
                .collect();
            (collapsed.join("\n"), b'\t')
        }
    };
    debug!(
        "parsing {} with separator {:?}",
        source.name, separator as char
    );

    CsvReader::new(Cursor::new(text.into_bytes()))
        .has_header(true)
        .with_separator(separator)
        .finish()
        .map_err(|e| DegError::malformed(&source.name, e))
}

/// Parses an uploaded byte stream into a normalized rectangular table.
///
/// The declared filename decides the parser: an `.xls`/`.xlsx` extension
/// selects the spreadsheet path, anything else the delimited-text path.
/// Auto-generated index columns are stripped from the result.
///
/// # Errors
///
/// Returns [DegError::MalformedInput] when the stream cannot be parsed as
/// tabular data: unreadable workbook, undecodable text, a CSV parse failure
/// (including inconsistent row widths), or zero remaining data columns.
pub fn load_table(source: &TableSource) -> Result<DataFrame, DegError> {
    let df = if is_spreadsheet(&source.name) {
        spreadsheet_to_df(source)?
    } else {
        delimited_to_df(source)?
    };

    let df = drop_index_columns(df)?;
    if df.width() == 0 {
        return Err(DegError::malformed(&source.name, "no data columns found"));
    }
    debug!(
        "loaded {}: {} rows x {} columns",
        source.name,
        df.height(),
        df.width()
    );
    Ok(df)
}
