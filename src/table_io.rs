/*!
 * Header-less delimited tables.
 *
 * Input rows are tab separated (`.tsv`, `.tab`, stdin) or comma separated
 * with RFC 4180 style double quotes (`.csv`). Output is always TSV with a
 * header row; tabs and line breaks inside cells are flattened to spaces.
 */

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::errors::TableError;
use crate::evaluation::{ComparisonRow, QaRow, TableRecord};

/// Column delimiter of an input table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Tab,
    Comma,
}

impl Delimiter {
    /// Pick the delimiter from a file extension, defaulting to tab
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()) {
            Some(ext) if ext == "csv" => Delimiter::Comma,
            _ => Delimiter::Tab,
        }
    }

    fn as_char(&self) -> char {
        match self {
            Delimiter::Tab => '\t',
            Delimiter::Comma => ',',
        }
    }
}

/// Read rows from `path`, or from stdin when `path` is `None` or `-`.
pub fn read_rows(path: Option<&Path>) -> Result<Vec<Vec<String>>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let content = fs::read_to_string(path).with_context(|| format!("Failed to read table: {:?}", path))?;
            Ok(parse_rows(&content, Delimiter::for_path(path))?)
        }
        _ => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read table from stdin")?;
            Ok(parse_rows(&content, Delimiter::Tab)?)
        }
    }
}

/// Split `content` into rows of cells. Blank lines are ignored.
pub fn parse_rows(content: &str, delimiter: Delimiter) -> Result<Vec<Vec<String>>, TableError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let separator = delimiter.as_char();
    let quoting = delimiter == Delimiter::Comma;

    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    cell.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                cell.push(c);
            }
            continue;
        }

        match c {
            '"' if quoting && cell.is_empty() => in_quotes = true,
            c if c == separator => row.push(std::mem::take(&mut cell)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut cell));
                push_row(&mut rows, std::mem::take(&mut row));
            }
            c => cell.push(c),
        }
    }

    if in_quotes {
        return Err(TableError::UnterminatedQuote { row: rows.len() + 1 });
    }
    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        push_row(&mut rows, row);
    }

    Ok(rows)
}

fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    if row.iter().any(|cell| !cell.trim().is_empty()) {
        rows.push(row);
    }
}

fn check_columns(rows: &[Vec<String>], expected: usize) -> Result<(), TableError> {
    match rows.iter().position(|row| row.len() != expected) {
        Some(index) => Err(TableError::WrongColumnCount {
            row: index + 1,
            expected,
            found: rows[index].len(),
        }),
        None => Ok(()),
    }
}

/// Convert two-column rows into QA input rows
pub fn qa_rows(rows: Vec<Vec<String>>) -> Result<Vec<QaRow>, TableError> {
    check_columns(&rows, 2)?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let mut cells = row.into_iter();
            QaRow::new(cells.next().unwrap_or_default(), cells.next().unwrap_or_default())
        })
        .collect())
}

/// Convert three-column rows into comparison input rows
pub fn comparison_rows(rows: Vec<Vec<String>>) -> Result<Vec<ComparisonRow>, TableError> {
    check_columns(&rows, 3)?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let mut cells = row.into_iter();
            ComparisonRow::new(
                cells.next().unwrap_or_default(),
                cells.next().unwrap_or_default(),
                cells.next().unwrap_or_default(),
            )
        })
        .collect())
}

fn clean_cell(cell: &str) -> String {
    cell.replace("\r\n", " ").replace(['\t', '\r', '\n'], " ")
}

fn write_line<W: Write, S: AsRef<str>>(writer: &mut W, cells: &[S]) -> io::Result<()> {
    let line: Vec<String> = cells.iter().map(|c| clean_cell(c.as_ref())).collect();
    writeln!(writer, "{}", line.join("\t"))
}

/// Write records as TSV with a header row
pub fn write_records<R: TableRecord, W: Write>(records: &[R], mut writer: W) -> io::Result<()> {
    write_line(&mut writer, R::header().as_slice())?;
    for record in records {
        write_line(&mut writer, record.cells().as_slice())?;
    }
    writer.flush()
}

/// Write aligned source/target pairs as TSV with a header row
pub fn write_pairs<'a, I, W>(pairs: I, mut writer: W) -> io::Result<()>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
    W: Write,
{
    write_line(&mut writer, &["source", "target"])?;
    for (source, target) in pairs {
        write_line(&mut writer, &[source, target])?;
    }
    writer.flush()
}
