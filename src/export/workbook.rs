//! In-memory workbook model
//!
//! An artifact is read completely with `calamine`, edited in memory, and
//! written back completely with `rust_xlsxwriter`. Sheets whose first row is
//! the listing header get the listing column layout and styling on write;
//! any other sheet is written back cell for cell.

use crate::export::types::{ExportError, ExportResult};
use calamine::{open_workbook, Data, Reader, Xlsx};
use regex::Regex;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatUnderline, Formula, Workbook, Worksheet};
use std::path::Path;
use std::sync::OnceLock;

/// Header of a listing sheet
pub const LISTING_HEADERS: [&str; 4] = ["Назва товару", "Ціна", "Наявність", "Посилання"];

/// Display text of every product link
pub const LINK_LABEL: &str = "Перейти до товару";

const COLUMN_WIDTHS: [f64; 4] = [80.0, 15.0, 20.0, 60.0];
const HEADER_FILL: u32 = 0x366092;
const STRIPE_FILL: u32 = 0xF2F2F2;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Longest string literal a formula may carry
const MAX_FORMULA_LITERAL_CHARS: usize = 255;

static RE_HYPERLINK: OnceLock<Regex> = OnceLock::new();
static RE_STRING_LITERAL: OnceLock<Regex> = OnceLock::new();

fn hyperlink_regex() -> &'static Regex {
    RE_HYPERLINK.get_or_init(|| {
        Regex::new(
            r#"(?is)^=?\s*HYPERLINK\(\s*((?:"(?:[^"]|"")*"\s*&\s*)*"(?:[^"]|"")*")\s*,\s*"((?:[^"]|"")*)"\s*\)\s*$"#,
        )
        .unwrap()
    })
}

fn string_literal_regex() -> &'static Regex {
    RE_STRING_LITERAL.get_or_init(|| Regex::new(r#""((?:[^"]|"")*)""#).unwrap())
}

/// One cell of the in-memory model
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Clickable link stored as a `HYPERLINK` formula
    Link { url: String, label: String },
    /// Any other formula, kept with its cached result
    Formula { formula: String, result: String },
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Text a reader would see in the cell
    pub fn display_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(text) => Some(text.clone()),
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Link { label, .. } => Some(label.clone()),
            CellValue::Formula { result, .. } => Some(result.clone()),
        }
    }

    fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
        }
    }

    /// Interprets a formula read back from a file
    fn from_formula(formula: &str, cached: &CellValue) -> Self {
        let result = cached.display_text().unwrap_or_default();

        match hyperlink_regex().captures(formula) {
            Some(caps) => CellValue::Link {
                url: string_literal_regex()
                    .captures_iter(&caps[1])
                    .map(|part| part[1].replace("\"\"", "\""))
                    .collect(),
                label: caps[2].replace("\"\"", "\""),
            },
            None => CellValue::Formula {
                formula: formula.to_string(),
                result,
            },
        }
    }
}

/// `HYPERLINK` formula text for a link cell
///
/// Formula string literals are capped at 255 characters, so a longer URL
/// is written as a `"..."&"..."` concatenation.
pub fn hyperlink_formula(url: &str, label: &str) -> String {
    format!(
        "=HYPERLINK({},\"{}\")",
        formula_string(url),
        label.replace('"', "\"\"")
    )
}

/// Quoted formula string, split into literals that respect the length cap
fn formula_string(value: &str) -> String {
    let mut literals = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for ch in value.chars() {
        let width = if ch == '"' { 2 } else { 1 };
        if current_len + width > MAX_FORMULA_LITERAL_CHARS {
            literals.push(format!("\"{}\"", current));
            current.clear();
            current_len = 0;
        }
        if ch == '"' {
            current.push_str("\"\"");
        } else {
            current.push(ch);
        }
        current_len += width;
    }
    literals.push(format!("\"{}\"", current));

    literals.join("&")
}

/// One worksheet as a grid of rows
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// A sheet holding only the listing header
    pub fn with_listing_header(name: impl Into<String>) -> Self {
        let mut sheet = Self::new(name);
        sheet.push_row(LISTING_HEADERS.iter().map(|h| CellValue::text(*h)).collect());
        sheet
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Rows below the header row
    pub fn data_rows(&self) -> &[Vec<CellValue>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when the first row is the listing header
    pub fn is_listing_sheet(&self) -> bool {
        self.rows.first().is_some_and(|header| {
            header.len() >= LISTING_HEADERS.len()
                && LISTING_HEADERS
                    .iter()
                    .zip(header)
                    .all(|(expected, cell)| cell.display_text().as_deref() == Some(*expected))
        })
    }

    fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if self.rows.len() <= row {
            self.rows.resize(row + 1, Vec::new());
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;
    }

    fn get(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// Every sheet of one artifact, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactBook {
    sheets: Vec<Sheet>,
}

impl ArtifactBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every sheet and cell of an existing file
    pub fn read(path: &Path) -> ExportResult<Self> {
        let read_error = |message: String| ExportError::Read {
            path: path.to_path_buf(),
            message,
        };

        let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| read_error(format!("{}", e)))?;
        let mut book = Self::new();

        for name in workbook.sheet_names() {
            let values = workbook
                .worksheet_range(&name)
                .map_err(|e| read_error(format!("sheet '{}': {}", name, e)))?;

            let mut sheet = Sheet::new(name.clone());

            if let Some((start_row, start_col)) = values.start() {
                for (row, col, data) in values.used_cells() {
                    sheet.set(
                        start_row as usize + row,
                        start_col as usize + col,
                        CellValue::from_data(data),
                    );
                }
            }

            // Formulas live in a separate range; links are recovered from them
            match workbook.worksheet_formula(&name) {
                Ok(formulas) => {
                    if let Some((start_row, start_col)) = formulas.start() {
                        for (row, col, formula) in formulas.used_cells() {
                            if formula.is_empty() {
                                continue;
                            }
                            let (row, col) = (start_row as usize + row, start_col as usize + col);
                            let value = CellValue::from_formula(formula, sheet.get(row, col));
                            sheet.set(row, col, value);
                        }
                    }
                }
                Err(e) => tracing::warn!("Could not read formulas of sheet '{}': {}", name, e),
            }

            book.sheets.push(sheet);
        }

        tracing::debug!("Read {} sheets from {}", book.sheets.len(), path.display());
        Ok(book)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// The named sheet, created with a listing header when missing or blank
    ///
    /// Returns the sheet and whether it had to be created or initialized.
    pub fn listing_sheet_mut(&mut self, name: &str) -> (&mut Sheet, bool) {
        let index = match self.sheets.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.sheets.push(Sheet::new(name));
                self.sheets.len() - 1
            }
        };

        let sheet = &mut self.sheets[index];
        let initialized = sheet.is_empty();
        if initialized {
            *sheet = Sheet::with_listing_header(name);
        }
        (sheet, initialized)
    }

    /// Writes every sheet to `path`, replacing the file
    pub fn save(&self, path: &Path) -> ExportResult<()> {
        let mut workbook = Workbook::new();
        let styles = ListingStyles::new();

        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;

            if sheet.is_listing_sheet() {
                write_listing_sheet(worksheet, sheet, &styles)?;
            } else {
                write_plain_sheet(worksheet, sheet)?;
            }
        }

        workbook.save(path)?;
        tracing::debug!("Saved {} sheets to {}", self.sheets.len(), path.display());
        Ok(())
    }
}

/// Formats of the listing layout
struct ListingStyles {
    header: Format,
    columns: Vec<Format>,
    striped: Vec<Format>,
}

impl ListingStyles {
    fn new() -> Self {
        let columns: Vec<Format> = (0..LISTING_HEADERS.len()).map(column_format).collect();
        let striped = columns
            .iter()
            .map(|f| f.clone().set_background_color(Color::RGB(STRIPE_FILL)))
            .collect();

        Self {
            header: Format::new()
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(HEADER_FILL))
                .set_align(FormatAlign::Center),
            columns,
            striped,
        }
    }

    /// Format of a cell; spreadsheet rows are 1-based, so odd indices are even rows
    fn cell(&self, row: usize, col: usize) -> Option<&Format> {
        if row == 0 {
            return Some(&self.header);
        }
        let formats = if row % 2 == 1 { &self.striped } else { &self.columns };
        formats.get(col)
    }
}

fn column_format(col: usize) -> Format {
    match col {
        1 => Format::new().set_align(FormatAlign::Right),
        2 => Format::new().set_align(FormatAlign::Center),
        3 => Format::new()
            .set_font_color(Color::Blue)
            .set_underline(FormatUnderline::Single)
            .set_align(FormatAlign::Center),
        _ => Format::new(),
    }
}

fn write_listing_sheet(
    worksheet: &mut Worksheet,
    sheet: &Sheet,
    styles: &ListingStyles,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    for (row, cells) in sheet.rows().iter().enumerate() {
        let width = cells.len().max(if row == 0 { 0 } else { LISTING_HEADERS.len() });
        for col in 0..width {
            let cell = cells.get(col).unwrap_or(&EMPTY_CELL);
            write_cell(worksheet, row as u32, col as u16, cell, styles.cell(row, col))?;
        }
    }
    Ok(())
}

fn write_plain_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<(), rust_xlsxwriter::XlsxError> {
    for (row, cells) in sheet.rows().iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            write_cell(worksheet, row as u32, col as u16, cell, None)?;
        }
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    format: Option<&Format>,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match (cell, format) {
        (CellValue::Empty, Some(format)) => {
            worksheet.write_blank(row, col, format)?;
        }
        (CellValue::Empty, None) => {}
        (CellValue::Text(text), Some(format)) => {
            worksheet.write_string_with_format(row, col, text, format)?;
        }
        (CellValue::Text(text), None) => {
            worksheet.write_string(row, col, text)?;
        }
        (CellValue::Number(n), Some(format)) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        (CellValue::Number(n), None) => {
            worksheet.write_number(row, col, *n)?;
        }
        (CellValue::Bool(b), Some(format)) => {
            worksheet.write_boolean_with_format(row, col, *b, format)?;
        }
        (CellValue::Bool(b), None) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        (CellValue::Link { url, label }, format) => {
            let formula = Formula::new(hyperlink_formula(url, label)).set_result(label);
            match format {
                Some(format) => worksheet.write_formula_with_format(row, col, formula, format)?,
                None => worksheet.write_formula(row, col, formula)?,
            };
        }
        (CellValue::Formula { formula, result }, format) => {
            let formula = Formula::new(formula).set_result(result);
            match format {
                Some(format) => worksheet.write_formula_with_format(row, col, formula, format)?,
                None => worksheet.write_formula(row, col, formula)?,
            };
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_hyperlink_formula_escapes_quotes() {
        assert_eq!(
            hyperlink_formula("https://site/a?q=\"x\"", LINK_LABEL),
            "=HYPERLINK(\"https://site/a?q=\"\"x\"\"\",\"Перейти до товару\")"
        );
    }

    #[test]
    fn test_long_url_split_into_short_literals() {
        let url = format!("https://site/uk/obyavlenie/{}", "a".repeat(300));
        let formula = hyperlink_formula(&url, LINK_LABEL);

        let literals: Vec<_> = string_literal_regex()
            .captures_iter(&formula)
            .map(|caps| caps[1].chars().count())
            .collect();
        assert_eq!(literals.len(), 3);
        assert!(literals.iter().all(|len| *len <= MAX_FORMULA_LITERAL_CHARS));
        assert!(formula.contains("\"&\""));

        let cell = CellValue::from_formula(&formula, &CellValue::text(LINK_LABEL));
        assert_eq!(
            cell,
            CellValue::Link {
                url,
                label: LINK_LABEL.to_string(),
            }
        );
    }

    #[test]
    fn test_split_never_breaks_escaped_quote() {
        let url = format!("{}\"tail", "b".repeat(254));
        let formula = hyperlink_formula(&url, LINK_LABEL);
        assert!(formula.starts_with(&format!("=HYPERLINK(\"{}\"&\"\"\"tail\"", "b".repeat(254))));

        let cell = CellValue::from_formula(&formula, &CellValue::Empty);
        assert!(matches!(cell, CellValue::Link { url: ref recovered, .. } if *recovered == url));
    }

    #[test]
    fn test_link_recovered_from_formula() {
        let formula = hyperlink_formula("https://site/a?q=\"x\"", LINK_LABEL);
        let cell = CellValue::from_formula(
            formula.trim_start_matches('='),
            &CellValue::text(LINK_LABEL),
        );
        assert_eq!(
            cell,
            CellValue::Link {
                url: "https://site/a?q=\"x\"".to_string(),
                label: LINK_LABEL.to_string(),
            }
        );
    }

    #[test]
    fn test_other_formula_kept() {
        let cell = CellValue::from_formula("SUM(B2:B9)", &CellValue::Number(12.0));
        assert_eq!(
            cell,
            CellValue::Formula {
                formula: "SUM(B2:B9)".to_string(),
                result: "12".to_string(),
            }
        );
    }

    #[test]
    fn test_listing_sheet_detection() {
        assert!(Sheet::with_listing_header("A").is_listing_sheet());
        assert!(!Sheet::new("A").is_listing_sheet());

        let mut other = Sheet::new("B");
        other.push_row(vec![CellValue::text("id"), CellValue::text("value")]);
        assert!(!other.is_listing_sheet());
        assert!(other.data_rows().is_empty());
    }

    #[test]
    fn test_listing_sheet_mut_initializes_once() {
        let mut book = ArtifactBook::new();
        let (sheet, initialized) = book.listing_sheet_mut("Авто");
        assert!(initialized);
        sheet.push_row(vec![CellValue::text("Car")]);

        let (sheet, initialized) = book.listing_sheet_mut("Авто");
        assert!(!initialized);
        assert_eq!(sheet.data_rows().len(), 1);
        assert_eq!(book.sheets().len(), 1);
    }

    #[test]
    fn test_save_and_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("book.xlsx");

        let mut book = ArtifactBook::new();
        let (sheet, _) = book.listing_sheet_mut("Авто");
        sheet.push_row(vec![
            CellValue::text("Volvo XC60"),
            CellValue::text("15000"),
            CellValue::text("✅ В наявності"),
            CellValue::Link {
                url: "https://www.olx.ua/uk/obyavlenie/volvo-ID1.html".to_string(),
                label: LINK_LABEL.to_string(),
            },
        ]);

        let mut notes = Sheet::new("Notes");
        notes.push_row(vec![CellValue::text("kept"), CellValue::Number(3.0)]);
        book.sheets.push(notes);

        book.save(&path).unwrap();
        let reread = ArtifactBook::read(&path).unwrap();

        assert_eq!(reread.sheets().len(), 2);
        let sheet = reread.sheet("Авто").unwrap();
        assert!(sheet.is_listing_sheet());
        assert_eq!(sheet.data_rows().len(), 1);
        assert_eq!(sheet.data_rows()[0][0], CellValue::text("Volvo XC60"));
        assert_eq!(
            sheet.data_rows()[0][3],
            CellValue::Link {
                url: "https://www.olx.ua/uk/obyavlenie/volvo-ID1.html".to_string(),
                label: LINK_LABEL.to_string(),
            }
        );

        let notes = reread.sheet("Notes").unwrap();
        assert_eq!(notes.rows()[0], vec![CellValue::text("kept"), CellValue::Number(3.0)]);
    }

    #[test]
    fn test_read_garbage_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();

        assert!(matches!(
            ArtifactBook::read(&path),
            Err(ExportError::Read { .. })
        ));
    }
}
