use std::fmt::Debug;
use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{OverlayError, OverlayResult};

/// Row located in a fetched page: trimmed cell texts plus the whole row text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRow {
    pub cells: Vec<String>,
    pub text: String,
}

impl DataRow {
    #[must_use]
    pub fn from_element(row: ElementRef<'_>) -> Self {
        let cells = row
            .select(cell_selector())
            .map(|cell| collapse_whitespace(&cell.text().collect::<Vec<_>>().join(" ")))
            .collect();
        Self {
            cells,
            text: element_text(row),
        }
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells
            .get(index)
            .map(String::as_str)
            .filter(|cell| !cell.is_empty())
    }
}

/// One way of locating the quote row in a parsed page.
///
/// Strategies are pure and stateless; the pipeline tries them in order and
/// stops at the first match.
pub trait ParseStrategy: Send + Sync + Debug {
    fn name(&self) -> &str;
    fn locate(&self, document: &Html) -> Option<DataRow>;
}

/// Exact structural lookup: `tr[data-symbol="<symbol>"]`.
#[derive(Debug)]
pub struct SymbolRowStrategy {
    selector: Selector,
}

impl SymbolRowStrategy {
    pub fn new(symbol: &str) -> OverlayResult<Self> {
        let css = format!("tr[data-symbol=\"{}\"]", symbol.replace('"', "\\\""));
        let selector = Selector::parse(&css).map_err(|e| {
            OverlayError::Config(format!("invalid row selector `{css}`: {e}"))
        })?;
        Ok(Self { selector })
    }
}

impl ParseStrategy for SymbolRowStrategy {
    fn name(&self) -> &str {
        "symbol-row"
    }

    fn locate(&self, document: &Html) -> Option<DataRow> {
        document
            .select(&self.selector)
            .next()
            .map(DataRow::from_element)
    }
}

/// Scans every table row for the maturity label.
#[derive(Debug)]
pub struct TableRowScanStrategy {
    pattern: Regex,
}

impl TableRowScanStrategy {
    #[must_use]
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl ParseStrategy for TableRowScanStrategy {
    fn name(&self) -> &str {
        "table-row-scan"
    }

    fn locate(&self, document: &Html) -> Option<DataRow> {
        document
            .select(table_row_selector())
            .find(|row| self.pattern.is_match(&element_text(*row)))
            .map(DataRow::from_element)
    }
}

/// Scans every element's own text for the maturity label, then walks up to
/// the enclosing row (or the first row of the enclosing table).
///
/// Without any enclosing table the matching element itself stands in for the
/// row, leaving extraction to the text scan.
#[derive(Debug)]
pub struct DocumentScanStrategy {
    pattern: Regex,
}

impl DocumentScanStrategy {
    #[must_use]
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl ParseStrategy for DocumentScanStrategy {
    fn name(&self) -> &str {
        "document-scan"
    }

    fn locate(&self, document: &Html) -> Option<DataRow> {
        let hit = document
            .select(any_element_selector())
            .find(|element| self.pattern.is_match(&own_text(*element)))?;

        if let Some(row) = closest(hit, "tr") {
            return Some(DataRow::from_element(row));
        }
        if let Some(first_row) =
            closest(hit, "table").and_then(|table| table.select(table_row_cells_selector()).next())
        {
            return Some(DataRow::from_element(first_row));
        }
        Some(DataRow::from_element(hit))
    }
}

/// Default cascade: exact symbol row, table scan, whole-document scan.
pub fn default_strategies(symbol: &str, pattern: &Regex) -> OverlayResult<Vec<Box<dyn ParseStrategy>>> {
    Ok(vec![
        Box::new(SymbolRowStrategy::new(symbol)?),
        Box::new(TableRowScanStrategy::new(pattern.clone())),
        Box::new(DocumentScanStrategy::new(pattern.clone())),
    ])
}

fn closest<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find(|candidate| candidate.value().name() == tag)
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn own_text(element: ElementRef<'_>) -> String {
    let text: Vec<&str> = element
        .children()
        .filter_map(|child| child.value().as_text())
        .map(|text| &**text)
        .collect();
    collapse_whitespace(&text.join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn cell_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    CELL.get_or_init(|| Selector::parse("td").expect("valid selector"))
}

fn table_row_selector() -> &'static Selector {
    static TABLE_ROW: OnceLock<Selector> = OnceLock::new();
    TABLE_ROW.get_or_init(|| Selector::parse("table tr").expect("valid selector"))
}

fn table_row_cells_selector() -> &'static Selector {
    static ROW: OnceLock<Selector> = OnceLock::new();
    ROW.get_or_init(|| Selector::parse("tr").expect("valid selector"))
}

fn any_element_selector() -> &'static Selector {
    static BODY_ELEMENT: OnceLock<Selector> = OnceLock::new();
    BODY_ELEMENT.get_or_init(|| Selector::parse("body *").expect("valid selector"))
}
