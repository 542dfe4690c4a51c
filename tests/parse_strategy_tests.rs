use std::time::Duration;

use async_trait::async_trait;
use chart_overlay::acquire::{
    AcquisitionPipeline, DocumentScanStrategy, InstrumentProfile, ParseStrategy,
    SymbolRowStrategy, TableRowScanStrategy, Transport,
};
use chart_overlay::core::ChangeSign;
use chart_overlay::error::{OverlayError, TransportError};
use scraper::Html;

struct Offline;

#[async_trait]
impl Transport for Offline {
    async fn get(&self, _url: &str, _timeout: Duration) -> Result<String, TransportError> {
        Err(TransportError::Request("offline".to_owned()))
    }
}

fn pipeline() -> AcquisitionPipeline<Offline> {
    AcquisitionPipeline::new(Offline, InstrumentProfile::us_10y()).expect("pipeline")
}

fn label() -> regex::Regex {
    InstrumentProfile::us_10y().label_regex().expect("label regex")
}

const QUOTE_TABLE: &str = r#"<html><body>
<table id="bonds">
  <tr><th>Name</th><th>Yield</th><th>Prev</th><th>Day</th><th>Weekly</th><th>Monthly</th><th>Date</th></tr>
  <tr data-symbol="USGG2YR:IND"><td>US 2Y</td><td>3.9800</td><td>3.99</td><td>-0.0100%</td><td></td><td></td><td>Oct/17</td></tr>
  <tr data-symbol="USGG10YR:IND"><td>US 10Y</td><td>4.2310</td><td>4.25</td><td>-0.0190%</td><td></td><td></td><td>Oct/17</td></tr>
</table>
</body></html>"#;

#[test]
fn symbol_row_strategy_uses_exact_identifier() {
    let document = Html::parse_document(QUOTE_TABLE);
    let row = SymbolRowStrategy::new("USGG10YR:IND")
        .expect("selector")
        .locate(&document)
        .expect("row");

    assert_eq!(row.cell(0), Some("US 10Y"));
    assert_eq!(row.cell(1), Some("4.2310"));
    assert_eq!(row.cell(3), Some("-0.0190%"));
    assert_eq!(row.cell(4), None);
}

#[test]
fn table_scan_skips_rows_for_other_maturities() {
    let page = r#"<table>
        <tr><td>United States 2 Year</td><td>3.98%</td></tr>
        <tr><td>United States 10 Year</td><td>4.23%</td><td>4.25%</td><td>+0.01%</td></tr>
        <tr><td>United States 30 Year</td><td>4.71%</td></tr>
    </table>"#;
    let row = TableRowScanStrategy::new(label())
        .locate(&Html::parse_document(page))
        .expect("row");
    assert_eq!(row.cell(0), Some("United States 10 Year"));
    assert_eq!(row.cell(1), Some("4.23%"));
}

#[test]
fn document_scan_walks_up_to_enclosing_row() {
    let page = r#"<table><tr><td><a href="/us10y"><span>US10Y</span></a></td><td>4.23</td></tr></table>"#;
    let row = DocumentScanStrategy::new(label())
        .locate(&Html::parse_document(page))
        .expect("row");
    assert_eq!(row.cells, vec!["US10Y".to_owned(), "4.23".to_owned()]);
}

#[test]
fn document_scan_falls_back_to_first_row_of_table() {
    let page = r#"<table><caption>US 10 Year</caption>
        <tr><td>Yield</td><td>4.23</td></tr>
        <tr><td>Other</td><td>9.99</td></tr>
    </table>"#;
    let row = DocumentScanStrategy::new(label())
        .locate(&Html::parse_document(page))
        .expect("row");
    assert_eq!(row.cell(1), Some("4.23"));
}

#[test]
fn first_matching_strategy_wins() {
    let page = r#"<html><body>
        <table><tr><td>US 10 Year (delayed)</td><td>9.99</td></tr></table>
        <table><tr data-symbol="USGG10YR:IND"><td>US 10Y</td><td>4.23</td><td></td><td>0.01</td></tr></table>
    </body></html>"#;
    let (strategy, observation) = pipeline().parse_body(page).expect("parsed");
    assert_eq!(strategy, "symbol-row");
    assert_eq!(observation.value(), 4.23);
}

#[test]
fn free_text_reading_is_parsed_from_numeric_tokens() {
    let page = "<html><body><p>US 10 Year 4.23% -0.02%</p></body></html>";
    let (strategy, observation) = pipeline().parse_body(page).expect("parsed");

    assert_eq!(strategy, "document-scan");
    assert_eq!(observation.value(), 4.23);
    assert_eq!(observation.change(), -0.02);
    assert_eq!(observation.change_sign(), ChangeSign::Negative);
    assert!(
        observation
            .label()
            .starts_with("US 10Y Yield: 4.23%\nChange: -0.02%\nTime: "),
        "unexpected label {:?}",
        observation.label()
    );
}

#[test]
fn symbol_row_values_feed_the_observation() {
    let (strategy, observation) = pipeline().parse_body(QUOTE_TABLE).expect("parsed");
    assert_eq!(strategy, "symbol-row");
    assert_eq!(observation.value(), 4.231);
    assert_eq!(observation.change(), -0.019);
    assert_eq!(
        observation.label(),
        "US 10Y Yield: 4.2310\nChange: -0.0190%\nTime: Oct/17"
    );
}

#[test]
fn unparseable_value_is_a_hard_failure() {
    let page = r#"<table><tr data-symbol="USGG10YR:IND"><td>US 10Y</td><td>n/a</td></tr></table>"#;
    assert!(matches!(
        pipeline().parse_body(page),
        Err(OverlayError::ParseFailure(_))
    ));
}

#[test]
fn page_without_the_instrument_is_a_parse_failure() {
    let page = "<html><body><p>Markets are closed.</p></body></html>";
    assert!(matches!(
        pipeline().parse_body(page),
        Err(OverlayError::ParseFailure(_))
    ));
}
