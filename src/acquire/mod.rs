//! Upstream acquisition: transport routes, row location strategies, field
//! extraction and the persisted snapshot.

pub mod extract;
pub mod pipeline;
pub mod profile;
pub mod route;
pub mod snapshot;
pub mod strategy;
pub mod transport;

pub use extract::{ColumnLayout, RawFields, extract_fields, numeric_tokens, parse_percent};
pub use pipeline::{
    AcquisitionPipeline, AcquisitionReport, AttemptOutcome, DEFAULT_ROUTE_TIMEOUT, RouteAttempt,
};
pub use profile::InstrumentProfile;
pub use route::{RouteEncoding, TransportRoute, default_routes};
pub use snapshot::{SnapshotFallback, YieldSnapshot};
pub use strategy::{
    DataRow, DocumentScanStrategy, ParseStrategy, SymbolRowStrategy, TableRowScanStrategy,
    default_strategies,
};
pub use transport::{HttpTransport, Transport};
