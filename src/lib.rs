//! Export daily traffic from the Gauges analytics service.
//! Authenticates with a browser session, lists the account's gauges and
//! writes each month of traffic to its own CSV file.

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod output;
pub mod transport;

pub use client::{Client, Fetch};
pub use config::{ConfigFile, Credentials, Overrides, Settings};
pub use error::GaugesError;
pub use export::{ExportSummary, MonthExporter, RunSummary, list_sites};
pub use models::{DailyTraffic, SiteDescriptor, TrafficPage, decode_month_page, decode_profile};
pub use transport::{AuthenticatedTransport, Transport};
