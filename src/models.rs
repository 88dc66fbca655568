use crate::error::GaugesError;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";
const MONTH_FORMAT: &str = "%Y-%m";

/// One monitored site as listed in the profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteDescriptor {
    pub id: Option<String>,
    pub title: String,
    pub traffic_url: String,
}

/// Aggregated traffic for a single day. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTraffic {
    pub date: String,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub views: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub people: u64,
}

/// One month of the traffic feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficPage {
    pub records: Vec<DailyTraffic>,
    pub older_url: Option<String>,
}

impl TrafficPage {
    /// `YYYY-MM` of the first record, or `None` for an empty page.
    pub fn month(&self) -> Result<Option<String>, GaugesError> {
        self.records
            .first()
            .map(|record| month_label(&record.date))
            .transpose()
    }
}

#[derive(Debug, Deserialize)]
struct Profile {
    gauges: Vec<RawGauge>,
}

#[derive(Debug, Deserialize)]
struct RawGauge {
    #[serde(default)]
    id: Option<String>,
    title: String,
    urls: RawGaugeUrls,
}

#[derive(Debug, Deserialize)]
struct RawGaugeUrls {
    traffic: String,
}

#[derive(Debug, Deserialize)]
struct RawMonthPage {
    data: RawPageData,
    #[serde(default)]
    urls: Option<RawPageUrls>,
}

#[derive(Debug, Deserialize)]
struct RawPageData {
    month: RawPeriod,
}

#[derive(Debug, Deserialize)]
struct RawPeriod {
    traffic: Vec<DailyTraffic>,
}

#[derive(Debug, Deserialize)]
struct RawPageUrls {
    #[serde(default)]
    older: Option<String>,
    #[serde(default)]
    month: Option<RawNavigation>,
}

#[derive(Debug, Deserialize)]
struct RawNavigation {
    #[serde(default)]
    older: Option<String>,
}

impl RawPageUrls {
    /// The top-level `older` link is followed first, `month.older` is the
    /// fallback. An empty `month.older` ends pagination either way.
    fn older_month(self) -> Option<String> {
        let month_older = self
            .month
            .map(|month| month.older.filter(|url| !url.is_empty()));
        if let Some(None) = month_older {
            return None;
        }
        self.older
            .filter(|url| !url.is_empty())
            .or(month_older.flatten())
    }
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<u64> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default())
}

impl From<RawGauge> for SiteDescriptor {
    fn from(raw: RawGauge) -> Self {
        SiteDescriptor {
            id: raw.id,
            title: raw.title,
            traffic_url: raw.urls.traffic,
        }
    }
}

/// Format the calendar month of a `YYYY-MM-DD` date as `YYYY-MM`.
pub fn month_label(date: &str) -> Result<String, GaugesError> {
    let parsed =
        NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|source| GaugesError::InvalidDate {
            value: date.to_string(),
            source,
        })?;
    Ok(parsed.format(MONTH_FORMAT).to_string())
}

pub fn decode_profile(data: &[u8]) -> Result<Vec<SiteDescriptor>, GaugesError> {
    let parsed: Profile = serde_json::from_slice(data)?;
    let sites: Vec<SiteDescriptor> = parsed.gauges.into_iter().map(Into::into).collect();
    debug!("Parsed {} gauges from profile", sites.len());
    Ok(sites)
}

pub fn decode_month_page(data: &[u8]) -> Result<TrafficPage, GaugesError> {
    let parsed: RawMonthPage = serde_json::from_slice(data)?;
    let page = TrafficPage {
        records: parsed.data.month.traffic,
        older_url: parsed.urls.and_then(RawPageUrls::older_month),
    };
    debug!(
        "Parsed {} daily records, older page: {}",
        page.records.len(),
        page.older_url.is_some()
    );
    Ok(page)
}
