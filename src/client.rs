use crate::config::{Credentials, DEFAULT_BASE_URL};
use crate::error::GaugesError;
use crate::transport::{AuthenticatedTransport, Transport};
use log::{debug, info};
use reqwest::{Client as HttpClient, Method, Request, StatusCode, Url};
use std::future::Future;
use std::time::Duration;

const PROFILE_PATH: &str = "/gauges/embedded";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Retrieves the raw body behind a URL.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, GaugesError>> + Send;
}

#[derive(Debug, Clone)]
pub struct Client<T = AuthenticatedTransport> {
    transport: T,
    base_url: String,
}

impl Client {
    /// Create a client that sends the given session with every request.
    pub fn new(credentials: &Credentials) -> Result<Self, GaugesError> {
        let http = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        let transport = AuthenticatedTransport::new(credentials, http)?;
        info!("Initialized Gauges client with default base URL");
        Ok(Self::with_transport(transport))
    }
}

impl<T> Client<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the base URL (useful for tests or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Updated Gauges base URL to {}", self.base_url);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the profile listing every gauge of the account.
    pub fn profile_url(&self) -> String {
        format!("{}{}", self.base_url, PROFILE_PATH)
    }

    fn handle_status(&self, status: StatusCode) -> Result<(), GaugesError> {
        if status.is_success() {
            return Ok(());
        }
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(GaugesError::Unauthorized(status))
            }
            _ => Err(GaugesError::Status(status)),
        }
    }
}

impl<T: Transport + Sync> Fetch for Client<T> {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, GaugesError> {
        let parsed = Url::parse(url).map_err(|_| GaugesError::InvalidUrl(url.to_string()))?;
        debug!("GET request to {}", parsed);
        let response = self
            .transport
            .execute(Request::new(Method::GET, parsed))
            .await?;
        debug!("Received status {}", response.status());
        self.handle_status(response.status())?;
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
