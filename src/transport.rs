//! Request transport and the header-injecting wrapper used for every
//! upstream call.

use crate::config::Credentials;
use crate::error::GaugesError;
use log::debug;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CONNECTION, COOKIE, HeaderMap, HeaderName, HeaderValue, REFERER,
    USER_AGENT,
};
use reqwest::{Client as HttpClient, Request, Response};
use std::future::Future;

const ACCEPT_VALUE: &str = "application/json, text/javascript, */*; q=0.01";
const ACCEPT_LANGUAGE_VALUE: &str = "en-us";
const USER_AGENT_VALUE: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_6) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/13.1.2 Safari/605.1.15";
const REFERER_VALUE: &str = "https://secure.gaug.es/dashboard";

pub const X_CSRF_TOKEN: &str = "x-csrf-token";
pub const X_REQUESTED_WITH: &str = "x-requested-with";

/// Sends a request and yields the response.
pub trait Transport {
    fn execute(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Response, reqwest::Error>> + Send;
}

impl Transport for HttpClient {
    fn execute(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Response, reqwest::Error>> + Send {
        HttpClient::execute(self, request)
    }
}

/// Wraps a transport and stamps the browser session headers onto every
/// request before handing it on.
#[derive(Debug, Clone)]
pub struct AuthenticatedTransport<T = HttpClient> {
    headers: HeaderMap,
    inner: T,
}

impl<T> AuthenticatedTransport<T> {
    pub fn new(credentials: &Credentials, inner: T) -> Result<Self, GaugesError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(REFERER, HeaderValue::from_static(REFERER_VALUE));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(
            HeaderName::from_static(X_REQUESTED_WITH),
            HeaderValue::from_static("XMLHttpRequest"),
        );

        if !credentials.cookie().is_empty() {
            let mut cookie = HeaderValue::from_str(credentials.cookie())?;
            cookie.set_sensitive(true);
            headers.insert(COOKIE, cookie);
        }
        if !credentials.csrf_token().is_empty() {
            let mut token = HeaderValue::from_str(credentials.csrf_token())?;
            token.set_sensitive(true);
            headers.insert(HeaderName::from_static(X_CSRF_TOKEN), token);
        }

        Ok(Self { headers, inner })
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Replace any same-named headers on `request` with the session set.
    pub fn authorize(&self, request: &mut Request) {
        request.headers_mut().extend(self.headers.clone());
    }
}

impl<T: Transport> Transport for AuthenticatedTransport<T> {
    fn execute(
        &self,
        mut request: Request,
    ) -> impl Future<Output = Result<Response, reqwest::Error>> + Send {
        self.authorize(&mut request);
        debug!("Injected {} session headers", self.headers.len());
        self.inner.execute(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    fn transport(cookie: &str, token: &str) -> AuthenticatedTransport<()> {
        let creds = Credentials::new(cookie, token).unwrap();
        AuthenticatedTransport::new(&creds, ()).expect("headers should build")
    }

    #[test]
    fn injects_session_headers() {
        let transport = transport("_gauges_session=abc", "tok123");
        let url = "https://secure.gaug.es/gauges/embedded".parse().unwrap();
        let mut request = Request::new(Method::GET, url);
        request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("text/html"));

        transport.authorize(&mut request);

        let headers = request.headers();
        assert_eq!(headers[COOKIE], "_gauges_session=abc");
        assert_eq!(headers[X_CSRF_TOKEN], "tok123");
        assert_eq!(headers[X_REQUESTED_WITH], "XMLHttpRequest");
        assert_eq!(headers[REFERER], REFERER_VALUE);
        assert_eq!(headers.get_all(ACCEPT).iter().count(), 1);
        assert_eq!(headers[ACCEPT], ACCEPT_VALUE);
        assert!(headers[COOKIE].is_sensitive());
    }

    #[test]
    fn skips_empty_credential_headers() {
        let transport = transport("", "tok123");
        assert!(transport.headers().get(COOKIE).is_none());
        assert_eq!(transport.headers()[X_CSRF_TOKEN], "tok123");
    }

    #[test]
    fn rejects_credentials_that_are_not_header_safe() {
        let creds = Credentials::new("bad\ncookie", "").unwrap();
        let err = AuthenticatedTransport::new(&creds, ()).unwrap_err();
        assert!(matches!(err, GaugesError::InvalidHeader(_)));
    }
}
