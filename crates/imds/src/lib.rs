//! Polls a cloud Instance Metadata Service for pending termination notices.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scuttle_termination::{Platform, TerminationSource};
use tracing::{debug, info};

static IMDS_BASE_URL: &str = "http://169.254.169.254";
static AWS_SPOT_ACTION_PATH: &str = "/latest/meta-data/spot/instance-action";
static AZURE_SCHEDULED_EVENTS_PATH: &str = "/metadata/scheduledevents?api-version=2019-01-01";

/// Default upper bound on a single metadata request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

const fn metadata_path(platform: Platform) -> Option<&'static str> {
    match platform {
        Platform::Aws => Some(AWS_SPOT_ACTION_PATH),
        Platform::Azure => Some(AZURE_SCHEDULED_EVENTS_PATH),
        Platform::None => None,
    }
}

/// Checks the platform's metadata endpoint for a termination notice.
///
/// A `200 OK` means a notice is pending. Any other status, a timeout or a
/// transport error means it is not.
#[derive(Clone, Debug)]
pub struct MetadataPoller {
    client: Client,
    endpoint: String,
    platform: Platform,
}

impl MetadataPoller {
    /// Creates a poller for `platform` against the link-local metadata service.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The platform has no metadata endpoint
    /// - The HTTP client cannot be constructed
    pub fn new(platform: Platform) -> Result<Self> {
        Self::with_base_url(platform, IMDS_BASE_URL)
    }

    /// Creates a poller for `platform` against a metadata service at `base_url`.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The platform has no metadata endpoint
    /// - The HTTP client cannot be constructed
    pub fn with_base_url(platform: Platform, base_url: &str) -> Result<Self> {
        let path = metadata_path(platform).ok_or(Error::NoMetadataEndpoint(platform))?;

        Ok(Self {
            client: Self::client(DEFAULT_TIMEOUT)?,
            endpoint: format!("{}{path}", base_url.trim_end_matches('/')),
            platform,
        })
    }

    /// Replaces the per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Self::client(timeout)?;
        Ok(self)
    }

    /// The URL polled for notices.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The platform this poller watches.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Queries the metadata endpoint once and returns the response status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or times out.
    pub async fn check(&self) -> Result<StatusCode> {
        let response = self
            .client
            .get(&self.endpoint)
            // Required by Azure, ignored by AWS.
            .header("Metadata", "true")
            .send()
            .await?;

        Ok(response.status())
    }

    fn client(timeout: Duration) -> Result<Client> {
        Ok(Client::builder().timeout(timeout).build()?)
    }
}

#[async_trait]
impl TerminationSource for MetadataPoller {
    fn name(&self) -> &'static str {
        self.platform.as_str()
    }

    async fn is_pending(&self) -> bool {
        debug!(platform = %self.platform, "check for termination notices");

        match self.check().await {
            Ok(StatusCode::OK) => {
                info!(platform = %self.platform, "instance interruption notice!");
                true
            }
            Ok(status) => {
                debug!(status = status.as_u16(), "metadata status code");
                false
            }
            Err(e) => {
                debug!(error = %e, "metadata error");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::Router;
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::get;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{addr}")
    }

    async fn notice(headers: HeaderMap) -> AxumStatus {
        match headers.get("metadata").and_then(|v| v.to_str().ok()) {
            Some("true") => AxumStatus::OK,
            _ => AxumStatus::BAD_REQUEST,
        }
    }

    async fn slow() -> AxumStatus {
        tokio::time::sleep(Duration::from_secs(5)).await;
        AxumStatus::OK
    }

    #[test]
    fn test_endpoints() {
        let aws = MetadataPoller::new(Platform::Aws).unwrap();
        assert_eq!(
            aws.endpoint(),
            "http://169.254.169.254/latest/meta-data/spot/instance-action"
        );

        let azure = MetadataPoller::new(Platform::Azure).unwrap();
        assert_eq!(
            azure.endpoint(),
            "http://169.254.169.254/metadata/scheduledevents?api-version=2019-01-01"
        );
    }

    #[test]
    fn test_no_endpoint_without_platform() {
        let err = MetadataPoller::new(Platform::None).unwrap_err();
        assert!(matches!(err, Error::NoMetadataEndpoint(Platform::None)));
    }

    #[tokio::test]
    async fn test_ok_status_is_pending() {
        let base = serve(Router::new().route(AWS_SPOT_ACTION_PATH, get(notice))).await;
        let poller = MetadataPoller::with_base_url(Platform::Aws, &base).unwrap();

        assert!(poller.is_pending().await);
    }

    #[tokio::test]
    async fn test_not_found_is_not_pending() {
        // AWS answers 404 until an interruption is scheduled.
        let base = serve(Router::new()).await;
        let poller = MetadataPoller::with_base_url(Platform::Aws, &base).unwrap();

        assert_eq!(poller.check().await.unwrap(), StatusCode::NOT_FOUND);
        assert!(!poller.is_pending().await);
    }

    #[tokio::test]
    async fn test_azure_query_reaches_scheduled_events() {
        let base = serve(Router::new().route("/metadata/scheduledevents", get(notice))).await;
        let poller = MetadataPoller::with_base_url(Platform::Azure, &base).unwrap();

        assert!(poller.is_pending().await);
    }

    #[tokio::test]
    async fn test_slow_endpoint_is_not_pending() {
        let base = serve(Router::new().route(AWS_SPOT_ACTION_PATH, get(slow))).await;
        let poller = MetadataPoller::with_base_url(Platform::Aws, &base)
            .unwrap()
            .with_timeout(Duration::from_millis(100))
            .unwrap();

        let started = std::time::Instant::now();
        assert!(!poller.is_pending().await);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_not_pending() {
        let poller = MetadataPoller::with_base_url(Platform::Aws, "http://127.0.0.1:1").unwrap();

        assert!(poller.check().await.is_err());
        assert!(!poller.is_pending().await);
    }
}
