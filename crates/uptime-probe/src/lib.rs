//! Single-shot HTTP availability checks.
//!
//! A probe issues one GET against the monitored URL and classifies the
//! result. Only an HTTP error status counts as downtime; transport failures
//! (DNS, refused connections, timeouts) are reported as inconclusive so a
//! flaky local network never resets a streak.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;

/// Default request timeout for a probe.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Classified result of one probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Healthy { status: u16 },
    Unhealthy { status: u16 },
    Inconclusive { reason: String },
}

impl ProbeOutcome {
    pub fn is_unhealthy(&self) -> bool {
        matches!(self, Self::Unhealthy { .. })
    }

    /// Classify a final response status (after redirects).
    pub fn from_status(status: StatusCode) -> Self {
        if status.as_u16() >= 400 {
            Self::Unhealthy {
                status: status.as_u16(),
            }
        } else {
            Self::Healthy {
                status: status.as_u16(),
            }
        }
    }
}

/// Error type for the uptime-probe crate.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid target URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

/// Validate that a probe target is an absolute http(s) URL.
pub fn parse_target(raw: &str) -> Result<url::Url, ProbeError> {
    let url = url::Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ProbeError::UnsupportedScheme(other.to_string())),
    }
}

/// HTTP prober holding a reusable client.
#[derive(Clone)]
pub struct UptimeProber {
    http: reqwest::Client,
}

impl UptimeProber {
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("uptime-streak/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Issue one GET and classify it. Never retries.
    pub async fn probe(&self, url: &str) -> ProbeOutcome {
        let resp = match self.http.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                let reason = describe_transport_error(&e);
                tracing::warn!(url, reason = %reason, "Probe inconclusive");
                return ProbeOutcome::Inconclusive { reason };
            }
        };

        let outcome = ProbeOutcome::from_status(resp.status());
        match &outcome {
            ProbeOutcome::Unhealthy { status } => {
                tracing::warn!(url, status, "Probe got error status");
            }
            _ => tracing::debug!(url, status = resp.status().as_u16(), "Probe healthy"),
        }
        outcome
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timeout: {e}")
    } else if e.is_connect() {
        format!("connect: {e}")
    } else if e.is_builder() {
        format!("request: {e}")
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::Router;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;

    use super::*;

    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn test_app() -> Router {
        Router::new()
            .route("/ok", get(|| async { "up" }))
            .route("/missing", get(|| async { AxumStatus::NOT_FOUND }))
            .route("/broken", get(|| async { AxumStatus::SERVICE_UNAVAILABLE }))
            .route(
                "/moved",
                get(|| async { axum::response::Redirect::temporary("/broken") }),
            )
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            )
    }

    #[test]
    fn status_classification() {
        assert_eq!(
            ProbeOutcome::from_status(StatusCode::OK),
            ProbeOutcome::Healthy { status: 200 }
        );
        assert_eq!(
            ProbeOutcome::from_status(StatusCode::NOT_MODIFIED),
            ProbeOutcome::Healthy { status: 304 }
        );
        assert!(ProbeOutcome::from_status(StatusCode::BAD_REQUEST).is_unhealthy());
        assert!(ProbeOutcome::from_status(StatusCode::BAD_GATEWAY).is_unhealthy());
    }

    #[test]
    fn parse_target_rejects_non_http() {
        assert!(parse_target("https://www.cian.ru/").is_ok());
        assert!(matches!(
            parse_target("ftp://example.com/"),
            Err(ProbeError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            parse_target("not a url"),
            Err(ProbeError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn probe_classifies_live_responses() {
        let addr = serve(test_app()).await;
        let prober = UptimeProber::new(Duration::from_secs(2)).unwrap();

        assert_eq!(
            prober.probe(&format!("http://{addr}/ok")).await,
            ProbeOutcome::Healthy { status: 200 }
        );
        assert_eq!(
            prober.probe(&format!("http://{addr}/missing")).await,
            ProbeOutcome::Unhealthy { status: 404 }
        );
        assert_eq!(
            prober.probe(&format!("http://{addr}/broken")).await,
            ProbeOutcome::Unhealthy { status: 503 }
        );
    }

    #[tokio::test]
    async fn probe_follows_redirects() {
        let addr = serve(test_app()).await;
        let prober = UptimeProber::new(Duration::from_secs(2)).unwrap();

        assert_eq!(
            prober.probe(&format!("http://{addr}/moved")).await,
            ProbeOutcome::Unhealthy { status: 503 }
        );
    }

    #[tokio::test]
    async fn timeout_is_inconclusive() {
        let addr = serve(test_app()).await;
        let prober = UptimeProber::new(Duration::from_millis(200)).unwrap();

        let outcome = prober.probe(&format!("http://{addr}/slow")).await;
        assert!(matches!(outcome, ProbeOutcome::Inconclusive { .. }));
    }

    #[tokio::test]
    async fn refused_connection_is_inconclusive() {
        let addr = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let prober = UptimeProber::new(Duration::from_secs(2)).unwrap();

        let outcome = prober.probe(&format!("http://{addr}/")).await;
        assert!(matches!(outcome, ProbeOutcome::Inconclusive { .. }));
        assert!(!outcome.is_unhealthy());
    }
}
