use std::time::Duration;

use goi_core::error::AppError;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const HEALTH_TIMEOUT_MS: u64 = 800;

#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Create a client for an Ollama-compatible API.
    ///
    /// The base URL must be `http(s)://host[:port]` with no userinfo and no path.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        validate_base_url(&base_url)?;
        Ok(Self {
            base_url,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn health_check(&self) -> Result<(), AppError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = ureq::get(&url)
            .timeout(Duration::from_millis(HEALTH_TIMEOUT_MS))
            .call();

        match resp {
            Ok(r) if r.status() == 200 => Ok(()),
            Ok(r) => Err(
                AppError::new("AI_BACKEND_UNHEALTHY", "Generative backend health check failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(ureq::Error::Status(status, _)) => Err(
                AppError::new("AI_BACKEND_UNHEALTHY", "Generative backend health check failed")
                    .with_details(format!("status={status}")),
            ),
            Err(e) => Err(AppError::new(
                "AI_BACKEND_UNREACHABLE",
                "Failed to reach the generative backend",
            )
            .with_details(e.to_string())
            .with_retryable(true)),
        }
    }
}

fn validate_base_url(base_url: &str) -> Result<(), AppError> {
    let invalid = |reason: &str| {
        Err(AppError::new("AI_BACKEND_URL_INVALID", "Backend base URL is invalid")
            .with_details(format!("base_url={base_url}; reason={reason}")))
    };

    let rest = if let Some(r) = base_url.strip_prefix("http://") {
        r
    } else if let Some(r) = base_url.strip_prefix("https://") {
        r
    } else {
        return invalid("scheme must be http or https");
    };

    if rest.is_empty() {
        return invalid("missing host");
    }
    if rest.contains('@') {
        return invalid("userinfo is not allowed");
    }
    if rest.contains('/') || rest.contains('?') || rest.contains('#') {
        return invalid("path is not allowed");
    }

    // Bracketed IPv6 literal: [::1]:11434
    let (host, port) = if let Some(v6) = rest.strip_prefix('[') {
        let Some(end) = v6.find(']') else {
            return invalid("unterminated IPv6 literal");
        };
        let after = &v6[end + 1..];
        let port = match after.strip_prefix(':') {
            Some(p) => Some(p),
            None if after.is_empty() => None,
            None => return invalid("unexpected characters after IPv6 literal"),
        };
        (&v6[..end], port)
    } else {
        match rest.split_once(':') {
            Some((h, p)) => (h, Some(p)),
            None => (rest, None),
        }
    };

    if host.is_empty() {
        return invalid("missing host");
    }
    if let Some(p) = port {
        match p.parse::<u16>() {
            Ok(n) if n > 0 => {}
            _ => return invalid("port must be 1-65535"),
        }
    }
    Ok(())
}

/// Transport timeouts surface as io errors somewhere in the source chain.
pub(crate) fn is_timeout(err: &ureq::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ) {
                return true;
            }
        }
        source = e.source();
    }
    err.to_string().to_lowercase().contains("timed out")
}
