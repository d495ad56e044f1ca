//! URL checks applied before a request leaves the process.

/// Error type for URL validation failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("missing host: {0}")]
    MissingHost(String),
}

/// Check that a resolved URL can be fetched over HTTP.
///
/// Only `http` and `https` with a host are accepted. Cache keys are built by
/// the router, so the URL itself is never rewritten here.
pub fn validate(url: &url::Url) -> Result<(), UrlError> {
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::MissingHost(url.to_string()));
    }

    Ok(())
}
