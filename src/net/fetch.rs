use url::Url;

/// Result of fetching a story page
#[derive(Clone)]
pub struct FetchResult {
    pub body: String,
    pub url: String,
    pub content_type: String,
}

/// Error during fetch
#[derive(Debug)]
pub struct FetchError {
    pub message: String,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FetchError {}

/// Whether `input` names a remote page rather than a local file.
pub fn is_remote(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Fetch a story page or markdown file (blocking).
pub fn fetch_url(url_str: &str) -> Result<FetchResult, FetchError> {
    let parsed = Url::parse(url_str).map_err(|e| FetchError {
        message: format!("Invalid URL: {}", e),
    })?;

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("storyspin/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(15))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| FetchError {
            message: format!("Client error: {}", e),
        })?;

    let response = client
        .get(parsed.as_str())
        .header(
            "Accept",
            "text/html,text/markdown;q=0.9,text/plain;q=0.8,*/*;q=0.5",
        )
        .send()
        .map_err(|e| FetchError {
            message: format!("Request failed: {}", e),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError {
            message: format!("{} returned {}", parsed, status),
        });
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    let final_url = response.url().to_string();

    let body = response.text().map_err(|e| FetchError {
        message: format!("Failed to read body: {}", e),
    })?;

    log::info!("fetched {} ({}, {} bytes)", final_url, content_type, body.len());

    Ok(FetchResult {
        body,
        url: final_url,
        content_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_detection() {
        assert!(is_remote("https://example.com/story.html"));
        assert!(is_remote("http://localhost:8000/story.md"));
        assert!(!is_remote("story.md"));
        assert!(!is_remote("./https/story.html"));
    }

    #[test]
    fn invalid_url_is_an_error() {
        let err = fetch_url("http://").err().unwrap();
        assert!(err.message.starts_with("Invalid URL"));
    }
}
