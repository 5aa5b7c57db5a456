use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::error::{PipelineError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Page body plus the status it came with. Only built for 2xx responses.
pub struct RawPage {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Single GET, no retries. Non-2xx is a `Status` error.
pub async fn fetch_page(url: &str, timeout: Duration) -> Result<RawPage> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?;

    info!("Fetching {}", url);
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(PipelineError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.bytes().await?.to_vec();
    info!("Fetched {} bytes (HTTP {})", body.len(), status.as_u16());
    Ok(RawPage {
        status: status.as_u16(),
        body,
    })
}

/// Body of a page saved to disk earlier.
pub fn read_saved_page(path: &Path) -> Result<Vec<u8>> {
    let body = std::fs::read(path)?;
    info!("Read {} bytes from {}", body.len(), path.display());
    Ok(body)
}
