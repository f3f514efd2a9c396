use docket_core::error::AppError;

/// Expected local deployment of the model gateway.
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_MODEL: &str = "llama3.2:latest";

#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: String,
}

impl GatewayClient {
    /// Create a client for the model gateway. Case material must never
    /// leave the machine, so this is strictly limited to `127.0.0.1`.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let allowed = if base_url == "http://127.0.0.1" {
            true
        } else if let Some(port) = base_url.strip_prefix("http://127.0.0.1:") {
            // Only a bare numeric port may follow; anything else (paths,
            // userinfo, subdomain tricks) is rejected.
            !port.is_empty()
                && port.bytes().all(|b| b.is_ascii_digit())
                && port
                    .parse::<u32>()
                    .map(|p| (1..=65535).contains(&p))
                    .unwrap_or(false)
        } else {
            false
        };

        if !allowed {
            return Err(AppError::new(
                "AI_REMOTE_NOT_ALLOWED",
                "Model gateway base URL must be localhost (127.0.0.1)",
            )
            .with_details(format!("base_url={base_url}")));
        }

        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health_check(&self) -> Result<(), AppError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = ureq::get(&url)
            .timeout(std::time::Duration::from_millis(800))
            .call();

        match resp {
            Ok(r) if r.status() == 200 => Ok(()),
            Ok(r) => Err(
                AppError::new("AI_GATEWAY_UNHEALTHY", "Model gateway health check failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(e) => Err(AppError::new(
                "AI_GATEWAY_UNREACHABLE",
                "Failed to reach model gateway on 127.0.0.1",
            )
            .with_details(e.to_string())
            .with_retryable(true)),
        }
    }
}
