use serde::Serialize;

#[derive(Debug, Serialize)]
struct MailMessage<'a> {
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Relay client for outbound mail. When no relay URL is configured the
/// client is a no-op, so notification delivery never depends on it.
#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl Mailer {
    pub fn new(base_url: Option<String>) -> Self {
        let normalized = base_url
            .filter(|url| !url.trim().is_empty())
            .map(|url| normalize_base_url(&url));
        Self {
            client: reqwest::Client::new(),
            base_url: normalized,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        let Some(base_url) = &self.base_url else {
            log::debug!("mail relay disabled, skipping email to {to}");
            return Ok(());
        };

        let url = format!("{}/mail/send", base_url);
        let response = self.client.post(&url)
            .json(&MailMessage { to, subject, body })
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("Failed to send mail: {}", text));
        }

        Ok(())
    }
}

fn normalize_base_url(value: &str) -> String {
    let trimmed = value.trim_end_matches('/');
    if trimmed.ends_with("/api/v1") {
        trimmed.to_string()
    } else {
        format!("{}/api/v1", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_api_prefix_once() {
        assert_eq!(normalize_base_url("http://mail:8080/"), "http://mail:8080/api/v1");
        assert_eq!(
            normalize_base_url("http://mail:8080/api/v1"),
            "http://mail:8080/api/v1"
        );
    }

    #[tokio::test]
    async fn disabled_mailer_is_a_noop() {
        let mailer = Mailer::disabled();
        assert!(mailer.send("a@b.c", "hi", "body").await.is_ok());
    }
}
