use uuid::Uuid;

/// Privileged client against the identity provider's admin API. Used when a
/// user removes their account, so the auth record goes away with the profile.
#[derive(Clone)]
pub struct AuthAdminClient {
    client: reqwest::Client,
    base_url: Option<String>,
    service_token: Option<String>,
}

impl AuthAdminClient {
    pub fn new(base_url: Option<String>, service_token: Option<String>) -> Self {
        let normalized = base_url
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim_end_matches('/').to_string());
        Self {
            client: reqwest::Client::new(),
            base_url: normalized,
            service_token: service_token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), String> {
        let (Some(base_url), Some(token)) = (&self.base_url, &self.service_token) else {
            log::debug!("auth admin client disabled, skipping remote delete of {user_id}");
            return Ok(());
        };

        let url = format!("{}/admin/users/{}", base_url, user_id);
        let response = self.client.delete(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("Failed to delete auth user: {}", text));
        }

        Ok(())
    }
}
