// # Token API path
//
// Talks to `/admin/api.php` with the API token passed as `auth`:
//
// ```http
// GET /admin/api.php?customdns=&action=get&auth=<token>
// GET /admin/api.php?customdns=&action=add&domain=nas.lan&ip=10.0.0.2&auth=<token>
// GET /admin/api.php?customdns=&action=delete&domain=nas.lan&ip=10.0.0.2&auth=<token>
// ```
//
// Pi-hole answers an unauthenticated request with an empty JSON array.

use pihole_core::{DnsRecord, DnsRecordList, Error, Result};

use crate::response::{self, ActionResponse, ListResponse};

/// Path of the token-authenticated API
pub(crate) const API_PATH: &str = "/admin/api.php";

/// Token-authenticated API access
pub(crate) struct TokenApi {
    token: String,
}

impl TokenApi {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    async fn call(
        &self,
        http: &reqwest::Client,
        base_url: &str,
        params: &[(&str, &str)],
        context: &str,
    ) -> Result<String> {
        let url = format!("{}{}", base_url, API_PATH);
        tracing::debug!("GET {} ({})", url, context);

        let mut query: Vec<(&str, &str)> = vec![("customdns", "")];
        query.extend_from_slice(params);
        query.push(("auth", self.token.as_str()));

        let response = http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::http(format!("{}: HTTP request failed: {}", context, e)))?;

        let body = response::read_body(response, context).await?;
        if body.trim() == "[]" {
            return Err(Error::auth(format!(
                "{}: Pi-hole rejected the API token",
                context
            )));
        }

        Ok(body)
    }

    pub async fn list(&self, http: &reqwest::Client, base_url: &str) -> Result<DnsRecordList> {
        let context = "list custom DNS records";
        let body = self.call(http, base_url, &[("action", "get")], context).await?;
        let list: ListResponse = response::parse(&body, context)?;
        Ok(list.into_records())
    }

    pub async fn add(&self, http: &reqwest::Client, base_url: &str, record: &DnsRecord) -> Result<()> {
        let context = "add custom DNS record";
        let params = [
            ("action", "add"),
            ("domain", record.domain.as_str()),
            ("ip", record.ip.as_str()),
        ];
        let body = self.call(http, base_url, &params, context).await?;
        response::parse::<ActionResponse>(&body, context)?.into_result()
    }

    pub async fn delete(
        &self,
        http: &reqwest::Client,
        base_url: &str,
        record: &DnsRecord,
    ) -> Result<()> {
        let context = "delete custom DNS record";
        let params = [
            ("action", "delete"),
            ("domain", record.domain.as_str()),
            ("ip", record.ip.as_str()),
        ];
        let body = self.call(http, base_url, &params, context).await?;
        response::parse::<ActionResponse>(&body, context)?.into_result()
    }
}
