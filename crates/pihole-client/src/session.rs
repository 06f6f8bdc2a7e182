// # Admin session path
//
// Used when no API token is configured. Logs into the admin dashboard with
// the password and scrapes the PHP endpoint the dashboard itself uses:
//
// ```http
// POST /admin/index.php?login            pw=<password>
//   -> 302 Location: index.php, Set-Cookie: PHPSESSID=<id>
// GET  /admin/index.php
// Cookie: PHPSESSID=<id>
//   -> HTML with <div id="token">CSRF</div>
//
// POST /admin/scripts/pi-hole/php/customdns.php
// Cookie: PHPSESSID=<id>
//   action=get|add|delete&domain=..&ip=..&token=<CSRF>
// ```
//
// The session is created on first use and kept until Pi-hole rejects it.

use std::fmt;
use std::sync::LazyLock;

use pihole_core::{DnsRecord, DnsRecordList, Error, Result};
use regex::Regex;
use reqwest::header::{COOKIE, HeaderMap, LOCATION, SET_COOKIE};
use tokio::sync::Mutex;

use crate::response::{self, ActionResponse, ListResponse};

/// Login endpoint of the admin dashboard
pub(crate) const LOGIN_PATH: &str = "/admin/index.php?login";

/// Admin script backing the "Local DNS Records" page
pub(crate) const CUSTOM_DNS_PATH: &str = "/admin/scripts/pi-hole/php/customdns.php";

/// PHP session cookie name
const SESSION_COOKIE: &str = "PHPSESSID";

/// Matches the hidden CSRF token element on dashboard pages
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"id=["']token["'][^>]*>([^<]+)<"#).expect("token pattern is valid")
});

/// An authenticated admin session
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Session {
    pub id: String,
    pub token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &"<REDACTED>")
            .field("token", &"<REDACTED>")
            .finish()
    }
}

/// Password-based access through the admin scripts
pub(crate) struct SessionAuth {
    password: String,
    session: Mutex<Option<Session>>,
}

impl SessionAuth {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            session: Mutex::new(None),
        }
    }

    /// Current session, logging in if there is none
    async fn session(&self, http: &reqwest::Client, base_url: &str) -> Result<Session> {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_ref() {
            return Ok(session.clone());
        }

        let session = login(http, base_url, &self.password).await?;
        *guard = Some(session.clone());
        Ok(session)
    }

    /// Forget the current session so the next request logs in again
    async fn invalidate(&self) {
        *self.session.lock().await = None;
    }

    /// POST a form to the custom DNS script within the session
    async fn post(
        &self,
        http: &reqwest::Client,
        base_url: &str,
        fields: &[(&str, &str)],
        context: &str,
    ) -> Result<String> {
        let session = self.session(http, base_url).await?;
        let url = format!("{}{}", base_url, CUSTOM_DNS_PATH);
        tracing::debug!("POST {} ({})", url, context);

        let mut form: Vec<(&str, &str)> = fields.to_vec();
        form.push(("token", session.token.as_str()));

        let response = http
            .post(&url)
            .header(COOKIE, format!("{}={}", SESSION_COOKIE, session.id))
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::http(format!("{}: HTTP request failed: {}", context, e)))?;

        let body = match response::read_body(response, context).await {
            Ok(body) => body,
            Err(e @ Error::Authentication(_)) => {
                self.invalidate().await;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        // A stale session or CSRF token gets a plain-text refusal instead of JSON
        if !response::is_json_object(&body) {
            self.invalidate().await;
            return Err(Error::auth(format!(
                "{}: Pi-hole rejected the admin session: {}",
                context,
                response::snippet(&body)
            )));
        }

        Ok(body)
    }

    pub async fn list(&self, http: &reqwest::Client, base_url: &str) -> Result<DnsRecordList> {
        let context = "list custom DNS records";
        let body = self.post(http, base_url, &[("action", "get")], context).await?;
        let list: ListResponse = response::parse(&body, context)?;
        Ok(list.into_records())
    }

    pub async fn add(&self, http: &reqwest::Client, base_url: &str, record: &DnsRecord) -> Result<()> {
        let context = "add custom DNS record";
        let fields = [
            ("action", "add"),
            ("domain", record.domain.as_str()),
            ("ip", record.ip.as_str()),
        ];
        let body = self.post(http, base_url, &fields, context).await?;
        response::parse::<ActionResponse>(&body, context)?.into_result()
    }

    pub async fn delete(
        &self,
        http: &reqwest::Client,
        base_url: &str,
        record: &DnsRecord,
    ) -> Result<()> {
        let context = "delete custom DNS record";
        let fields = [
            ("action", "delete"),
            ("domain", record.domain.as_str()),
            ("ip", record.ip.as_str()),
        ];
        let body = self.post(http, base_url, &fields, context).await?;
        response::parse::<ActionResponse>(&body, context)?.into_result()
    }
}

/// Log into the admin dashboard
///
/// The HTTP client must not follow redirects: Pi-hole sets the session
/// cookie on the 302 that answers a successful login, and the dashboard it
/// points to only shows the CSRF token to a request carrying that cookie.
async fn login(http: &reqwest::Client, base_url: &str, password: &str) -> Result<Session> {
    let url = format!("{}{}", base_url, LOGIN_PATH);
    tracing::debug!("Logging into Pi-hole admin at {}", base_url);

    let response = http
        .post(&url)
        .form(&[("pw", password)])
        .send()
        .await
        .map_err(|e| Error::http(format!("login: HTTP request failed: {}", e)))?;

    let mut session_id = session_cookie(response.headers());

    let body = if response.status().is_redirection() {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::auth("login: redirect without a Location header"))?;
        let target = response
            .url()
            .join(location)
            .map_err(|e| Error::http(format!("login: invalid redirect {:?}: {}", location, e)))?;
        let id = session_id.clone().ok_or_else(|| {
            Error::auth(format!("login: Pi-hole did not set a {} cookie", SESSION_COOKIE))
        })?;

        tracing::debug!("Following login redirect to {}", target.path());
        let page = http
            .get(target)
            .header(COOKIE, format!("{}={}", SESSION_COOKIE, id))
            .send()
            .await
            .map_err(|e| Error::http(format!("login: HTTP request failed: {}", e)))?;

        // PHP may rotate the session id on the dashboard page
        if let Some(rotated) = session_cookie(page.headers()) {
            session_id = Some(rotated);
        }
        response::read_body(page, "login").await?
    } else {
        response::read_body(response, "login").await?
    };

    let id = session_id.ok_or_else(|| {
        Error::auth(format!("login: Pi-hole did not set a {} cookie", SESSION_COOKIE))
    })?;
    let token = extract_token(&body)
        .ok_or_else(|| Error::auth("login: wrong password or no CSRF token on the dashboard"))?;

    tracing::info!("Logged into Pi-hole admin dashboard");
    Ok(Session { id, token })
}

/// Find the session id among the `Set-Cookie` headers
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Extract the CSRF token from a dashboard page
fn extract_token(html: &str) -> Option<String> {
    TOKEN_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_extract_token() {
        let html = r#"<body><div id="token" hidden>aGVsbG8+/w==</div></body>"#;
        assert_eq!(extract_token(html), Some("aGVsbG8+/w==".to_string()));
    }

    #[test]
    fn test_extract_token_missing() {
        let html = r#"<form action="index.php?login" method="post"></form>"#;
        assert_eq!(extract_token(html), None);
    }

    #[test]
    fn test_session_cookie_picks_phpsessid() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("theme=dark; path=/"));
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("PHPSESSID=abc123; path=/; HttpOnly"),
        );

        assert_eq!(session_cookie(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_session_cookie_absent() {
        assert_eq!(session_cookie(&HeaderMap::new()), None);
    }

    #[test]
    fn test_session_debug_redacts() {
        let session = Session {
            id: "abc123".to_string(),
            token: "csrf".to_string(),
        };
        let debug = format!("{:?}", session);
        assert!(!debug.contains("abc123"));
        assert!(!debug.contains("csrf"));
    }
}
