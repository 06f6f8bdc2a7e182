// # Pi-hole responses
//
// Both the token API and the admin scripts answer with the same JSON shapes:
//
// - list: `{"data": [["nas.lan", "192.168.1.10"], ...]}`
// - add/delete: `{"success": true, "message": ""}`

use pihole_core::{DnsRecord, DnsRecordList, Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Response of a `get` action
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(default)]
    pub data: Vec<Vec<String>>,
}

impl ListResponse {
    /// Convert rows into records, skipping malformed rows
    pub fn into_records(self) -> DnsRecordList {
        self.data
            .into_iter()
            .filter_map(|row| {
                let mut columns = row.into_iter();
                match (columns.next(), columns.next()) {
                    (Some(domain), Some(ip)) => Some(DnsRecord::new(domain, ip)),
                    _ => {
                        tracing::warn!("Skipping malformed custom DNS row from Pi-hole");
                        None
                    }
                }
            })
            .collect()
    }
}

/// Response of an `add` or `delete` action
#[derive(Debug, Deserialize)]
pub(crate) struct ActionResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl ActionResponse {
    /// Turn `success: false` into an error carrying Pi-hole's message
    pub fn into_result(self) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(Error::provider("pihole", self.message))
        }
    }
}

/// Read the body of a response, mapping HTTP failures to errors
pub(crate) async fn read_body(response: reqwest::Response, context: &str) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::http(format!("{}: failed to read response: {}", context, e)))?;

    if status.is_success() {
        return Ok(body);
    }

    match status.as_u16() {
        // Only reached without redirect following, i.e. the admin session
        // being sent back to the login page
        300..=399 => Err(Error::auth(format!(
            "{}: Pi-hole redirected the request. Status: {}",
            context, status
        ))),
        401 | 403 => Err(Error::auth(format!(
            "{}: Pi-hole rejected the credentials. Status: {}",
            context, status
        ))),
        404 => Err(Error::http(format!(
            "{}: endpoint not found, is this a Pi-hole admin URL? Status: {}",
            context, status
        ))),
        500..=599 => Err(Error::provider(
            "pihole",
            format!("{}: server error (transient): {} - {}", context, status, body.trim()),
        )),
        _ => Err(Error::http(format!(
            "{}: unexpected status {} - {}",
            context,
            status,
            body.trim()
        ))),
    }
}

/// Parse a JSON body
pub(crate) fn parse<T: DeserializeOwned>(body: &str, context: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        Error::http(format!(
            "{}: unexpected response from Pi-hole ({}): {}",
            context,
            e,
            snippet(body)
        ))
    })
}

/// Whether a body looks like a JSON object at all
pub(crate) fn is_json_object(body: &str) -> bool {
    body.trim_start().starts_with('{')
}

/// First line of a body, shortened for error messages
pub(crate) fn snippet(body: &str) -> String {
    let line = body.trim().lines().next().unwrap_or_default();
    line.chars().take(120).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_skips_short_rows() {
        let response: ListResponse = parse(
            r#"{"data": [["nas.lan", "10.0.0.2"], ["broken"], ["tv.lan", "10.0.0.3"]]}"#,
            "list",
        )
        .unwrap();

        assert_eq!(
            response.into_records(),
            vec![
                DnsRecord::new("nas.lan", "10.0.0.2"),
                DnsRecord::new("tv.lan", "10.0.0.3"),
            ]
        );
    }

    #[test]
    fn test_list_response_without_data() {
        let response: ListResponse = parse("{}", "list").unwrap();
        assert!(response.into_records().is_empty());
    }

    #[test]
    fn test_action_response_failure_keeps_message() {
        let response: ActionResponse = parse(
            r#"{"success": false, "message": "This domain already has a custom DNS entry for an IPv4"}"#,
            "add",
        )
        .unwrap();

        let err = response.into_result().unwrap_err();
        assert!(err.to_string().contains("already has a custom DNS entry"));
    }

    #[test]
    fn test_parse_error_includes_snippet() {
        let err = parse::<ActionResponse>("Not allowed!\n<html>", "add").unwrap_err();
        assert!(err.to_string().contains("Not allowed!"));
        assert!(!is_json_object("Not allowed!"));
    }
}
