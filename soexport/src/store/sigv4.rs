//! AWS Signature Version 4 signing for remote store requests.
//!
//! Signs `host` and `x-amz-date`; the payload hash is sent as
//! `x-amz-content-sha256`. The query string is rewritten into its canonical
//! form before signing so the signed and the sent query are identical.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderValue, AUTHORIZATION, HOST};
use reqwest::{Request, Url};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

use crate::config::SigV4Config;
use crate::store::{Result, StoreError};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SIGNED_HEADERS: &str = "host;x-amz-date";

pub(crate) struct SigV4Signer {
    access_key: String,
    secret_key: String,
    region: String,
    service: String,
}

impl SigV4Signer {
    pub(crate) fn new(config: &SigV4Config) -> Self {
        Self {
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
            region: config.region.clone(),
            service: config.service.clone(),
        }
    }

    /// Add the signature headers to `request` as of `now`.
    pub(crate) fn sign(&self, request: &mut Request, now: DateTime<Utc>) -> Result<()> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = &amz_date[..8];
        let host = host_header(request.url())?;

        let query = canonical_query(request.url());
        request
            .url_mut()
            .set_query((!query.is_empty()).then_some(query.as_str()));

        let body = request.body().and_then(|b| b.as_bytes()).unwrap_or_default();
        let payload_hash = hex::encode(Sha256::digest(body));

        let canonical_request = format!(
            "{}\n{}\n{}\nhost:{}\nx-amz-date:{}\n\n{}\n{}",
            request.method().as_str(),
            request.url().path(),
            query,
            host,
            amz_date,
            SIGNED_HEADERS,
            payload_hash
        );
        let scope = format!("{}/{}/{}/aws4_request", date, self.region, self.service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );
        let signature = hex::encode(hmac(&self.signing_key(date)?, &string_to_sign)?);
        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.access_key, scope, SIGNED_HEADERS, signature
        );

        let headers = request.headers_mut();
        headers.insert(HOST, header_value(&host)?);
        headers.insert("x-amz-date", header_value(&amz_date)?);
        headers.insert("x-amz-content-sha256", header_value(&payload_hash)?);
        headers.insert(AUTHORIZATION, header_value(&authorization)?);
        Ok(())
    }

    fn signing_key(&self, date: &str) -> Result<Vec<u8>> {
        let key = hmac(format!("AWS4{}", self.secret_key).as_bytes(), date)?;
        let key = hmac(&key, &self.region)?;
        let key = hmac(&key, &self.service)?;
        hmac(&key, "aws4_request")
    }
}

fn hmac(key: &[u8], data: &str) -> Result<Vec<u8>> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| StoreError::Signing(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| StoreError::Signing(e.to_string()))
}

/// `host[:port]`, with the port only when it is not the scheme default.
fn host_header(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| StoreError::Signing(format!("no host in {}", url)))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Query pairs, RFC 3986 encoded and sorted by name then value.
fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (uri_encode(&k), uri_encode(&v)))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn uri_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else {
            let _ = write!(out, "%{:02X}", byte);
        }
    }
    out
}
