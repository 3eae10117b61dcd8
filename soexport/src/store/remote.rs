//! Remote saved-objects store over HTTP.
//!
//! Talks to a dashboards instance's saved-objects API:
//! - `GET  {url}/api/saved_objects/_find`
//! - `POST {url}/api/saved_objects/_bulk_get`
//!
//! Requests are either basic-auth or SigV4 signed, never both. A security
//! tenant is optional. Every request carries the `osd-xsrf` header the API
//! requires for non-browser clients.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::sigv4::SigV4Signer;
use super::{BulkGetOptions, BulkGetResponse, FindOptions, FindResponse, SavedObjectsStore};
use crate::config::StoreConfig;
use crate::object::{ObjectRef, SavedObject};
use crate::store::{Result, StoreError};

const FIND_PATH: &str = "/api/saved_objects/_find";
const BULK_GET_PATH: &str = "/api/saved_objects/_bulk_get";
const ALLOWED_TYPES_PATH: &str =
    "/api/opensearch-dashboards/management/saved_objects/_allowed_types";
const TENANTS_PATH: &str = "/api/v1/configuration/tenants";

pub struct RemoteStore {
    client: Client,
    url: String,
    username: Option<String>,
    password: Option<String>,
    tenant: Option<String>,
    signer: Option<SigV4Signer>,
}

#[derive(Serialize)]
struct BulkGetEntry<'a> {
    #[serde(rename = "type")]
    object_type: &'a str,
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespaces: Option<[&'a str; 1]>,
}

#[derive(Deserialize)]
struct FindBody {
    total: usize,
    saved_objects: Vec<SavedObject>,
}

#[derive(Deserialize)]
struct BulkGetBody {
    saved_objects: Vec<Value>,
}

#[derive(Deserialize)]
struct AllowedTypesBody {
    types: Vec<String>,
}

#[derive(Deserialize)]
struct TenantsBody {
    data: serde_json::Map<String, Value>,
}

impl RemoteStore {
    /// Build a client from the `[store]` configuration section.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("remote store requires a url".to_string()))?
            .trim_end_matches('/')
            .to_string();
        if config.sigv4.is_some() && config.username.is_some() {
            return Err(StoreError::Unavailable(
                "basic auth and sigv4 cannot both be configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            url,
            username: config.username.clone(),
            password: config.password.clone(),
            tenant: config.tenant.clone(),
            signer: config.sigv4.as_ref().map(SigV4Signer::new),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.url, path))
            .header("osd-xsrf", "true");
        if let Some(username) = &self.username {
            builder = builder.basic_auth(username, self.password.as_ref());
        }
        if let Some(tenant) = &self.tenant {
            builder = builder.header("securitytenant", tenant);
        }
        builder
    }

    async fn send_json<T: serde::de::DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let mut request = builder.build()?;
        if let Some(signer) = &self.signer {
            signer.sign(&mut request, Utc::now())?;
        }
        let response = self.client.execute(request).await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }
        let body: Value = response.json().await?;
        serde_json::from_value(body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Saved-object types the remote instance allows to be exported.
    pub async fn allowed_types(&self) -> Result<Vec<String>> {
        let body: AllowedTypesBody = self
            .send_json(self.request(Method::GET, ALLOWED_TYPES_PATH))
            .await?;
        Ok(body.types)
    }

    /// Security tenants visible to the configured user.
    pub async fn tenants(&self) -> Result<Vec<String>> {
        let body: TenantsBody = self
            .send_json(self.request(Method::GET, TENANTS_PATH))
            .await?;
        Ok(body.data.keys().cloned().collect())
    }
}

/// Query string for a `_find` call. Types are repeated as `type=` pairs.
fn find_query(options: &FindOptions) -> Vec<(&'static str, String)> {
    let mut query: Vec<(&'static str, String)> = options
        .types
        .iter()
        .map(|t| ("type", t.clone()))
        .collect();
    if let Some(search) = &options.search {
        query.push(("search", search.clone()));
    }
    if let Some(namespaces) = &options.namespaces {
        query.extend(namespaces.iter().map(|ns| ("namespaces", ns.clone())));
    }
    query.push(("per_page", options.per_page.to_string()));
    query
}

/// Keep the found objects of a `_bulk_get` response.
///
/// The API answers every requested identity; misses come back as entries
/// with an `error` member and are dropped here.
fn decode_bulk_get(body: BulkGetBody) -> Result<Vec<SavedObject>> {
    body.saved_objects
        .into_iter()
        .filter(|entry| entry.get("error").is_none())
        .map(|entry| serde_json::from_value(entry).map_err(|e| StoreError::Decode(e.to_string())))
        .collect()
}

#[async_trait]
impl SavedObjectsStore for RemoteStore {
    async fn find(&self, options: &FindOptions) -> Result<FindResponse> {
        let builder = self
            .request(Method::GET, FIND_PATH)
            .query(&find_query(options));
        let body: FindBody = self.send_json(builder).await?;
        Ok(FindResponse {
            total: body.total,
            saved_objects: body.saved_objects,
        })
    }

    async fn bulk_get(
        &self,
        objects: &[ObjectRef],
        options: &BulkGetOptions,
    ) -> Result<BulkGetResponse> {
        let entries: Vec<BulkGetEntry<'_>> = objects
            .iter()
            .map(|o| BulkGetEntry {
                object_type: &o.object_type,
                id: &o.id,
                namespaces: options.namespace.as_deref().map(|ns| [ns]),
            })
            .collect();

        let mut builder = self.request(Method::POST, BULK_GET_PATH).json(&entries);
        if let Some(workspaces) = &options.workspaces {
            let query: Vec<(&str, &str)> =
                workspaces.iter().map(|w| ("workspaces", w.as_str())).collect();
            builder = builder.query(&query);
        }

        let body: BulkGetBody = self.send_json(builder).await?;
        Ok(BulkGetResponse {
            saved_objects: decode_bulk_get(body)?,
        })
    }

    fn name(&self) -> &str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SigV4Config;
    use serde_json::json;

    #[test]
    fn test_find_query() {
        let query = find_query(&FindOptions {
            types: vec!["index-pattern".into(), "search".into()],
            search: Some("foo".into()),
            namespaces: Some(vec!["ops".into()]),
            per_page: 501,
        });
        assert_eq!(
            query,
            vec![
                ("type", "index-pattern".to_string()),
                ("type", "search".to_string()),
                ("search", "foo".to_string()),
                ("namespaces", "ops".to_string()),
                ("per_page", "501".to_string()),
            ]
        );
    }

    #[test]
    fn test_decode_bulk_get_drops_errors() {
        let body: BulkGetBody = serde_json::from_value(json!({
            "saved_objects": [
                {"type": "search", "id": "2", "attributes": {}, "references": []},
                {"type": "index-pattern", "id": "1", "error": {"statusCode": 404, "message": "Not found"}}
            ]
        }))
        .unwrap();
        let objects = decode_bulk_get(body).unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].object_ref(), ObjectRef::new("search", "2"));
    }

    #[test]
    fn test_bulk_get_entry_shape() {
        let entry = BulkGetEntry {
            object_type: "search",
            id: "2",
            namespaces: Some(["ops"]),
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"type": "search", "id": "2", "namespaces": ["ops"]})
        );
    }

    #[test]
    fn test_new_requires_url() {
        let config = StoreConfig::default();
        assert!(matches!(
            RemoteStore::new(&config),
            Err(StoreError::Unavailable(_))
        ));
    }

    #[test]
    fn test_new_rejects_two_auth_kinds() {
        let config = StoreConfig {
            url: Some("https://search.example.com".to_string()),
            username: Some("admin".to_string()),
            sigv4: Some(sigv4_config()),
            ..Default::default()
        };
        assert!(matches!(
            RemoteStore::new(&config),
            Err(StoreError::Unavailable(_))
        ));
    }

    #[test]
    fn test_signed_request_carries_sigv4_headers() {
        let config = StoreConfig {
            url: Some("https://search.example.com/_dashboards".to_string()),
            tenant: Some("global".to_string()),
            sigv4: Some(sigv4_config()),
            ..Default::default()
        };
        let store = RemoteStore::new(&config).unwrap();
        let mut request = store
            .request(Method::GET, FIND_PATH)
            .query(&[("type", "search")])
            .build()
            .unwrap();
        store
            .signer
            .as_ref()
            .unwrap()
            .sign(&mut request, Utc::now())
            .unwrap();

        let headers = request.headers();
        assert!(headers["authorization"]
            .to_str()
            .unwrap()
            .starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"));
        assert!(headers.contains_key("x-amz-date"));
        assert_eq!(headers["securitytenant"], "global");
        assert_eq!(headers["osd-xsrf"], "true");
    }

    fn sigv4_config() -> SigV4Config {
        SigV4Config {
            access_key: "AKIDEXAMPLE".to_string(),
            secret_key: "secret".to_string(),
            region: "eu-west-1".to_string(),
            service: "es".to_string(),
        }
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = StoreConfig {
            url: Some("https://dashboards.example.com/_dashboards/".to_string()),
            ..Default::default()
        };
        let store = RemoteStore::new(&config).unwrap();
        assert_eq!(store.url(), "https://dashboards.example.com/_dashboards");
    }
}
