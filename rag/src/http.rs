use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::from_str;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{RagError, Result};

fn client(cfg: &Config, method: &'static str, url: &str) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(cfg.request_timeout_secs))
        .build()
        .map_err(|e| RagError::Http {
            method,
            url: url.to_string(),
            message: e.to_string(),
        })
}

fn send<T: DeserializeOwned>(method: &'static str, url: &str, req: RequestBuilder) -> Result<T> {
    debug!(method, url, "sending request");
    let resp = req.send().map_err(|e| RagError::Http {
        method,
        url: url.to_string(),
        message: e.to_string(),
    })?;
    let status = resp.status();
    let text = resp.text().unwrap_or_default();
    if !status.is_success() {
        return Err(RagError::Http {
            method,
            url: url.to_string(),
            message: format!("{} {}", status, text),
        });
    }
    from_str::<T>(&text).map_err(|e| RagError::Decode {
        url: url.to_string(),
        message: format!("{} | {}", e, text),
    })
}

pub fn get_json<T: DeserializeOwned>(cfg: &Config, url: &str) -> Result<T> {
    let req = client(cfg, "GET", url)?.get(url);
    send("GET", url, req)
}

pub fn post_json<T: DeserializeOwned, B: Serialize>(cfg: &Config, url: &str, body: &B) -> Result<T> {
    let req = client(cfg, "POST", url)?
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .json(body);
    send("POST", url, req)
}

pub fn put_json<T: DeserializeOwned, B: Serialize>(cfg: &Config, url: &str, body: &B) -> Result<T> {
    let req = client(cfg, "PUT", url)?
        .put(url)
        .header(CONTENT_TYPE, "application/json")
        .json(body);
    send("PUT", url, req)
}

pub fn delete_json<T: DeserializeOwned>(cfg: &Config, url: &str) -> Result<T> {
    let req = client(cfg, "DELETE", url)?.delete(url);
    send("DELETE", url, req)
}
