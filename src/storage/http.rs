use super::ObjectStore;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url};

/// Object store reached over HTTP with path-style addressing.
///
/// `GET {endpoint}/{bucket}/{key}`; every key segment is percent-encoded on
/// its own so keys containing spaces or `#` survive the trip. `.` and `..`
/// segments are refused since URL normalization would drop them and address
/// another object.
#[derive(Clone)]
pub struct HttpObjectStore {
    endpoint: String,
    http: Client,
}

impl HttpObjectStore {
    pub fn new(endpoint: impl Into<String>, http: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }

    fn object_url(&self, bucket: &str, key: &str) -> anyhow::Result<Url> {
        for part in [bucket, key] {
            let dot_segment = part.split('/').any(|segment| segment == "." || segment == "..");
            if part.is_empty() || dot_segment {
                anyhow::bail!("invalid object path component '{}'", part);
            }
        }

        let mut url = Url::parse(&self.endpoint)
            .with_context(|| format!("invalid object store endpoint '{}'", self.endpoint))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("object store endpoint cannot be a base URL"))?
            .pop_if_empty()
            .push(bucket)
            .extend(key.split('/'));
        Ok(url)
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> anyhow::Result<Vec<u8>> {
        let url = self.object_url(bucket, key)?;
        tracing::debug!(url = %url, "Fetching object");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("request for s3://{}/{} failed", bucket, key))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "object store returned {} for s3://{}/{}",
                status,
                bucket,
                key
            ));
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_is_path_style() {
        let store = HttpObjectStore::new("http://localhost:9000/", Client::new());
        let url = store.object_url("media", "transcripts/my file#1.json").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/media/transcripts/my%20file%231.json"
        );
    }

    #[test]
    fn test_dot_segments_are_rejected() {
        let store = HttpObjectStore::new("http://localhost:9000", Client::new());
        for (bucket, key) in [
            ("media", "a/../../secret.json"),
            ("media", "../other-bucket/secret.json"),
            ("media", "./a.json"),
            ("media", "a/./b.json"),
            ("..", "x.json"),
            (".", "x.json"),
            ("", "x.json"),
            ("media", ""),
        ] {
            let err = store.object_url(bucket, key).unwrap_err();
            assert!(err.to_string().contains("invalid object path component"), "{}/{}", bucket, key);
        }

        // Dots inside a segment are ordinary characters
        let url = store.object_url("media", "a/..b/c..json").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/media/a/..b/c..json");
    }

    #[tokio::test]
    async fn test_get_refuses_dot_segments_before_sending() {
        // Nothing listens here; a request attempt would fail with a different error
        let store = HttpObjectStore::new("http://127.0.0.1:9", Client::new());
        let err = store.get("media", "a/../secret.json").await.unwrap_err();
        assert!(err.to_string().contains("invalid object path component"));
    }

    #[test]
    fn test_invalid_endpoint() {
        let store = HttpObjectStore::new("not a url", Client::new());
        assert!(store.object_url("media", "a.json").is_err());
    }
}
