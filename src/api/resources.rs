use crate::api::client::OpsClient;
use crate::api::models::{Envelope, Page, PageShape, Summary};
use crate::error::ApiError;
use serde_json::{Value, json};

pub const API_PREFIX: &str = "/api/v1";

/// Static description of a namespaced resource collection.
///
/// `kind` is the path segment on the server; `page_shape` tells the
/// renderer how list responses are framed for this kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSpec {
    pub kind: &'static str,
    pub page_shape: PageShape,
}

pub const CLUSTERS: ResourceSpec = ResourceSpec {
    kind: "clusters",
    page_shape: PageShape::Paged,
};
pub const HOSTS: ResourceSpec = ResourceSpec {
    kind: "hosts",
    page_shape: PageShape::Paged,
};
pub const TASKS: ResourceSpec = ResourceSpec {
    kind: "tasks",
    page_shape: PageShape::Paged,
};
pub const TASKRUNS: ResourceSpec = ResourceSpec {
    kind: "taskruns",
    page_shape: PageShape::Paged,
};
pub const PIPELINES: ResourceSpec = ResourceSpec {
    kind: "pipelines",
    page_shape: PageShape::Paged,
};
pub const PIPELINERUNS: ResourceSpec = ResourceSpec {
    kind: "pipelineruns",
    page_shape: PageShape::Paged,
};
pub const EVENTHOOKS: ResourceSpec = ResourceSpec {
    kind: "eventhooks",
    page_shape: PageShape::Paged,
};

/// Query parameters shared by every list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page_size: u64,
    pub page: u64,
    pub search: String,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery {
            page_size: 10,
            page: 1,
            search: String::new(),
        }
    }
}

// Collection endpoints omit an empty search, node and subject listings send
// it even when empty, and the per-subject event route takes none at all.
#[derive(Debug, Clone, Copy)]
enum SearchParam {
    OmitEmpty,
    Always,
    Never,
}

fn query_string(query: &ListQuery, search: SearchParam) -> String {
    let mut qs = format!("?page_size={}&page={}", query.page_size, query.page);
    let include = match search {
        SearchParam::OmitEmpty => !query.search.is_empty(),
        SearchParam::Always => true,
        SearchParam::Never => false,
    };
    if include {
        qs.push_str("&search=");
        qs.push_str(&urlencoding::encode(&query.search));
    }
    qs
}

/// Generic accessor for one resource kind.
///
/// All methods unwrap the response envelope: reads hand back the `data`
/// payload untouched, mutations hand back the whole envelope so callers
/// can branch on the server's result code.
#[derive(Debug, Clone)]
pub struct Accessor {
    client: OpsClient,
    spec: ResourceSpec,
}

impl Accessor {
    pub fn new(client: OpsClient, spec: ResourceSpec) -> Self {
        Accessor { client, spec }
    }

    pub fn spec(&self) -> ResourceSpec {
        self.spec
    }

    fn collection_path(&self, namespace: &str) -> String {
        format!("{}/namespaces/{}/{}", API_PREFIX, namespace, self.spec.kind)
    }

    fn item_path(&self, namespace: &str, name: &str) -> String {
        format!("{}/{}", self.collection_path(namespace), name)
    }

    pub async fn list(&self, namespace: &str, query: &ListQuery) -> Result<Value, ApiError> {
        let path = format!(
            "{}{}",
            self.collection_path(namespace),
            query_string(query, SearchParam::OmitEmpty)
        );
        let body = self.client.get(&path).await?;
        Ok(Envelope::from_body(body).data)
    }

    pub async fn get(&self, namespace: &str, name: &str) -> Result<Value, ApiError> {
        let body = self.client.get(&self.item_path(namespace, name)).await?;
        Ok(Envelope::from_body(body).data)
    }

    pub async fn create(&self, namespace: &str, payload: &Value) -> Result<Envelope, ApiError> {
        let body = self
            .client
            .post(&self.collection_path(namespace), Some(payload))
            .await?;
        Ok(Envelope::from_body(body))
    }

    pub async fn update(
        &self,
        namespace: &str,
        name: &str,
        payload: &Value,
    ) -> Result<Envelope, ApiError> {
        let body = self
            .client
            .put(&self.item_path(namespace, name), Some(payload))
            .await?;
        Ok(Envelope::from_body(body))
    }

    pub async fn delete(&self, namespace: &str, name: &str) -> Result<Envelope, ApiError> {
        let body = self.client.delete(&self.item_path(namespace, name)).await?;
        Ok(Envelope::from_body(body))
    }
}

/// Entry point for everything the dashboard asks of the server.
#[derive(Debug, Clone)]
pub struct Ops {
    client: OpsClient,
}

impl Ops {
    pub fn new(client: OpsClient) -> Self {
        Ops { client }
    }

    pub fn client(&self) -> &OpsClient {
        &self.client
    }

    pub fn accessor(&self, spec: ResourceSpec) -> Accessor {
        Accessor::new(self.client.clone(), spec)
    }

    pub fn clusters(&self) -> Accessor {
        self.accessor(CLUSTERS)
    }

    pub fn hosts(&self) -> Accessor {
        self.accessor(HOSTS)
    }

    pub fn tasks(&self) -> Accessor {
        self.accessor(TASKS)
    }

    pub fn taskruns(&self) -> Accessor {
        self.accessor(TASKRUNS)
    }

    pub fn pipelines(&self) -> Accessor {
        self.accessor(PIPELINES)
    }

    pub fn pipelineruns(&self) -> Accessor {
        self.accessor(PIPELINERUNS)
    }

    pub fn eventhooks(&self) -> Accessor {
        self.accessor(EVENTHOOKS)
    }

    /// Nodes of one cluster, paged like any other collection.
    pub async fn cluster_nodes(
        &self,
        namespace: &str,
        cluster: &str,
        query: &ListQuery,
    ) -> Result<Value, ApiError> {
        let path = format!(
            "{}/namespaces/{}/clusters/{}/nodes{}",
            API_PREFIX,
            namespace,
            cluster,
            query_string(query, SearchParam::Always)
        );
        let body = self.client.get(&path).await?;
        Ok(Envelope::from_body(body).data)
    }

    /// Distinct event subjects known to the server.
    pub async fn event_subjects(&self, query: &ListQuery) -> Result<Value, ApiError> {
        let path = format!(
            "{}/events{}",
            API_PREFIX,
            query_string(query, SearchParam::Always)
        );
        let body = self.client.get(&path).await?;
        Ok(Envelope::from_body(body).data)
    }

    /// Event records published under one subject. This route pages but does
    /// not search.
    pub async fn events(&self, subject: &str, query: &ListQuery) -> Result<Value, ApiError> {
        let path = format!(
            "{}/events/{}{}",
            API_PREFIX,
            subject,
            query_string(query, SearchParam::Never)
        );
        let body = self.client.get(&path).await?;
        Ok(Envelope::from_body(body).data)
    }

    /// Namespace names, served as a bare list rather than a page object.
    pub async fn namespaces(&self) -> Result<Vec<String>, ApiError> {
        let body = self.client.get(&format!("{}/namespaces", API_PREFIX)).await?;
        let data = Envelope::from_body(body).data;
        let page = Page::from_data(&data, PageShape::Bare);
        Ok(page
            .list
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect())
    }

    pub async fn summary(&self) -> Result<Summary, ApiError> {
        let body = self.client.get(&format!("{}/summary", API_PREFIX)).await?;
        let data = Envelope::from_body(body).data;
        Ok(serde_json::from_value(data).unwrap_or_default())
    }

    /// One-shot question to the copilot endpoint.
    pub async fn copilot(&self, input: &str) -> Result<Envelope, ApiError> {
        let body = self
            .client
            .post(&format!("{}/copilot", API_PREFIX), Some(&json!({"input": input})))
            .await?;
        Ok(Envelope::from_body(body))
    }

    pub async fn check(&self) -> bool {
        self.client.check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::credentials::SessionStore;
    use std::sync::Arc;

    fn test_accessor(spec: ResourceSpec) -> Accessor {
        let client = OpsClient::new(
            "http://example.test".to_string(),
            Arc::new(SessionStore::in_memory()),
        )
        .expect("client creation failed");
        Accessor::new(client, spec)
    }

    #[test]
    fn test_collection_and_item_paths() {
        let accessor = test_accessor(TASKRUNS);
        assert_eq!(
            accessor.collection_path("ops-system"),
            "/api/v1/namespaces/ops-system/taskruns"
        );
        assert_eq!(
            accessor.item_path("ops-system", "nightly-42"),
            "/api/v1/namespaces/ops-system/taskruns/nightly-42"
        );
    }

    #[test]
    fn test_query_string_defaults_omit_search() {
        let query = ListQuery::default();
        assert_eq!(
            query_string(&query, SearchParam::OmitEmpty),
            "?page_size=10&page=1"
        );
    }

    #[test]
    fn test_query_string_includes_nonempty_search() {
        let query = ListQuery {
            search: "nightly run".to_string(),
            ..ListQuery::default()
        };
        assert_eq!(
            query_string(&query, SearchParam::OmitEmpty),
            "?page_size=10&page=1&search=nightly%20run"
        );
    }

    #[test]
    fn test_query_string_always_search_sends_empty() {
        let query = ListQuery::default();
        assert_eq!(
            query_string(&query, SearchParam::Always),
            "?page_size=10&page=1&search="
        );
    }

    #[test]
    fn test_query_string_never_search_drops_term() {
        let query = ListQuery {
            search: "ignored".to_string(),
            ..ListQuery::default()
        };
        assert_eq!(
            query_string(&query, SearchParam::Never),
            "?page_size=10&page=1"
        );
    }

    #[test]
    fn test_kind_segments() {
        for (spec, segment) in [
            (CLUSTERS, "clusters"),
            (HOSTS, "hosts"),
            (TASKS, "tasks"),
            (TASKRUNS, "taskruns"),
            (PIPELINES, "pipelines"),
            (PIPELINERUNS, "pipelineruns"),
            (EVENTHOOKS, "eventhooks"),
        ] {
            assert_eq!(spec.kind, segment);
            assert_eq!(spec.page_shape, PageShape::Paged);
        }
    }
}
