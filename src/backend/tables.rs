use super::{check_status, BackendError, RestClient};
use reqwest::{Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

/// A PostgREST table query with equality filters and ordering.
#[derive(Debug, Clone)]
pub struct TableQuery<'a> {
    client: &'a RestClient,
    table: String,
    filters: Vec<(String, String)>,
    order: Option<String>,
}

impl RestClient {
    #[must_use]
    pub fn from(&self, table: &str) -> TableQuery<'_> {
        TableQuery {
            client: self,
            table: table.to_string(),
            filters: Vec::new(),
            order: None,
        }
    }
}

impl TableQuery<'_> {
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order = Some(format!("{column}.{direction}"));
        self
    }

    fn params(&self, select: bool) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 2);
        if select {
            params.push(("select".to_string(), "*".to_string()));
        }
        params.extend(self.filters.iter().cloned());
        if let Some(order) = &self.order {
            params.push(("order".to_string(), order.clone()));
        }
        params
    }

    fn request(&self, method: Method, select: bool) -> Result<RequestBuilder, BackendError> {
        let url = self.client.endpoint(&format!("rest/v1/{}", self.table))?;
        let builder = self
            .client
            .http()
            .request(method, url)
            .query(&self.params(select));
        Ok(self.client.authorized(builder))
    }

    /// Fetch all matching rows.
    ///
    /// # Errors
    /// Returns an error on transport failure, a non-2xx status, or rows that do not decode.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn select<T: DeserializeOwned>(self) -> Result<Vec<T>, BackendError> {
        let response = self.request(Method::GET, true)?.send().await?;
        let response = check_status(response).await?;
        let rows: Vec<T> = response.json().await?;
        debug!("selected {} rows", rows.len());
        Ok(rows)
    }

    /// Insert rows and return them as stored.
    ///
    /// # Errors
    /// Returns an error on transport failure, a non-2xx status, or rows that do not decode.
    #[instrument(skip(self, rows), fields(table = %self.table))]
    pub async fn insert<B, T>(self, rows: &[B]) -> Result<Vec<T>, BackendError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::POST, false)?
            .header("Prefer", "return=representation")
            .json(rows)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Patch every matching row and return the updated rows.
    ///
    /// # Errors
    /// Returns an error on transport failure, a non-2xx status, or rows that do not decode.
    #[instrument(skip(self, patch), fields(table = %self.table))]
    pub async fn update<B, T>(self, patch: &B) -> Result<Vec<T>, BackendError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::PATCH, false)?
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Delete every matching row.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-2xx status.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn delete(self) -> Result<(), BackendError> {
        let response = self.request(Method::DELETE, false)?.send().await?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use secrecy::SecretString;
    use serde_json::{json, Value};
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client(uri: &str) -> RestClient {
        RestClient::new(uri, SecretString::from("anon-key".to_string())).unwrap()
    }

    #[test]
    fn params_render_filters_and_order() {
        let client = client("https://db.example.com");
        let query = client
            .from("contact_messages")
            .eq("is_read", false)
            .order("created_at", false);

        assert_eq!(
            query.params(true),
            vec![
                ("select".to_string(), "*".to_string()),
                ("is_read".to_string(), "eq.false".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
            ]
        );
        assert_eq!(query.params(false).len(), 2);
    }

    #[tokio::test]
    async fn select_sends_query_string() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/skills"))
            .and(query_param("select", "*"))
            .and(query_param("is_visible", "eq.true"))
            .and(query_param("order", "sort_order.asc"))
            .and(header("apikey", "anon-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "name": "Rust" }])),
            )
            .mount(&server)
            .await;

        let rows: Vec<Value> = client(&server.uri())
            .from("skills")
            .eq("is_visible", true)
            .order("sort_order", true)
            .select()
            .await?;

        assert_eq!(rows, vec![json!({ "name": "Rust" })]);
        Ok(())
    }

    #[tokio::test]
    async fn update_patches_filtered_rows() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/contact_messages"))
            .and(query_param("id", "eq.abc"))
            .and(header("Prefer", "return=representation"))
            .and(body_json(json!({ "is_read": true })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "id": "abc", "is_read": true }])),
            )
            .mount(&server)
            .await;

        let rows: Vec<Value> = client(&server.uri())
            .from("contact_messages")
            .eq("id", "abc")
            .update(&json!({ "is_read": true }))
            .await?;

        assert_eq!(rows.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn delete_surfaces_errors() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/rest/v1/projects"))
            .and(query_param("id", "eq.1"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "JWT expired" })),
            )
            .mount(&server)
            .await;

        let result = client(&server.uri()).from("projects").eq("id", 1).delete().await;
        match result {
            Err(BackendError::Status { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "JWT expired");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        Ok(())
    }
}
