use std::time::Duration;

use super::{Customer, CustomerFields, CustomerId};
use crate::error::{Context, DynError, HttpStatusError, Result};

/// Thin async client over the customers collection.
///
/// `base_url` is the collection URL (`.../customers`); items live at
/// `{base_url}/{id}`.
#[derive(Clone, Debug)]
pub struct CustomerClient {
    http: reqwest::Client,
    base_url: String,
}

impl CustomerClient {
    /// Build a client. `timeout` of `None` leaves requests unbounded.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder
            .build()
            .with_ctx(|| "failed to build HTTP client".to_string())?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn item_url(&self, id: CustomerId) -> String {
        format!("{}/{}", self.base_url, id)
    }

    /// `GET /customers`; fails unless the body is a customer array.
    pub async fn list(&self) -> Result<Vec<Customer>> {
        let url = self.base_url.clone();
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_ctx(|| format!("GET {url}"))?;
        let status = resp.status();
        match resp.json::<Vec<Customer>>().await {
            Ok(customers) => Ok(customers),
            Err(_) if !status.is_success() => Err(Box::new(HttpStatusError {
                method: "GET",
                url,
                status: status.as_u16(),
            }) as DynError),
            Err(e) => Err::<Vec<Customer>, _>(e).with_ctx(|| format!("decode customer list from {url}")),
        }
    }

    /// `POST /customers` with the full record, client id included.
    ///
    /// Any response status counts as done.
    pub async fn create(&self, customer: &Customer) -> Result<()> {
        let url = self.base_url.clone();
        let resp = self
            .http
            .post(&url)
            .json(customer)
            .send()
            .await
            .with_ctx(|| format!("POST {url}"))?;
        note_status("POST", &url, &resp);
        Ok(())
    }

    /// `PUT /customers/{id}` with the four editable fields.
    pub async fn update(&self, id: CustomerId, fields: &CustomerFields) -> Result<()> {
        let url = self.item_url(id);
        let resp = self
            .http
            .put(&url)
            .json(fields)
            .send()
            .await
            .with_ctx(|| format!("PUT {url}"))?;
        note_status("PUT", &url, &resp);
        Ok(())
    }

    /// `DELETE /customers/{id}`
    pub async fn delete(&self, id: CustomerId) -> Result<()> {
        let url = self.item_url(id);
        let resp = self
            .http
            .delete(&url)
            .send()
            .await
            .with_ctx(|| format!("DELETE {url}"))?;
        note_status("DELETE", &url, &resp);
        Ok(())
    }
}

/// Mutations complete on any HTTP response; only transport errors fail them.
fn note_status(method: &'static str, url: &str, resp: &reqwest::Response) {
    let status = resp.status();
    if !status.is_success() {
        tracing::warn!(method, url, status = status.as_u16(), "server answered with an error status");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let c = CustomerClient::new("http://127.0.0.1:5000/customers/", None).unwrap();
        assert_eq!(c.base_url(), "http://127.0.0.1:5000/customers");
        assert_eq!(c.item_url(42), "http://127.0.0.1:5000/customers/42");
    }
}
