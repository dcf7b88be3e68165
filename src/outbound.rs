use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use tokio::time;
use tracing::{debug, error, info};

use crate::{
    database::Database,
    model::{Form, Response},
};

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Attempts per form in one fetch round before moving on to the next form.
const MAX_ATTEMPTS: usize = 3;

/// A client of the form backend's REST API.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn request(&self, path: &str) -> RequestBuilder {
        let request = self.client.get(format!("{}/{path}", self.base_url));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// `GET /forms/{id}/`
    pub async fn fetch_form(&self, form_id: i64) -> Result<Form> {
        self.request(&format!("forms/{form_id}/"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("malformed form {form_id}"))
    }

    /// `GET /forms/{id}/responses/`
    pub async fn fetch_responses(&self, form_id: i64) -> Result<Vec<Response>> {
        self.request(&format!("forms/{form_id}/responses/"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("malformed responses of form {form_id}"))
    }

    /// Fetches one form and its responses into `db`.
    pub async fn refresh(&self, form_id: i64, db: &Database) -> Result<()> {
        let form = self.fetch_form(form_id).await?;
        let responses = self.fetch_responses(form_id).await?;
        info!(
            form_id,
            questions = form.questions().count(),
            responses = responses.len(),
            "Fetched form"
        );
        db.insert_snapshot(form_id, form, responses)
    }
}

pub async fn fetch_periodically(
    forms: Arc<Vec<i64>>,
    client: ApiClient,
    period: Duration,
    retry: Duration,
    db: Database,
) {
    let mut itv = time::interval(period);
    loop {
        itv.tick().await;
        for &form_id in forms.iter() {
            let mut re_itv = time::interval(retry);
            for attempt in 1..=MAX_ATTEMPTS {
                re_itv.tick().await;
                match client.refresh(form_id, &db).await {
                    Ok(()) => break,
                    Err(error) if attempt < MAX_ATTEMPTS => {
                        error!(
                            form_id,
                            "Problem while fetching form. Retrying in {} seconds. {:#}",
                            retry.as_secs(),
                            error
                        );
                    }
                    Err(error) => {
                        error!(
                            form_id,
                            "Problem while fetching form. Skipping until the next round. {:#}",
                            error
                        );
                    }
                }
            }
        }
        match db.form_ids() {
            Ok(stored) => debug!(?stored, "Fetch round finished"),
            Err(error) => error!("Problem while reading database. {:#}", error),
        }
    }
}
