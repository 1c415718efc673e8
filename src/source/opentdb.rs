use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;

use crate::session::params::{CategoryId, Difficulty};
use crate::session::question::RawQuestionRecord;
use crate::source::{Category, QuestionSource, SourceError};

pub const DEFAULT_BASE_URL: &str = "https://opentdb.com";

const RESPONSE_OK: u8 = 0;
const RESPONSE_NO_RESULTS: u8 = 1;

/// Human-readable meaning of a provider response code.
pub fn describe_response_code(code: u8) -> &'static str {
    match code {
        RESPONSE_OK => "success",
        RESPONSE_NO_RESULTS => "not enough questions for this query",
        2 => "invalid parameter",
        3 => "session token not found",
        4 => "session token exhausted",
        5 => "too many requests, wait a few seconds",
        _ => "unknown response code",
    }
}

#[derive(Deserialize)]
struct BatchResponse {
    response_code: u8,
    #[serde(default)]
    results: Vec<RawQuestionRecord>,
}

#[derive(Deserialize)]
struct CategoryResponse {
    trivia_categories: Vec<Category>,
}

pub fn batch_url(
    base_url: &str,
    category: CategoryId,
    difficulty: Option<Difficulty>,
    amount: usize,
) -> String {
    let mut url = format!(
        "{}/api.php?amount={amount}&category={category}&type=multiple",
        base_url.trim_end_matches('/')
    );
    if let Some(d) = difficulty {
        url.push_str("&difficulty=");
        url.push_str(d.as_str());
    }
    url
}

pub fn categories_url(base_url: &str) -> String {
    format!("{}/api_category.php", base_url.trim_end_matches('/'))
}

/// Response code 1 ("no results") is an empty batch, not an error.
pub fn parse_batch(body: &str) -> Result<Vec<RawQuestionRecord>, SourceError> {
    let response: BatchResponse = serde_json::from_str(body)?;
    match response.response_code {
        RESPONSE_OK => Ok(response.results),
        RESPONSE_NO_RESULTS => {
            debug!("provider reported no results for request");
            Ok(Vec::new())
        }
        code => Err(SourceError::Provider(code)),
    }
}

pub fn parse_categories(body: &str) -> Result<Vec<Category>, SourceError> {
    let response: CategoryResponse = serde_json::from_str(body)?;
    let mut categories = response.trivia_categories;
    categories.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(categories)
}

pub struct OpenTdbSource {
    base_url: String,
    #[cfg(feature = "network")]
    client: reqwest::blocking::Client,
}

impl OpenTdbSource {
    #[cfg(feature = "network")]
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.to_string(),
            client,
        })
    }

    #[cfg(not(feature = "network"))]
    pub fn new(base_url: &str, _timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[cfg(feature = "network")]
    fn get(&self, url: &str) -> Result<String, SourceError> {
        debug!("GET {url}");
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            warn!("GET {url} failed with status {status}");
            return Err(SourceError::HttpStatus(status.as_u16()));
        }
        Ok(response.text()?)
    }

    #[cfg(not(feature = "network"))]
    fn get(&self, url: &str) -> Result<String, SourceError> {
        warn!("skipping GET {url}: built without network support");
        Err(SourceError::Offline)
    }
}

impl QuestionSource for OpenTdbSource {
    fn fetch_batch(
        &self,
        category: CategoryId,
        difficulty: Option<Difficulty>,
        amount: usize,
    ) -> Result<Vec<RawQuestionRecord>, SourceError> {
        let url = batch_url(&self.base_url, category, difficulty, amount);
        let body = self.get(&url)?;
        parse_batch(&body)
    }

    fn fetch_categories(&self) -> Result<Vec<Category>, SourceError> {
        let body = self.get(&categories_url(&self.base_url))?;
        parse_categories(&body)
    }
}
