//! Indexer height over a subgraph's GraphQL endpoint.

use std::{collections::HashMap, time::Duration};

use itertools::Itertools;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::{error::IndexerError, ledger::IndexerHeight};

const META_QUERY: &str = "{ _meta { block { number } } }";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads `_meta.block.number` from per-chain subgraph endpoints.
#[derive(Clone, Debug)]
pub struct SubgraphIndexer {
    client: Client,
    endpoints: HashMap<u64, Url>,
}

impl SubgraphIndexer {
    pub fn new() -> Result<Self, IndexerError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoints: HashMap::new(),
        })
    }

    /// Registers the subgraph serving `chain_id`.
    pub fn with_endpoint(mut self, chain_id: u64, url: Url) -> Self {
        self.endpoints.insert(chain_id, url);
        self
    }

    pub fn endpoint(&self, chain_id: u64) -> Option<&Url> {
        self.endpoints.get(&chain_id)
    }
}

impl IndexerHeight for SubgraphIndexer {
    async fn last_indexed_block(&self, chain_id: u64) -> Result<u64, IndexerError> {
        let url = self
            .endpoint(chain_id)
            .ok_or(IndexerError::UnknownChain(chain_id))?;
        let resp = self
            .client
            .post(url.clone())
            .json(&GraphqlRequest { query: META_QUERY })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IndexerError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let height = resp.json::<GraphqlResponse>().await?.block_number()?;
        debug!(chain_id, %url, height, "queried subgraph meta");
        Ok(height)
    }
}

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<MetaData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct MetaData {
    #[serde(rename = "_meta")]
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    block: MetaBlock,
}

#[derive(Debug, Deserialize)]
struct MetaBlock {
    number: u64,
}

impl GraphqlResponse {
    fn block_number(self) -> Result<u64, IndexerError> {
        if !self.errors.is_empty() {
            return Err(IndexerError::Query(
                self.errors.into_iter().map(|e| e.message).join("; "),
            ));
        }
        self.data
            .and_then(|d| d.meta)
            .map(|m| m.block.number)
            .ok_or(IndexerError::NullResp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<u64, IndexerError> {
        serde_json::from_str::<GraphqlResponse>(body)
            .unwrap()
            .block_number()
    }

    #[test]
    fn test_block_number_from_meta() {
        assert_eq!(
            parse(r#"{"data":{"_meta":{"block":{"number":28411734}}}}"#).unwrap(),
            28411734
        );
    }

    #[test]
    fn test_block_number_errors() {
        assert!(matches!(
            parse(r#"{"errors":[{"message":"indexing_error"},{"message":"stale"}]}"#),
            Err(IndexerError::Query(msg)) if msg == "indexing_error; stale"
        ));
        assert!(matches!(parse(r#"{"data":null}"#), Err(IndexerError::NullResp)));
        assert!(matches!(parse(r#"{"data":{"_meta":null}}"#), Err(IndexerError::NullResp)));
    }

    #[tokio::test]
    async fn test_unknown_chain() {
        let indexer = SubgraphIndexer::new()
            .unwrap()
            .with_endpoint(8453, Url::parse("http://localhost:8000/subgraphs/name/clober").unwrap());
        assert!(indexer.endpoint(8453).is_some());
        assert!(matches!(
            indexer.last_indexed_block(1).await,
            Err(IndexerError::UnknownChain(1))
        ));
    }
}
