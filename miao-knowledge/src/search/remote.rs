use super::KnowledgeSearch;
use crate::error::{KnowledgeError, Result};
use crate::model::ScoredEntry;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::debug;

pub const SEARCH_PATH: &str = "/api/knowledge/search";

/// Tags attached to every match coming from the remote service.
pub const REMOTE_TAGS: [&str; 2] = ["RAG", "Knowledge"];

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(rename = "topK")]
    top_k: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    #[serde(rename = "bestMatch")]
    best_match: Option<RemoteHit>,
    results: Vec<RemoteHit>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RemoteHit {
    question: String,
    answer: String,
    /// Passage-only services return `content` instead of a question/answer pair.
    content: Option<String>,
    score: f64,
}

impl RemoteHit {
    fn into_scored(self) -> Option<ScoredEntry> {
        let content = self.content.unwrap_or_default();
        let answer = if self.answer.trim().is_empty() {
            content.clone()
        } else {
            self.answer
        };
        let question = if self.question.trim().is_empty() {
            content
        } else {
            self.question
        };
        if answer.trim().is_empty() || !self.score.is_finite() {
            return None;
        }

        Some(ScoredEntry {
            question,
            answer,
            tags: REMOTE_TAGS.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
            score: self.score,
        })
    }

    fn same_as(&self, other: &RemoteHit) -> bool {
        self.question == other.question && self.answer == other.answer && self.content == other.content
    }
}

/// Client for a knowledge search service exposing `POST /api/knowledge/search`.
#[derive(Debug, Clone)]
pub struct RemoteSearch {
    client: Client,
    endpoint: String,
}

impl RemoteSearch {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), SEARCH_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl KnowledgeSearch for RemoteSearch {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredEntry>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SearchRequest { query, top_k })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KnowledgeError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        let SearchResponse {
            best_match,
            results,
        } = response.json().await?;
        debug!(
            "Remote search returned best match {:?} and {} results",
            best_match.as_ref().map(|m| m.score),
            results.len()
        );

        // The service's own best match goes first; other results follow in
        // the order given, minus a duplicate of the best match.
        let mut hits = Vec::with_capacity(results.len() + 1);
        let others: Vec<RemoteHit> = match &best_match {
            Some(best) => results.into_iter().filter(|hit| !hit.same_as(best)).collect(),
            None => results,
        };
        hits.extend(best_match);
        hits.extend(others);

        Ok(hits
            .into_iter()
            .filter_map(RemoteHit::into_scored)
            .take(top_k)
            .collect())
    }

    fn backend_name(&self) -> &str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::find_best_match;
    use crate::testing::{MockServer, StatusCode};
    use tokio::net::TcpListener;

    async fn serve(status: StatusCode, body: &str) -> (MockServer, RemoteSearch) {
        let server = MockServer::start(status, body).await.unwrap();
        let search = RemoteSearch::new(server.base_url(), Duration::from_secs(5)).unwrap();
        (server, search)
    }

    #[tokio::test]
    async fn test_search_sends_query_and_top_k() {
        let (server, search) = serve(
            StatusCode::OK,
            r#"{"bestMatch": {"question": "什么是人工智能？", "answer": "AI", "score": 0.8}}"#,
        )
        .await;
        assert!(search.endpoint().ends_with("/api/knowledge/search"));

        let results = search.search("什么是人工智能", 3).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].answer, "AI");
        assert!(results[0].tags.contains("RAG"));
        assert!(results[0].tags.contains("Knowledge"));

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/api/knowledge/search");
        assert_eq!(requests[0].body["query"], "什么是人工智能");
        assert_eq!(requests[0].body["topK"], 3);
    }

    #[tokio::test]
    async fn test_best_match_first_and_deduplicated() {
        let (_server, search) = serve(
            StatusCode::OK,
            r#"{
                "bestMatch": {"question": "b", "answer": "best", "score": 0.9},
                "results": [
                    {"question": "b", "answer": "best", "score": 0.9},
                    {"content": "a passage", "score": 0.7}
                ]
            }"#,
        )
        .await;

        let results = search.search("q", 5).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].answer, "best");
        assert_eq!(results[1].question, "a passage");
        assert_eq!(results[1].answer, "a passage");
    }

    #[tokio::test]
    async fn test_threshold_applies_to_remote_score() {
        let (_server, search) = serve(
            StatusCode::OK,
            r#"{"bestMatch": {"question": "q", "answer": "a", "score": 0.5}}"#,
        )
        .await;
        assert!(find_best_match(&search, "q", 3, 0.55).await.is_none());
    }

    #[tokio::test]
    async fn test_missing_best_match_is_empty() {
        let (_server, search) = serve(StatusCode::OK, r#"{"bestMatch": null}"#).await;
        assert!(search.search("q", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let (_server, search) =
            serve(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error": "boom"}"#).await;

        let err = search.search("q", 3).await.unwrap_err();
        assert!(matches!(err, KnowledgeError::RemoteStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_no_match() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let search = RemoteSearch::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
        assert!(search.search("q", 3).await.is_err());
        assert!(find_best_match(&search, "q", 3, 0.0).await.is_none());
    }
}
