//! Minimal client for the remote question proxy.
//!
//! The proxy fronts a generative model: `GET /simple`, `/quiz` and `/lab`
//! return one line of question text, and `POST /` with `question~answer`
//! returns a body containing `true` when the answer is judged correct.
//! Calls log latencies and body sizes, never the answer text.

use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use tracing::{error, info, instrument};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::util::trunc_for_log;

/// Separator between question and answer in the check request.
pub const DELIMITER: char = '~';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKind {
  Simple,
  Quiz,
  Lab,
}

impl RemoteKind {
  pub fn path(self) -> &'static str {
    match self {
      Self::Simple => "simple",
      Self::Quiz => "quiz",
      Self::Lab => "lab",
    }
  }
}

/// Request body for an answer check. Tildes are stripped from the answer so it
/// cannot forge the delimiter.
pub fn answer_body(question: &str, answer: &str) -> String {
  let answer: String = answer.chars().filter(|c| *c != DELIMITER).collect();
  format!("{question}{DELIMITER}{answer}")
}

pub fn judged_correct(body: &str) -> bool {
  body.contains("true")
}

#[derive(Clone, Debug)]
pub struct QuestionProxy {
  client: reqwest::Client,
  pub base_url: String,
}

impl QuestionProxy {
  /// Construct the client if a proxy URL is configured; otherwise return None.
  pub fn from_config(cfg: &ProxyConfig) -> Option<Self> {
    let base_url = cfg.url.as_deref()?.trim_end_matches('/').to_string();
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs))
      .build()
      .ok()?;
    Some(Self { client, base_url })
  }

  #[instrument(level = "info", target = "proxy", skip(self), fields(base_url = %self.base_url))]
  pub async fn fetch_question(&self, kind: RemoteKind) -> Result<String, ProxyError> {
    let url = format!("{}/{}", self.base_url, kind.path());
    let start = Instant::now();
    let res = self.client.get(&url).header(USER_AGENT, "chemboard/0.1").send().await?;
    let text = Self::text_or_status(res).await?.trim().to_string();
    info!(target: "proxy", elapsed = ?start.elapsed(), len = text.len(), "question fetched");
    Ok(text)
  }

  #[instrument(level = "info", target = "proxy", skip(self, question, answer), fields(answer_len = answer.len()))]
  pub async fn check_answer(&self, question: &str, answer: &str) -> Result<bool, ProxyError> {
    let url = format!("{}/", self.base_url);
    let start = Instant::now();
    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "chemboard/0.1")
      .header(CONTENT_TYPE, "text/plain; charset=utf-8")
      .body(answer_body(question, answer))
      .send()
      .await?;
    let text = Self::text_or_status(res).await?;
    let correct = judged_correct(&text);
    info!(target: "proxy", elapsed = ?start.elapsed(), %correct, "answer judged");
    Ok(correct)
  }

  async fn text_or_status(res: reqwest::Response) -> Result<String, ProxyError> {
    let status = res.status();
    if !status.is_success() {
      let body = res.text().await.unwrap_or_default();
      error!(target: "proxy", %status, body = %trunc_for_log(&body, 200), "proxy returned an error status");
      return Err(ProxyError::Status { status: status.as_u16(), body });
    }
    Ok(res.text().await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
  };
  use tokio::net::TcpListener;

  async fn spawn_proxy() -> String {
    let app = Router::new()
      .route("/quiz", get(|| async { "What is the charge of an electron?\n" }))
      .route("/lab", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model unavailable") }))
      .route(
        "/",
        post(|body: String| async move {
          if body == "What is the charge of an electron?~-1" { "true" } else { "false" }
        }),
      );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
  }

  fn proxy(url: String) -> QuestionProxy {
    QuestionProxy::from_config(&ProxyConfig { url: Some(url), timeout_secs: 5 }).unwrap()
  }

  #[test]
  fn answers_cannot_smuggle_the_delimiter() {
    assert_eq!(answer_body("Q?", "~a~b~"), "Q?~ab");
    assert!(judged_correct("true\n"));
    assert!(!judged_correct("false"));
  }

  #[test]
  fn no_url_means_no_proxy() {
    assert!(QuestionProxy::from_config(&ProxyConfig::default()).is_none());
  }

  #[tokio::test]
  async fn fetches_and_checks_against_a_live_proxy() {
    let p = proxy(spawn_proxy().await);
    let q = p.fetch_question(RemoteKind::Quiz).await.unwrap();
    assert_eq!(q, "What is the charge of an electron?");
    assert!(p.check_answer(&q, "-~1").await.unwrap());
    assert!(!p.check_answer(&q, "+1").await.unwrap());
  }

  #[tokio::test]
  async fn error_status_is_not_a_wrong_answer() {
    let p = proxy(spawn_proxy().await);
    match p.fetch_question(RemoteKind::Lab).await {
      Err(ProxyError::Status { status, body }) => {
        assert_eq!(status, 500);
        assert_eq!(body, "model unavailable");
      }
      other => panic!("expected a status error, got {other:?}"),
    }
    assert!(matches!(p.fetch_question(RemoteKind::Simple).await, Err(ProxyError::Status { status: 404, .. })));
  }

  #[tokio::test]
  async fn unreachable_proxy_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let p = proxy(format!("http://{addr}"));
    assert!(matches!(p.fetch_question(RemoteKind::Quiz).await, Err(ProxyError::Transport(_))));
  }
}
