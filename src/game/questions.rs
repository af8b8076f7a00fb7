//! Question sources for Quiz and Lab squares.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, instrument};

use crate::config::{QuestionSource, QuestionsConfig};
use crate::error::{GameError, ProxyError, TemplateError};
use crate::proxy::{QuestionProxy, RemoteKind};
use crate::template::{Question, QuestionBanks};
use crate::util::fill_template;

use super::board::SquareKind;
use super::io::QuestionDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
  Quiz,
  Lab,
}

impl QuestionKind {
  pub fn for_square(kind: SquareKind) -> Option<Self> {
    match kind {
      SquareKind::Basic => None,
      SquareKind::Quiz => Some(Self::Quiz),
      SquareKind::Lab => Some(Self::Lab),
    }
  }

  /// Banner shown when a player lands on the square.
  pub fn title(self, penalty: usize) -> String {
    let tpl = match self {
      Self::Quiz => "Quiz: Answer correctly or you'll be moved back {n} squares.",
      Self::Lab => "Lab Question: Answer correctly or you'll be moved back {n} squares.",
    };
    fill_template(tpl, &[("n", &penalty.to_string())])
  }
}

/// A question ready to be asked.
#[derive(Debug)]
pub enum PreparedQuestion {
  Template(Question),
  Remote { text: String, proxy: QuestionProxy },
}

impl PreparedQuestion {
  pub fn text(&self) -> &str {
    match self {
      Self::Template(q) => q.text(),
      Self::Remote { text, .. } => text,
    }
  }

  pub async fn ask<D: QuestionDisplay + ?Sized>(&self, display: &mut D) -> Result<bool, GameError> {
    match self {
      Self::Template(q) => q.ask(display).await,
      Self::Remote { text, proxy } => {
        let answer = display.prompt(text).await?;
        Ok(proxy.check_answer(text, &answer).await?)
      }
    }
  }
}

/// Draws questions for a session from the template banks or the remote proxy.
#[derive(Debug, Clone)]
pub struct QuestionDeck {
  banks: Arc<QuestionBanks>,
  proxy: Option<QuestionProxy>,
  quiz: QuestionSource,
  lab: QuestionSource,
}

impl QuestionDeck {
  pub fn new(banks: Arc<QuestionBanks>, proxy: Option<QuestionProxy>, sources: &QuestionsConfig) -> Self {
    Self { banks, proxy, quiz: sources.quiz, lab: sources.lab }
  }

  pub fn source(&self, kind: QuestionKind) -> QuestionSource {
    match kind {
      QuestionKind::Quiz => self.quiz,
      QuestionKind::Lab => self.lab,
    }
  }

  #[instrument(level = "debug", target = "game", skip(self, rng))]
  pub async fn draw<R: Rng + ?Sized>(&self, kind: QuestionKind, rng: &mut R) -> Result<PreparedQuestion, GameError> {
    let remote = match (self.source(kind), kind) {
      (QuestionSource::Templates, _) => {
        let bank = match kind {
          QuestionKind::Quiz => &self.banks.quiz,
          QuestionKind::Lab => &self.banks.lab,
        };
        let template = bank
          .choose(rng)
          .ok_or_else(|| TemplateError::eval(format!("the {} bank has no templates", bank.name())))?;
        debug!(target: "game", bank = bank.name(), template = template.index(), "template drawn");
        return Ok(PreparedQuestion::Template(template.instantiate(rng)?));
      }
      (QuestionSource::RemoteSimple, _) => RemoteKind::Simple,
      (QuestionSource::Remote, QuestionKind::Quiz) => RemoteKind::Quiz,
      (QuestionSource::Remote, QuestionKind::Lab) => RemoteKind::Lab,
    };

    let proxy = self.proxy.clone().ok_or(ProxyError::NotConfigured)?;
    let text = proxy.fetch_question(remote).await?;
    Ok(PreparedQuestion::Remote { text, proxy })
  }
}
