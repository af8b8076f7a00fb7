//! Template banks: blank-line separated blocks of three template lines.

use std::path::Path;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, instrument};

use crate::error::{ConfigError, TemplateError};

use super::eval::EvalScope;
use super::QuestionTemplate;

const BUILTIN_QUIZ: &str = include_str!("banks/quiz.bank");
const BUILTIN_LAB: &str = include_str!("banks/lab.bank");

#[derive(Debug, Clone)]
pub struct TemplateBank {
    name: String,
    templates: Vec<QuestionTemplate>,
}

impl TemplateBank {
    /// Parses every block in source order. Any malformed block fails the whole bank.
    #[instrument(level = "info", target = "template", skip(source, scope), fields(bytes = source.len()))]
    pub fn parse(name: &str, source: &str, scope: Arc<EvalScope>) -> Result<Self, TemplateError> {
        let templates = split_blocks(source)
            .into_iter()
            .enumerate()
            .map(|(index, block)| match <[&str; 3]>::try_from(block.as_slice()) {
                Ok(lines) => QuestionTemplate::parse(index, lines, Arc::clone(&scope)),
                Err(_) => Err(TemplateError::Syntax { template: index, lines: block.len() }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(target: "template", bank = name, templates = templates.len(), "template bank loaded");
        Ok(Self { name: name.to_string(), templates })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> Option<&QuestionTemplate> {
        self.templates.get(index)
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&QuestionTemplate> {
        self.templates.choose(rng)
    }
}

/// Groups trimmed lines into blocks; lines that are empty after trimming separate blocks.
fn split_blocks(source: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in source.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// The two banks squares draw from.
#[derive(Debug, Clone)]
pub struct QuestionBanks {
    pub quiz: TemplateBank,
    pub lab: TemplateBank,
}

impl QuestionBanks {
    #[cfg(test)]
    pub fn builtin(scope: Arc<EvalScope>) -> Result<Self, TemplateError> {
        Ok(Self {
            quiz: TemplateBank::parse("quiz", BUILTIN_QUIZ, Arc::clone(&scope))?,
            lab: TemplateBank::parse("lab", BUILTIN_LAB, scope)?,
        })
    }

    /// Built-in banks, each optionally replaced by the contents of a file.
    pub fn load(quiz: Option<&Path>, lab: Option<&Path>, scope: Arc<EvalScope>) -> Result<Self, ConfigError> {
        let read = |path: Option<&Path>, builtin: &'static str| -> Result<String, ConfigError> {
            match path {
                Some(p) => std::fs::read_to_string(p)
                    .map_err(|source| ConfigError::BankFile { path: p.display().to_string(), source }),
                None => Ok(builtin.to_string()),
            }
        };
        Ok(Self {
            quiz: TemplateBank::parse("quiz", &read(quiz, BUILTIN_QUIZ)?, Arc::clone(&scope))?,
            lab: TemplateBank::parse("lab", &read(lab, BUILTIN_LAB)?, scope)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemplateBank> {
        [&self.quiz, &self.lab].into_iter()
    }
}
