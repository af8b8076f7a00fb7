//! Templated question engine.
//!
//! A template is three lines of a small DSL: random variable declarations,
//! question text with `@{...}` interpolations, and an answer check. Templates
//! are parsed once into an AST and validated against the helper namespace;
//! each [`QuestionTemplate::instantiate`] samples the variables once and binds
//! the same values into both the rendered text and the checker.

pub mod ast;
pub mod bank;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod variable;

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, instrument};

use crate::error::{GameError, TemplateError};
use crate::game::io::QuestionDisplay;
use crate::util::trunc_for_log;

use self::ast::{Checker, Expr, Segment};
use self::eval::{helper_arity, is_constant, Env, EvalScope, Value};
use self::variable::{parse_variables, RandomVariable};

pub use self::bank::QuestionBanks;

/// Name bound to the player's raw answer inside the check line.
pub const ANSWER: &str = "answer";

const COMPOUND_FIELDS: [&str; 2] = ["name", "formula"];

#[derive(Debug, Clone)]
pub struct QuestionTemplate {
    index: usize,
    variables: Vec<RandomVariable>,
    text: Arc<Vec<Segment>>,
    checker: Arc<Checker>,
    scope: Arc<EvalScope>,
}

impl QuestionTemplate {
    /// Builds a template from its three source lines.
    pub fn parse(index: usize, lines: [&str; 3], scope: Arc<EvalScope>) -> Result<Self, TemplateError> {
        let [vars, text, check] = lines;
        let variables = parse_variables(vars).map_err(|m| TemplateError::parse(index, m))?;
        let text = parser::parse_text(text).map_err(|m| TemplateError::parse(index, format!("question text: {m}")))?;
        let checker = parser::parse_checker(check).map_err(|m| TemplateError::parse(index, format!("answer check: {m}")))?;

        let mut known: Vec<&str> = variables.iter().map(|v| v.name.as_str()).collect();
        for segment in &text {
            if let Segment::Expr(e) = segment {
                resolve(e, &known).map_err(|m| TemplateError::parse(index, m))?;
            }
        }
        known.push(ANSWER);
        for (name, expr) in &checker.bindings {
            resolve(expr, &known).map_err(|m| TemplateError::parse(index, m))?;
            known.push(name);
        }
        resolve(&checker.verdict, &known).map_err(|m| TemplateError::parse(index, m))?;

        Ok(Self { index, variables, text: Arc::new(text), checker: Arc::new(checker), scope })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    #[cfg(test)]
    pub fn variables(&self) -> &[RandomVariable] {
        &self.variables
    }

    /// Samples every variable once, in declaration order.
    pub fn instantiate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Question, TemplateError> {
        let values = self.variables.iter().map(|v| v.sample(rng)).collect();
        self.instantiate_with(values)
    }

    /// Binds explicit values positionally to the declared variables.
    #[instrument(level = "debug", target = "template", skip(self), fields(template = self.index))]
    pub fn instantiate_with(&self, values: Vec<f64>) -> Result<Question, TemplateError> {
        if values.len() != self.variables.len() {
            return Err(TemplateError::eval(format!(
                "template {} takes {} values, got {}",
                self.index,
                self.variables.len(),
                values.len()
            )));
        }

        let bound: Vec<(String, f64)> = self.variables.iter().map(|v| v.name.clone()).zip(values).collect();
        let mut env = Env::new(&self.scope);
        for (name, value) in &bound {
            env.bind(name.clone(), Value::Number(*value));
        }
        let text = env.render(&self.text)?;
        debug!(target: "template", template = self.index, text = %trunc_for_log(&text, 120), "question rendered");

        let checker = Arc::clone(&self.checker);
        let scope = Arc::clone(&self.scope);
        Ok(Question::new(text, move |answer: &str| {
            let mut env = Env::new(&scope);
            for (name, value) in &bound {
                env.bind(name.clone(), Value::Number(*value));
            }
            env.bind(ANSWER, Value::Str(answer.to_string()));
            env.check(&checker)
        }))
    }
}

/// Rejects names and helpers that would only fail once a player lands on the square.
fn resolve(expr: &Expr, known: &[&str]) -> Result<(), String> {
    match expr {
        Expr::Var(name) if !known.contains(&name.as_str()) && !is_constant(name) => {
            return Err(format!("unknown name `{name}`"));
        }
        Expr::Call { name, args } => {
            let (min, max) = helper_arity(name).ok_or_else(|| format!("unknown function `{name}`"))?;
            if args.len() < min || max.map_or(false, |max| args.len() > max) {
                return Err(format!("`{name}` called with {} argument(s)", args.len()));
            }
        }
        Expr::Member { field, .. } if !eval_field_known(field) => {
            return Err(format!("unknown field `.{field}`"));
        }
        _ => {}
    }
    expr.children().into_iter().try_for_each(|child| resolve(child, known))
}

fn eval_field_known(field: &str) -> bool {
    crate::chem::Element::FIELDS.contains(&field) || COMPOUND_FIELDS.contains(&field)
}

type CheckFn = dyn Fn(&str) -> Result<bool, TemplateError> + Send + Sync;

/// One concrete question: rendered text plus its bound answer check.
pub struct Question {
    text: String,
    checker: Box<CheckFn>,
}

impl fmt::Debug for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Question").field("text", &self.text).finish_non_exhaustive()
    }
}

impl Question {
    pub fn new(text: impl Into<String>, checker: impl Fn(&str) -> Result<bool, TemplateError> + Send + Sync + 'static) -> Self {
        Self { text: text.into(), checker: Box::new(checker) }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn check(&self, answer: &str) -> Result<bool, TemplateError> {
        (self.checker)(answer)
    }

    /// Shows the text, waits for one answer and checks it exactly once.
    pub async fn ask<D: QuestionDisplay + ?Sized>(&self, display: &mut D) -> Result<bool, GameError> {
        let answer = display.prompt(&self.text).await?;
        debug!(target: "template", answer_len = answer.len(), "answer received");
        Ok(self.check(&answer)?)
    }
}
