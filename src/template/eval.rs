//! Tree-walking evaluator for template expressions and the helper namespace.
//!
//! Values are loosely typed the way question authors expect: `+` concatenates
//! when either side is text, and `==` between text and a number compares the
//! text's numeric reading.

use std::fmt;

use crate::chem::geometry::{self, SHAPES};
use crate::chem::periodic::FieldValue;
use crate::chem::{compounds, Compound, Element, PeriodicTable};
use crate::error::TemplateError;

use super::ast::{BinaryOp, Checker, Expr, Segment, UnaryOp};

type EResult<T = Value> = Result<T, TemplateError>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
    Element(&'static Element),
    Compound(Compound),
    List(Vec<Value>),
}

impl Value {
    pub fn truthy(&self) -> bool {
        match self {
            Self::Nil => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Str(s) => !s.is_empty(),
            Self::Element(_) | Self::Compound(_) | Self::List(_) => true,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nothing",
            Self::Bool(_) => "a boolean",
            Self::Number(_) => "a number",
            Self::Str(_) => "text",
            Self::Element(_) => "an element",
            Self::Compound(_) => "a compound",
            Self::List(_) => "a list",
        }
    }

    fn to_number(&self) -> EResult<f64> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Self::Str(s) => Ok(parse_number(s).unwrap_or(f64::NAN)),
            Self::Nil => Ok(f64::NAN),
            other => Err(TemplateError::eval(format!("expected a number, found {}", other.type_name()))),
        }
    }
}

impl From<FieldValue> for Value {
    fn from(v: FieldValue) -> Self {
        match v {
            FieldValue::Number(n) => Self::Number(n),
            FieldValue::Text(s) => Self::Str(s.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nothing"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Str(s) => f.write_str(s),
            Self::Element(e) => fmt::Display::fmt(e, f),
            Self::Compound(c) => f.write_str(&c.formula),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    fmt::Display::fmt(item, f)?;
                }
                Ok(())
            }
        }
    }
}

/// Integral values print without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".into()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".into() } else { "-Infinity".into() }
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse().ok()
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    use Value::*;

    match (a, b) {
        (Number(x), Number(y)) => x == y,
        (Str(s), Number(n)) | (Number(n), Str(s)) => parse_number(s).map_or(false, |x| x == *n),
        (Str(x), Str(y)) => x == y,
        (Bool(x), Bool(y)) => x == y,
        (Bool(b), other) | (other, Bool(b)) => loose_eq(&Number(if *b { 1.0 } else { 0.0 }), other),
        (Nil, Nil) => true,
        (Element(x), Element(y)) => x.num == y.num,
        (Compound(x), Compound(y)) => x == y,
        (List(x), List(y)) => x.len() == y.len() && x.iter().zip(y).all(|(a, b)| loose_eq(a, b)),
        _ => false,
    }
}

/// `(min, max)` argument counts for each helper; `None` means variadic.
pub fn helper_arity(name: &str) -> Option<(usize, Option<usize>)> {
    Some(match name {
        "element" | "count" | "angles" | "compound" | "lower" | "upper" | "trim" | "num" | "floor"
        | "round" | "abs" => (1, Some(1)),
        "shape" | "check_angles" => (2, Some(2)),
        "find_element" | "find_elements" => (2, None),
        "check" => (1, None),
        "max" | "min" => (1, None),
        "compound_count" => (0, Some(0)),
        _ => return None,
    })
}

/// Named constants visible to every template.
pub fn is_constant(name: &str) -> bool {
    name == "shapes"
}

/// Read-only reference data shared by all templates.
#[derive(Debug, Clone)]
pub struct EvalScope {
    pub table: PeriodicTable,
    pub compounds: Vec<Compound>,
}

impl Default for EvalScope {
    fn default() -> Self {
        let table = PeriodicTable::default();
        let compounds = compounds::catalogue(&table);
        Self { table, compounds }
    }
}

/// Variable bindings for one evaluation, layered over an [`EvalScope`].
pub struct Env<'a> {
    scope: &'a EvalScope,
    vars: Vec<(String, Value)>,
}

impl<'a> Env<'a> {
    pub fn new(scope: &'a EvalScope) -> Self {
        Self { scope, vars: Vec::new() }
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.vars.push((name.into(), value));
    }

    fn lookup(&self, name: &str) -> EResult {
        if let Some((_, v)) = self.vars.iter().rev().find(|(n, _)| n == name) {
            return Ok(v.clone());
        }
        match name {
            "shapes" => Ok(Value::List(SHAPES.iter().map(|s| Value::Str(s.to_string())).collect())),
            _ => Err(TemplateError::eval(format!("unknown name `{name}`"))),
        }
    }

    pub fn render(&self, segments: &[Segment]) -> EResult<String> {
        let mut out = String::new();
        for segment in segments {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Expr(e) => out.push_str(&self.eval(e)?.to_string()),
            }
        }
        Ok(out)
    }

    pub fn check(&mut self, checker: &Checker) -> EResult<bool> {
        for (name, expr) in &checker.bindings {
            let value = self.eval(expr)?;
            self.bind(name.clone(), value);
        }
        Ok(self.eval(&checker.verdict)?.truthy())
    }

    pub fn eval(&self, expr: &Expr) -> EResult {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Var(name) => self.lookup(name),
            Expr::Call { name, args } => {
                let args = args.iter().map(|a| self.eval(a)).collect::<EResult<Vec<_>>>()?;
                self.call(name, args)
            }
            Expr::Member { target, field } => member(self.eval(target)?, field),
            Expr::Index { target, index } => {
                let target = self.eval(target)?;
                let index = self.eval(index)?.to_number()?;
                match target {
                    Value::List(items) => {
                        if index < 0.0 || index.fract() != 0.0 {
                            return Err(TemplateError::eval(format!("bad list index {}", format_number(index))));
                        }
                        items.into_iter().nth(index as usize).ok_or_else(|| {
                            TemplateError::eval(format!("list index {} out of range", format_number(index)))
                        })
                    }
                    other => Err(TemplateError::eval(format!("cannot index into {}", other.type_name()))),
                }
            }
            Expr::Unary { op, operand } => {
                let v = self.eval(operand)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!v.truthy()),
                    UnaryOp::Neg => Value::Number(-v.to_number()?),
                })
            }
            Expr::Binary { op: BinaryOp::And, left, right } => {
                let l = self.eval(left)?.truthy();
                Ok(Value::Bool(l && self.eval(right)?.truthy()))
            }
            Expr::Binary { op: BinaryOp::Or, left, right } => {
                let l = self.eval(left)?.truthy();
                Ok(Value::Bool(l || self.eval(right)?.truthy()))
            }
            Expr::Binary { op, left, right } => binary(*op, self.eval(left)?, self.eval(right)?),
            Expr::Conditional { cond, then, otherwise } => {
                if self.eval(cond)?.truthy() {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
        }
    }

    fn call(&self, name: &str, args: Vec<Value>) -> EResult {
        let table = &self.scope.table;
        let num = |i: usize| args[i].to_number();
        let text = |i: usize| args[i].to_string();

        Ok(match name {
            "element" => {
                let n = num(0)?;
                if n >= 1.0 && n.fract() == 0.0 {
                    table.by_number(n as u32).map_or(Value::Nil, Value::Element)
                } else {
                    Value::Nil
                }
            }
            "find_element" => {
                let conds = element_conditions(&args)?;
                table.find(|e| matches_all(e, &conds)).map_or(Value::Nil, Value::Element)
            }
            "find_elements" => {
                let conds = element_conditions(&args)?;
                Value::List(table.filter(|e| matches_all(e, &conds)).into_iter().map(Value::Element).collect())
            }
            "count" => match &args[0] {
                Value::List(items) => Value::Number(items.len() as f64),
                other => return Err(TemplateError::eval(format!("cannot count {}", other.type_name()))),
            },
            "shape" => {
                let (s, l) = (num(0)?, num(1)?);
                if s.fract() != 0.0 || l.fract() != 0.0 || s.is_nan() || l.is_nan() {
                    Value::Str(geometry::NO_SUCH_SHAPE.to_string())
                } else {
                    Value::Str(geometry::shape(s as i64, l as i64).to_string())
                }
            }
            "angles" => Value::List(
                geometry::bond_angles(&text(0))
                    .iter()
                    .map(|a| Value::Str(a.to_string()))
                    .collect(),
            ),
            "check_angles" => Value::Bool(geometry::check_bond_angles(&text(0).to_lowercase(), &text(1))),
            "check" => {
                let input = text(0);
                let accepted: Vec<String> = args[1..].iter().map(Value::to_string).collect();
                let numeric = parse_number(&input).map_or(false, |n| {
                    args[1..].iter().any(|a| loose_eq(&Value::Number(n), a))
                });
                Value::Bool(numeric || geometry::check_any(&input, &accepted))
            }
            "compound" => {
                let i = num(0)?;
                if i >= 0.0 && i.fract() == 0.0 {
                    self.scope.compounds.get(i as usize).cloned().map_or(Value::Nil, Value::Compound)
                } else {
                    Value::Nil
                }
            }
            "compound_count" => Value::Number(self.scope.compounds.len() as f64),
            "lower" => Value::Str(text(0).to_lowercase()),
            "upper" => Value::Str(text(0).to_uppercase()),
            "trim" => Value::Str(text(0).trim().to_string()),
            "num" => Value::Number(args[0].to_number()?),
            "floor" => Value::Number(num(0)?.floor()),
            "round" => Value::Number((num(0)? + 0.5).floor()),
            "abs" => Value::Number(num(0)?.abs()),
            "max" | "min" => {
                let mut best = num(0)?;
                for i in 1..args.len() {
                    let n = num(i)?;
                    best = if name == "max" { best.max(n) } else { best.min(n) };
                }
                Value::Number(best)
            }
            _ => return Err(TemplateError::eval(format!("unknown helper `{name}`"))),
        })
    }
}

fn member(target: Value, field: &str) -> EResult {
    match &target {
        Value::Element(e) => e
            .field(field)
            .map(Value::from)
            .ok_or_else(|| TemplateError::eval(format!("elements have no field `{field}`"))),
        Value::Compound(c) => match field {
            "name" => Ok(Value::Str(c.name.clone())),
            "formula" => Ok(Value::Str(c.formula.clone())),
            _ => Err(TemplateError::eval(format!("compounds have no field `{field}`"))),
        },
        other => Err(TemplateError::eval(format!("cannot read `{field}` of {}", other.type_name()))),
    }
}

fn binary(op: BinaryOp, left: Value, right: Value) -> EResult {
    use BinaryOp::*;

    Ok(match op {
        Add => match (&left, &right) {
            (Value::Str(_), _) | (_, Value::Str(_)) => Value::Str(format!("{left}{right}")),
            _ => Value::Number(left.to_number()? + right.to_number()?),
        },
        Sub => Value::Number(left.to_number()? - right.to_number()?),
        Mul => Value::Number(left.to_number()? * right.to_number()?),
        Div => Value::Number(left.to_number()? / right.to_number()?),
        Rem => Value::Number(left.to_number()? % right.to_number()?),
        Eq => Value::Bool(loose_eq(&left, &right)),
        Ne => Value::Bool(!loose_eq(&left, &right)),
        Lt | Le | Gt | Ge => {
            let ordering = match (&left, &right) {
                (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
                _ => left.to_number()?.partial_cmp(&right.to_number()?),
            };
            Value::Bool(match ordering {
                None => false,
                Some(o) => match op {
                    Lt => o.is_lt(),
                    Le => o.is_le(),
                    Gt => o.is_gt(),
                    _ => o.is_ge(),
                },
            })
        }
        And | Or => unreachable!("short-circuit operators are evaluated in Env::eval"),
    })
}

fn element_conditions(args: &[Value]) -> EResult<Vec<(String, Value)>> {
    if args.len() % 2 != 0 {
        return Err(TemplateError::eval("element lookups take field/value pairs"));
    }
    args.chunks(2)
        .map(|pair| match &pair[0] {
            Value::Str(field) if Element::FIELDS.contains(&field.as_str()) => Ok((field.clone(), pair[1].clone())),
            other => Err(TemplateError::eval(format!("`{other}` is not an element field"))),
        })
        .collect()
}

fn matches_all(e: &Element, conds: &[(String, Value)]) -> bool {
    conds
        .iter()
        .all(|(field, want)| e.field(field).map_or(false, |have| loose_eq(&Value::from(have), want)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::parser::{parse_checker, parse_expression};

    fn eval_with(src: &str, vars: &[(&str, Value)]) -> EResult {
        let scope = EvalScope::default();
        let mut env = Env::new(&scope);
        for (name, value) in vars {
            env.bind(*name, value.clone());
        }
        env.eval(&parse_expression(src).unwrap())
    }

    fn eval(src: &str) -> Value {
        eval_with(src, &[]).unwrap()
    }

    #[test]
    fn numbers_format_like_integers_when_whole() {
        assert_eq!(eval("7 / 2").to_string(), "3.5");
        assert_eq!(eval("6 / 2").to_string(), "3");
        assert_eq!(eval("1 / 0").to_string(), "Infinity");
        assert_eq!(eval("-2 * 3").to_string(), "-6");
    }

    #[test]
    fn plus_concatenates_text() {
        assert_eq!(eval("3 + ~ ~ + ~protons~"), Value::Str("3 protons".into()));
        assert_eq!(eval("1 + 2 + ~x~"), Value::Str("3x".into()));
    }

    #[test]
    fn loose_equality_between_text_and_numbers() {
        let answer = |a: &str| vec![("answer", Value::Str(a.into()))];
        assert_eq!(eval_with("answer == 2", &answer("2")).unwrap(), Value::Bool(true));
        assert_eq!(eval_with("answer == 2", &answer(" 2.0 ")).unwrap(), Value::Bool(true));
        assert_eq!(eval_with("answer == 2", &answer("3")).unwrap(), Value::Bool(false));
        assert_eq!(eval_with("answer == 0", &answer("")).unwrap(), Value::Bool(false));
        assert_eq!(eval_with("answer == 2", &answer("two")).unwrap(), Value::Bool(false));
    }

    #[test]
    fn element_helpers() {
        assert_eq!(eval("element(6).sym"), Value::Str("C".into()));
        assert_eq!(eval("element(0)"), Value::Nil);
        assert_eq!(eval("find_element(~period~, 3, ~charge~, 2).name"), Value::Str("Magnesium".into()));
        assert_eq!(eval("count(find_elements(~group~, 18))"), Value::Number(7.0));
        assert!(eval_with("find_element(~colour~, 1)", &[]).is_err());
        assert!(eval_with("find_element(~period~)", &[]).is_err());
        assert!(eval_with("element(200).sym", &[]).is_err());
    }

    #[test]
    fn geometry_helpers() {
        assert_eq!(eval("shape(4, 1)"), Value::Str("trigonal pyramid".into()));
        assert_eq!(eval("shape(3, 3)"), Value::Str("doesn't exist".into()));
        assert_eq!(eval("shapes[6]"), Value::Str("seesaw".into()));
        assert_eq!(eval("angles(~seesaw~)").to_string(), "<90,<120");
        assert_eq!(eval("check_angles(~<120,<90~, ~seesaw~)"), Value::Bool(true));
        assert!(eval_with("shapes[11]", &[]).is_err());
    }

    #[test]
    fn check_accepts_any_case_and_numeric_forms() {
        assert_eq!(eval("check(~CARBON~, ~carbon~)"), Value::Bool(true));
        assert_eq!(eval("check(~5.0~, 5, ~5 protons~)"), Value::Bool(true));
        assert_eq!(eval("check(~5 Protons~, 5, ~5 protons~)"), Value::Bool(true));
        assert_eq!(eval("check(~6~, 5, ~5 protons~)"), Value::Bool(false));
    }

    #[test]
    fn compounds_and_math_helpers() {
        assert_eq!(eval("compound(0).name"), Value::Str("water".into()));
        assert_eq!(eval("compound_count()"), Value::Number(81.0));
        assert_eq!(eval("round(2.5) + floor(2.9) + abs(-1)"), Value::Number(6.0));
        assert_eq!(eval("max(3, 9, 4) - min(3, 9, 4)"), Value::Number(6.0));
        assert_eq!(eval("2 == 1 ? ~a~ : ~b~"), Value::Str("b".into()));
    }

    #[test]
    fn checker_bindings_shadow_in_order() {
        let scope = EvalScope::default();
        let mut env = Env::new(&scope);
        env.bind("answer", Value::Str("mg".into()));
        let checker = parse_checker("let el = find_element(~period~, 3, ~charge~, 2); check(answer, el.sym, el.name)").unwrap();
        assert!(env.check(&checker).unwrap());
    }

    #[test]
    fn short_circuit_skips_errors() {
        assert_eq!(eval("0 && element(999).sym"), Value::Bool(false));
        assert_eq!(eval("1 || element(999).sym"), Value::Bool(true));
    }
}
