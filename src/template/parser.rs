//! Recursive-descent parser for template expressions, interpolated text and checker lines.

use super::ast::*;
use super::lexer::{tokenize, Spanned, Token};

type PResult<T = Expr> = Result<T, String>;

/// Opens an inline expression in question text.
pub const INTERPOLATION_OPEN: &str = "@{";
/// Delimits string literals inside expressions.
pub const STRING_DELIMITER: char = '~';

pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    src_len: usize,
}

impl Parser {
    const COMPARISON_OPS: &'static [Token] = &[
        Token::LessThan,
        Token::GreaterThan,
        Token::LessEqual,
        Token::GreaterEqual,
    ];

    const EQUALITY_OPS: &'static [Token] = &[Token::EqualEqual, Token::BangEqual];

    const ADDITION_OPS: &'static [Token] = &[Token::Plus, Token::Minus];

    const MULTIPLICATION_OPS: &'static [Token] = &[Token::Star, Token::Slash, Token::Percent];

    pub fn new(src: &str) -> PResult<Self> {
        Ok(Self {
            tokens: tokenize(src)?,
            pos: 0,
            src_len: src.len(),
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn matches(&self, kind: &Token) -> bool {
        self.peek() == Some(kind)
    }

    fn matches_any(&self, options: &[Token]) -> bool {
        self.peek().map_or(false, |t| options.contains(t))
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn consume(&mut self, expected: Token) -> PResult<()> {
        if self.matches(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            self.unexpected(&expected.to_string())
        }
    }

    fn unexpected<T>(&self, expected: &str) -> PResult<T> {
        match self.tokens.get(self.pos) {
            Some((token, span)) => Err(format!(
                "unexpected {token} at position {}; expected {expected}",
                span.start
            )),
            None => Err(format!(
                "unexpected end of input at position {}; expected {expected}",
                self.src_len
            )),
        }
    }

    fn ident(&mut self) -> PResult<String> {
        match self.peek() {
            Some(Token::Ident(_)) => match self.advance() {
                Some(Token::Ident(name)) => Ok(name),
                _ => unreachable!("peeked an identifier"),
            },
            _ => self.unexpected("an identifier"),
        }
    }

    /// Parses the whole input as a single expression.
    pub fn parse_expression(mut self) -> PResult {
        let expr = self.parse_node()?;
        if !self.at_end() {
            return self.unexpected("end of expression");
        }
        Ok(expr)
    }

    /// Parses `let name = expr;`* followed by the verdict expression.
    pub fn parse_checker(mut self) -> PResult<Checker> {
        let mut bindings = Vec::new();
        while self.matches(&Token::Let) {
            self.advance();
            let name = self.ident()?;
            self.consume(Token::Equal)?;
            let value = self.parse_node()?;
            self.consume(Token::Semicolon)?;
            bindings.push((name, value));
        }

        let verdict = self.parse_node()?;
        if self.matches(&Token::Semicolon) {
            self.advance();
        }
        if !self.at_end() {
            return self.unexpected("end of checker");
        }
        Ok(Checker { bindings, verdict })
    }

    fn parse_node(&mut self) -> PResult {
        self.parse_conditional()
    }

    fn parse_conditional(&mut self) -> PResult {
        let cond = self.parse_or()?;
        if !self.matches(&Token::Question) {
            return Ok(cond);
        }
        self.advance();
        let then = self.parse_node()?;
        self.consume(Token::Colon)?;
        let otherwise = self.parse_node()?;
        Ok(Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn parse_or(&mut self) -> PResult {
        let mut lhs = self.parse_and()?;
        while self.matches(&Token::OrOr) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> PResult {
        let mut lhs = self.parse_equality()?;
        while self.matches(&Token::AndAnd) {
            self.advance();
            let rhs = self.parse_equality()?;
            lhs = Expr::binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> PResult {
        let mut lhs = self.parse_comparison()?;
        while self.matches_any(Self::EQUALITY_OPS) {
            let op = binary_op(self.advance());
            let rhs = self.parse_comparison()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> PResult {
        let mut lhs = self.parse_addition()?;
        while self.matches_any(Self::COMPARISON_OPS) {
            let op = binary_op(self.advance());
            let rhs = self.parse_addition()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_addition(&mut self) -> PResult {
        let mut lhs = self.parse_multiplication()?;
        while self.matches_any(Self::ADDITION_OPS) {
            let op = binary_op(self.advance());
            let rhs = self.parse_multiplication()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_multiplication(&mut self) -> PResult {
        let mut lhs = self.parse_unary()?;
        while self.matches_any(Self::MULTIPLICATION_OPS) {
            let op = binary_op(self.advance());
            let rhs = self.parse_unary()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult {
        let op = match self.peek() {
            Some(Token::Bang) => UnaryOp::Not,
            Some(Token::Minus) => UnaryOp::Neg,
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::unary(op, operand))
    }

    fn parse_postfix(&mut self) -> PResult {
        let mut expr = self.parse_atom()?;
        loop {
            if self.matches(&Token::Dot) {
                self.advance();
                let field = self.ident()?;
                expr = Expr::Member { target: Box::new(expr), field };
            } else if self.matches(&Token::LeftBracket) {
                self.advance();
                let index = self.parse_node()?;
                self.consume(Token::RightBracket)?;
                expr = Expr::Index { target: Box::new(expr), index: Box::new(index) };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_atom(&mut self) -> PResult {
        match self.peek() {
            Some(Token::Number(_)) => match self.advance() {
                Some(Token::Number(n)) => Ok(Expr::Number(n)),
                _ => unreachable!("peeked a number"),
            },
            Some(Token::Str(_)) => match self.advance() {
                Some(Token::Str(s)) => Ok(Expr::Str(s)),
                _ => unreachable!("peeked a string"),
            },
            Some(Token::Ident(_)) => {
                let name = self.ident()?;
                if self.matches(&Token::LeftParen) {
                    let args = self.parse_args()?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Some(Token::LeftParen) => {
                self.advance();
                let inner = self.parse_node()?;
                self.consume(Token::RightParen)?;
                Ok(inner)
            }
            _ => self.unexpected("a number, string, name or '('"),
        }
    }

    fn parse_args(&mut self) -> PResult<Vec<Expr>> {
        self.consume(Token::LeftParen)?;
        let mut args = Vec::new();
        if self.matches(&Token::RightParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_node()?);
            if self.matches(&Token::Comma) {
                self.advance();
            } else {
                self.consume(Token::RightParen)?;
                return Ok(args);
            }
        }
    }
}

// Only called after `matches_any` accepted one of the operator tokens.
fn binary_op(token: Option<Token>) -> BinaryOp {
    match token {
        Some(Token::Plus) => BinaryOp::Add,
        Some(Token::Minus) => BinaryOp::Sub,
        Some(Token::Star) => BinaryOp::Mul,
        Some(Token::Slash) => BinaryOp::Div,
        Some(Token::Percent) => BinaryOp::Rem,
        Some(Token::EqualEqual) => BinaryOp::Eq,
        Some(Token::BangEqual) => BinaryOp::Ne,
        Some(Token::LessThan) => BinaryOp::Lt,
        Some(Token::LessEqual) => BinaryOp::Le,
        Some(Token::GreaterThan) => BinaryOp::Gt,
        Some(Token::GreaterEqual) => BinaryOp::Ge,
        other => unreachable!("{other:?} is not a binary operator"),
    }
}

pub fn parse_expression(src: &str) -> PResult {
    Parser::new(src)?.parse_expression()
}

pub fn parse_checker(src: &str) -> PResult<Checker> {
    Parser::new(src)?.parse_checker()
}

/// Splits question text into literal runs and `@{...}` expressions.
pub fn parse_text(line: &str) -> PResult<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut rest = line;
    let mut offset = 0;

    while let Some(start) = rest.find(INTERPOLATION_OPEN) {
        if start > 0 {
            segments.push(Segment::Text(rest[..start].to_string()));
        }
        let body_start = start + INTERPOLATION_OPEN.len();
        let body_len = closing_brace(&rest[body_start..]).ok_or_else(|| {
            format!("unterminated interpolation at position {}", offset + start)
        })?;
        let body = &rest[body_start..body_start + body_len];
        let expr = parse_expression(body)
            .map_err(|e| format!("in interpolation at position {}: {e}", offset + start))?;
        segments.push(Segment::Expr(expr));

        let consumed = body_start + body_len + 1;
        offset += consumed;
        rest = &rest[consumed..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Text(rest.to_string()));
    }
    Ok(segments)
}

// Byte offset of the brace closing an interpolation body, skipping string literals.
fn closing_brace(body: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut in_string = false;
    for (i, c) in body.char_indices() {
        match c {
            STRING_DELIMITER => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Expr {
        Expr::Var(name.into())
    }

    fn check(src: &str, expected: Expr) {
        assert_eq!(parse_expression(src).unwrap(), expected, "{src}");
    }

    #[test]
    fn arithmetic_is_left_associative_with_precedence() {
        check(
            "1 - 2 - 3",
            Expr::binary(
                BinaryOp::Sub,
                Expr::binary(BinaryOp::Sub, Expr::Number(1.0), Expr::Number(2.0)),
                Expr::Number(3.0),
            ),
        );
        check(
            "x + y * 2",
            Expr::binary(
                BinaryOp::Add,
                var("x"),
                Expr::binary(BinaryOp::Mul, var("y"), Expr::Number(2.0)),
            ),
        );
        check(
            "-x == 1 && !y",
            Expr::binary(
                BinaryOp::And,
                Expr::binary(BinaryOp::Eq, Expr::unary(UnaryOp::Neg, var("x")), Expr::Number(1.0)),
                Expr::unary(UnaryOp::Not, var("y")),
            ),
        );
    }

    #[test]
    fn postfix_chains_and_calls() {
        check(
            "element(x).sym",
            Expr::Member {
                target: Box::new(Expr::Call { name: "element".into(), args: vec![var("x")] }),
                field: "sym".into(),
            },
        );
        check(
            "shapes[x]",
            Expr::Index { target: Box::new(var("shapes")), index: Box::new(var("x")) },
        );
        check("compound_count()", Expr::Call { name: "compound_count".into(), args: vec![] });
    }

    #[test]
    fn nested_conditionals() {
        check(
            "x == 1 ? ~a~ : x == 2 ? ~b~ : ~c~",
            Expr::Conditional {
                cond: Box::new(Expr::binary(BinaryOp::Eq, var("x"), Expr::Number(1.0))),
                then: Box::new(Expr::Str("a".into())),
                otherwise: Box::new(Expr::Conditional {
                    cond: Box::new(Expr::binary(BinaryOp::Eq, var("x"), Expr::Number(2.0))),
                    then: Box::new(Expr::Str("b".into())),
                    otherwise: Box::new(Expr::Str("c".into())),
                }),
            },
        );
    }

    #[test]
    fn checker_with_bindings() {
        let checker = parse_checker("let el = element(2); let n = el.num; answer == n;").unwrap();
        assert_eq!(checker.bindings.len(), 2);
        assert_eq!(checker.bindings[0].0, "el");
        assert_eq!(checker.bindings[1].0, "n");
        assert_eq!(checker.verdict, Expr::binary(BinaryOp::Eq, var("answer"), var("n")));
    }

    #[test]
    fn reports_errors_with_positions() {
        let err = parse_expression("x + ").unwrap_err();
        assert!(err.contains("end of input"), "{err}");
        let err = parse_expression("f(1 2)").unwrap_err();
        assert!(err.contains("position 4"), "{err}");
        assert!(parse_checker("let = 3; x").is_err());
        assert!(parse_expression("x y").is_err());
    }

    #[test]
    fn text_interpolation() {
        let segments = parse_text("What is @{x} + @{y}?").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Text("What is ".into()),
                Segment::Expr(var("x")),
                Segment::Text(" + ".into()),
                Segment::Expr(var("y")),
                Segment::Text("?".into()),
            ]
        );
    }

    #[test]
    fn braces_inside_strings_do_not_close_interpolation() {
        let segments = parse_text("@{~}~} end").unwrap();
        assert_eq!(
            segments,
            vec![Segment::Expr(Expr::Str("}".into())), Segment::Text(" end".into())]
        );
        assert_eq!(parse_text("plain").unwrap(), vec![Segment::Text("plain".into())]);
        assert!(parse_text("oops @{x + 1").unwrap_err().contains("unterminated"));
    }
}
