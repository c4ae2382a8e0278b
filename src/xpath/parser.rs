//! Recursive-descent query parser (§4.4): turns [`QueryToken`]s into an [`Expr`] tree.
//!
//! Keyword operators (`and`, `or`, `div`, `mod`) arrive from the lexer as plain `Name` tokens;
//! this parser recognizes them only at the specific precedence level where an operator is
//! expected, never at a position where a node test or function name would otherwise be valid —
//! matching §4.4's "keyword disambiguation by grammar position" note.

use crate::xpath::ast::{Axis, BinaryOp, Expr, KindTest, NodeTest, PathSpec, Step, UnaryOp};
use crate::xpath::error::QueryParseError;
use crate::xpath::lexer::QueryLexer;
use crate::xpath::token::{QueryToken, QueryTokenKind};

const KIND_TEST_NAMES: [&str; 4] = ["node", "text", "comment", "processing-instruction"];

pub fn parse(input: &str) -> Result<Expr, crate::xpath::error::QueryError> {
    let mut lexer = QueryLexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let is_eof = matches!(tok.kind, QueryTokenKind::Eof);
        tokens.push(tok);
        if is_eof {
            break;
        }
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    parser.expect_eof()?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<QueryToken>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &QueryTokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_at(&self, offset: usize) -> &QueryTokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn position(&self) -> crate::position::Position {
        self.tokens[self.pos].position
    }

    fn bump(&mut self) -> QueryToken {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn is_keyword(&self, kw: &str) -> bool {
        matches!(self.peek(), QueryTokenKind::Name(n) if n == kw)
    }

    fn expect(&mut self, kind: QueryTokenKind) -> Result<(), QueryParseError> {
        if *self.peek() == kind {
            self.bump();
            Ok(())
        } else {
            Err(QueryParseError::UnexpectedToken {
                position: self.position(),
                found: format!("{:?}", self.peek()),
                expected: format!("{:?}", kind),
            })
        }
    }

    fn expect_eof(&mut self) -> Result<(), QueryParseError> {
        if matches!(self.peek(), QueryTokenKind::Eof) {
            Ok(())
        } else {
            Err(QueryParseError::UnexpectedToken {
                position: self.position(),
                found: format!("{:?}", self.peek()),
                expected: "end of query".to_string(),
            })
        }
    }

    fn expect_name(&mut self) -> Result<String, QueryParseError> {
        match self.peek().clone() {
            QueryTokenKind::Name(n) => {
                self.bump();
                Ok(n)
            }
            other => Err(QueryParseError::UnexpectedToken {
                position: self.position(),
                found: format!("{:?}", other),
                expected: "a name".to_string(),
            }),
        }
    }

    // OrExpr -> AndExpr ( 'or' AndExpr )*
    fn parse_or(&mut self) -> Result<Expr, QueryParseError> {
        let mut lhs = self.parse_and()?;
        while self.is_keyword("or") {
            self.bump();
            let rhs = self.parse_and()?;
            lhs = Expr::Binary(BinaryOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // AndExpr -> EqualityExpr ( 'and' EqualityExpr )*
    fn parse_and(&mut self) -> Result<Expr, QueryParseError> {
        let mut lhs = self.parse_equality()?;
        while self.is_keyword("and") {
            self.bump();
            let rhs = self.parse_equality()?;
            lhs = Expr::Binary(BinaryOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr, QueryParseError> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                QueryTokenKind::Eq => BinaryOp::Eq,
                QueryTokenKind::Ne => BinaryOp::Ne,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_relational()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Expr, QueryParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                QueryTokenKind::Lt => BinaryOp::Lt,
                QueryTokenKind::Le => BinaryOp::Le,
                QueryTokenKind::Gt => BinaryOp::Gt,
                QueryTokenKind::Ge => BinaryOp::Ge,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, QueryParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                QueryTokenKind::Plus => BinaryOp::Add,
                QueryTokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, QueryParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = if matches!(self.peek(), QueryTokenKind::Star) {
                BinaryOp::Mul
            } else if self.is_keyword("div") {
                BinaryOp::Div
            } else if self.is_keyword("mod") {
                BinaryOp::Mod
            } else {
                break;
            };
            self.bump();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, QueryParseError> {
        if matches!(self.peek(), QueryTokenKind::Minus) {
            self.bump();
            let inner = self.parse_unary()?;
            Ok(Expr::Unary(UnaryOp::Neg, Box::new(inner)))
        } else if matches!(self.peek(), QueryTokenKind::Plus) {
            self.bump();
            let inner = self.parse_unary()?;
            Ok(Expr::Unary(UnaryOp::Plus, Box::new(inner)))
        } else {
            self.parse_union()
        }
    }

    fn parse_union(&mut self) -> Result<Expr, QueryParseError> {
        let mut lhs = self.parse_path_expr()?;
        while matches!(self.peek(), QueryTokenKind::Pipe) {
            self.bump();
            let rhs = self.parse_path_expr()?;
            lhs = Expr::Union(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    /// True if the current token begins a `Step` rather than a `PrimaryExpr`. The only
    /// overlap is `Name` immediately followed by `(` — a function call unless the name is one
    /// of the four kind-test names, in which case it is a step using the default child axis
    /// (`text()`, `node()`, ...).
    fn looks_like_step(&self) -> bool {
        match self.peek() {
            QueryTokenKind::At | QueryTokenKind::Dot | QueryTokenKind::DotDot | QueryTokenKind::Star => true,
            QueryTokenKind::Name(n) => match self.peek_at(1) {
                QueryTokenKind::LParen => KIND_TEST_NAMES.contains(&n.as_str()),
                _ => true,
            },
            _ => false,
        }
    }

    fn parse_path_expr(&mut self) -> Result<Expr, QueryParseError> {
        match self.peek() {
            QueryTokenKind::Slash => {
                self.bump();
                if self.looks_like_step() {
                    let steps = self.parse_relative_location_path(PathSpec::Single)?;
                    Ok(Expr::Path(steps))
                } else {
                    Ok(Expr::Path(Vec::new()))
                }
            }
            QueryTokenKind::DoubleSlash => {
                self.bump();
                let steps = self.parse_relative_location_path(PathSpec::Double)?;
                Ok(Expr::Path(steps))
            }
            _ if self.looks_like_step() => {
                let steps = self.parse_relative_location_path(PathSpec::Nil)?;
                Ok(Expr::Path(steps))
            }
            _ => {
                let filter = self.parse_filter_expr()?;
                match self.peek() {
                    QueryTokenKind::Slash => {
                        self.bump();
                        let steps = self.parse_relative_location_path(PathSpec::Single)?;
                        Ok(Expr::FilteredPath(Box::new(filter), steps))
                    }
                    QueryTokenKind::DoubleSlash => {
                        self.bump();
                        let steps = self.parse_relative_location_path(PathSpec::Double)?;
                        Ok(Expr::FilteredPath(Box::new(filter), steps))
                    }
                    _ => Ok(filter),
                }
            }
        }
    }

    fn parse_relative_location_path(&mut self, first_sep: PathSpec) -> Result<Vec<Step>, QueryParseError> {
        let mut steps = Vec::new();
        steps.push(self.parse_step(first_sep)?);
        loop {
            let sep = match self.peek() {
                QueryTokenKind::Slash => PathSpec::Single,
                QueryTokenKind::DoubleSlash => PathSpec::Double,
                _ => break,
            };
            self.bump();
            steps.push(self.parse_step(sep)?);
        }
        Ok(steps)
    }

    fn parse_step(&mut self, path_spec: PathSpec) -> Result<Step, QueryParseError> {
        let (axis, test) = if matches!(self.peek(), QueryTokenKind::At) {
            self.bump();
            (Axis::Attribute, self.parse_node_test()?)
        } else if matches!(self.peek(), QueryTokenKind::Dot) {
            self.bump();
            (Axis::SelfAxis, NodeTest::Kind(KindTest::Node))
        } else if matches!(self.peek(), QueryTokenKind::DotDot) {
            self.bump();
            (Axis::Parent, NodeTest::Kind(KindTest::Node))
        } else if let QueryTokenKind::Name(n) = self.peek().clone() {
            if matches!(self.peek_at(1), QueryTokenKind::DoubleColon) {
                self.bump();
                self.bump();
                let axis = Axis::from_name(&n).ok_or_else(|| QueryParseError::UnexpectedToken {
                    position: self.position(),
                    found: n.clone(),
                    expected: "an axis name".to_string(),
                })?;
                (axis, self.parse_node_test()?)
            } else {
                (Axis::Child, self.parse_node_test()?)
            }
        } else {
            (Axis::Child, self.parse_node_test()?)
        };
        let predicates = self.parse_predicates()?;
        Ok(Step { path_spec, axis, test, predicates })
    }

    fn parse_node_test(&mut self) -> Result<NodeTest, QueryParseError> {
        match self.peek().clone() {
            QueryTokenKind::Star => {
                self.bump();
                Ok(NodeTest::Wildcard)
            }
            QueryTokenKind::Name(n) => {
                self.bump();
                if matches!(self.peek(), QueryTokenKind::Colon) {
                    self.bump();
                    if matches!(self.peek(), QueryTokenKind::Star) {
                        self.bump();
                        Ok(NodeTest::PrefixWildcard(n))
                    } else {
                        let local = self.expect_name()?;
                        Ok(NodeTest::PrefixLocal(n, local))
                    }
                } else if matches!(self.peek(), QueryTokenKind::LParen) && KIND_TEST_NAMES.contains(&n.as_str()) {
                    self.bump();
                    if n == "processing-instruction" {
                        let target = if let QueryTokenKind::StringLit(s) = self.peek().clone() {
                            self.bump();
                            Some(s)
                        } else {
                            None
                        };
                        self.expect(QueryTokenKind::RParen)?;
                        Ok(NodeTest::ProcessingInstruction(target))
                    } else {
                        self.expect(QueryTokenKind::RParen)?;
                        let kind = match n.as_str() {
                            "node" => KindTest::Node,
                            "text" => KindTest::Text,
                            "comment" => KindTest::Comment,
                            _ => unreachable!(),
                        };
                        Ok(NodeTest::Kind(kind))
                    }
                } else {
                    Ok(NodeTest::Name(n))
                }
            }
            other => Err(QueryParseError::UnexpectedToken {
                position: self.position(),
                found: format!("{:?}", other),
                expected: "a node test".to_string(),
            }),
        }
    }

    fn parse_predicates(&mut self) -> Result<Vec<Expr>, QueryParseError> {
        let mut preds = Vec::new();
        while matches!(self.peek(), QueryTokenKind::LBracket) {
            self.bump();
            preds.push(self.parse_or()?);
            if !matches!(self.peek(), QueryTokenKind::RBracket) {
                return Err(QueryParseError::MissingClosingBracket { position: self.position(), bracket: ']' });
            }
            self.bump();
        }
        Ok(preds)
    }

    fn parse_filter_expr(&mut self) -> Result<Expr, QueryParseError> {
        let primary = self.parse_primary_expr()?;
        let preds = self.parse_predicates()?;
        if preds.is_empty() {
            Ok(primary)
        } else {
            Ok(Expr::Predicate(Box::new(primary), preds))
        }
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, QueryParseError> {
        match self.peek().clone() {
            QueryTokenKind::LParen => {
                self.bump();
                let e = self.parse_or()?;
                self.expect(QueryTokenKind::RParen)?;
                Ok(e)
            }
            QueryTokenKind::StringLit(s) => {
                self.bump();
                Ok(Expr::Literal(s))
            }
            QueryTokenKind::Number(n) => {
                self.bump();
                Ok(Expr::Number(n))
            }
            QueryTokenKind::Name(n) if matches!(self.peek_at(1), QueryTokenKind::LParen) => self.parse_function_call(n),
            other => Err(QueryParseError::UnexpectedToken {
                position: self.position(),
                found: format!("{:?}", other),
                expected: "an expression".to_string(),
            }),
        }
    }

    fn parse_function_call(&mut self, name: String) -> Result<Expr, QueryParseError> {
        self.bump(); // name
        self.bump(); // '('
        let mut args = Vec::new();
        if !matches!(self.peek(), QueryTokenKind::RParen) {
            loop {
                args.push(self.parse_or()?);
                if matches!(self.peek(), QueryTokenKind::Comma) {
                    self.bump();
                    if matches!(self.peek(), QueryTokenKind::RParen) {
                        return Err(QueryParseError::TrailingComma(self.position()));
                    }
                    continue;
                }
                break;
            }
        }
        self.expect(QueryTokenKind::RParen)?;
        Ok(Expr::Call(name, args))
    }
}
