//! Lexer and recursive-descent parser for path expressions.

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Union {
    pub(crate) paths: Vec<LocationPath>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LocationPath {
    pub(crate) absolute: bool,
    pub(crate) steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Step {
    pub(crate) axis: Axis,
    pub(crate) test: NodeTest,
    pub(crate) predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Parent,
    Ancestor,
    AncestorOrSelf,
    SelfNode,
    Attribute,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeTest {
    Name(String),
    AnyElement,
    Text,
    AnyNode,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Predicate {
    /// 1-based position within the candidates of a step.
    Position(usize),
    Condition(Condition),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Condition {
    Or(Box<Condition>, Box<Condition>),
    And(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
    Exists(LocationPath),
    Compare {
        left: Operand,
        right: Operand,
        equal: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    Literal(String),
    Path(LocationPath),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Slash,
    DoubleSlash,
    Pipe,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Eq,
    NotEq,
    Star,
    Dot,
    DotDot,
    DoubleColon,
    At,
    Literal(String),
    Number(usize),
    Name(String),
}

/// Parses a full path expression.
pub(crate) fn parse(source: &str) -> Result<Union> {
    if source.trim().is_empty() {
        return Err(syntax_error(source, "empty path expression"));
    }

    let tokens = tokenize(source)?;
    let mut parser = Parser {
        source,
        tokens,
        position: 0,
    };

    let union = parser.parse_union()?;
    if let Some(token) = parser.peek() {
        return Err(parser.error(&format!("unexpected trailing {:?}", token)));
    }

    Ok(union)
}

fn syntax_error(source: &str, message: &str) -> Error {
    Error::QuerySyntax {
        path: source.to_string(),
        message: message.to_string(),
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match c {
            c if c.is_whitespace() => i += 1,
            '/' if next == Some('/') => {
                tokens.push(Token::DoubleSlash);
                i += 2;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '.' if next == Some('.') => {
                tokens.push(Token::DotDot);
                i += 2;
            }
            '.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            ':' if next == Some(':') => {
                tokens.push(Token::DoubleColon);
                i += 2;
            }
            '!' if next == Some('=') => {
                tokens.push(Token::NotEq);
                i += 2;
            }
            '|' | '[' | ']' | '(' | ')' | '=' | '*' | '@' => {
                tokens.push(match c {
                    '|' => Token::Pipe,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '=' => Token::Eq,
                    '*' => Token::Star,
                    _ => Token::At,
                });
                i += 1;
            }
            '"' | '\'' => {
                let start = i + 1;
                let end = chars[start..]
                    .iter()
                    .position(|candidate| *candidate == c)
                    .map(|offset| start + offset)
                    .ok_or_else(|| syntax_error(source, "unterminated string literal"))?;
                tokens.push(Token::Literal(chars[start..end].iter().collect()));
                i = end + 1;
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let digits: String = chars[start..i].iter().collect();
                let number = digits
                    .parse::<usize>()
                    .map_err(|e| syntax_error(source, &format!("bad number '{}': {}", digits, e)))?;
                tokens.push(Token::Number(number));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || matches!(chars[i], '_' | '-' | '.'))
                {
                    i += 1;
                }
                tokens.push(Token::Name(chars[start..i].iter().collect()));
            }
            other => {
                return Err(syntax_error(
                    source,
                    &format!("unexpected character '{}' at offset {}", other, i),
                ));
            }
        }
    }

    Ok(tokens)
}

fn starts_step(token: Option<&Token>) -> bool {
    matches!(
        token,
        Some(Token::Dot | Token::DotDot | Token::Name(_) | Token::Star | Token::At)
    )
}

fn descendant_or_self() -> Step {
    Step {
        axis: Axis::DescendantOrSelf,
        test: NodeTest::AnyNode,
        predicates: Vec::new(),
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.position + offset)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Name(name)) if name == keyword)
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<()> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(self.error(&format!("expected {}, found {:?}", what, token))),
            None => Err(self.error(&format!("expected {}, found end of input", what))),
        }
    }

    fn error(&self, message: &str) -> Error {
        syntax_error(self.source, message)
    }

    fn parse_union(&mut self) -> Result<Union> {
        let mut paths = vec![self.parse_path()?];
        while self.peek() == Some(&Token::Pipe) {
            self.advance();
            paths.push(self.parse_path()?);
        }
        Ok(Union { paths })
    }

    fn parse_path(&mut self) -> Result<LocationPath> {
        let mut steps = Vec::new();

        match self.peek() {
            Some(Token::Slash) => {
                self.advance();
                if starts_step(self.peek()) {
                    self.parse_relative(&mut steps)?;
                }
                Ok(LocationPath {
                    absolute: true,
                    steps,
                })
            }
            Some(Token::DoubleSlash) => {
                self.advance();
                steps.push(descendant_or_self());
                self.parse_relative(&mut steps)?;
                Ok(LocationPath {
                    absolute: true,
                    steps,
                })
            }
            token if starts_step(token) => {
                self.parse_relative(&mut steps)?;
                Ok(LocationPath {
                    absolute: false,
                    steps,
                })
            }
            _ => Err(self.error("expected a location path")),
        }
    }

    fn parse_relative(&mut self, steps: &mut Vec<Step>) -> Result<()> {
        loop {
            steps.push(self.parse_step()?);
            match self.peek() {
                Some(Token::Slash) => {
                    self.advance();
                }
                Some(Token::DoubleSlash) => {
                    self.advance();
                    steps.push(descendant_or_self());
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_step(&mut self) -> Result<Step> {
        let (axis, test) = match self.peek().cloned() {
            Some(Token::Dot) => {
                self.advance();
                (Axis::SelfNode, NodeTest::AnyNode)
            }
            Some(Token::DotDot) => {
                self.advance();
                (Axis::Parent, NodeTest::AnyNode)
            }
            Some(Token::At) => {
                self.advance();
                (Axis::Attribute, self.parse_node_test()?)
            }
            Some(Token::Name(name)) if self.peek_at(1) == Some(&Token::DoubleColon) => {
                self.advance();
                self.advance();
                let axis = self.axis_named(&name)?;
                (axis, self.parse_node_test()?)
            }
            _ => (Axis::Child, self.parse_node_test()?),
        };

        let mut predicates = Vec::new();
        while self.peek() == Some(&Token::LBracket) {
            self.advance();
            predicates.push(self.parse_predicate()?);
            self.expect(Token::RBracket, "']'")?;
        }

        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn axis_named(&self, name: &str) -> Result<Axis> {
        match name {
            "child" => Ok(Axis::Child),
            "descendant" => Ok(Axis::Descendant),
            "descendant-or-self" => Ok(Axis::DescendantOrSelf),
            "parent" => Ok(Axis::Parent),
            "ancestor" => Ok(Axis::Ancestor),
            "ancestor-or-self" => Ok(Axis::AncestorOrSelf),
            "self" => Ok(Axis::SelfNode),
            "attribute" => Ok(Axis::Attribute),
            other => Err(self.error(&format!("unknown axis '{}'", other))),
        }
    }

    fn parse_node_test(&mut self) -> Result<NodeTest> {
        match self.advance() {
            Some(Token::Star) => Ok(NodeTest::AnyElement),
            Some(Token::Name(name)) if self.peek() == Some(&Token::LParen) => {
                self.advance();
                self.expect(Token::RParen, "')'")?;
                match name.as_str() {
                    "text" => Ok(NodeTest::Text),
                    "node" => Ok(NodeTest::AnyNode),
                    other => Err(self.error(&format!("unsupported node test '{}()'", other))),
                }
            }
            Some(Token::Name(name)) => Ok(NodeTest::Name(name)),
            Some(Token::At) => Err(self.error("unexpected '@'")),
            Some(token) => Err(self.error(&format!("expected a node test, found {:?}", token))),
            None => Err(self.error("expected a node test, found end of input")),
        }
    }

    fn parse_predicate(&mut self) -> Result<Predicate> {
        if let (Some(Token::Number(position)), Some(Token::RBracket)) = (self.peek(), self.peek_at(1)) {
            let position = *position;
            self.advance();
            if position == 0 {
                return Err(self.error("positions start at 1"));
            }
            return Ok(Predicate::Position(position));
        }

        Ok(Predicate::Condition(self.parse_or()?))
    }

    fn parse_or(&mut self) -> Result<Condition> {
        let mut left = self.parse_and()?;
        while self.is_keyword("or") {
            self.advance();
            let right = self.parse_and()?;
            left = Condition::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Condition> {
        let mut left = self.parse_unary()?;
        while self.is_keyword("and") {
            self.advance();
            let right = self.parse_unary()?;
            left = Condition::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Condition> {
        if self.is_keyword("not") && self.peek_at(1) == Some(&Token::LParen) {
            self.advance();
            self.advance();
            let inner = self.parse_or()?;
            self.expect(Token::RParen, "')'")?;
            return Ok(Condition::Not(Box::new(inner)));
        }

        if self.peek() == Some(&Token::LParen) {
            self.advance();
            let inner = self.parse_or()?;
            self.expect(Token::RParen, "')'")?;
            return Ok(inner);
        }

        let left = self.parse_operand()?;
        let equal = match self.peek() {
            Some(Token::Eq) => true,
            Some(Token::NotEq) => false,
            _ => {
                return match left {
                    Operand::Path(path) => Ok(Condition::Exists(path)),
                    Operand::Literal(_) => Err(self.error("a literal must be compared with '=' or '!='")),
                };
            }
        };
        self.advance();
        let right = self.parse_operand()?;

        Ok(Condition::Compare { left, right, equal })
    }

    fn parse_operand(&mut self) -> Result<Operand> {
        match self.peek().cloned() {
            Some(Token::Literal(text)) => {
                self.advance();
                Ok(Operand::Literal(text))
            }
            Some(Token::Number(number)) => {
                self.advance();
                Ok(Operand::Literal(number.to_string()))
            }
            Some(Token::Slash | Token::DoubleSlash) => Ok(Operand::Path(self.parse_path()?)),
            token if starts_step(token.as_ref()) => Ok(Operand::Path(self.parse_path()?)),
            Some(token) => Err(self.error(&format!("expected an operand, found {:?}", token))),
            None => Err(self.error("expected an operand, found end of input")),
        }
    }
}
