//! Recursive descent parser over the token stream.

use crate::ast::*;
use crate::token::{Token, TokenKind};

/// A syntax error with its source position.
#[derive(Debug, Clone, thiserror::Error)]
#[error("syntax error at line {line}, column {col}: {message}")]
pub struct ParseError {
    /// What went wrong.
    pub message: String,
    /// 1-based source line.
    pub line: u32,
    /// 1-based source column.
    pub col: u32,
}

/// Converts a byte offset into a 1-based (line, column) pair.
pub(crate) fn position(source: &str, offset: usize) -> (u32, u32) {
    let mut line = 1;
    let mut col = 1;
    for b in source.as_bytes()[..offset.min(source.len())].iter() {
        if *b == b'\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

pub(crate) struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    pub(crate) fn parse_source_file(mut self) -> Result<SourceFile, ParseError> {
        let mut modules = Vec::new();
        while !self.at(&TokenKind::Eof) {
            modules.push(self.parse_module()?);
        }
        Ok(SourceFile { modules })
    }

    // --- token plumbing -----------------------------------------------------

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.error_here(format!(
                "expected {}, found {}",
                kind.describe(),
                self.peek().describe()
            )))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => Err(self.error_here(format!(
                "expected identifier, found {}",
                other.describe()
            ))),
        }
    }

    fn error_here(&self, message: String) -> ParseError {
        let (line, col) = position(self.source, self.tokens[self.pos].start);
        ParseError { message, line, col }
    }

    // --- declarations -------------------------------------------------------

    fn parse_module(&mut self) -> Result<ModuleDecl, ParseError> {
        self.expect(&TokenKind::Module)?;
        let name = self.expect_ident()?;

        let mut params = Vec::new();
        if self.eat(&TokenKind::Hash) {
            self.expect(&TokenKind::LParen)?;
            loop {
                self.expect(&TokenKind::Parameter)?;
                params.push(self.parse_param_binding(false)?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen)?;
        }

        let mut ports = Vec::new();
        if self.eat(&TokenKind::LParen) {
            if !self.at(&TokenKind::RParen) {
                loop {
                    ports.push(self.parse_port()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(&TokenKind::RParen)?;
        }
        self.expect(&TokenKind::Semi)?;

        let mut items = Vec::new();
        while !self.at(&TokenKind::Endmodule) {
            if self.at(&TokenKind::Eof) {
                return Err(self.error_here(format!(
                    "unterminated module `{name}`: expected `endmodule`"
                )));
            }
            self.parse_module_item(&mut items)?;
        }
        self.expect(&TokenKind::Endmodule)?;

        Ok(ModuleDecl {
            name,
            params,
            ports,
            items,
        })
    }

    fn parse_param_binding(&mut self, is_local: bool) -> Result<ParamDecl, ParseError> {
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Assign1)?;
        let value = self.parse_expr()?;
        Ok(ParamDecl {
            name,
            value,
            is_local,
        })
    }

    fn parse_port(&mut self) -> Result<Port, ParseError> {
        let direction = match self.peek() {
            TokenKind::Input => Direction::Input,
            TokenKind::Output => Direction::Output,
            TokenKind::Inout => Direction::Inout,
            other => {
                return Err(self.error_here(format!(
                    "expected port direction, found {}",
                    other.describe()
                )))
            }
        };
        self.advance();
        let is_reg = if self.eat(&TokenKind::Reg) {
            true
        } else {
            self.eat(&TokenKind::Wire);
            false
        };
        let range = self.parse_optional_range()?;
        let name = self.expect_ident()?;
        Ok(Port {
            direction,
            is_reg,
            range,
            name,
        })
    }

    fn parse_optional_range(&mut self) -> Result<Option<Range>, ParseError> {
        if !self.eat(&TokenKind::LBracket) {
            return Ok(None);
        }
        let msb = self.parse_expr()?;
        self.expect(&TokenKind::Colon)?;
        let lsb = self.parse_expr()?;
        self.expect(&TokenKind::RBracket)?;
        Ok(Some(Range { msb, lsb }))
    }

    fn parse_module_item(&mut self, items: &mut Vec<ModuleItem>) -> Result<(), ParseError> {
        match self.peek() {
            TokenKind::Wire | TokenKind::Reg => {
                let is_reg = matches!(self.advance(), TokenKind::Reg);
                let range = self.parse_optional_range()?;
                let mut names = Vec::new();
                loop {
                    let name = self.expect_ident()?;
                    let dimension = self.parse_optional_range()?;
                    names.push(DeclName { name, dimension });
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::Semi)?;
                items.push(ModuleItem::Net(NetDecl {
                    is_reg,
                    range,
                    names,
                }));
            }
            TokenKind::Parameter | TokenKind::Localparam => {
                let is_local = matches!(self.advance(), TokenKind::Localparam);
                loop {
                    items.push(ModuleItem::Param(self.parse_param_binding(is_local)?));
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::Semi)?;
            }
            TokenKind::Assign => {
                self.advance();
                let target = self.expect_ident()?;
                self.expect(&TokenKind::Assign1)?;
                let value = self.parse_expr()?;
                self.expect(&TokenKind::Semi)?;
                items.push(ModuleItem::Assign(ContinuousAssign { target, value }));
            }
            TokenKind::Always => {
                self.advance();
                let sensitivity = self.parse_sensitivity()?;
                let body = self.parse_statement()?;
                items.push(ModuleItem::Always(AlwaysBlock { sensitivity, body }));
            }
            other => {
                return Err(self.error_here(format!(
                    "expected module item, found {}",
                    other.describe()
                )))
            }
        }
        Ok(())
    }

    fn parse_sensitivity(&mut self) -> Result<Vec<SensItem>, ParseError> {
        self.expect(&TokenKind::At)?;
        // `always @*` without parens
        if self.eat(&TokenKind::Star) {
            return Ok(Vec::new());
        }
        self.expect(&TokenKind::LParen)?;
        if self.eat(&TokenKind::Star) {
            self.expect(&TokenKind::RParen)?;
            return Ok(Vec::new());
        }
        let mut items = Vec::new();
        loop {
            let edge = match self.peek() {
                TokenKind::Posedge => {
                    self.advance();
                    Some(Edge::Posedge)
                }
                TokenKind::Negedge => {
                    self.advance();
                    Some(Edge::Negedge)
                }
                _ => None,
            };
            let signal = self.expect_ident()?;
            items.push(SensItem { edge, signal });
            if !(self.eat(&TokenKind::OrKw) || self.eat(&TokenKind::Comma)) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(items)
    }

    // --- statements ---------------------------------------------------------

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match self.peek() {
            TokenKind::Begin => {
                self.advance();
                let mut stmts = Vec::new();
                while !self.eat(&TokenKind::End) {
                    if self.at(&TokenKind::Eof) {
                        return Err(self.error_here("unterminated `begin` block".into()));
                    }
                    stmts.push(self.parse_statement()?);
                }
                Ok(Statement::Block(stmts))
            }
            TokenKind::If => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let cond = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                let then_branch = Box::new(self.parse_statement()?);
                let else_branch = if self.eat(&TokenKind::Else) {
                    Some(Box::new(self.parse_statement()?))
                } else {
                    None
                };
                Ok(Statement::If {
                    cond,
                    then_branch,
                    else_branch,
                })
            }
            TokenKind::Case => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let subject = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                let mut arms = Vec::new();
                let mut default = None;
                while !self.eat(&TokenKind::Endcase) {
                    if self.at(&TokenKind::Eof) {
                        return Err(self.error_here("unterminated `case`".into()));
                    }
                    if self.eat(&TokenKind::Default) {
                        self.eat(&TokenKind::Colon);
                        if default.is_some() {
                            return Err(self.error_here("duplicate `default` arm".into()));
                        }
                        default = Some(Box::new(self.parse_statement()?));
                        continue;
                    }
                    let mut labels = vec![self.parse_expr()?];
                    while self.eat(&TokenKind::Comma) {
                        labels.push(self.parse_expr()?);
                    }
                    self.expect(&TokenKind::Colon)?;
                    let body = self.parse_statement()?;
                    arms.push(CaseArm { labels, body });
                }
                Ok(Statement::Case {
                    subject,
                    arms,
                    default,
                })
            }
            TokenKind::Ident(_) => {
                let target = self.expect_ident()?;
                let index = if self.eat(&TokenKind::LBracket) {
                    let idx = self.parse_expr()?;
                    self.expect(&TokenKind::RBracket)?;
                    Some(idx)
                } else {
                    None
                };
                let nonblocking = if self.eat(&TokenKind::LeAssign) {
                    true
                } else {
                    self.expect(&TokenKind::Assign1)?;
                    false
                };
                let value = self.parse_expr()?;
                self.expect(&TokenKind::Semi)?;
                Ok(Statement::Assign {
                    target,
                    index,
                    value,
                    nonblocking,
                })
            }
            other => Err(self.error_here(format!(
                "expected statement, found {}",
                other.describe()
            ))),
        }
    }

    // --- expressions --------------------------------------------------------
    //
    // Precedence, loosest first: || < && < == != < + - < unary !

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_lor()
    }

    fn parse_lor(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_land()?;
        while self.eat(&TokenKind::PipePipe) {
            let rhs = self.parse_land()?;
            lhs = binary(BinaryOp::LOr, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_land(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_equality()?;
        while self.eat(&TokenKind::AmpAmp) {
            let rhs = self.parse_equality()?;
            lhs = binary(BinaryOp::LAnd, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = if self.eat(&TokenKind::EqEq) {
                BinaryOp::Eq
            } else if self.eat(&TokenKind::BangEq) {
                BinaryOp::Ne
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_additive()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = if self.eat(&TokenKind::Plus) {
                BinaryOp::Add
            } else if self.eat(&TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_unary()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&TokenKind::Bang) {
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::LNot,
                operand: Box::new(operand),
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            TokenKind::Number { value, width } => {
                self.advance();
                Ok(Expr::Literal { value, width })
            }
            TokenKind::Ident(name) => {
                self.advance();
                if self.eat(&TokenKind::LBracket) {
                    let index = self.parse_expr()?;
                    self.expect(&TokenKind::RBracket)?;
                    Ok(Expr::Index {
                        base: name,
                        index: Box::new(index),
                    })
                } else {
                    Ok(Expr::Identifier(name))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBrace => {
                self.advance();
                let count = self.parse_expr()?;
                if !self.at(&TokenKind::LBrace) {
                    return Err(self
                        .error_here("concatenation is not supported, only replication".into()));
                }
                self.advance();
                let value = self.parse_expr()?;
                self.expect(&TokenKind::RBrace)?;
                self.expect(&TokenKind::RBrace)?;
                Ok(Expr::Replicate {
                    count: Box::new(count),
                    value: Box::new(value),
                })
            }
            other => Err(self.error_here(format!(
                "expected expression, found {}",
                other.describe()
            ))),
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}
