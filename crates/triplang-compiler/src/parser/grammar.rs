//! Recursive-descent grammar for `.trip` sources.
//!
//! Each stratum has its own term grammar over the shared token stream:
//! poly bodies admit type abstraction, type application, `let`, and `match`;
//! typed bodies require annotated binders; untyped bodies forbid them;
//! combinator bodies are S/K/I spines with references. The type grammar is
//! shared. Decimal literals parse to sentinel variable references in the
//! stratum's variable namespace.

use num_bigint::BigUint;
use triplang_core::def::{DataCtor, Def, Program};
use triplang_core::names;
use triplang_core::term::{Combinator, MatchArm, TermRef, TripValue};

use super::error::ParseError;
use super::lexer::{Token, TokenKind, lex};

/// Parse a whole program.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let tokens = lex(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        module: None,
    };
    parser.program()
}

/// Which term grammar is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TermSyntax {
    Poly,
    Typed,
    Untyped,
    Ski,
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    module: Option<String>,
}

impl<'src> Parser<'src> {
    fn peek(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn text(&self, token: &Token) -> &'src str {
        &self.source[token.span.clone()]
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(token) => ParseError::Unexpected {
                found: format!("{} {:?}", token.kind.describe(), self.text(token)),
                expected: expected.to_owned(),
            },
            None => ParseError::Eof {
                expected: expected.to_owned(),
            },
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.peek() == Some(kind) {
            Ok(self.advance().unwrap())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(self.text(&token).to_owned())
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn program(&mut self) -> Result<Program, ParseError> {
        let mut defs = Vec::new();
        while let Some(kind) = self.peek() {
            let def = match kind {
                TokenKind::Module => self.module_decl()?,
                TokenKind::Import => self.import_decl()?,
                TokenKind::Export => self.export_decl()?,
                TokenKind::Poly => self.poly_def()?,
                TokenKind::Typed => self.typed_def()?,
                TokenKind::Untyped => self.untyped_def()?,
                TokenKind::Combinator => self.combinator_def()?,
                TokenKind::Type => self.type_def()?,
                TokenKind::Data => self.data_def()?,
                _ => return Err(self.unexpected("a declaration")),
            };
            defs.push(def);
        }
        Ok(Program::new(defs))
    }

    fn module_decl(&mut self) -> Result<Def, ParseError> {
        self.expect(TokenKind::Module)?;
        let name = self.expect_ident()?;
        if let Some(first) = &self.module {
            return Err(ParseError::DuplicateModule {
                first: first.clone(),
                second: name,
            });
        }
        self.module = Some(name.clone());
        Ok(Def::Module { name })
    }

    fn import_decl(&mut self) -> Result<Def, ParseError> {
        self.expect(TokenKind::Import)?;
        let module_ref = self.expect_ident()?;
        let symbol_ref = self.expect_ident()?;
        Ok(Def::Import {
            module_ref,
            symbol_ref,
        })
    }

    fn export_decl(&mut self) -> Result<Def, ParseError> {
        self.expect(TokenKind::Export)?;
        let symbol_ref = self.expect_ident()?;
        Ok(Def::Export { symbol_ref })
    }

    fn poly_def(&mut self) -> Result<Def, ParseError> {
        self.expect(TokenKind::Poly)?;
        let rec = self.eat(TokenKind::Rec);
        let name = self.expect_ident()?;
        let ty = if self.eat(TokenKind::Colon) {
            Some(self.type_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Eq)?;
        let term = self.term(TermSyntax::Poly)?;
        Ok(Def::Poly {
            name,
            term,
            ty,
            rec,
        })
    }

    fn typed_def(&mut self) -> Result<Def, ParseError> {
        self.expect(TokenKind::Typed)?;
        let name = self.expect_ident()?;
        let ty = if self.eat(TokenKind::Colon) {
            Some(self.type_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Eq)?;
        let term = self.term(TermSyntax::Typed)?;
        Ok(Def::Typed { name, term, ty })
    }

    fn untyped_def(&mut self) -> Result<Def, ParseError> {
        self.expect(TokenKind::Untyped)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::Eq)?;
        let term = self.term(TermSyntax::Untyped)?;
        Ok(Def::Untyped { name, term })
    }

    fn combinator_def(&mut self) -> Result<Def, ParseError> {
        self.expect(TokenKind::Combinator)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::Eq)?;
        let term = self.term(TermSyntax::Ski)?;
        Ok(Def::Combinator { name, term })
    }

    fn type_def(&mut self) -> Result<Def, ParseError> {
        self.expect(TokenKind::Type)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::Eq)?;
        let ty = self.type_expr()?;
        Ok(Def::Type { name, ty })
    }

    fn data_def(&mut self) -> Result<Def, ParseError> {
        self.expect(TokenKind::Data)?;
        let name = self.expect_ident()?;
        let mut type_params = Vec::new();
        while self.peek() == Some(TokenKind::Ident) {
            type_params.push(self.expect_ident()?);
        }
        self.expect(TokenKind::Eq)?;
        let mut ctors = vec![self.data_ctor()?];
        while self.eat(TokenKind::Pipe) {
            ctors.push(self.data_ctor()?);
        }
        Ok(Def::Data {
            name,
            type_params,
            ctors,
        })
    }

    fn data_ctor(&mut self) -> Result<DataCtor, ParseError> {
        let name = self.expect_ident()?;
        let mut arg_types = Vec::new();
        while matches!(self.peek(), Some(TokenKind::Ident | TokenKind::LParen)) {
            arg_types.push(self.type_atom()?);
        }
        Ok(DataCtor { name, arg_types })
    }

    // ------------------------------------------------------------------
    // Terms
    // ------------------------------------------------------------------

    fn term(&mut self, syntax: TermSyntax) -> Result<TermRef, ParseError> {
        match self.peek() {
            Some(TokenKind::Hash) if syntax == TermSyntax::Poly => {
                self.advance();
                let type_var = self.expect_ident()?;
                self.expect(TokenKind::FatArrow)?;
                let body = self.term(syntax)?;
                Ok(TripValue::sysf_type_abs(type_var, body))
            }
            Some(TokenKind::Backslash) if syntax != TermSyntax::Ski => self.abstraction(syntax),
            Some(TokenKind::Let) if syntax == TermSyntax::Poly => {
                self.advance();
                let name = self.expect_ident()?;
                self.expect(TokenKind::Eq)?;
                let value = self.term(syntax)?;
                self.expect(TokenKind::In)?;
                let body = self.term(syntax)?;
                Ok(TripValue::sysf_let(name, value, body))
            }
            Some(TokenKind::Match) if syntax == TermSyntax::Poly => self.match_expr(),
            _ => self.application(syntax),
        }
    }

    fn abstraction(&mut self, syntax: TermSyntax) -> Result<TermRef, ParseError> {
        self.expect(TokenKind::Backslash)?;
        let param = self.expect_ident()?;
        match syntax {
            TermSyntax::Poly => {
                self.expect(TokenKind::Colon)?;
                let param_type = self.type_atom()?;
                self.expect(TokenKind::FatArrow)?;
                let body = self.term(syntax)?;
                Ok(TripValue::sysf_abs(param, param_type, body))
            }
            TermSyntax::Typed => {
                // The annotation is optional; elaboration fills missing ones
                // from the definition's declared type.
                let param_type = if self.eat(TokenKind::Colon) {
                    Some(self.type_atom()?)
                } else {
                    None
                };
                self.expect(TokenKind::FatArrow)?;
                let body = self.term(syntax)?;
                Ok(match param_type {
                    Some(param_type) => TripValue::typed_abs(param, param_type, body),
                    None => TripValue::lambda_abs(param, body),
                })
            }
            TermSyntax::Untyped => {
                self.expect(TokenKind::FatArrow)?;
                let body = self.term(syntax)?;
                Ok(TripValue::lambda_abs(param, body))
            }
            TermSyntax::Ski => Err(self.unexpected("a combinator term")),
        }
    }

    fn match_expr(&mut self) -> Result<TermRef, ParseError> {
        self.expect(TokenKind::Match)?;
        let scrutinee = self.application(TermSyntax::Poly)?;
        self.expect(TokenKind::Return)?;
        let return_type = self.type_atom()?;
        self.expect(TokenKind::LBrace)?;
        let mut arms = vec![self.match_arm()?];
        while self.eat(TokenKind::Pipe) {
            arms.push(self.match_arm()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(TripValue::sysf_match(scrutinee, return_type, arms))
    }

    fn match_arm(&mut self) -> Result<MatchArm, ParseError> {
        let ctor = self.expect_ident()?;
        let mut params = Vec::new();
        while self.peek() == Some(TokenKind::Ident) {
            params.push(self.expect_ident()?);
        }
        self.expect(TokenKind::FatArrow)?;
        let body = self.term(TermSyntax::Poly)?;
        Ok(MatchArm { ctor, params, body })
    }

    fn application(&mut self, syntax: TermSyntax) -> Result<TermRef, ParseError> {
        let mut term = self.atom(syntax)?;
        loop {
            match self.peek() {
                Some(TokenKind::LBracket) if syntax == TermSyntax::Poly => {
                    self.advance();
                    let type_arg = self.type_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    term = TripValue::sysf_type_app(term, type_arg);
                }
                Some(TokenKind::Ident | TokenKind::Number | TokenKind::LParen) => {
                    let arg = self.atom(syntax)?;
                    term = TripValue::app(term, arg);
                }
                _ => break,
            }
        }
        Ok(term)
    }

    fn atom(&mut self, syntax: TermSyntax) -> Result<TermRef, ParseError> {
        match self.peek() {
            Some(TokenKind::Ident) => {
                let token = self.advance().unwrap();
                let name = self.text(&token);
                Ok(match syntax {
                    TermSyntax::Poly => TripValue::sysf_var(name),
                    TermSyntax::Typed | TermSyntax::Untyped => TripValue::lambda_var(name),
                    TermSyntax::Ski => match name {
                        "S" => TripValue::terminal(Combinator::S),
                        "K" => TripValue::terminal(Combinator::K),
                        "I" => TripValue::terminal(Combinator::I),
                        _ => TripValue::lambda_var(name),
                    },
                })
            }
            Some(TokenKind::Number) if syntax != TermSyntax::Ski => {
                let token = self.advance().unwrap();
                let text = self.text(&token);
                let value: BigUint =
                    text.parse().map_err(|_| ParseError::InvalidNumber {
                        text: text.to_owned(),
                    })?;
                let name = names::literal_name(&value);
                Ok(match syntax {
                    TermSyntax::Poly => TripValue::sysf_var(name),
                    _ => TripValue::lambda_var(name),
                })
            }
            Some(TokenKind::LParen) => {
                self.advance();
                let term = self.term(syntax)?;
                self.expect(TokenKind::RParen)?;
                Ok(term)
            }
            _ => Err(self.unexpected("a term")),
        }
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn type_expr(&mut self) -> Result<TermRef, ParseError> {
        if self.peek() == Some(TokenKind::Hash) {
            self.advance();
            let type_var = self.expect_ident()?;
            self.expect(TokenKind::FatArrow)?;
            let body = self.type_expr()?;
            return Ok(TripValue::forall(type_var, body));
        }
        let lhs = self.type_app_chain()?;
        if self.eat(TokenKind::Arrow) {
            let rhs = self.type_expr()?;
            Ok(TripValue::arrow(lhs, rhs))
        } else {
            Ok(lhs)
        }
    }

    fn type_app_chain(&mut self) -> Result<TermRef, ParseError> {
        let mut ty = self.type_atom()?;
        while matches!(self.peek(), Some(TokenKind::Ident | TokenKind::LParen)) {
            let arg = self.type_atom()?;
            ty = TripValue::type_app(ty, arg);
        }
        Ok(ty)
    }

    fn type_atom(&mut self) -> Result<TermRef, ParseError> {
        match self.peek() {
            Some(TokenKind::Ident) => {
                let token = self.advance().unwrap();
                Ok(TripValue::type_var(self.text(&token)))
            }
            Some(TokenKind::LParen) => {
                self.advance();
                let ty = self.type_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(ty)
            }
            _ => Err(self.unexpected("a type")),
        }
    }
}
