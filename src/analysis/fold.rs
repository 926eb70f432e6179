//! Constant folding of dimension-size expressions.
//!
//! Handles what a size expression can carry without data-flow: integer
//! literals, unary sign, parentheses, `+ - *`, numeric casts and conversion
//! calls, and named constants declared in the same file.

use crate::syntax::TokenKind;

use super::site::{Constants, ExprToken};

/// Constant chains longer than this are treated as unknown.
const MAX_CONSTANT_DEPTH: usize = 16;

/// Syntax-specific pieces of constant folding.
pub trait FoldDialect {
    /// Value of an integer literal, `None` for anything non-integral.
    fn integer_literal(&self, text: &str) -> Option<i128>;

    /// Number of tokens forming a prefix cast at the start of `tokens`,
    /// such as `(long)` in C#.
    fn prefix_cast(&self, tokens: &[ExprToken]) -> Option<usize>;

    /// Whether `name(...)` converts its first argument without changing
    /// its value (`CLng`, `CType`, `checked`).
    fn is_conversion(&self, name: &str) -> bool;
}

/// Fold `tokens` to an integer, or `None` if the expression is not a
/// compile-time integral constant the folder understands.
pub fn fold(tokens: &[ExprToken], dialect: &dyn FoldDialect, constants: &Constants) -> Option<i128> {
    fold_at_depth(tokens, dialect, constants, 0)
}

fn fold_at_depth(
    tokens: &[ExprToken],
    dialect: &dyn FoldDialect,
    constants: &Constants,
    depth: usize,
) -> Option<i128> {
    if depth > MAX_CONSTANT_DEPTH || tokens.is_empty() {
        return None;
    }
    let mut folder = Folder {
        tokens,
        pos: 0,
        dialect,
        constants,
        depth,
    };
    let value = folder.expr()?;
    // Trailing tokens mean an operator we don't model.
    if folder.pos != tokens.len() {
        return None;
    }
    Some(value)
}

struct Folder<'a> {
    tokens: &'a [ExprToken],
    pos: usize,
    dialect: &'a dyn FoldDialect,
    constants: &'a Constants,
    depth: usize,
}

impl<'a> Folder<'a> {
    fn peek(&self) -> Option<&'a ExprToken> {
        self.tokens.get(self.pos)
    }

    fn peek_punct(&self, p: &str) -> bool {
        self.peek().map(|t| t.is_punct(p)).unwrap_or(false)
    }

    fn expect_punct(&mut self, p: &str) -> Option<()> {
        if self.peek_punct(p) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    fn expr(&mut self) -> Option<i128> {
        let mut value = self.term()?;
        loop {
            if self.peek_punct("+") {
                self.pos += 1;
                value = value.checked_add(self.term()?)?;
            } else if self.peek_punct("-") {
                self.pos += 1;
                value = value.checked_sub(self.term()?)?;
            } else {
                return Some(value);
            }
        }
    }

    fn term(&mut self) -> Option<i128> {
        let mut value = self.unary()?;
        while self.peek_punct("*") {
            self.pos += 1;
            value = value.checked_mul(self.unary()?)?;
        }
        Some(value)
    }

    fn unary(&mut self) -> Option<i128> {
        if self.peek_punct("-") {
            self.pos += 1;
            return self.unary()?.checked_neg();
        }
        if self.peek_punct("+") {
            self.pos += 1;
            return self.unary();
        }
        if let Some(len) = self.dialect.prefix_cast(&self.tokens[self.pos..]) {
            self.pos += len;
            return self.unary();
        }
        self.primary()
    }

    fn primary(&mut self) -> Option<i128> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::Number => {
                self.pos += 1;
                self.dialect.integer_literal(&token.text)
            }
            TokenKind::Punct if token.text == "(" => {
                self.pos += 1;
                let value = self.expr()?;
                self.expect_punct(")")?;
                Some(value)
            }
            TokenKind::Ident => {
                self.pos += 1;
                if self.peek_punct("(") && self.dialect.is_conversion(&token.text) {
                    self.pos += 1;
                    let value = self.expr()?;
                    if self.peek_punct(",") {
                        // CType(value, TargetType): the type doesn't change the value.
                        self.skip_to_close()?;
                    }
                    self.expect_punct(")")?;
                    return Some(value);
                }
                let definition = self.constants.get(&token.text)?;
                fold_at_depth(definition, self.dialect, self.constants, self.depth + 1)
            }
            _ => None,
        }
    }

    /// Advance to the `)` closing the current argument list.
    fn skip_to_close(&mut self) -> Option<()> {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                if depth == 0 {
                    return Some(());
                }
                depth -= 1;
            }
            self.pos += 1;
        }
        None
    }
}

/// Parse digits in `radix`, ignoring `_` separators.
pub(crate) fn parse_digits(digits: &str, radix: u32) -> Option<i128> {
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return None;
    }
    i128::from_str_radix(&cleaned, radix).ok()
}
