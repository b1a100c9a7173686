//! Recursive-descent scanner for rule text.
//!
//! The scanner walks the input once, one character of lookahead at a time,
//! and builds a [`Rule`] tree directly without a separate token stream.

use regex::Regex;

use crate::ast::{Rule, RuleLit, RuleNode};
use crate::error::{Result, SyntaxError};
use crate::quote::{unquote, unslash};

/// Characters that end a literal or name.
pub const RESERVED: &[char] = &[
    '@', '?', '=', '[', ']', '(', ')', '{', '}', '/', '<', '>', ',', ':',
];

fn is_reserved(c: char) -> bool {
    RESERVED.contains(&c)
}

fn is_token_char(c: char) -> bool {
    !c.is_whitespace() && !is_reserved(c)
}

/// Parses a complete rule; trailing input other than whitespace is an error.
pub fn parse_rule(source: &str) -> Result<Rule> {
    Scanner::new(source).root()
}

impl std::str::FromStr for Rule {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self> {
        parse_rule(s)
    }
}

impl Rule {
    /// Parses rule text, see [`parse_rule`].
    pub fn parse(source: &str) -> Result<Self> {
        parse_rule(source)
    }
}

struct Scanner<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn root(&mut self) -> Result<Rule> {
        self.skip_whitespace();
        let rule = self.rule()?;
        self.skip_whitespace();

        if let Some(c) = self.current_char() {
            return Err(self.error(format!("rule should end but got `{c}`")));
        }

        Ok(rule)
    }

    fn rule(&mut self) -> Result<Rule> {
        let start = self.position;

        match self.current_char() {
            Some('@') => self.advance(),
            Some(c) => return Err(self.error(format!("rule should start with `@` but got `{c}`"))),
            None => return Err(self.error("rule should start with `@`")),
        }

        let name = self.token();
        if name.is_empty() {
            return Err(self.error("rule name is missing"));
        }

        let mut rule = Rule::new(name);

        loop {
            match self.current_char() {
                Some('<') => {
                    if !rule.params.is_empty() {
                        return Err(self.error("parameters already declared"));
                    }
                    rule.params = self.params()?;
                }
                Some('[' | '(') => {
                    if !rule.range.is_empty() {
                        return Err(self.error("range already declared"));
                    }
                    let (range, exclusive_left, exclusive_right) = self.range()?;
                    rule.range = range;
                    rule.exclusive_left = exclusive_left;
                    rule.exclusive_right = exclusive_right;
                }
                Some('{') => {
                    if !rule.values.is_empty() {
                        return Err(self.error("values already declared"));
                    }
                    rule.values = self.values()?;
                }
                Some('/') => {
                    if rule.pattern.is_some() {
                        return Err(self.error("pattern already declared"));
                    }
                    rule.pattern = Some(self.pattern()?);
                }
                Some('?' | '=') => {
                    if rule.optional {
                        return Err(self.error("optional marker already declared"));
                    }
                    let default_value = self.optional_and_default()?;
                    rule.optional = true;
                    rule.default_value = default_value;
                }
                Some(c) if c.is_whitespace() => self.advance(),
                _ => break,
            }
        }

        rule.raw = self.input[start..self.position].trim_end().to_string();
        Ok(rule)
    }

    /// `<p1,p2,...>`; missing slots become empty literals.
    fn params(&mut self) -> Result<Vec<RuleNode>> {
        self.advance();

        let mut slots: Vec<Option<RuleNode>> = vec![None];

        loop {
            match self.current_char() {
                None => return Err(self.error("parameters should end with `>`")),
                Some('>') => {
                    self.advance();
                    break;
                }
                Some(',') => {
                    self.advance();
                    slots.push(None);
                }
                Some(c) if c.is_whitespace() => self.advance(),
                Some('@') => {
                    let offset = self.position;
                    let nested = self.rule()?;
                    let slot = slots.last_mut().ok_or_else(|| self.error("parameter slot missing"))?;
                    if slot.is_some() {
                        return Err(self.error_at("parameter already has a value", offset));
                    }
                    *slot = Some(RuleNode::Rule(Box::new(nested)));
                }
                Some(_) => {
                    let offset = self.position;
                    let lit = self.literal()?.to_string();
                    let slot = slots.last_mut().ok_or_else(|| self.error("parameter slot missing"))?;
                    match slot {
                        None => *slot = Some(RuleNode::Lit(RuleLit::new(lit))),
                        Some(RuleNode::Lit(existing)) => existing.append(&lit),
                        Some(RuleNode::Rule(_)) => {
                            return Err(self.error_at("parameter already has a rule", offset));
                        }
                    }
                }
            }
        }

        if slots.len() == 1 && slots[0].is_none() {
            return Ok(Vec::new());
        }

        Ok(slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| RuleNode::Lit(RuleLit::default())))
            .collect())
    }

    /// `[a,b]`, `(a,b)`, mixed brackets, or `[a]`.
    fn range(&mut self) -> Result<(Vec<RuleLit>, bool, bool)> {
        let exclusive_left = self.current_char() == Some('(');
        self.advance();

        let mut bounds = vec![RuleLit::default()];

        let exclusive_right = loop {
            match self.current_char() {
                None => return Err(self.error("range should end with `]` or `)`")),
                Some(']') => break false,
                Some(')') => break true,
                Some(',') => {
                    if bounds.len() == 2 {
                        return Err(self.error("range accepts at most two bounds"));
                    }
                    self.advance();
                    bounds.push(RuleLit::default());
                }
                Some(c) if c.is_whitespace() => self.advance(),
                Some(_) => {
                    let lit = self.literal()?;
                    if let Some(last) = bounds.last_mut() {
                        last.append(lit);
                    }
                }
            }
        };
        self.advance();

        if bounds.len() == 1 && bounds[0].is_empty() {
            bounds.clear();
        }

        Ok((bounds, exclusive_left, exclusive_right))
    }

    /// `{v1,v2,...}`.
    fn values(&mut self) -> Result<Vec<RuleLit>> {
        self.advance();

        let mut values = vec![RuleLit::default()];

        loop {
            match self.current_char() {
                None => return Err(self.error("values should end with `}`")),
                Some('}') => {
                    self.advance();
                    break;
                }
                Some(',') => {
                    self.advance();
                    values.push(RuleLit::default());
                }
                Some(c) if c.is_whitespace() => self.advance(),
                Some(_) => {
                    let lit = self.literal()?;
                    if let Some(last) = values.last_mut() {
                        last.append(lit);
                    }
                }
            }
        }

        if values.len() == 1 && values[0].is_empty() {
            values.clear();
        }

        Ok(values)
    }

    /// `/regex/` with `\/` for a literal slash.
    fn pattern(&mut self) -> Result<Regex> {
        self.advance();
        let start = self.position;

        loop {
            match self.current_char() {
                None => return Err(self.error("pattern should end with `/`")),
                Some('\\') => {
                    self.advance();
                    if self.current_char().is_none() {
                        return Err(self.error("backslash at end of pattern"));
                    }
                    self.advance();
                }
                Some('/') => break,
                Some(_) => self.advance(),
            }
        }

        let body = &self.input[start..self.position];
        self.advance();

        Regex::new(&unslash(body))
            .map_err(|e| self.error_at(format!("invalid pattern: {e}"), start))
    }

    /// `?`, `= 'quoted'`, `= bare` or a bare `=` meaning an empty default.
    fn optional_and_default(&mut self) -> Result<Option<String>> {
        let marker = self.current_char();
        self.advance();

        if marker == Some('?') {
            return Ok(None);
        }

        self.skip_whitespace();

        match self.current_char() {
            Some('\'') => self.quoted().map(Some),
            Some(c) if is_token_char(c) => Ok(Some(self.token().to_string())),
            _ => Ok(Some(String::new())),
        }
    }

    fn quoted(&mut self) -> Result<String> {
        self.advance();
        let start = self.position;

        loop {
            match self.current_char() {
                None => return Err(self.error("default value should end with `'`")),
                Some('\\') => {
                    self.advance();
                    if self.current_char().is_none() {
                        return Err(self.error("backslash at end of default value"));
                    }
                    self.advance();
                }
                Some('\'') => break,
                Some(_) => self.advance(),
            }
        }

        let body = &self.input[start..self.position];
        self.advance();
        Ok(unquote(body))
    }

    /// A non-empty run of token characters.
    fn literal(&mut self) -> Result<&'a str> {
        let token = self.token();
        if token.is_empty() {
            return Err(match self.current_char() {
                Some(c) => self.error(format!("unexpected `{c}`")),
                None => self.error("unexpected end of input"),
            });
        }
        Ok(token)
    }

    fn token(&mut self) -> &'a str {
        let start = self.position;
        while let Some(c) = self.current_char() {
            if !is_token_char(c) {
                break;
            }
            self.advance();
        }
        &self.input[start..self.position]
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.current_char() {
            self.position += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char() {
            if !c.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        self.error_at(message, self.position)
    }

    fn error_at(&self, message: impl Into<String>, offset: usize) -> SyntaxError {
        SyntaxError::new(message, self.input, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nested_params_keep_positions() {
        let rule = parse_rule("@map<,@string[1,]>").unwrap();
        assert_eq!(rule.params.len(), 2);
        assert!(rule.params[0].is_empty());
        assert_eq!(rule.params[1].as_rule().map(|r| r.name.as_str()), Some("string"));
    }

    #[test]
    fn test_literal_tokens_concatenate() {
        let rule = parse_rule("@int[1 0, 2 0]").unwrap();
        assert_eq!(rule.range, vec![RuleLit::new("10"), RuleLit::new("20")]);
    }

    #[test]
    fn test_raw_is_source_slice() {
        let rule = parse_rule("@slice<@string[1,] >[1,2]").unwrap();
        assert_eq!(rule.raw, "@slice<@string[1,] >[1,2]");
        assert_eq!(rule.params[0].as_rule().map(|r| r.raw.as_str()), Some("@string[1,]"));
    }

    #[test]
    fn test_empty_brackets_mean_nothing() {
        let rule = parse_rule("@string<>[]{}").unwrap();
        assert!(rule.params.is_empty());
        assert!(rule.range.is_empty());
        assert!(rule.values.is_empty());
    }

    #[test]
    fn test_error_reports_offset() {
        let err = parse_rule("@int[1,2").unwrap_err();
        assert_eq!(err.offset, 8);
        assert_eq!(err.fragment, "");

        let err = parse_rule("@int]").unwrap_err();
        assert_eq!(err.offset, 4);
        assert_eq!(err.fragment, "]");
    }
}
