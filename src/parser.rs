//! Reads `selector[, selector...] { key: value; ... }` rules with `cssparser`.
//!
//! Malformed rules fail the whole sheet. Malformed declarations inside a
//! rule come back as a [`Declaration`] without a value so the caller can
//! report them and keep going.

use cssparser::{
    AtRuleParser, BasicParseErrorKind, DeclarationParser, ParseError, ParseErrorKind, Parser,
    ParserInput, ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
    StyleSheetParser, ToCss, Token,
};

use crate::error::Error;

pub(crate) struct Declaration {
    pub(crate) line: usize,
    pub(crate) key: String,
    /// `None` when the text could not be read as `key: value`.
    pub(crate) value: Option<String>,
}

pub(crate) struct Block {
    pub(crate) line: usize,
    pub(crate) selectors: Vec<String>,
    pub(crate) declarations: Vec<Declaration>,
}

struct RuleParser;

struct BodyParser;

impl<'i> QualifiedRuleParser<'i> for RuleParser {
    type Prelude = Vec<String>;
    type QualifiedRule = Block;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        input.parse_comma_separated(|input| {
            let name = input.expect_ident()?;
            Ok((**name).to_owned())
        })
    }

    fn parse_block<'t>(
        &mut self,
        selectors: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let mut body = BodyParser;
        let declarations = RuleBodyParser::new(input, &mut body)
            .map(|item| match item {
                Ok(declaration) => declaration,
                Err((err, text)) => Declaration {
                    line: err.location.line as usize + 1,
                    key: text
                        .split_once(':')
                        .map_or(text, |(key, _)| key)
                        .trim()
                        .trim_end_matches(';')
                        .to_string(),
                    value: None,
                },
            })
            .collect();
        Ok(Block {
            line: start.source_location().line as usize + 1,
            selectors,
            declarations,
        })
    }
}

impl<'i> AtRuleParser<'i> for RuleParser {
    type Prelude = ();
    type AtRule = Block;
    type Error = ();
}

impl<'i> DeclarationParser<'i> for BodyParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: cssparser::CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let line = input.current_source_location().line as usize + 1;
        let mut parts = Vec::new();
        while let Ok(token) = input.next() {
            parts.push(match token {
                Token::Ident(s) | Token::QuotedString(s) => (**s).to_owned(),
                other => other.to_css_string(),
            });
        }
        Ok(Declaration {
            line,
            key: (*name).to_owned(),
            value: Some(parts.join(" ")),
        })
    }
}

impl<'i> AtRuleParser<'i> for BodyParser {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for BodyParser {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, Declaration, ()> for BodyParser {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

fn syntax(err: &ParseError<'_, ()>) -> Error {
    let reason = match &err.kind {
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            format!("unexpected {}", token.to_css_string())
        }
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => {
            "unexpected end of rule".to_string()
        }
        ParseErrorKind::Basic(BasicParseErrorKind::AtRuleInvalid(name)) => {
            format!("unsupported at-rule @{}", &**name)
        }
        _ => "invalid rule".to_string(),
    };
    Error::Syntax {
        line: err.location.line as usize + 1,
        reason,
    }
}

pub(crate) fn parse(source: &str) -> Result<Vec<Block>, Error> {
    let mut input = ParserInput::new(source);
    let mut parser = Parser::new(&mut input);
    let mut rules = RuleParser;
    let blocks = StyleSheetParser::new(&mut parser, &mut rules)
        .map(|rule| rule.map_err(|(err, _)| syntax(&err)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(blocks)
}
