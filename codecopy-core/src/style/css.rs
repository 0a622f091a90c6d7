//! CSS syntax on top of `cssparser`.
//!
//! Turns stylesheet text into style rules and `style` attribute text into
//! declarations. Values are kept as their source text, trimmed, with the
//! `!important` flag split off. Tokenization is left to `cssparser`, so
//! strings, comments and nested blocks inside values never end a declaration
//! early.

use super::selector::SelectorGroup;
use cssparser::{
    parse_important, AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput,
    ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, StyleSheetParser, Token,
};

/// One `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Lower-cased property name.
    pub name: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(name: &str, value: &str) -> Self {
        Declaration {
            name: name.to_ascii_lowercase(),
            value: value.to_string(),
            important: false,
        }
    }

    /// Serialized in the `property: value;` form of a CSSOM-written style.
    pub fn to_css(&self) -> String {
        if self.important {
            format!("{}: {} !important;", self.name, self.value)
        } else {
            format!("{}: {};", self.name, self.value)
        }
    }
}

/// A qualified rule: a selector group and its declaration block.
#[derive(Debug, Clone)]
pub struct StyleRule {
    pub selectors: SelectorGroup,
    pub declarations: Vec<Declaration>,
}

/// Parse a declaration list such as the value of a `style` attribute.
/// Invalid declarations are dropped.
pub fn parse_declaration_list(text: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    declarations_in(&mut parser)
}

/// Parse the top-level style rules of a stylesheet. At-rules and rules whose
/// selectors cannot be matched at all are dropped.
pub fn parse_style_rules(css: &str) -> Vec<StyleRule> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut rules = TopLevelRuleParser;
    StyleSheetParser::new(&mut parser, &mut rules)
        .filter_map(|rule| match rule {
            Ok(rule) => Some(rule),
            Err((_, source)) => {
                log::trace!("skipping css rule: {}", source.trim());
                None
            }
        })
        .collect()
}

fn declarations_in(input: &mut Parser<'_, '_>) -> Vec<Declaration> {
    let mut declarations = DeclarationListParser;
    RuleBodyParser::new(input, &mut declarations)
        .filter_map(Result::ok)
        .collect()
}

struct TopLevelRuleParser;

impl<'i> QualifiedRuleParser<'i> for TopLevelRuleParser {
    type Prelude = SelectorGroup;
    type QualifiedRule = StyleRule;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next().is_ok() {}
        SelectorGroup::parse(input.slice_from(start)).ok_or_else(|| input.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        selectors: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        Ok(StyleRule {
            selectors,
            declarations: declarations_in(input),
        })
    }
}

impl<'i> AtRuleParser<'i> for TopLevelRuleParser {
    type Prelude = ();
    type AtRule = StyleRule;
    type Error = ();
}

struct DeclarationListParser;

impl<'i> DeclarationParser<'i> for DeclarationListParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _declaration_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        let mut end = start;
        let mut important = false;
        while !input.is_exhausted() {
            if input.try_parse(parse_important).is_ok() {
                important = true;
                break;
            }
            skip_component_value(input)?;
            end = input.position();
        }
        // `!important` has to be the last thing in the declaration.
        input.expect_exhausted()?;

        let value = input.slice(start..end).trim();
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok(Declaration {
            name: name.to_ascii_lowercase(),
            value: value.to_string(),
            important,
        })
    }
}

impl<'i> AtRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, Declaration, ()> for DeclarationListParser {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Consume one component value, including the contents of a block or
/// function it opens.
fn skip_component_value<'i>(input: &mut Parser<'i, '_>) -> Result<(), ParseError<'i, ()>> {
    let opens_block = matches!(
        input.next()?,
        Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock
    );
    if opens_block {
        input.parse_nested_block(|nested| {
            while nested.next().is_ok() {}
            Ok::<(), ParseError<'i, ()>>(())
        })?;
    }
    Ok(())
}
