//! Lexical scanner.
//!
//! [`Scanner`] turns the source text into a forward-only sequence of
//! [`Token`]s without building any tree structure. At each position it
//! recognizes, in order: comments, CDATA sections, doctype declarations,
//! processing instructions, end tags, start tags, and finally text runs up
//! to the next `<`.
//!
//! The scanner is an [`Iterator`] over `Result<Token, ParseError>` and stops
//! for good after the first error.

use std::collections::HashSet;

use crate::error::{ErrorKind, ParseError, SourceLocation};
use crate::tree::Attribute;

use super::input::{
    decode_entities, is_name_char, is_name_start_char, is_xml_whitespace, ScanInput,
    DEFAULT_MAX_ATTRIBUTES,
};
use super::ParseOptions;

/// A lexical token and the location of its first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What was scanned.
    pub kind: TokenKind,
    /// Where the token starts in the source.
    pub location: SourceLocation,
}

/// The lexical categories the scanner produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `<name attr="v">`, or `<name/>` when `self_closing` is set.
    StartTag {
        name: String,
        attributes: Vec<Attribute>,
        self_closing: bool,
    },
    /// `</name>`.
    EndTag { name: String },
    /// A run of character data with entities decoded.
    Text(String),
    /// Comment body.
    Comment(String),
    /// CDATA content.
    CData(String),
    /// `<?target data?>`.
    ProcessingInstruction { target: String, data: String },
    /// Raw text between `<!DOCTYPE` and the first following `>`.
    Doctype(String),
}

/// Forward-only tokenizer over a complete text buffer.
///
/// ```
/// use smallxml::parser::{Scanner, TokenKind};
///
/// let kinds: Vec<TokenKind> = Scanner::new("<a>hi</a>")
///     .map(|t| t.unwrap().kind)
///     .collect();
/// assert_eq!(kinds[1], TokenKind::Text("hi".to_string()));
/// assert_eq!(kinds.len(), 3);
/// ```
pub struct Scanner<'a> {
    input: ScanInput<'a>,
    max_attributes: u32,
    failed: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner with default limits.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            input: ScanInput::new(text),
            max_attributes: DEFAULT_MAX_ATTRIBUTES,
            failed: false,
        }
    }

    /// Creates a scanner honoring the name and attribute limits in
    /// `options`.
    #[must_use]
    pub fn with_options(text: &'a str, options: &ParseOptions) -> Self {
        let mut input = ScanInput::new(text);
        input.set_max_name_length(options.max_name_length);
        Self {
            input,
            max_attributes: options.max_attributes,
            failed: false,
        }
    }

    /// Location of the next unread character; the end-of-input location
    /// once the scanner is exhausted.
    #[must_use]
    pub fn location(&self) -> SourceLocation {
        self.input.location()
    }

    fn scan_token(&mut self) -> Result<Token, ParseError> {
        let location = self.input.location();
        let kind = if self.input.looking_at("<!--") {
            self.scan_comment(location)?
        } else if self.input.looking_at("<![CDATA[") {
            self.scan_cdata(location)?
        } else if self.input.looking_at("<!DOCTYPE") || self.input.looking_at("<!doctype") {
            self.scan_doctype(location)?
        } else if self.input.looking_at("<!") {
            return Err(self.input.error(
                ErrorKind::MalformedTag,
                "unrecognized markup declaration",
            ));
        } else if self.input.looking_at("<?") {
            self.scan_processing_instruction(location)?
        } else if self.input.looking_at("</") {
            self.scan_end_tag(location)?
        } else if self.input.looking_at("<") {
            self.scan_start_tag(location)?
        } else {
            let raw = self.input.take_text();
            TokenKind::Text(decode_entities(raw).into_owned())
        };
        Ok(Token { kind, location })
    }

    // --- Delimited constructs ---

    /// Consumes `open`, then everything up to `close`.
    fn delimited(
        &mut self,
        open: &str,
        close: &str,
        what: &str,
        start: SourceLocation,
    ) -> Result<&'a str, ParseError> {
        self.input.eat(open);
        self.input.take_until(close).ok_or_else(|| {
            ParseError::new(
                ErrorKind::UnterminatedConstruct,
                format!("{what} is missing its closing '{close}'"),
                start,
            )
        })
    }

    fn scan_comment(&mut self, start: SourceLocation) -> Result<TokenKind, ParseError> {
        let body = self.delimited("<!--", "-->", "comment", start)?;
        Ok(TokenKind::Comment(body.to_string()))
    }

    fn scan_cdata(&mut self, start: SourceLocation) -> Result<TokenKind, ParseError> {
        let body = self.delimited("<![CDATA[", "]]>", "CDATA section", start)?;
        Ok(TokenKind::CData(body.to_string()))
    }

    fn scan_doctype(&mut self, start: SourceLocation) -> Result<TokenKind, ParseError> {
        // The keyword may be written in either case; both spellings are
        // nine bytes long.
        let open = &self.input.remaining()[.."<!DOCTYPE".len()];
        let body = self.delimited(open, ">", "doctype declaration", start)?;
        Ok(TokenKind::Doctype(body.to_string()))
    }

    fn scan_processing_instruction(
        &mut self,
        start: SourceLocation,
    ) -> Result<TokenKind, ParseError> {
        let body = self.delimited("<?", "?>", "processing instruction", start)?;

        let target_len = body
            .char_indices()
            .find(|&(i, c)| {
                if i == 0 {
                    !is_name_start_char(c)
                } else {
                    !is_name_char(c)
                }
            })
            .map_or(body.len(), |(i, _)| i);
        let (target, rest) = body.split_at(target_len);

        if target.is_empty() {
            return Err(ParseError::new(
                ErrorKind::MalformedTag,
                "processing instruction has no target",
                start,
            ));
        }
        if rest.chars().next().is_some_and(|c| !is_xml_whitespace(c)) {
            return Err(ParseError::new(
                ErrorKind::MalformedTag,
                format!("invalid character after processing instruction target '{target}'"),
                start,
            ));
        }

        Ok(TokenKind::ProcessingInstruction {
            target: target.to_string(),
            data: rest.trim_start_matches(is_xml_whitespace).to_string(),
        })
    }

    // --- Tags ---

    /// Scans the name after `<` or `</`. Input ending here is reported at
    /// the start of the tag.
    fn tag_name(&mut self, start: SourceLocation) -> Result<String, ParseError> {
        if self.input.at_end() {
            return Err(ParseError::new(
                ErrorKind::UnterminatedConstruct,
                "tag is cut off before its name",
                start,
            ));
        }
        Ok(self.input.parse_name()?.to_string())
    }

    fn scan_end_tag(&mut self, start: SourceLocation) -> Result<TokenKind, ParseError> {
        self.input.eat("</");
        let name = self.tag_name(start)?;
        self.input.skip_whitespace();
        self.expect_tag_close(start)?;
        Ok(TokenKind::EndTag { name })
    }

    fn scan_start_tag(&mut self, start: SourceLocation) -> Result<TokenKind, ParseError> {
        self.input.eat("<");
        let name = self.tag_name(start)?;

        let mut attributes: Vec<Attribute> = Vec::new();
        let mut seen: HashSet<&'a str> = HashSet::new();
        loop {
            self.input.skip_whitespace();
            if self.input.eat("/>") {
                return Ok(TokenKind::StartTag {
                    name,
                    attributes,
                    self_closing: true,
                });
            }
            if self.input.eat(">") {
                return Ok(TokenKind::StartTag {
                    name,
                    attributes,
                    self_closing: false,
                });
            }
            match self.input.peek_char() {
                None => return Err(unterminated_tag(&name, start)),
                Some(c) if is_name_start_char(c) => {}
                Some(c) => {
                    return Err(self.input.error(
                        ErrorKind::MalformedTag,
                        format!("unexpected character '{c}' in tag <{name}>"),
                    ))
                }
            }

            let attr_location = self.input.location();
            let attr_name = self.input.parse_name()?;
            if !seen.insert(attr_name) {
                return Err(ParseError::new(
                    ErrorKind::MalformedAttribute,
                    format!("duplicate attribute '{attr_name}' on <{name}>"),
                    attr_location,
                ));
            }
            if attributes.len() >= self.max_attributes as usize {
                return Err(ParseError::new(
                    ErrorKind::LimitExceeded,
                    format!(
                        "too many attributes on <{name}> (maximum {})",
                        self.max_attributes
                    ),
                    attr_location,
                ));
            }
            let value = self.scan_attribute_value(attr_name)?;
            attributes.push(Attribute::new(attr_name, value));
        }
    }

    /// Scans `= "value"` after an attribute name.
    fn scan_attribute_value(&mut self, attr_name: &str) -> Result<String, ParseError> {
        self.input.skip_whitespace();
        if !self.input.eat("=") {
            return Err(self.input.error(
                ErrorKind::MalformedAttribute,
                format!("expected '=' after attribute '{attr_name}'"),
            ));
        }
        self.input.skip_whitespace();

        let quote = match self.input.peek_char() {
            Some(q @ ('"' | '\'')) => q,
            _ => {
                return Err(self.input.error(
                    ErrorKind::MalformedAttribute,
                    format!("value of attribute '{attr_name}' must be quoted"),
                ))
            }
        };
        let open = self.input.location();
        self.input.advance_char(quote);

        let mut raw = String::new();
        loop {
            match self.input.peek_char() {
                None => {
                    return Err(ParseError::new(
                        ErrorKind::MalformedAttribute,
                        format!("unbalanced quote in value of attribute '{attr_name}'"),
                        open,
                    ))
                }
                Some(c) if c == quote => {
                    self.input.advance_char(c);
                    break;
                }
                Some('<') => {
                    return Err(self.input.error(
                        ErrorKind::MalformedAttribute,
                        format!("'<' not allowed in value of attribute '{attr_name}'"),
                    ))
                }
                Some(c) => {
                    self.input.advance_char(c);
                    // Attribute-value normalization (XML 1.0 §3.3.3)
                    raw.push(if is_xml_whitespace(c) { ' ' } else { c });
                }
            }
        }
        Ok(decode_entities(&raw).into_owned())
    }

    fn expect_tag_close(&mut self, start: SourceLocation) -> Result<(), ParseError> {
        if self.input.eat(">") {
            return Ok(());
        }
        match self.input.peek_char() {
            None => Err(ParseError::new(
                ErrorKind::UnterminatedConstruct,
                "end tag is missing its closing '>'",
                start,
            )),
            Some(c) => Err(self.input.error(
                ErrorKind::MalformedTag,
                format!("unexpected character '{c}' in end tag"),
            )),
        }
    }
}

fn unterminated_tag(name: &str, start: SourceLocation) -> ParseError {
    ParseError::new(
        ErrorKind::UnterminatedConstruct,
        format!("tag <{name}> is missing its closing '>'"),
        start,
    )
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.input.at_end() {
            return None;
        }
        let token = self.scan_token();
        match &token {
            Ok(t) => log::trace!(target: "smallxml::scanner", "token at {}: {:?}", t.location, t.kind),
            Err(e) => {
                log::debug!(target: "smallxml::scanner", "scan failed: {e}");
                self.failed = true;
            }
        }
        Some(token)
    }
}

impl std::iter::FusedIterator for Scanner<'_> {}
