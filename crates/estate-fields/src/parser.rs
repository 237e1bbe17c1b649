//! Answer-set markup walker
//!
//! Streams the document once with `quick-xml`, collecting every `Answer`
//! container into a [`FieldTable`]. Structural problems abort the parse;
//! per-field anomalies degrade to absent values.

use crate::error::ParseError;
use crate::table::FieldTable;
use crate::value::{coerce, ValueKind};
use quick_xml::errors::IllFormedError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

/// Default upper bound on accepted markup size (5 MiB)
pub const DEFAULT_MAX_MARKUP_BYTES: usize = 5 * 1024 * 1024;

const ANSWER: &[u8] = b"Answer";
const ROOT: &[u8] = b"AnswerSet";
const NAME_ATTR: &str = "name";
const UNANSWERED_ATTR: &str = "unans";

/// Parser for answer-set exports
#[derive(Debug, Clone)]
pub struct AnswerSetParser {
    max_bytes: usize,
}

impl Default for AnswerSetParser {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_MARKUP_BYTES,
        }
    }
}

impl AnswerSetParser {
    /// Parser with the default size limit
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum accepted markup size in bytes
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Configured size limit
    #[must_use]
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Parse markup into a field table.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for oversize input, malformed XML, unbalanced
    /// tags, a missing root element, or content after the root element.
    pub fn parse(&self, markup: &str) -> Result<FieldTable, ParseError> {
        if markup.len() > self.max_bytes {
            return Err(ParseError::TooLarge {
                size: markup.len(),
                max: self.max_bytes,
            });
        }

        let mut reader = Reader::from_str(markup);
        reader.config_mut().trim_text(true);
        let mut walker = Walker::default();

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => return Err(classify(&err, position(&reader))),
            };
            let at = position(&reader);

            match event {
                Event::Start(e) => walker.start(&e, at, false)?,
                Event::Empty(e) => walker.start(&e, at, true)?,
                Event::End(e) => walker.end(e.local_name().as_ref(), at)?,
                Event::Text(t) => {
                    let text = t.unescape().map_err(|err| ParseError::syntax(at, err.to_string()))?;
                    walker.text(&text, at)?;
                }
                Event::CData(c) => {
                    let raw = c.into_inner();
                    walker.text(&String::from_utf8_lossy(&raw), at)?;
                }
                Event::Eof => return walker.finish(at),
                _ => {}
            }
        }
    }
}

/// Parse markup with the default parser
///
/// # Errors
///
/// See [`AnswerSetParser::parse`].
pub fn parse_answer_set(markup: &str) -> Result<FieldTable, ParseError> {
    AnswerSetParser::default().parse(markup)
}

fn position<R>(reader: &Reader<R>) -> u64 {
    u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX)
}

fn classify(err: &quick_xml::Error, at: u64) -> ParseError {
    match err {
        quick_xml::Error::IllFormed(
            IllFormedError::MismatchedEndTag { .. } | IllFormedError::UnmatchedEndTag(_),
        ) => ParseError::unbalanced(at, err.to_string()),
        _ => ParseError::syntax(at, err.to_string()),
    }
}

fn attribute(e: &BytesStart<'_>, key: &str, at: u64) -> Result<Option<String>, ParseError> {
    let attr = e
        .try_get_attribute(key)
        .map_err(|err| ParseError::syntax(at, err.to_string()))?;
    attr.map(|a| {
        a.unescape_value()
            .map(Cow::into_owned)
            .map_err(|err| ParseError::syntax(at, err.to_string()))
    })
    .transpose()
}

struct OpenAnswer {
    name: Option<String>,
    slots: usize,
}

struct OpenValue {
    kind: ValueKind,
    unanswered: bool,
    text: String,
}

#[derive(Default)]
struct Walker {
    table: FieldTable,
    open: Vec<String>,
    root_seen: bool,
    answer: Option<OpenAnswer>,
    value: Option<OpenValue>,
    skipped: usize,
}

impl Walker {
    fn start(&mut self, e: &BytesStart<'_>, at: u64, empty: bool) -> Result<(), ParseError> {
        let local_name = e.local_name();
        let local = local_name.as_ref();

        if self.open.is_empty() {
            if self.root_seen {
                return Err(ParseError::TrailingContent { position: at });
            }
            self.root_seen = true;
            if local != ROOT {
                tracing::debug!(root = %String::from_utf8_lossy(local), "unexpected root element name");
            }
        }

        if local == ANSWER {
            if self.answer.is_some() {
                tracing::warn!("nested answer container; closing the outer one");
                self.finish_answer();
            }
            let name = attribute(e, NAME_ATTR, at)?;
            self.answer = Some(OpenAnswer { name, slots: 0 });
            if empty {
                self.finish_answer();
            }
        } else if let Some(kind) = ValueKind::from_element(local).filter(|_| self.answer.is_some()) {
            let unanswered = attribute(e, UNANSWERED_ATTR, at)?.is_some_and(|v| v.eq_ignore_ascii_case("true"));
            self.value = Some(OpenValue {
                kind,
                unanswered,
                text: String::new(),
            });
            if empty {
                self.finish_value();
            }
        }

        if !empty {
            self.open.push(String::from_utf8_lossy(local).into_owned());
        }
        Ok(())
    }

    fn text(&mut self, text: &str, at: u64) -> Result<(), ParseError> {
        if self.open.is_empty() {
            return Err(if self.root_seen {
                ParseError::TrailingContent { position: at }
            } else {
                ParseError::syntax(at, "text before the root element")
            });
        }
        if let Some(value) = self.value.as_mut() {
            value.text.push_str(text);
        }
        Ok(())
    }

    fn end(&mut self, local: &[u8], at: u64) -> Result<(), ParseError> {
        let closing = String::from_utf8_lossy(local);
        let Some(open) = self.open.pop() else {
            return Err(ParseError::unbalanced(at, format!("</{closing}> closes nothing")));
        };
        if open != closing {
            return Err(ParseError::unbalanced(
                at,
                format!("expected </{open}>, found </{closing}>"),
            ));
        }

        if local == ANSWER {
            self.finish_answer();
        } else if self.value.is_some() && ValueKind::from_element(local).is_some() {
            self.finish_value();
        }
        Ok(())
    }

    fn finish(self, at: u64) -> Result<FieldTable, ParseError> {
        if let Some(open) = self.open.last() {
            return Err(ParseError::unbalanced(at, format!("<{open}> is never closed")));
        }
        if !self.root_seen {
            return Err(ParseError::MissingRoot);
        }
        tracing::debug!(
            fields = self.table.len(),
            skipped = self.skipped,
            "answer set parsed"
        );
        Ok(self.table)
    }

    fn finish_value(&mut self) {
        let Some(open) = self.value.take() else {
            return;
        };
        let value = if open.unanswered {
            None
        } else {
            coerce(open.kind, &open.text)
        };

        if let Some(answer) = self.answer.as_mut() {
            answer.slots += 1;
            if let Some(name) = &answer.name {
                self.table.record(name.clone(), value);
            }
        }
    }

    fn finish_answer(&mut self) {
        let Some(answer) = self.answer.take() else {
            return;
        };
        match answer.name {
            Some(name) if answer.slots == 0 => {
                self.table.record(name, None);
            }
            Some(_) => {}
            None => {
                self.skipped += 1;
                tracing::warn!(values = answer.slots, "answer without a name attribute skipped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    fn wrap(body: &str) -> String {
        format!(r#"<?xml version="1.0"?><AnswerSet title="t" version="1.1">{body}</AnswerSet>"#)
    }

    #[test]
    fn typed_values() {
        let table = parse_answer_set(&wrap(
            r#"<Answer name="Client first name"><TextValue>Matthew</TextValue></Answer>
               <Answer name="Joint trust TF"><TFValue>true</TFValue></Answer>
               <Answer name="Beneficiary percentage"><NumValue>50</NumValue></Answer>
               <Answer name="Trust sign date"><DateValue>25/12/2020</DateValue></Answer>"#,
        ))
        .unwrap();

        assert_eq!(table.text("Client first name"), Some("Matthew"));
        assert_eq!(table.bool("Joint trust TF"), Some(true));
        assert_eq!(table.number("Beneficiary percentage"), Some(50.0));
        assert_eq!(table.text("Trust sign date"), Some("2020-12-25"));
    }

    #[test]
    fn repeated_and_multiple_choice_values_flatten() {
        let table = parse_answer_set(&wrap(
            r#"<Answer name="Child name"><RptValue><TextValue>Anna</TextValue><TextValue unans="true"/><TextValue>Ben</TextValue></RptValue></Answer>
               <Answer name="Trust state"><MCValue><SelValue>Utah</SelValue></MCValue></Answer>"#,
        ))
        .unwrap();

        assert_eq!(table.texts("Child name"), vec![Some("Anna"), None, Some("Ben")]);
        assert_eq!(table.text("Trust state"), Some("Utah"));
        assert!(!table.get("Trust state").unwrap().is_list());
    }

    #[test]
    fn escaped_text_and_cdata() {
        let table = parse_answer_set(&wrap(
            r#"<Answer name="Trust name"><TextValue>Smith &amp; Jones Trust</TextValue></Answer>
               <Answer name="Notes"><TextValue><![CDATA[a <b> c]]></TextValue></Answer>"#,
        ))
        .unwrap();
        assert_eq!(table.text("Trust name"), Some("Smith & Jones Trust"));
        assert_eq!(table.text("Notes"), Some("a <b> c"));
    }

    #[test]
    fn nameless_answer_is_skipped() {
        let table = parse_answer_set(&wrap(
            r#"<Answer><TextValue>orphan</TextValue></Answer>
               <Answer name="Kept"><TextValue>yes</TextValue></Answer>"#,
        ))
        .unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.contains("Kept"));
    }

    #[test]
    fn empty_answer_records_absent_slot() {
        let table = parse_answer_set(&wrap(r#"<Answer name="Client email"/><Answer name="Spouse email"></Answer>"#)).unwrap();
        assert_eq!(table.slots("Client email"), &[None]);
        assert_eq!(table.slots("Spouse email"), &[None]);
    }

    #[test]
    fn absent_markers_inside_values() {
        let table = parse_answer_set(&wrap(
            r#"<Answer name="Middle"><TextValue>None</TextValue></Answer>
               <Answer name="Count"><TextValue>3</TextValue></Answer>"#,
        ))
        .unwrap();
        assert_eq!(table.value("Middle"), None);
        assert_eq!(table.value("Count"), None);
    }

    #[test]
    fn mixed_kinds_in_recurring_field() {
        let table = parse_answer_set(&wrap(
            r#"<Answer name="Share"><NumValue>50</NumValue></Answer>
               <Answer name="Share"><TextValue>half</TextValue></Answer>"#,
        ))
        .unwrap();
        assert_eq!(table.slots("Share"), &[Some(FieldValue::Number(50.0)), None]);
    }

    #[test]
    fn structural_errors() {
        assert_eq!(parse_answer_set(""), Err(ParseError::MissingRoot));
        assert_eq!(parse_answer_set("<?xml version=\"1.0\"?>"), Err(ParseError::MissingRoot));

        let err = parse_answer_set("<AnswerSet><Answer name=\"x\"></AnswerSet>").unwrap_err();
        assert!(matches!(err, ParseError::Unbalanced { .. }), "{err:?}");

        let err = parse_answer_set("<AnswerSet><Answer name=\"x\">").unwrap_err();
        assert!(
            matches!(err, ParseError::Unbalanced { .. } | ParseError::Syntax { .. }),
            "{err:?}"
        );

        let err = parse_answer_set("<AnswerSet/><AnswerSet/>").unwrap_err();
        assert!(matches!(err, ParseError::TrailingContent { .. }), "{err:?}");

        let err = parse_answer_set("<AnswerSet></AnswerSet>trailing").unwrap_err();
        assert!(matches!(err, ParseError::TrailingContent { .. }), "{err:?}");

        let err = parse_answer_set("<AnswerSet><Answer name=\"x></AnswerSet>").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "{err:?}");
    }

    #[test]
    fn size_limit() {
        let parser = AnswerSetParser::new().with_max_bytes(16);
        let err = parser.parse(&wrap("")).unwrap_err();
        assert!(matches!(err, ParseError::TooLarge { max: 16, .. }));
    }
}
