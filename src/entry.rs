use std::fmt;

use log::debug;
use scraper::ElementRef;
use serde_json::{Map, Value};

use crate::definition::Definition;
use crate::error::{DleError, Result};
use crate::lemma::{EntryLemma, Lemma};
use crate::markup::{child_elements, class_letter, first_element, parse_fragment, tag_name, text_of};
use crate::repr::{base_map, list, Representation};
use crate::sentence::Sentence;

/// Which paragraphs an entry claims as notes and as definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryKind {
    pub note_class: char,
    pub definition_class: char,
}

/// A simple entry: complex forms inside an article.
pub const SIMPLE_ENTRY: EntryKind = EntryKind {
    note_class: 'n',
    definition_class: 'm',
};

/// The main entry of an article.
pub const ARTICLE_ENTRY: EntryKind = EntryKind {
    note_class: 'n',
    definition_class: 'j',
};

/// A lemma plus its supplementary notes and ordered definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<L = EntryLemma> {
    lemma: L,
    supplementary_info: Vec<Sentence>,
    definitions: Vec<Definition>,
    raw_text: String,
    html: String,
}

impl<L: Lemma> Entry<L> {
    /// Decode an entry from the elements of a (possibly synthetic) container.
    pub fn decode_children<'a, I>(children: I, kind: EntryKind) -> Result<Self>
    where
        I: IntoIterator<Item = ElementRef<'a>>,
    {
        let mut lemma: Option<L> = None;
        let mut supplementary_info = Vec::new();
        let mut definitions = Vec::new();
        let mut raw_text = String::new();
        let mut html = String::new();

        for child in children {
            raw_text.push_str(&text_of(&child));
            html.push_str(&child.html());

            if lemma.is_none() {
                if let Ok(decoded) = L::decode(child) {
                    lemma = Some(decoded);
                    continue;
                }
            }
            if tag_name(&child) != "p" {
                continue;
            }
            match class_letter(&child) {
                Some(c) if c == kind.note_class => {
                    supplementary_info.push(Sentence::decode(child, &[])?);
                }
                Some(c) if c == kind.definition_class => {
                    definitions.push(Definition::decode(child)?);
                }
                other => debug!("entry skips <p> with class letter {other:?}"),
            }
        }

        let lemma = lemma.ok_or_else(|| DleError::structure("could not find the lemma of the entry"))?;
        Ok(Self {
            lemma,
            supplementary_info,
            definitions,
            raw_text,
            html,
        })
    }

    /// Decode the children of `el`.
    pub fn decode(el: ElementRef<'_>, kind: EntryKind) -> Result<Self> {
        Self::decode_children(child_elements(el), kind)
    }

    pub fn from_html(raw: &str, kind: EntryKind) -> Result<Self> {
        let html = parse_fragment(raw)?;
        let el = first_element(&html).ok_or(DleError::EmptyInput)?;
        Self::decode(el, kind)
    }

    pub fn try_from_html(raw: &str, kind: EntryKind) -> Option<Self> {
        Self::from_html(raw, kind).ok()
    }

    pub fn lemma(&self) -> &L {
        &self.lemma
    }

    pub fn supplementary_info(&self) -> &[Sentence] {
        &self.supplementary_info
    }

    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

impl<L: Lemma> fmt::Display for Entry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_text)
    }
}

impl<L: Lemma> Representation for Entry<L> {
    fn represent(&self, extended: bool) -> Result<Map<String, Value>> {
        let mut map = base_map(&self.html, extended);
        map.insert("lemma".into(), Value::Object(self.lemma.represent(extended)?));
        map.insert(
            "supplementary_info".into(),
            list(&self.supplementary_info, extended)?,
        );
        map.insert("definitions".into(), list(&self.definitions, extended)?);
        if extended {
            map.insert("raw_text".into(), self.raw_text.clone().into());
        }
        Ok(map)
    }
}
