//! Headword decoders: the simple-entry lemma (`<p class="k…">`) and the
//! article lemma (`<header class="f…">`), which also carries morphology.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Selector};
use serde_json::{Map, Value};

use crate::error::{DleError, Result};
use crate::markup::{class_letter, first_element, first_of, parse_fragment, text_of};
use crate::repr::{base_map, Representation};

lazy_static! {
    static ref PARAGRAPH: Selector = Selector::parse("p").unwrap();
    static ref HEADER: Selector = Selector::parse("header").unwrap();
    static ref ITALIC: Selector = Selector::parse("i").unwrap();

    // "correr2, a (correrse)": headword, homograph index, feminine suffix, related word
    static ref HEADWORD_PATTERN: Regex = Regex::new(
        r"(?i)^(?P<lemma>[^\W\d_]+)(?P<index>\d+)?(?:,\s+(?P<female_suffix>\w+))?(?:\s+\((?P<related>\w+)\))?$"
    ).unwrap();
}

fn paragraph() -> &'static Selector {
    &PARAGRAPH
}

fn header() -> &'static Selector {
    &HEADER
}

/// Where a lemma lives: its tag, how to find it and the first letter of its class.
#[derive(Debug, Clone, Copy)]
pub struct LemmaSpec {
    pub tag: &'static str,
    pub selector: fn() -> &'static Selector,
    pub class_letter: char,
}

pub const ENTRY_LEMMA: LemmaSpec = LemmaSpec {
    tag: "p",
    selector: paragraph,
    class_letter: 'k',
};

pub const ARTICLE_LEMMA: LemmaSpec = LemmaSpec {
    tag: "header",
    selector: header,
    class_letter: 'f',
};

/// Shared surface of both lemma kinds, so one entry decoder serves both.
pub trait Lemma: Representation + fmt::Display + Sized {
    const SPEC: LemmaSpec;

    fn decode(el: ElementRef<'_>) -> Result<Self>;

    /// The headword.
    fn lemma(&self) -> &str;
}

/// The parts captured from a headword such as `correr2, a (correrse)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadwordParts {
    pub lemma: String,
    pub index: Option<u32>,
    pub female_suffix: Option<String>,
    pub related: Option<String>,
}

pub fn match_headword(text: &str) -> Option<HeadwordParts> {
    let cap = HEADWORD_PATTERN.captures(text.trim())?;
    Some(HeadwordParts {
        lemma: cap["lemma"].to_string(),
        index: cap.name("index").and_then(|m| m.as_str().parse().ok()),
        female_suffix: cap.name("female_suffix").map(|m| m.as_str().trim().to_string()),
        related: cap.name("related").map(|m| m.as_str().to_string()),
    })
}

/// Headword of a simple entry (a complex form inside an article).
#[derive(Debug, Clone, PartialEq)]
pub struct EntryLemma {
    id: String,
    lemma: String,
    is_foreign: bool,
    html: String,
}

impl EntryLemma {
    fn decode_as(el: ElementRef<'_>, spec: LemmaSpec) -> Result<Self> {
        let tag = first_of(el, (spec.selector)())
            .filter(|tag| class_letter(tag) == Some(spec.class_letter))
            .ok_or_else(|| {
                DleError::structure(format!(
                    "no <{} class=\"{}…\"> lemma element",
                    spec.tag, spec.class_letter
                ))
            })?;
        Ok(Self {
            id: tag.value().attr("id").unwrap_or_default().to_string(),
            lemma: text_of(&tag),
            is_foreign: tag.select(&ITALIC).next().is_some(),
            html: el.html(),
        })
    }

    pub fn from_html(raw: &str) -> Result<Self> {
        let html = parse_fragment(raw)?;
        let el = first_element(&html).ok_or(DleError::EmptyInput)?;
        <Self as Lemma>::decode(el)
    }

    pub fn try_from_html(raw: &str) -> Option<Self> {
        Self::from_html(raw).ok()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Foreign or non-adapted Latin origin, shown in italics.
    pub fn is_foreign(&self) -> bool {
        self.is_foreign
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

impl Lemma for EntryLemma {
    const SPEC: LemmaSpec = ENTRY_LEMMA;

    fn decode(el: ElementRef<'_>) -> Result<Self> {
        Self::decode_as(el, Self::SPEC)
    }

    fn lemma(&self) -> &str {
        &self.lemma
    }
}

impl fmt::Display for EntryLemma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lemma)
    }
}

impl Representation for EntryLemma {
    fn represent(&self, extended: bool) -> Result<Map<String, Value>> {
        let mut map = base_map(&self.html, extended);
        map.insert("lemma".into(), self.lemma.clone().into());
        if extended {
            map.insert("id".into(), self.id.clone().into());
            map.insert("is_foreign".into(), self.is_foreign.into());
        }
        Ok(map)
    }
}

/// Headword of a full article.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleLemma {
    base: EntryLemma,
    index: u32,
    female_suffix: String,
    related: String,
}

impl ArticleLemma {
    pub fn from_html(raw: &str) -> Result<Self> {
        let html = parse_fragment(raw)?;
        let el = first_element(&html).ok_or(DleError::EmptyInput)?;
        <Self as Lemma>::decode(el)
    }

    pub fn try_from_html(raw: &str) -> Option<Self> {
        Self::from_html(raw).ok()
    }

    pub fn base(&self) -> &EntryLemma {
        &self.base
    }

    pub fn id(&self) -> &str {
        self.base.id()
    }

    pub fn is_foreign(&self) -> bool {
        self.base.is_foreign()
    }

    /// Homograph index; 0 when the headword has none.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn female_suffix(&self) -> &str {
        &self.female_suffix
    }

    /// Parenthesized related word, e.g. the pronominal form.
    pub fn related(&self) -> &str {
        &self.related
    }

    pub fn is_acronym(&self) -> bool {
        let lemma = self.lemma();
        lemma.chars().any(char::is_alphabetic)
            && lemma
                .chars()
                .filter(|c| c.is_alphabetic())
                .all(char::is_uppercase)
    }

    /// `pre-`
    pub fn is_prefix(&self) -> bool {
        self.lemma().ends_with('-')
    }

    /// `-mente`
    pub fn is_suffix(&self) -> bool {
        self.lemma().starts_with('-')
    }

    pub fn html(&self) -> &str {
        self.base.html()
    }
}

impl Lemma for ArticleLemma {
    const SPEC: LemmaSpec = ARTICLE_LEMMA;

    fn decode(el: ElementRef<'_>) -> Result<Self> {
        let mut base = EntryLemma::decode_as(el, Self::SPEC)?;
        let mut index = 0;
        let mut female_suffix = String::new();
        let mut related = String::new();
        if let Some(parts) = match_headword(&base.lemma) {
            base.lemma = parts.lemma;
            index = parts.index.unwrap_or(0);
            female_suffix = parts.female_suffix.unwrap_or_default();
            related = parts.related.unwrap_or_default();
        }
        Ok(Self {
            base,
            index,
            female_suffix,
            related,
        })
    }

    fn lemma(&self) -> &str {
        self.base.lemma()
    }
}

impl fmt::Display for ArticleLemma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lemma())
    }
}

impl Representation for ArticleLemma {
    fn represent(&self, extended: bool) -> Result<Map<String, Value>> {
        let mut map = self.base.represent(extended)?;
        map.insert("index".into(), self.index.into());
        map.insert("female_suffix".into(), self.female_suffix.clone().into());
        if extended {
            map.insert("is_acronym".into(), self.is_acronym().into());
            map.insert("is_prefix".into(), self.is_prefix().into());
            map.insert("is_suffix".into(), self.is_suffix().into());
            map.insert("related".into(), self.related.clone().into());
        }
        Ok(map)
    }
}
