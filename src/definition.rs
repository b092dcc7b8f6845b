use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Selector};
use serde_json::{json, Map, Value};

use crate::abbr::Abbreviation;
use crate::error::{DleError, Result};
use crate::markup::{child_elements, class_letter, first_class, first_element, first_of, parse_fragment, tag_name, text_of};
use crate::repr::{base_map, list, Representation};
use crate::sentence::Sentence;

lazy_static! {
    static ref PARAGRAPH: Selector = Selector::parse("p").unwrap();

    // "12. " -> 12
    static ref INDEX_PATTERN: Regex = Regex::new(r"^(\d+)\.").unwrap();
    static ref VERB_PATTERN: Regex = Regex::new(r"(?i)verbo").unwrap();
}

/// Class-prefix letters of a numbered meaning (`j`) and a sub-meaning (`m`).
pub const DEFINITION_CLASSES: [char; 2] = ['j', 'm'];

const INDEX_CLASS: &str = "n_acep";
const EXAMPLE_CLASS: &str = "h";
const FIRST_OF_CATEGORY_CLASS: &str = "d";

const NOUN_CODES: [&str; 2] = ["s.", "sust."];
const VERB_FORM_CODES: [&str; 6] = ["part.", "ger.", "pret.", "fut.", "pres.", "infinit."];

/// One numbered meaning of a lemma.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    id: String,
    index: u32,
    category: Option<Abbreviation>,
    first_of_category: bool,
    abbreviations: Vec<Abbreviation>,
    sentence: Sentence,
    examples: Vec<Sentence>,
    raw_text: String,
    html: String,
}

impl Definition {
    pub fn decode(el: ElementRef<'_>) -> Result<Self> {
        let p = first_of(el, &PARAGRAPH)
            .ok_or_else(|| DleError::structure("invalid tag passed for a definition"))?;
        match class_letter(&p) {
            Some(letter) if DEFINITION_CLASSES.contains(&letter) => {}
            _ => {
                return Err(DleError::structure(
                    "paragraph class does not correspond to a definition",
                ))
            }
        }

        let raw_text = text_of(&p);
        let mut index = 0;
        let mut category = None;
        let mut first_of_category = false;
        let mut abbreviations = Vec::new();
        let mut examples = Vec::new();

        for child in child_elements(p) {
            let class = first_class(&child).unwrap_or_default().to_lowercase();
            match tag_name(&child) {
                "span" if class == INDEX_CLASS => {
                    if let Some(cap) = INDEX_PATTERN.captures(text_of(&child).trim()) {
                        index = cap[1].parse().unwrap_or(0);
                    }
                }
                "span" if class == EXAMPLE_CLASS => {
                    examples.push(Sentence::decode(child, &[])?);
                }
                "abbr" => {
                    let abbr = Abbreviation::decode(child)?;
                    if category.is_none() {
                        first_of_category = class == FIRST_OF_CATEGORY_CLASS;
                        category = Some(abbr);
                    } else {
                        abbreviations.push(abbr);
                    }
                }
                _ => {}
            }
        }

        Ok(Self {
            id: p.value().attr("id").unwrap_or_default().to_string(),
            index,
            category,
            first_of_category,
            abbreviations,
            sentence: Sentence::decode(p, &["abbr", "span"])?,
            examples,
            raw_text,
            html: el.html(),
        })
    }

    pub fn from_html(raw: &str) -> Result<Self> {
        let html = parse_fragment(raw)?;
        let el = first_element(&html).ok_or(DleError::EmptyInput)?;
        Self::decode(el)
    }

    pub fn try_from_html(raw: &str) -> Option<Self> {
        Self::from_html(raw).ok()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Ordinal of the meaning; 0 when the paragraph carries none.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn category(&self) -> Option<&Abbreviation> {
        self.category.as_ref()
    }

    pub fn first_of_category(&self) -> bool {
        self.first_of_category
    }

    pub fn abbreviations(&self) -> &[Abbreviation] {
        &self.abbreviations
    }

    pub fn sentence(&self) -> &Sentence {
        &self.sentence
    }

    /// The gloss.
    pub fn text(&self) -> String {
        self.sentence.text()
    }

    pub fn examples(&self) -> &[Sentence] {
        &self.examples
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    fn required_category(&self) -> Result<&Abbreviation> {
        self.category.as_ref().ok_or(DleError::MissingCategory)
    }

    pub fn is_noun(&self) -> Result<bool> {
        let code = self.required_category()?.abbr();
        Ok(NOUN_CODES.contains(&code))
    }

    pub fn is_adjective(&self) -> Result<bool> {
        Ok(self.required_category()?.abbr() == "adj.")
    }

    pub fn is_adverb(&self) -> Result<bool> {
        Ok(self.required_category()?.abbr() == "adv.")
    }

    pub fn is_pronoun(&self) -> Result<bool> {
        Ok(self.required_category()?.abbr() == "pron.")
    }

    pub fn is_verb(&self) -> Result<bool> {
        let category = self.required_category()?;
        Ok(VERB_PATTERN.is_match(category.text())
            || VERB_FORM_CODES.iter().any(|code| category.abbr().contains(code)))
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_text)
    }
}

impl Representation for Definition {
    fn represent(&self, extended: bool) -> Result<Map<String, Value>> {
        let mut map = base_map(&self.html, extended);
        if extended {
            map.insert("id".into(), self.id.clone().into());
        }
        map.insert("index".into(), self.index.into());
        map.insert(
            "category".into(),
            Value::Object(self.required_category()?.represent(extended)?),
        );
        map.insert(
            "is".into(),
            json!({
                "adjective": self.is_adjective()?,
                "adverb": self.is_adverb()?,
                "noun": self.is_noun()?,
                "pronoun": self.is_pronoun()?,
                "verb": self.is_verb()?,
            }),
        );
        if extended {
            map.insert("first_of_category".into(), self.first_of_category.into());
        }
        map.insert("abbreviations".into(), list(&self.abbreviations, extended)?);
        map.insert(
            "sentence".into(),
            Value::Object(self.sentence.represent(extended)?),
        );
        map.insert("examples".into(), list(&self.examples, extended)?);
        if extended {
            map.insert("raw_text".into(), self.raw_text.clone().into());
        }
        Ok(map)
    }
}
