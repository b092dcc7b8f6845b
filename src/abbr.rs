use std::fmt;

use lazy_static::lazy_static;
use scraper::{ElementRef, Selector};
use serde_json::{Map, Value};

use crate::error::{DleError, Result};
use crate::markup::{first_class, first_element, first_of, normalize, parse_fragment, text_of};
use crate::repr::{base_map, Representation};

lazy_static! {
    static ref ABBR: Selector = Selector::parse("abbr").unwrap();
}

/// A shorthand such as a grammatical-category code, with its expansion
/// taken from the `title` attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Abbreviation {
    abbr: String,
    class: String,
    text: String,
    html: String,
}

impl Abbreviation {
    pub fn decode(el: ElementRef<'_>) -> Result<Self> {
        let tag = first_of(el, &ABBR).ok_or_else(|| DleError::structure("no <abbr> element"))?;
        let text = tag
            .value()
            .attr("title")
            .map(normalize)
            .filter(|t| !t.is_empty())
            .ok_or(DleError::MissingAttribute {
                element: "abbr",
                attribute: "title",
            })?;
        Ok(Self {
            abbr: text_of(&tag),
            class: first_class(&tag).unwrap_or_default().to_string(),
            text,
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

    /// The abbreviated code, e.g. `adj.`.
    pub fn abbr(&self) -> &str {
        &self.abbr
    }

    /// Class marker; `d` flags the first category of a block.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// The expanded text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

impl fmt::Display for Abbreviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.abbr, self.text)
    }
}

impl Representation for Abbreviation {
    fn represent(&self, extended: bool) -> Result<Map<String, Value>> {
        let mut map = base_map(&self.html, extended);
        map.insert("abbr".into(), self.abbr.clone().into());
        if extended {
            map.insert("class".into(), self.class.clone().into());
        }
        map.insert("text".into(), self.text.clone().into());
        Ok(map)
    }
}
