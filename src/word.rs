use std::fmt;

use lazy_static::lazy_static;
use scraper::{ElementRef, Selector};
use serde_json::{Map, Value};

use crate::config::DLE_MAIN_URL;
use crate::error::{DleError, Result};
use crate::markup::{first_class, first_element, first_of, parse_fragment, text_of};
use crate::repr::{base_map, Representation};

lazy_static! {
    static ref MARK: Selector = Selector::parse("mark").unwrap();
    static ref ANCHOR: Selector = Selector::parse("a").unwrap();
    static ref SPAN: Selector = Selector::parse("span").unwrap();
}

/// A single word, possibly linked to another dictionary entry.
///
/// The page renders it three ways: a `<mark data-id>` (plain-looking but
/// searchable), an `<a href>` (a real hyperlink) or a `<span class="u">`
/// (underlined, no link).
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    text: String,
    href: String,
    is_active_link: bool,
    html: String,
}

impl Word {
    /// `parent_href` completes relative hrefs that do not start with `/`.
    pub fn decode(el: ElementRef<'_>, parent_href: &str) -> Result<Self> {
        let html = el.html();

        if let Some(mark) = first_of(el, &MARK) {
            let id = mark.value().attr("data-id").ok_or(DleError::MissingAttribute {
                element: "mark",
                attribute: "data-id",
            })?;
            return Ok(Self {
                text: text_of(&mark),
                href: format!("/?id={id}"),
                is_active_link: false,
                html,
            });
        }

        if let Some(anchor) = first_of(el, &ANCHOR) {
            let mut href = anchor
                .value()
                .attr("href")
                .ok_or(DleError::MissingAttribute {
                    element: "a",
                    attribute: "href",
                })?
                .to_string();
            if !href.is_empty() && !href.starts_with('/') {
                href = format!("/{parent_href}{href}");
            }
            return Ok(Self {
                text: text_of(&anchor).trim().to_string(),
                href,
                is_active_link: true,
                html,
            });
        }

        if let Some(span) = first_of(el, &SPAN) {
            if first_class(&span).map_or(false, |c| c.eq_ignore_ascii_case("u")) {
                return Ok(Self {
                    text: text_of(&span),
                    href: String::new(),
                    is_active_link: false,
                    html,
                });
            }
        }

        Err(DleError::structure("the markup cannot be decoded as a word"))
    }

    pub fn from_html(raw: &str, parent_href: &str) -> Result<Self> {
        let html = parse_fragment(raw)?;
        let el = first_element(&html).ok_or(DleError::EmptyInput)?;
        Self::decode(el, parent_href)
    }

    pub fn try_from_html(raw: &str, parent_href: &str) -> Option<Self> {
        Self::from_html(raw, parent_href).ok()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn is_active_link(&self) -> bool {
        self.is_active_link
    }

    /// Absolute link that returns results for this word, empty when there is none.
    pub fn link(&self) -> String {
        if self.href.is_empty() {
            String::new()
        } else {
            format!("{DLE_MAIN_URL}{}", self.href)
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Representation for Word {
    fn represent(&self, extended: bool) -> Result<Map<String, Value>> {
        let mut map = base_map(&self.html, extended);
        map.insert("text".into(), self.text.clone().into());
        if self.is_active_link || extended {
            map.insert("link".into(), self.link().into());
        }
        if extended {
            map.insert("is_active_link".into(), self.is_active_link.into());
        }
        Ok(map)
    }
}
