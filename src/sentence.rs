use std::fmt;

use scraper::{ElementRef, Node};
use serde_json::{Map, Value};

use crate::abbr::Abbreviation;
use crate::error::{DleError, Result};
use crate::markup::{first_element, normalize, parse_fragment, tag_name, text_of};
use crate::repr::{base_map, Representation};
use crate::word::Word;

/// One token of a sentence.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Abbreviation(Abbreviation),
    Word(Word),
    Text(String),
}

impl Component {
    /// Abbreviation first, then word, then plain text: first match wins.
    fn recognize(el: ElementRef<'_>) -> Self {
        if let Ok(abbr) = Abbreviation::decode(el) {
            return Component::Abbreviation(abbr);
        }
        if let Ok(word) = Word::decode(el, "") {
            return Component::Word(word);
        }
        Component::Text(text_of(&el))
    }

    fn to_value(&self, extended: bool) -> Result<Value> {
        Ok(match self {
            Component::Abbreviation(abbr) => Value::Object(abbr.represent(extended)?),
            Component::Word(word) => Value::Object(word.represent(extended)?),
            Component::Text(text) => Value::String(text.clone()),
        })
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Abbreviation(abbr) => write!(f, "{abbr}"),
            Component::Word(word) => write!(f, "{word}"),
            Component::Text(text) => f.write_str(text),
        }
    }
}

/// An utterance composed of abbreviations, words and plain text.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    components: Vec<Component>,
    html: String,
}

impl Sentence {
    /// Compose the immediate children of `el`, skipping child elements whose
    /// tag name is in `ignore_tags`.
    pub fn decode(el: ElementRef<'_>, ignore_tags: &[&str]) -> Result<Self> {
        let mut components = Vec::new();
        for node in el.children() {
            match node.value() {
                Node::Element(_) => {
                    let Some(child) = ElementRef::wrap(node) else {
                        continue;
                    };
                    if ignore_tags.contains(&tag_name(&child)) {
                        continue;
                    }
                    components.push(Component::recognize(child));
                }
                Node::Text(text) => {
                    let text: &str = text;
                    components.push(Component::Text(normalize(text)));
                }
                _ => {}
            }
        }
        Ok(Self {
            components,
            html: el.html(),
        })
    }

    pub fn from_html(raw: &str, ignore_tags: &[&str]) -> Result<Self> {
        let html = parse_fragment(raw)?;
        let el = first_element(&html).ok_or(DleError::EmptyInput)?;
        Self::decode(el, ignore_tags)
    }

    pub fn try_from_html(raw: &str, ignore_tags: &[&str]) -> Option<Self> {
        Self::from_html(raw, ignore_tags).ok()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn text(&self) -> String {
        self.components
            .iter()
            .map(ToString::to_string)
            .collect::<String>()
            .trim()
            .to_string()
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl Representation for Sentence {
    fn represent(&self, extended: bool) -> Result<Map<String, Value>> {
        let mut map = base_map(&self.html, extended);
        map.insert("text".into(), self.text().into());
        if extended {
            let components = self
                .components
                .iter()
                .map(|c| c.to_value(extended))
                .collect::<Result<Vec<_>>>()?;
            map.insert("components".into(), Value::Array(components));
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::is_superset;

    const NOTE: &str = concat!(
        r#"<p class="n2">Del lat. <i>currere</i>; cf. <abbr title="véase">v.</abbr> "#,
        r#"<a href="/carrera">carrera</a> y <mark data-id="X9">curso</mark>. </p>"#,
    );

    #[test]
    fn tokens_are_recognized_in_order() {
        let sentence = Sentence::from_html(NOTE, &[]).unwrap();
        let kinds: Vec<&str> = sentence
            .components()
            .iter()
            .map(|c| match c {
                Component::Abbreviation(_) => "abbr",
                Component::Word(_) => "word",
                Component::Text(_) => "text",
            })
            .collect();
        assert_eq!(
            kinds,
            ["text", "text", "text", "abbr", "text", "word", "text", "word", "text"]
        );
    }

    #[test]
    fn text_is_trimmed_concatenation() {
        let sentence = Sentence::from_html(NOTE, &[]).unwrap();
        let joined: String = sentence.components().iter().map(|c| c.to_string()).collect();
        assert_eq!(sentence.text(), joined.trim());
        assert_eq!(
            sentence.text(),
            "Del lat. currere; cf. v. (véase) carrera y curso."
        );
        assert_eq!(sentence.to_string(), sentence.text());
    }

    #[test]
    fn ignored_tags_are_skipped() {
        let raw = r#"<p class="j"><span class="n_acep">1. </span><abbr title="nombre">m.</abbr> Casa grande.</p>"#;
        let sentence = Sentence::from_html(raw, &["abbr", "span"]).unwrap();
        assert_eq!(sentence.text(), "Casa grande.");
        assert_eq!(sentence.components().len(), 1);
    }

    #[test]
    fn empty_element_gives_empty_text() {
        let sentence = Sentence::from_html("<p></p>", &[]).unwrap();
        assert!(sentence.components().is_empty());
        assert_eq!(sentence.text(), "");
    }

    #[test]
    fn components_only_in_extended() {
        let sentence = Sentence::from_html(NOTE, &[]).unwrap();
        let compact = sentence.compact().unwrap();
        let extended = sentence.extended().unwrap();
        assert!(compact.get("components").is_none());
        assert_eq!(extended["components"].as_array().unwrap().len(), 9);
        assert_eq!(extended["components"][0], "Del lat. ");
        assert!(is_superset(&extended, &compact));
    }
}
