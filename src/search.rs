//! A whole results page: metadata, the articles found, or the related
//! entries offered when nothing matched exactly.

use std::fmt;

use lazy_static::lazy_static;
use log::{debug, warn};
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};

use crate::article::Article;
use crate::conjugation::{Conjugation, CONJUGATION_CONTAINER_ID};
use crate::error::{DleError, Result};
use crate::lemma::match_headword;
use crate::markup::{child_elements, tag_name, text_of};
use crate::repr::{base_map, list, Representation};
use crate::word::Word;

lazy_static! {
    static ref CANONICAL: Selector = Selector::parse(r#"link[rel="canonical"]"#).unwrap();
    static ref TITLE: Selector = Selector::parse("title").unwrap();
    static ref META_DESCRIPTION: Selector = Selector::parse(r#"meta[name="description"]"#).unwrap();
    static ref RESULTS: Selector = Selector::parse("div#resultados").unwrap();
    static ref RELATED_BLOCK: Selector = Selector::parse("div.n1").unwrap();
    static ref ANCHOR: Selector = Selector::parse("a").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    title: String,
    canonical: String,
    meta_description: String,
    articles: Vec<Article>,
    related_entries: Vec<(String, Vec<Word>)>,
    html: String,
}

impl SearchResult {
    /// Decode from the root of a parsed page.
    pub fn decode(root: ElementRef<'_>) -> Result<Self> {
        let canonical = root
            .select(&CANONICAL)
            .next()
            .and_then(|link| link.value().attr("href"))
            .unwrap_or_default()
            .to_string();
        let title = root
            .select(&TITLE)
            .next()
            .map(|title| text_of(&title))
            .unwrap_or_default();
        let meta_description = root
            .select(&META_DESCRIPTION)
            .next()
            .and_then(|meta| meta.value().attr("content"))
            .unwrap_or_default()
            .to_string();

        let mut articles = Vec::new();
        let mut related_entries = Vec::new();
        match root.select(&RESULTS).next() {
            Some(results) => {
                articles = decode_articles(results);
                if articles.is_empty() {
                    related_entries = decode_related_entries(results);
                }
            }
            None => debug!("page has no results container"),
        }

        Ok(Self {
            title,
            canonical,
            meta_description,
            articles,
            related_entries,
            html: root.html(),
        })
    }

    pub fn from_html(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(DleError::EmptyInput);
        }
        let document = Html::parse_document(raw);
        Self::decode(document.root_element())
    }

    pub fn try_from_html(raw: &str) -> Option<Self> {
        Self::from_html(raw).ok()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The canonical link that returns this same page.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn meta_description(&self) -> &str {
        &self.meta_description
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// Related entries grouped by relation label, in page order. Only
    /// populated when the page has no articles.
    pub fn related_entries(&self) -> &[(String, Vec<Word>)] {
        &self.related_entries
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

fn decode_articles(results: ElementRef<'_>) -> Vec<Article> {
    let mut articles = Vec::new();
    for child in child_elements(results).filter(|el| tag_name(el) == "article") {
        let article = match Article::decode(child) {
            Ok(article) => article,
            Err(e) => {
                warn!("skipping undecodable article: {e}");
                continue;
            }
        };
        let article = match following_conjugation(child) {
            Some(conjugation) if references(child, &conjugation) => {
                article.with_conjugation(conjugation)
            }
            Some(conjugation) => {
                debug!("{} does not belong to article {}", conjugation.id(), article.id());
                article
            }
            None => article,
        };
        articles.push(article);
    }
    articles
}

/// The conjugation table right after `article`, when there is one.
fn following_conjugation(article: ElementRef<'_>) -> Option<Conjugation> {
    let sibling = article.next_siblings().find_map(ElementRef::wrap)?;
    if tag_name(&sibling) != "div" || sibling.value().id() != Some(CONJUGATION_CONTAINER_ID) {
        return None;
    }
    match Conjugation::decode(sibling) {
        Ok(conjugation) => Some(conjugation),
        Err(e) => {
            warn!("skipping undecodable conjugation table: {e}");
            None
        }
    }
}

/// Whether `article` links to the conjugation's anchor.
fn references(article: ElementRef<'_>, conjugation: &Conjugation) -> bool {
    let target = format!("#{}", conjugation.id());
    article
        .select(&ANCHOR)
        .any(|a| a.value().attr("href") == Some(target.as_str()))
}

fn decode_related_entries(results: ElementRef<'_>) -> Vec<(String, Vec<Word>)> {
    let mut groups: Vec<(String, Vec<Word>)> = Vec::new();
    for block in child_elements(results).filter(|el| RELATED_BLOCK.matches(el)) {
        let Some(anchor) = block.select(&ANCHOR).next() else {
            continue;
        };
        let Some(label) = match_headword(&text_of(&block)).and_then(|parts| parts.related) else {
            debug!("related block without a relation label: {:?}", text_of(&block));
            continue;
        };
        let word = match Word::decode(anchor, "") {
            Ok(word) => word,
            Err(e) => {
                warn!("skipping undecodable related entry: {e}");
                continue;
            }
        };
        match groups.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, words)) => words.push(word),
            None => groups.push((label, vec![word])),
        }
    }
    groups
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.meta_description)
    }
}

impl Representation for SearchResult {
    fn represent(&self, extended: bool) -> Result<Map<String, Value>> {
        let mut map = base_map(&self.html, extended);
        map.insert("title".into(), self.title.clone().into());
        if extended {
            map.insert("canonical".into(), self.canonical.clone().into());
            map.insert(
                "meta_description".into(),
                self.meta_description.clone().into(),
            );
        }
        if !self.articles.is_empty() {
            map.insert("articles".into(), list(&self.articles, extended)?);
        } else if !self.related_entries.is_empty() {
            let mut related = Map::new();
            for (label, words) in &self.related_entries {
                related.insert(label.clone(), list(words, extended)?);
            }
            map.insert("related_entries".into(), Value::Object(related));
        }
        Ok(map)
    }
}
