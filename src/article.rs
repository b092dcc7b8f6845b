//! A full article: the headword entry, its complex forms, cross-references
//! and (for verbs) the conjugation table.

use std::fmt;

use lazy_static::lazy_static;
use log::debug;
use scraper::{ElementRef, Selector};
use serde_json::{json, Map, Value};

use crate::conjugation::Conjugation;
use crate::definition::Definition;
use crate::entry::{Entry, ARTICLE_ENTRY, SIMPLE_ENTRY};
use crate::error::{DleError, Result};
use crate::lemma::{ArticleLemma, ENTRY_LEMMA};
use crate::markup::{child_elements, class_letter, first_element, first_of, parse_fragment, tag_name, text_of};
use crate::repr::{base_map, list, Representation};
use crate::sentence::Sentence;
use crate::word::Word;

lazy_static! {
    static ref ARTICLE: Selector = Selector::parse("article").unwrap();
    static ref HEADER: Selector = Selector::parse("header").unwrap();
}

const ARTICLE_DEFINITION_CLASS: char = 'j';
const ENTRY_DEFINITION_CLASS: char = 'm';
const NOTE_CLASS: char = 'n';
const CROSS_REFERENCE_CLASS: char = 'l';

// ─────────────────────────────────────────────────────────────────────────────
// Segmentation
// ─────────────────────────────────────────────────────────────────────────────

/// The article's direct children split into groupings, document order kept.
#[derive(Debug, Default)]
struct Segments<'a> {
    lemma_entry: Vec<ElementRef<'a>>,
    complex_forms: Vec<Vec<ElementRef<'a>>>,
    cross_references: Vec<ElementRef<'a>>,
}

impl<'a> Segments<'a> {
    /// Notes and sub-entry definitions go to the most recently opened complex
    /// form, or to the lemma entry while none is open.
    fn open_grouping(&mut self) -> &mut Vec<ElementRef<'a>> {
        match self.complex_forms.last_mut() {
            Some(open) => open,
            None => &mut self.lemma_entry,
        }
    }

    fn push(mut self, child: ElementRef<'a>) -> Self {
        match tag_name(&child) {
            "header" => self.lemma_entry.push(child),
            "p" => match class_letter(&child) {
                Some(ARTICLE_DEFINITION_CLASS) => self.lemma_entry.push(child),
                Some(ENTRY_DEFINITION_CLASS | NOTE_CLASS) => self.open_grouping().push(child),
                Some(c) if c == ENTRY_LEMMA.class_letter => self.complex_forms.push(vec![child]),
                Some(CROSS_REFERENCE_CLASS) => self.cross_references.push(child),
                other => debug!("article skips <p> with class letter {other:?}"),
            },
            other => debug!("article skips <{other}>"),
        }
        self
    }
}

fn segment(article: ElementRef<'_>) -> Segments<'_> {
    child_elements(article).fold(Segments::default(), Segments::push)
}

// ─────────────────────────────────────────────────────────────────────────────
// Article
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    id: String,
    lemma_entry: Entry<ArticleLemma>,
    complex_forms: Vec<Entry>,
    other_entries: Vec<Word>,
    conjugation: Option<Conjugation>,
    raw_text: String,
    html: String,
}

impl Article {
    pub fn decode(el: ElementRef<'_>) -> Result<Self> {
        let article = first_of(el, &ARTICLE)
            .filter(|article| article.select(&HEADER).next().is_some())
            .ok_or_else(|| DleError::structure("an article with a header is required"))?;
        let id = article.value().attr("id").unwrap_or_default().to_string();

        let segments = segment(article);
        let lemma_entry = Entry::decode_children(segments.lemma_entry, ARTICLE_ENTRY)?;
        let complex_forms = segments
            .complex_forms
            .into_iter()
            .map(|grouping| Entry::decode_children(grouping, SIMPLE_ENTRY))
            .collect::<Result<Vec<_>>>()?;
        let other_entries = segments
            .cross_references
            .into_iter()
            .map(|el| Word::decode(el, &id))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw_text: text_of(&article),
            html: article.html(),
            id,
            lemma_entry,
            complex_forms,
            other_entries,
            conjugation: None,
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

    pub fn with_conjugation(mut self, conjugation: Conjugation) -> Self {
        self.conjugation = Some(conjugation);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn lemma(&self) -> &ArticleLemma {
        self.lemma_entry.lemma()
    }

    pub fn lemma_entry(&self) -> &Entry<ArticleLemma> {
        &self.lemma_entry
    }

    pub fn supplementary_info(&self) -> &[Sentence] {
        self.lemma_entry.supplementary_info()
    }

    pub fn definitions(&self) -> &[Definition] {
        self.lemma_entry.definitions()
    }

    pub fn complex_forms(&self) -> &[Entry] {
        &self.complex_forms
    }

    /// Cross-references to related entries, linked relative to this article.
    pub fn other_entries(&self) -> &[Word] {
        &self.other_entries
    }

    pub fn conjugation(&self) -> Option<&Conjugation> {
        self.conjugation.as_ref()
    }

    /// A conjugation table settles it; otherwise any verb definition does.
    pub fn is_verb(&self) -> Result<bool> {
        if self.conjugation.is_some() {
            return Ok(true);
        }
        for definition in self.definitions() {
            if definition.is_verb()? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_text)
    }
}

impl Representation for Article {
    fn represent(&self, extended: bool) -> Result<Map<String, Value>> {
        let mut map = base_map(&self.html, extended);
        map.insert("id".into(), self.id.clone().into());
        map.insert("lemma".into(), Value::Object(self.lemma().represent(extended)?));
        map.insert(
            "supplementary_info".into(),
            list(self.supplementary_info(), extended)?,
        );
        map.insert("is".into(), json!({ "verb": self.is_verb()? }));
        map.insert("definitions".into(), list(self.definitions(), extended)?);
        map.insert("complex_forms".into(), list(&self.complex_forms, extended)?);
        map.insert("other_entries".into(), list(&self.other_entries, extended)?);
        if let Some(conjugation) = &self.conjugation {
            map.insert(
                "conjugations".into(),
                Value::Object(conjugation.represent(extended)?),
            );
        }
        if extended {
            map.insert("raw_text".into(), self.raw_text.clone().into());
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lemma::Lemma;
    use crate::repr::is_superset;

    const CARRERA: &str = concat!(
        r#"<article id="7sK8N"><header class="f">carrera</header>"#,
        r#"<p class="n2">Del lat. vulg. carraria.</p>"#,
        r#"<p class="j" id="Aa1"><span class="n_acep">1. </span><abbr class="d" title="nombre femenino">f.</abbr> Acción de correr.</p>"#,
        r#"<p class="j" id="Aa2"><span class="n_acep">2. </span><abbr class="d" title="nombre femenino">f.</abbr> Pugna de velocidad.</p>"#,
        r#"<p class="k5" id="Kb1">a la carrera</p>"#,
        r#"<p class="m"><span class="n_acep">1. </span><abbr title="locución adverbial">loc. adv.</abbr> Con prisa.</p>"#,
        r#"<p class="k5" id="Kb2">de carrera</p>"#,
        r#"<p class="n3">U. t. c. loc. adj.</p>"#,
        r#"<p class="m"><span class="n_acep">1. </span><abbr title="locución adverbial">loc. adv.</abbr> Sin reflexión.</p>"#,
        r##"<p class="l"><a href="#Zt3">carrero</a></p>"##,
        r#"<div class="sin-contenido"></div>"#,
        r#"</article>"#,
    );

    // ─────────────────────────────────────────────────────────────
    // Segmentation
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn segments_keep_document_order() {
        let html = parse_fragment(CARRERA).unwrap();
        let article = first_element(&html).unwrap();
        let segments = segment(article);
        let lemma_tags: Vec<&str> = segments.lemma_entry.iter().map(|el| tag_name(el)).collect();
        assert_eq!(lemma_tags, ["header", "p", "p", "p"]);
        assert_eq!(segments.complex_forms.len(), 2);
        assert_eq!(segments.complex_forms[0].len(), 2);
        assert_eq!(segments.complex_forms[1].len(), 3);
        assert_eq!(segments.cross_references.len(), 1);
    }

    #[test]
    fn notes_before_any_complex_form_belong_to_the_lemma() {
        let raw = concat!(
            r#"<article><header class="f">casa</header>"#,
            r#"<p class="j"><abbr title="nombre femenino">f.</abbr> Edificio.</p>"#,
            r#"<p class="n3">Nota tardía.</p></article>"#,
        );
        let article = Article::from_html(raw).unwrap();
        assert_eq!(article.supplementary_info().len(), 1);
        assert_eq!(article.supplementary_info()[0].text(), "Nota tardía.");
        assert!(article.complex_forms().is_empty());
    }

    #[test]
    fn article_definitions_after_a_complex_form_stay_with_the_lemma() {
        let raw = concat!(
            r#"<article><header class="f">casa</header>"#,
            r#"<p class="j"><abbr title="nombre femenino">f.</abbr> Edificio.</p>"#,
            r#"<p class="k5">casa grande</p>"#,
            r#"<p class="m"><abbr title="locución nominal">loc. nom.</abbr> Mansión.</p>"#,
            r#"<p class="j"><abbr title="nombre femenino">f.</abbr> Familia.</p>"#,
            r#"</article>"#,
        );
        let article = Article::from_html(raw).unwrap();
        let lemma_texts: Vec<String> = article.definitions().iter().map(|d| d.text()).collect();
        assert_eq!(lemma_texts, ["Edificio.", "Familia."]);

        let forms = article.complex_forms();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].definitions().len(), 1);
        assert_eq!(forms[0].definitions()[0].text(), "Mansión.");
    }

    // ─────────────────────────────────────────────────────────────
    // Decoding
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn decodes_lemma_entry() {
        let article = Article::from_html(CARRERA).unwrap();
        assert_eq!(article.id(), "7sK8N");
        assert_eq!(article.lemma().lemma(), "carrera");
        assert_eq!(article.supplementary_info().len(), 1);
        assert_eq!(article.definitions().len(), 2);
        assert_eq!(article.definitions()[1].text(), "Pugna de velocidad.");
    }

    #[test]
    fn decodes_complex_forms_in_order() {
        let article = Article::from_html(CARRERA).unwrap();
        let forms = article.complex_forms();
        assert_eq!(forms.len(), 2);
        assert_eq!(forms[0].lemma().lemma(), "a la carrera");
        assert_eq!(forms[0].definitions().len(), 1);
        assert_eq!(forms[1].lemma().lemma(), "de carrera");
        assert_eq!(forms[1].supplementary_info().len(), 1);
        assert_eq!(forms[1].definitions()[0].text(), "Sin reflexión.");
    }

    #[test]
    fn cross_references_resolve_against_article_id() {
        let article = Article::from_html(CARRERA).unwrap();
        assert_eq!(article.other_entries().len(), 1);
        assert_eq!(article.other_entries()[0].href(), "/7sK8N#Zt3");
    }

    #[test]
    fn raw_text_covers_the_whole_article() {
        let article = Article::from_html(CARRERA).unwrap();
        assert!(article.raw_text().starts_with("carrera"));
        assert!(article.raw_text().contains("Sin reflexión."));
        assert!(article.raw_text().ends_with("carrero"));
    }

    #[test]
    fn header_is_required() {
        let raw = r#"<article id="x"><p class="j"><abbr title="adjetivo">adj.</abbr> Algo.</p></article>"#;
        assert!(matches!(Article::from_html(raw), Err(DleError::Structure(_))));
        assert!(Article::try_from_html("<div>nada</div>").is_none());
    }

    // ─────────────────────────────────────────────────────────────
    // Verbs and representation
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn verb_by_definition_or_conjugation() {
        let article = Article::from_html(CARRERA).unwrap();
        assert!(!article.is_verb().unwrap());

        let verb = concat!(
            r#"<article id="B1"><header class="f">correr</header>"#,
            r#"<p class="j"><abbr class="d" title="verbo intransitivo">intr.</abbr> Ir deprisa.</p></article>"#,
        );
        assert!(Article::from_html(verb).unwrap().is_verb().unwrap());

        let conjugation = Conjugation::from_html(
            r#"<div id="conjugacion"><article id="C"><header><b>carrerar</b></header></article></div>"#,
        )
        .unwrap();
        let attached = article.with_conjugation(conjugation);
        assert!(attached.is_verb().unwrap());
        assert_eq!(attached.compact().unwrap()["conjugations"]["verb"], "carrerar");
    }

    #[test]
    fn representation_lists_every_part() {
        let article = Article::from_html(CARRERA).unwrap();
        let compact = article.compact().unwrap();
        let keys: Vec<&str> = compact.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "id",
                "lemma",
                "supplementary_info",
                "is",
                "definitions",
                "complex_forms",
                "other_entries"
            ]
        );
        assert_eq!(compact["is"]["verb"], false);

        let extended = article.extended().unwrap();
        assert!(extended["raw_text"].is_string());
        assert!(is_superset(&extended, &compact));
    }
}
