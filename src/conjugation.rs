//! Verb conjugation tables.
//!
//! The table carries its schema in header cells: a `th` naming a mood opens
//! a group, the `th` cells after it name the tenses of each column, and each
//! `td` holds the forms for the active mood, the tense of its column and the
//! person named in the row's third cell.

use std::collections::HashMap;

use lazy_static::lazy_static;
use log::debug;
use scraper::{ElementRef, Selector};
use serde_json::{Map, Value};

use crate::error::{DleError, Result};
use crate::markup::{child_elements, first_element, first_of, parse_fragment, tag_name, text_of};
use crate::repr::{base_map, Representation};

/// `id` of the element wrapping a conjugation table.
pub const CONJUGATION_CONTAINER_ID: &str = "conjugacion";

lazy_static! {
    static ref CONTAINER: Selector = Selector::parse("div#conjugacion").unwrap();
    static ref ARTICLE: Selector = Selector::parse("article").unwrap();
    static ref HEADER: Selector = Selector::parse("header").unwrap();
    static ref BOLD: Selector = Selector::parse("b").unwrap();
    static ref TABLE: Selector = Selector::parse("table.cnj").unwrap();
    static ref ROW: Selector = Selector::parse("tr").unwrap();
}

/// Columns before this index are structural; the one just before it names the person.
const FIRST_DATA_COLUMN: usize = 3;
const PERSON_COLUMN: usize = 2;

// ─────────────────────────────────────────────────────────────────────────────
// Schema
// ─────────────────────────────────────────────────────────────────────────────

/// One cell's worth of forms; some cells list alternatives (`corriera o corriese`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerbForm {
    Single(String),
    Alternatives(Vec<String>),
}

impl VerbForm {
    fn to_value(&self) -> Value {
        match self {
            VerbForm::Single(form) => Value::String(form.clone()),
            VerbForm::Alternatives(forms) => {
                Value::Array(forms.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

/// A leaf of the table: either a bare form or forms keyed by person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Form(VerbForm),
    Persons(Vec<(String, VerbForm)>),
}

impl Slot {
    fn empty_form() -> Self {
        Slot::Form(VerbForm::Single(String::new()))
    }

    fn empty_persons() -> Self {
        Slot::Persons(Vec::new())
    }

    /// Person maps merge key by key; anything else is overwritten.
    pub fn write(&mut self, value: Slot) {
        match (self, value) {
            (Slot::Persons(existing), Slot::Persons(incoming)) => {
                for (person, form) in incoming {
                    match existing.iter_mut().find(|(p, _)| *p == person) {
                        Some(entry) => entry.1 = form,
                        None => existing.push((person, form)),
                    }
                }
            }
            (slot, value) => *slot = value,
        }
    }

    /// Forms for `person`, when this slot is person-keyed.
    pub fn person(&self, person: &str) -> Option<&VerbForm> {
        match self {
            Slot::Persons(forms) => forms.iter().find(|(p, _)| p == person).map(|(_, f)| f),
            Slot::Form(_) => None,
        }
    }

    pub fn form(&self) -> Option<&VerbForm> {
        match self {
            Slot::Form(form) => Some(form),
            Slot::Persons(_) => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Slot::Form(form) => form.to_value(),
            Slot::Persons(forms) => Value::Object(
                forms
                    .iter()
                    .map(|(person, form)| (person.clone(), form.to_value()))
                    .collect(),
            ),
        }
    }
}

/// The moods of the table, named as the page names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    NonPersonal,
    Indicative,
    Subjunctive,
    Imperative,
}

impl Mood {
    pub const ALL: [Mood; 4] = [
        Mood::NonPersonal,
        Mood::Indicative,
        Mood::Subjunctive,
        Mood::Imperative,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Mood::NonPersonal => "Formas no personales",
            Mood::Indicative => "Indicativo",
            Mood::Subjunctive => "Subjuntivo",
            Mood::Imperative => "Imperativo",
        }
    }

    /// Tense (or form) names under this mood, in table order.
    pub fn tenses(self) -> &'static [&'static str] {
        match self {
            Mood::NonPersonal => &["Infinitivo", "Gerundio", "Participio"],
            Mood::Indicative => &["Presente", "Copretérito", "Pretérito", "Futuro", "Pospretérito"],
            Mood::Subjunctive => &["Presente", "Futuro", "Copretérito"],
            Mood::Imperative => &[],
        }
    }

    fn from_header(header: &str) -> Option<Mood> {
        Mood::ALL.into_iter().find(|m| m.label() == header)
    }

    /// Headers read like `Pretérito imperfecto / Copretérito`; any
    /// slash-separated segment may carry the tense name.
    fn resolve_tense(self, header: &str) -> Option<usize> {
        self.tenses().iter().position(|tense| {
            header
                .split('/')
                .any(|segment| segment.trim().to_lowercase() == tense.to_lowercase())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonPersonalForms {
    pub infinitive: Slot,
    pub gerund: Slot,
    pub participle: Slot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicativeMood {
    pub present: Slot,
    pub copreterite: Slot,
    pub preterite: Slot,
    pub future: Slot,
    pub pospreterite: Slot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjunctiveMood {
    pub present: Slot,
    pub future: Slot,
    pub copreterite: Slot,
}

/// The full verb-form table, starting from an empty fixed skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConjugationTable {
    pub non_personal: NonPersonalForms,
    pub indicative: IndicativeMood,
    pub subjunctive: SubjunctiveMood,
    pub imperative: Slot,
}

impl Default for ConjugationTable {
    fn default() -> Self {
        Self {
            non_personal: NonPersonalForms {
                infinitive: Slot::empty_form(),
                gerund: Slot::empty_form(),
                participle: Slot::empty_form(),
            },
            indicative: IndicativeMood {
                present: Slot::empty_persons(),
                copreterite: Slot::empty_persons(),
                preterite: Slot::empty_persons(),
                future: Slot::empty_persons(),
                pospreterite: Slot::empty_persons(),
            },
            subjunctive: SubjunctiveMood {
                present: Slot::empty_persons(),
                future: Slot::empty_persons(),
                copreterite: Slot::empty_persons(),
            },
            imperative: Slot::empty_persons(),
        }
    }
}

/// The one mapping from (mood, tense index) to a field, expanded for both
/// shared and mutable access.
macro_rules! slot_path {
    ($table:expr, $mood:expr, $tense:expr $(, $mutability:tt)?) => {
        match ($mood, $tense) {
            (Mood::Imperative, _) => Some(&$($mutability)? $table.imperative),
            (_, None) => None,
            (Mood::NonPersonal, Some(t)) => match t {
                0 => Some(&$($mutability)? $table.non_personal.infinitive),
                1 => Some(&$($mutability)? $table.non_personal.gerund),
                2 => Some(&$($mutability)? $table.non_personal.participle),
                _ => None,
            },
            (Mood::Indicative, Some(t)) => match t {
                0 => Some(&$($mutability)? $table.indicative.present),
                1 => Some(&$($mutability)? $table.indicative.copreterite),
                2 => Some(&$($mutability)? $table.indicative.preterite),
                3 => Some(&$($mutability)? $table.indicative.future),
                4 => Some(&$($mutability)? $table.indicative.pospreterite),
                _ => None,
            },
            (Mood::Subjunctive, Some(t)) => match t {
                0 => Some(&$($mutability)? $table.subjunctive.present),
                1 => Some(&$($mutability)? $table.subjunctive.future),
                2 => Some(&$($mutability)? $table.subjunctive.copreterite),
                _ => None,
            },
        }
    };
}

impl ConjugationTable {
    /// Resolve a key path (mood, index into `Mood::tenses`) to its slot.
    /// The imperative has no tenses and takes its persons directly.
    pub fn slot(&self, mood: Mood, tense: Option<usize>) -> Option<&Slot> {
        slot_path!(self, mood, tense)
    }

    pub fn slot_mut(&mut self, mood: Mood, tense: Option<usize>) -> Option<&mut Slot> {
        slot_path!(self, mood, tense, mut)
    }

    /// Look a slot up by the page's own labels, e.g. `("Indicativo", Some("Presente"))`.
    pub fn get(&self, mood: &str, tense: Option<&str>) -> Option<&Slot> {
        let mood = Mood::from_header(mood)?;
        let tense = match tense {
            Some(name) => Some(mood.tenses().iter().position(|t| *t == name)?),
            None => None,
        };
        self.slot(mood, tense)
    }

    /// Write `value` at a key path using the merge-on-write rule of [`Slot::write`].
    /// Returns false when the path does not exist in the schema.
    pub fn write(&mut self, mood: Mood, tense: Option<usize>, value: Slot) -> bool {
        match self.slot_mut(mood, tense) {
            Some(slot) => {
                slot.write(value);
                true
            }
            None => false,
        }
    }

    fn decode(table: ElementRef<'_>, verb: &str) -> Self {
        let mut conjugations = Self::default();
        let separators = [if verb.starts_with('o') { " u " } else { " o " }, " / "];
        let mut mood: Option<Mood> = None;
        let mut tense_columns: HashMap<usize, Option<usize>> = HashMap::new();

        for row in table.select(&ROW) {
            let cells: Vec<ElementRef<'_>> = child_elements(row).collect();
            let person = cells
                .get(PERSON_COLUMN)
                .map(|cell| text_of(cell).trim().to_string())
                .filter(|p| !p.is_empty());

            for (column, cell) in cells.iter().enumerate().skip(FIRST_DATA_COLUMN) {
                let text = text_of(cell);
                let text = text.trim();
                match tag_name(cell) {
                    "th" => {
                        if let Some(found) = Mood::from_header(text) {
                            mood = Some(found);
                            tense_columns.clear();
                        } else if let Some(current) = mood {
                            tense_columns.insert(column, current.resolve_tense(text));
                        }
                    }
                    "td" => {
                        let Some(current) = mood else {
                            debug!("conjugation cell before any mood header: {text:?}");
                            continue;
                        };
                        let tense = if tense_columns.is_empty() {
                            None
                        } else {
                            match tense_columns.get(&column) {
                                Some(Some(t)) => Some(*t),
                                _ => {
                                    debug!("no known tense for column {column} under {}", current.label());
                                    continue;
                                }
                            }
                        };
                        let forms = split_forms(text, &separators);
                        let value = match &person {
                            Some(p) => Slot::Persons(vec![(p.clone(), forms)]),
                            None => Slot::Form(forms),
                        };
                        if !conjugations.write(current, tense, value) {
                            debug!("no slot for {} / {tense:?}", current.label());
                        }
                    }
                    _ => {}
                }
            }
        }
        conjugations
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        for mood in Mood::ALL {
            let value = if mood == Mood::Imperative {
                self.imperative.to_value()
            } else {
                let tenses: Map<String, Value> = mood
                    .tenses()
                    .iter()
                    .enumerate()
                    .filter_map(|(i, name)| {
                        self.slot(mood, Some(i))
                            .map(|slot| (name.to_string(), slot.to_value()))
                    })
                    .collect();
                Value::Object(tenses)
            };
            map.insert(mood.label().into(), value);
        }
        Value::Object(map)
    }
}

/// Split a cell on the first alternative-form separator it contains.
fn split_forms(text: &str, separators: &[&str]) -> VerbForm {
    for separator in separators {
        if text.contains(separator) {
            let mut forms: Vec<String> = text
                .split(separator)
                .map(|f| f.trim().to_string())
                .collect();
            return if forms.len() == 1 {
                VerbForm::Single(forms.remove(0))
            } else {
                VerbForm::Alternatives(forms)
            };
        }
    }
    VerbForm::Single(text.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Conjugation
// ─────────────────────────────────────────────────────────────────────────────

/// The conjugation of one verb, linked back to its article by `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Conjugation {
    id: String,
    verb: String,
    table: Option<ConjugationTable>,
    html: String,
}

impl Conjugation {
    pub fn decode(el: ElementRef<'_>) -> Result<Self> {
        let container = first_of(el, &CONTAINER)
            .ok_or_else(|| DleError::structure("invalid HTML for a conjugations table"))?;

        let id = container
            .select(&ARTICLE)
            .next()
            .and_then(|article| article.value().attr("id"))
            .map(|id| format!("{CONJUGATION_CONTAINER_ID}{id}"))
            .unwrap_or_default();
        let verb = container
            .select(&HEADER)
            .next()
            .and_then(|header| header.select(&BOLD).next())
            .map(|b| text_of(&b).trim().to_string())
            .unwrap_or_default();
        let table = container
            .select(&TABLE)
            .next()
            .map(|table| ConjugationTable::decode(table, &verb));

        Ok(Self {
            id,
            verb,
            table,
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

    /// `conjugacion<article id>`, the anchor target the owning article links to.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Infinitive.
    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// `None` when the container holds no table.
    pub fn table(&self) -> Option<&ConjugationTable> {
        self.table.as_ref()
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

impl Representation for Conjugation {
    fn represent(&self, extended: bool) -> Result<Map<String, Value>> {
        let mut map = base_map(&self.html, extended);
        if extended {
            map.insert("id".into(), self.id.clone().into());
        }
        map.insert("verb".into(), self.verb.clone().into());
        map.insert(
            "conjugations".into(),
            self.table
                .as_ref()
                .map_or_else(|| Value::Object(Map::new()), ConjugationTable::to_value),
        );
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::is_superset;

    fn single(s: &str) -> VerbForm {
        VerbForm::Single(s.to_string())
    }

    // ─────────────────────────────────────────────────────────────
    // Merge rule
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn person_maps_merge() {
        let mut slot = Slot::empty_persons();
        slot.write(Slot::Persons(vec![("yo".into(), single("corro"))]));
        slot.write(Slot::Persons(vec![("tú".into(), single("corres"))]));
        assert_eq!(slot.person("yo"), Some(&single("corro")));
        assert_eq!(slot.person("tú"), Some(&single("corres")));
    }

    #[test]
    fn same_person_is_replaced() {
        let mut slot = Slot::Persons(vec![("yo".into(), single("corro"))]);
        slot.write(Slot::Persons(vec![("yo".into(), single("corrí"))]));
        assert_eq!(slot, Slot::Persons(vec![("yo".into(), single("corrí"))]));
    }

    #[test]
    fn non_map_is_overwritten() {
        let mut slot = Slot::empty_form();
        slot.write(Slot::Persons(vec![("yo".into(), single("corro"))]));
        assert!(slot.person("yo").is_some());

        slot.write(Slot::Form(single("correr")));
        assert_eq!(slot.form(), Some(&single("correr")));

        slot.write(Slot::Form(single("corriendo")));
        assert_eq!(slot.form(), Some(&single("corriendo")));
    }

    #[test]
    fn unknown_path_is_not_written() {
        let mut table = ConjugationTable::default();
        assert!(!table.write(Mood::Indicative, None, Slot::Form(single("x"))));
        assert!(!table.write(Mood::Subjunctive, Some(7), Slot::Form(single("x"))));
        assert!(table.write(Mood::Imperative, None, Slot::Persons(vec![("tú".into(), single("corre"))])));
    }

    #[test]
    fn shared_and_mutable_paths_agree() {
        let mut table = ConjugationTable::default();
        for mood in Mood::ALL {
            let tenses: Vec<Option<usize>> = if mood == Mood::Imperative {
                vec![None]
            } else {
                (0..mood.tenses().len()).map(Some).collect()
            };
            for (n, tense) in tenses.into_iter().enumerate() {
                let form = format!("{}-{n}", mood.label());
                assert!(table.write(mood, tense, Slot::Form(single(&form))));
                assert_eq!(table.slot(mood, tense).and_then(Slot::form), Some(&single(&form)));
            }
            let past_end = Some(mood.tenses().len());
            assert_eq!(table.slot(mood, past_end).is_some(), mood == Mood::Imperative);
        }
        assert_eq!(table.indicative.pospreterite.form(), Some(&single("Indicativo-4")));
        assert_eq!(table.subjunctive.copreterite.form(), Some(&single("Subjuntivo-2")));
    }

    // ─────────────────────────────────────────────────────────────
    // Headers and forms
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn tense_headers_resolve_by_segment() {
        assert_eq!(Mood::Indicative.resolve_tense("Presente"), Some(0));
        assert_eq!(Mood::Indicative.resolve_tense("Pretérito imperfecto / Copretérito"), Some(1));
        assert_eq!(Mood::Indicative.resolve_tense("Pretérito perfecto simple / Pretérito"), Some(2));
        assert_eq!(Mood::Indicative.resolve_tense("Condicional simple / Pospretérito"), Some(4));
        assert_eq!(Mood::Subjunctive.resolve_tense("Futuro simple / Futuro"), Some(1));
        assert_eq!(Mood::NonPersonal.resolve_tense("Participio"), Some(2));
        assert_eq!(Mood::Indicative.resolve_tense("Pluscuamperfecto"), None);
    }

    #[test]
    fn forms_split_on_alternatives() {
        let seps = [" o ", " / "];
        assert_eq!(
            split_forms("corriera o corriese", &seps),
            VerbForm::Alternatives(vec!["corriera".into(), "corriese".into()])
        );
        assert_eq!(
            split_forms("corréis / corrés", &seps),
            VerbForm::Alternatives(vec!["corréis".into(), "corrés".into()])
        );
        assert_eq!(split_forms("corro", &seps), single("corro"));

        let seps_o = [" u ", " / "];
        assert_eq!(
            split_forms("oyera u oyese", &seps_o),
            VerbForm::Alternatives(vec!["oyera".into(), "oyese".into()])
        );
    }

    // ─────────────────────────────────────────────────────────────
    // Full table
    // ─────────────────────────────────────────────────────────────

    const TABLE: &str = concat!(
        r#"<div id="conjugacion"><article id="B1"><header class="f">Conjugación de <b>correr</b></header>"#,
        r#"<table class="cnj">"#,
        r#"<tr><td></td><td></td><td></td><th>Formas no personales</th></tr>"#,
        r#"<tr><td></td><td></td><td></td><th>Infinitivo</th><th>Gerundio</th></tr>"#,
        r#"<tr><td></td><td></td><td></td><td>correr</td><td>corriendo</td></tr>"#,
        r#"<tr><td></td><td></td><td></td><th>Participio</th></tr>"#,
        r#"<tr><td></td><td></td><td></td><td>corrido</td></tr>"#,
        r#"<tr><td></td><td></td><td></td><th>Indicativo</th></tr>"#,
        r#"<tr><td></td><td></td><td></td><th>Presente</th><th>Pretérito imperfecto / Copretérito</th></tr>"#,
        r#"<tr><td>Singular</td><td>Primera</td><td>yo</td><td>corro</td><td>corría</td></tr>"#,
        r#"<tr><td></td><td>Segunda</td><td>tú / vos</td><td>corres / corrés</td><td>corrías</td></tr>"#,
        r#"<tr><td></td><td></td><td></td><th>Pretérito perfecto simple / Pretérito</th></tr>"#,
        r#"<tr><td>Singular</td><td>Primera</td><td>yo</td><td>corrí</td></tr>"#,
        r#"<tr><td></td><td></td><td></td><th>Subjuntivo</th></tr>"#,
        r#"<tr><td></td><td></td><td></td><th>Pretérito imperfecto / Copretérito</th></tr>"#,
        r#"<tr><td>Singular</td><td>Primera</td><td>yo</td><td>corriera o corriese</td></tr>"#,
        r#"<tr><td></td><td></td><td></td><th>Imperativo</th></tr>"#,
        r#"<tr><td>Singular</td><td>Segunda</td><td>tú / vos</td><td>corre / corré</td></tr>"#,
        r#"</table></article></div>"#,
    );

    #[test]
    fn decodes_identifier_and_verb() {
        let conj = Conjugation::from_html(TABLE).unwrap();
        assert_eq!(conj.id(), "conjugacionB1");
        assert_eq!(conj.verb(), "correr");
    }

    #[test]
    fn decodes_non_personal_forms() {
        let conj = Conjugation::from_html(TABLE).unwrap();
        let table = conj.table().unwrap();
        assert_eq!(table.non_personal.infinitive.form(), Some(&single("correr")));
        assert_eq!(table.non_personal.gerund.form(), Some(&single("corriendo")));
        assert_eq!(table.non_personal.participle.form(), Some(&single("corrido")));
    }

    #[test]
    fn persons_accumulate_per_tense() {
        let conj = Conjugation::from_html(TABLE).unwrap();
        let table = conj.table().unwrap();
        assert_eq!(table.indicative.present.person("yo"), Some(&single("corro")));
        assert_eq!(
            table.indicative.present.person("tú / vos"),
            Some(&VerbForm::Alternatives(vec!["corres".into(), "corrés".into()]))
        );
        assert_eq!(table.indicative.copreterite.person("tú / vos"), Some(&single("corrías")));
        assert_eq!(table.indicative.preterite.person("yo"), Some(&single("corrí")));
        assert_eq!(
            table.subjunctive.copreterite.person("yo"),
            Some(&VerbForm::Alternatives(vec!["corriera".into(), "corriese".into()]))
        );
        assert_eq!(table.indicative.future, Slot::empty_persons());
    }

    #[test]
    fn imperative_takes_persons_directly() {
        let conj = Conjugation::from_html(TABLE).unwrap();
        let slot = conj.table().unwrap().get("Imperativo", None).unwrap();
        assert_eq!(
            slot.person("tú / vos"),
            Some(&VerbForm::Alternatives(vec!["corre".into(), "corré".into()]))
        );
    }

    #[test]
    fn lookup_by_labels() {
        let conj = Conjugation::from_html(TABLE).unwrap();
        let table = conj.table().unwrap();
        assert!(table.get("Indicativo", Some("Presente")).is_some());
        assert!(table.get("Indicativo", None).is_none());
        assert!(table.get("Condicional", Some("Presente")).is_none());
    }

    #[test]
    fn missing_table_gives_empty_conjugations() {
        let raw = r#"<div id="conjugacion"><article id="Z"><header>Conjugación de <b>ir</b></header></article></div>"#;
        let conj = Conjugation::from_html(raw).unwrap();
        assert!(conj.table().is_none());
        let compact = conj.compact().unwrap();
        assert_eq!(compact["conjugations"], serde_json::json!({}));
    }

    #[test]
    fn other_container_is_rejected() {
        assert!(Conjugation::try_from_html(r#"<div id="resultados"></div>"#).is_none());
    }

    #[test]
    fn representation_follows_page_labels() {
        let conj = Conjugation::from_html(TABLE).unwrap();
        let compact = conj.compact().unwrap();
        let c = &compact["conjugations"];
        assert_eq!(c["Formas no personales"]["Infinitivo"], "correr");
        assert_eq!(c["Indicativo"]["Presente"]["yo"], "corro");
        assert_eq!(c["Indicativo"]["Presente"]["tú / vos"], serde_json::json!(["corres", "corrés"]));
        assert_eq!(c["Indicativo"]["Futuro"], serde_json::json!({}));
        assert_eq!(c["Imperativo"]["tú / vos"][1], "corré");
        assert!(compact.get("id").is_none());

        let extended = conj.extended().unwrap();
        assert_eq!(extended["id"], "conjugacionB1");
        assert!(is_superset(&extended, &compact));
    }
}
