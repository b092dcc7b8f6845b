//! Decomposition of the Spanish dictionary's (DLE) result pages into typed
//! entities: abbreviations, words, sentences, definitions, lemmas, entries,
//! articles, conjugation tables and whole search results.
//!
//! Every entity decodes from a markup fragment and renders to a compact or
//! extended plain map through [`Representation`].

pub mod abbr;
pub mod article;
pub mod config;
pub mod conjugation;
pub mod definition;
pub mod entry;
pub mod error;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod lemma;
pub mod logger;
pub mod markup;
pub mod repr;
pub mod search;
pub mod sentence;
pub mod word;

pub use abbr::Abbreviation;
pub use article::Article;
pub use config::{DleConfig, LogLevel, DLE_MAIN_URL};
pub use conjugation::{Conjugation, ConjugationTable, Mood, Slot, VerbForm};
pub use definition::Definition;
pub use entry::{Entry, EntryKind, ARTICLE_ENTRY, SIMPLE_ENTRY};
pub use error::{DleError, Result};
pub use lemma::{ArticleLemma, EntryLemma, Lemma};
pub use repr::Representation;
pub use search::SearchResult;
pub use sentence::{Component, Sentence};
pub use word::Word;
