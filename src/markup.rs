//! Fragment parsing and the small element helpers every decoder shares.
//!
//! The dictionary marks meaning through tag names and the first letter of the
//! first CSS class, so most lookups here are about those two things.

use scraper::{ElementRef, Html, Selector};
use unicode_normalization::UnicodeNormalization;

use crate::error::{DleError, Result};

/// Parse a markup fragment. Fails on blank input or when the fragment holds
/// no element at all.
pub fn parse_fragment(raw: &str) -> Result<Html> {
    if raw.trim().is_empty() {
        return Err(DleError::EmptyInput);
    }
    let html = Html::parse_fragment(raw);
    if first_element(&html).is_none() {
        return Err(DleError::EmptyInput);
    }
    Ok(html)
}

/// The first top-level element of a parsed fragment.
pub fn first_element(html: &Html) -> Option<ElementRef<'_>> {
    html.root_element().children().find_map(ElementRef::wrap)
}

/// `el` itself when it matches `selector`, otherwise its first matching descendant.
pub fn first_of<'a>(el: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    if selector.matches(&el) {
        Some(el)
    } else {
        el.select(selector).next()
    }
}

/// Direct element children, in document order.
pub fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

pub fn tag_name<'a>(el: &ElementRef<'a>) -> &'a str {
    el.value().name()
}

/// First token of the `class` attribute.
pub fn first_class<'a>(el: &ElementRef<'a>) -> Option<&'a str> {
    el.value().attr("class")?.split_whitespace().next()
}

/// Lowercased first letter of the first class, the marker the page layout keys on.
pub fn class_letter(el: &ElementRef<'_>) -> Option<char> {
    first_class(el)?
        .chars()
        .next()
        .map(|c| c.to_ascii_lowercase())
}

/// All descendant text, NFC-normalized.
pub fn text_of(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().nfc().collect()
}

pub fn normalize(s: &str) -> String {
    s.nfc().collect()
}
