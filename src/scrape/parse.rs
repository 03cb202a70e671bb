//! Parsing of the loaded home page document into raw sections.
//!
//! The page is a flat list of section renderers inside one container node.
//! Each section carries its title in a label node, a composite accessible
//! label on the header (title plus optional subtitle), and its items in a
//! plain list. Everything here is pure; browse references come back
//! unresolved as [`LinkRef::Browse`].

use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};

use crate::error::{FreshetError, Result};
use crate::feed::{classify_link, LinkRef};

/// Separator between subtitle and title inside the composite header label.
const LABEL_SEPARATOR: char = '\u{b7}';

/// A parsed section whose items are classified but not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    pub title: String,
    pub subtitle: Option<String>,
    pub links: Vec<LinkRef>,
}

/// Parse the full document markup into raw sections.
///
/// `cap` limits how many sections are read off the page; `None` parses all
/// of them. A missing feed container or any section that does not match the
/// expected shape fails the whole attempt.
pub fn parse_sections(markup: &str, cap: Option<usize>) -> Result<Vec<RawSection>> {
    let document = Html::parse_document(markup);
    let container = feed_container(&document)?;

    container
        .children()
        .filter_map(ElementRef::wrap)
        .take(cap.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(index, section)| parse_section(section, index))
        .collect()
}

fn feed_container(document: &Html) -> Result<ElementRef<'_>> {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    let selector = SELECTOR.get_or_init(|| {
        Selector::parse("div#contents.style-scope.ytmusic-section-list-renderer").unwrap()
    });

    document
        .select(selector)
        .next()
        .ok_or_else(|| FreshetError::ParseShape("Feed section container not found".to_string()))
}

fn parse_section(section: ElementRef<'_>, index: usize) -> Result<RawSection> {
    let title = section_title(section, index)?;
    let label = section_label(section, index)?;
    let subtitle = derive_subtitle(&label, &title)?;
    let links = section_links(section, index)?;

    Ok(RawSection {
        title,
        subtitle,
        links,
    })
}

/// Read the section title, preferring an embedded link's text over the label
/// node's own text.
fn section_title(section: ElementRef<'_>, index: usize) -> Result<String> {
    static TITLE_SELECTOR: OnceLock<Selector> = OnceLock::new();
    static LINK_SELECTOR: OnceLock<Selector> = OnceLock::new();
    let title_selector =
        TITLE_SELECTOR.get_or_init(|| Selector::parse("div#details > yt-formatted-string").unwrap());
    let link_selector = LINK_SELECTOR.get_or_init(|| Selector::parse("a").unwrap());

    let label_node = section.select(title_selector).next().ok_or_else(|| {
        FreshetError::ParseShape(format!("Section {}: title node not found", index))
    })?;

    let title = match label_node.select(link_selector).next() {
        Some(link) => link.text().collect::<String>(),
        None => label_node.text().collect::<String>(),
    };
    let title = title.trim().to_string();

    if title.is_empty() {
        return Err(FreshetError::ParseShape(format!(
            "Section {}: empty title",
            index
        )));
    }
    Ok(title)
}

/// Read the composite accessible label off the section header.
fn section_label(section: ElementRef<'_>, index: usize) -> Result<String> {
    static HEADER_SELECTOR: OnceLock<Selector> = OnceLock::new();
    let header_selector =
        HEADER_SELECTOR.get_or_init(|| Selector::parse("h2#content-group").unwrap());

    section
        .select(header_selector)
        .next()
        .and_then(|header| header.value().attr("aria-label"))
        .map(str::to_string)
        .ok_or_else(|| {
            FreshetError::ParseShape(format!(
                "Section {}: header accessible label not found",
                index
            ))
        })
}

/// Recover the subtitle from the composite header label.
///
/// The label is either the title alone (no subtitle) or the subtitle and the
/// title joined by a separator. The title must sit at the very end of the
/// label; a label that does not end with it is a parse error rather than a
/// cue to start guessing with a substring search.
fn derive_subtitle(label: &str, title: &str) -> Result<Option<String>> {
    if label == title {
        return Ok(None);
    }

    let Some(head) = label.strip_suffix(title) else {
        return Err(FreshetError::ParseShape(format!(
            "Section label {:?} does not end with title {:?}",
            label, title
        )));
    };

    let subtitle = head.trim_end_matches(|c: char| c == LABEL_SEPARATOR || c.is_whitespace());
    if subtitle.is_empty() {
        return Err(FreshetError::ParseShape(format!(
            "Section label {:?} holds no subtitle ahead of title {:?}",
            label, title
        )));
    }
    Ok(Some(subtitle.to_string()))
}

fn section_links(section: ElementRef<'_>, index: usize) -> Result<Vec<LinkRef>> {
    static ITEMS_SELECTOR: OnceLock<Selector> = OnceLock::new();
    static ANCHOR_SELECTOR: OnceLock<Selector> = OnceLock::new();
    let items_selector = ITEMS_SELECTOR.get_or_init(|| Selector::parse("ul#items").unwrap());
    let anchor_selector = ANCHOR_SELECTOR.get_or_init(|| Selector::parse("a").unwrap());

    let list = section.select(items_selector).next().ok_or_else(|| {
        FreshetError::ParseShape(format!("Section {}: item list not found", index))
    })?;

    let mut links = Vec::new();
    for (item_index, item) in list.children().filter_map(ElementRef::wrap).enumerate() {
        let href = item
            .select(anchor_selector)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
            .ok_or_else(|| {
                FreshetError::ParseShape(format!(
                    "Section {}: item {} has no link",
                    index, item_index
                ))
            })?;
        links.push(classify_link(href)?);
    }
    Ok(links)
}
