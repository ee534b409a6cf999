//! Title and image discovery in Markdown posts

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::{Path, PathBuf};

use blog_fs::{clean, io, is_image_file, sanitize_relative};
use chrono::{DateTime, Utc};
use pulldown_cmark::{Event, HeadingLevel, LinkType, Options, Parser, Tag};
use url::Url;

use crate::Result;
use crate::rewrite::LinkMap;

/// An image referenced by a local post and present on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    /// Link destination as parsed from the Markdown source.
    pub reference: String,
    /// Byte range of the destination in the source, angle brackets included.
    ///
    /// For reference-style images this points into the link definition.
    pub span: Option<Range<usize>>,
    /// Cleaned path relative to the blog root; the image's identity.
    pub rel_path: String,
    pub full_path: PathBuf,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// Result of scanning one local post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedPost {
    /// Text of the first level-1 heading, or empty.
    pub title: String,
    /// Source lines of that heading, line ending included.
    pub title_span: Option<Range<usize>>,
    /// Referenced images that exist under the root, in document order.
    pub images: Vec<LocalImage>,
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Scan a post for its title and the local images it references.
///
/// Image destinations with a scheme, without an image extension, or with an
/// absolute path are ignored, as are images missing from disk. A destination
/// that tries to leave `root` fails the whole scan.
pub fn scan(markdown: &str, root: &Path) -> Result<ScannedPost> {
    let mut title: Option<(String, Range<usize>)> = None;
    let mut found = Vec::new();

    let mut events = Parser::new_ext(markdown, parser_options()).into_offset_iter();
    for (event, range) in events.by_ref() {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) if title.is_none() => {
                let text = heading_text(&markdown[range.clone()]);
                title = Some((text, line_span(markdown, range)));
            }
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                id,
                ..
            }) => found.push((link_type, dest_url.to_string(), id.to_string(), range)),
            _ => {}
        }
    }

    let definitions = events.reference_definitions();
    let mut images = Vec::new();
    for (link_type, destination, id, range) in found {
        let span = match link_type {
            LinkType::Inline => inline_destination(markdown, range),
            LinkType::Reference | LinkType::Collapsed | LinkType::Shortcut => definitions
                .get(&id)
                .and_then(|def| definition_destination(markdown, def.span.clone())),
            _ => None,
        };
        if let Some(image) = local_image(&destination, span, root)? {
            images.push(image);
        }
    }

    let (title, title_span) = match title {
        Some((text, span)) => (text, Some(span)),
        None => (String::new(), None),
    };
    Ok(ScannedPost {
        title,
        title_span,
        images,
    })
}

fn local_image(
    destination: &str,
    span: Option<Range<usize>>,
    root: &Path,
) -> Result<Option<LocalImage>> {
    if !is_image_file(destination) || Url::parse(destination).is_ok() {
        return Ok(None);
    }

    let Some(rel_path) = sanitize_relative(&clean(destination), true)? else {
        tracing::debug!(destination, "Skipping absolute image path");
        return Ok(None);
    };

    let full_path = root.join(&rel_path);
    match io::stamp_if_file(&full_path)? {
        Some(stamp) => Ok(Some(LocalImage {
            reference: destination.to_string(),
            span,
            rel_path,
            full_path,
            size: stamp.size,
            modified: stamp.modified,
        })),
        None => {
            tracing::debug!(destination, "Referenced image not found on disk");
            Ok(None)
        }
    }
}

/// Widen a block range to whole source lines, trailing line ending included.
fn line_span(source: &str, range: Range<usize>) -> Range<usize> {
    let line_start = source[..range.start].rfind('\n').map_or(0, |i| i + 1);
    let start = if source[line_start..range.start].trim().is_empty() {
        line_start
    } else {
        range.start
    };

    let end = if source[..range.end].ends_with('\n') {
        range.end
    } else {
        source[range.end..]
            .find('\n')
            .map_or(source.len(), |i| range.end + i + 1)
    };
    start..end
}

/// Offset just past the `]` closing the bracketed label that opens `range`.
fn label_end(source: &str, range: &Range<usize>) -> Option<usize> {
    let block = source.get(range.clone())?;
    let mut depth = 0usize;
    let mut chars = block.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(range.start + i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Destination of an inline `![alt](dest "title")` image.
fn inline_destination(source: &str, range: Range<usize>) -> Option<Range<usize>> {
    let after = label_end(source, &range)?;
    if !source[after..].starts_with('(') {
        return None;
    }
    destination_span(source, after + 1).filter(|span| span.end <= range.end)
}

/// Destination of a `[label]: dest "title"` definition.
fn definition_destination(source: &str, range: Range<usize>) -> Option<Range<usize>> {
    let after = label_end(source, &range)?;
    if !source[after..].starts_with(':') {
        return None;
    }
    destination_span(source, after + 1).filter(|span| span.end <= range.end)
}

/// The link destination token starting at `from`, after optional whitespace.
fn destination_span(source: &str, from: usize) -> Option<Range<usize>> {
    let rest = source.get(from..)?;
    let start = from + (rest.len() - rest.trim_start().len());
    let tail = &source[start..];

    if tail.starts_with('<') {
        let close = tail.find('>')?;
        return Some(start..start + close + 1);
    }

    let mut depth = 0usize;
    let mut chars = tail.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '(' => depth += 1,
            ')' if depth == 0 => return (i > 0).then_some(start..start + i),
            ')' => depth -= 1,
            c if c.is_whitespace() => return (i > 0).then_some(start..start + i),
            _ => {}
        }
    }
    (!tail.is_empty()).then_some(start..source.len())
}

/// Extract the heading text from the source of a heading block.
///
/// ATX headings lose their opening and closing `#` runs; setext headings
/// lose the underline. Inline markup is kept as written so the title line
/// can be found again in the source.
fn heading_text(block: &str) -> String {
    let trimmed = block.trim();

    if trimmed.starts_with('#') {
        let line = trimmed.lines().next().unwrap_or_default();
        let text = line.trim_start_matches('#').trim();
        let without_closing = text.trim_end_matches('#');
        if without_closing.len() != text.len()
            && (without_closing.is_empty() || without_closing.ends_with([' ', '\t']))
        {
            return without_closing.trim_end().to_string();
        }
        return text.to_string();
    }

    let lines: Vec<&str> = trimmed.lines().collect();
    let content = match lines.split_last() {
        Some((_underline, content)) if !content.is_empty() => content,
        _ => &lines[..],
    };
    content
        .iter()
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Walk the images of remotely sourced Markdown and collect link replacements.
///
/// `resolve` is asked once per distinct image destination; it returns the
/// local path to substitute, or `None` to leave the link alone.
pub fn scan_for_download<F, E>(markdown: &str, mut resolve: F) -> std::result::Result<LinkMap, E>
where
    F: FnMut(&str) -> std::result::Result<Option<String>, E>,
{
    let mut links = BTreeMap::new();
    let mut seen = Vec::new();

    for event in Parser::new_ext(markdown, parser_options()) {
        let Event::Start(Tag::Image { dest_url, .. }) = event else {
            continue;
        };
        let destination = dest_url.to_string();
        if !is_image_file(&destination) || seen.contains(&destination) {
            continue;
        }

        if let Some(local) = resolve(&destination)? {
            links.insert(destination.clone(), local);
        }
        seen.push(destination);
    }

    Ok(links)
}
