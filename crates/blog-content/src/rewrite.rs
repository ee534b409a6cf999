//! Content rewriting between the local and remote representations of a post

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Link destination replacements, old destination to new destination.
pub type LinkMap = BTreeMap<String, String>;

/// The discussion link the blog service appends to every rendered body.
static DISCUSS_FOOTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\n\n<a href="[^"\n]*">Discuss\.\.\.</a>\s*\z"#).unwrap());

/// Replace every `(old)` link destination with `(new)` in one pass.
///
/// Longer destinations are matched first, and replaced text is never
/// rescanned, so a new destination that equals another old one is left as is.
pub fn rewrite_links(content: &str, links: &LinkMap) -> String {
    if links.is_empty() {
        return content.to_string();
    }

    let mut keys: Vec<&String> = links.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    let alternation = keys
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");

    let Ok(pattern) = Regex::new(&format!(r"\(({alternation})\)")) else {
        // Only reachable if the escaped pattern exceeds the regex size limit.
        return links.iter().fold(content.to_string(), |acc, (old, new)| {
            acc.replace(&format!("({old})"), &format!("({new})"))
        });
    };

    pattern
        .replace_all(content, |caps: &regex::Captures<'_>| {
            let old = &caps[1];
            format!("({})", links.get(old).map(String::as_str).unwrap_or(old))
        })
        .into_owned()
}

/// Remove the trailing `Discuss...` link added by the blog service.
pub fn strip_discuss_footer(content: &str) -> String {
    DISCUSS_FOOTER.replace(content, "").into_owned()
}

/// Apply replacements to byte ranges of `content`.
///
/// An edit that overlaps one starting earlier is dropped; for two edits
/// with the same start the wider one wins. Ranges outside `content` or
/// off a character boundary are ignored.
pub fn replace_spans(content: &str, mut edits: Vec<(Range<usize>, &str)>) -> String {
    edits.sort_by(|(a, _), (b, _)| a.start.cmp(&b.start).then_with(|| b.end.cmp(&a.end)));

    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;
    for (span, replacement) in edits {
        if span.start < cursor || content.get(span.clone()).is_none() {
            continue;
        }
        out.push_str(&content[cursor..span.start]);
        out.push_str(replacement);
        cursor = span.end;
    }
    out.push_str(&content[cursor..]);
    out
}

/// Put the remote title back in front of the body as a level-1 heading.
pub fn prepend_title(content: &str, title: &str) -> String {
    if title.trim().is_empty() {
        return content.to_string();
    }
    format!("# {title}\n{content}")
}
