use ego_tree::NodeRef;
use regex::Regex;
use scraper::{node::Node, Html};
use std::sync::OnceLock;

/// Minimum number of sentence units per chunk once a document has at least
/// this many.
pub const MIN_SENTENCES_PER_CHUNK: usize = 10;

fn terminal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]").expect("Invalid regex"))
}

/// Extracts plain text from a story document: newlines become spaces, tables
/// are dropped whole, tags are stripped.
pub fn strip_markup(doc_html: &str) -> String {
    let without_newlines = doc_html.replace(['\n', '\r'], " ");
    let fragment = Html::parse_fragment(&without_newlines);

    let mut clean_text = String::new();
    collect_text(*fragment.root_element(), &mut clean_text);
    clean_text
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text),
            Node::Element(element) if element.name() == "table" => {}
            Node::Element(_) => collect_text(child, out),
            _ => {}
        }
    }
}

/// Splits cleaned text into sentence spans. Every span ends right after a
/// terminal punctuation character; a tail with no terminal punctuation is the
/// final span unless it is pure whitespace, which folds into the sentence
/// before it. The spans partition the input exactly.
fn sentence_spans(clean_text: &str) -> Vec<&str> {
    let mut ends: Vec<usize> = terminal_regex()
        .find_iter(clean_text)
        .map(|terminal| terminal.end())
        .collect();

    match ends.last_mut() {
        Some(last_end) if clean_text[*last_end..].trim().is_empty() => {
            *last_end = clean_text.len();
        }
        _ => {
            if !clean_text.is_empty() {
                ends.push(clean_text.len());
            }
        }
    }

    let mut spans = Vec::with_capacity(ends.len());
    let mut start = 0;
    for end in ends {
        spans.push(&clean_text[start..end]);
        start = end;
    }
    spans
}

/// Sizes of the sentence groups for `total` sentence units: fewer than the
/// minimum collapses into one group, otherwise the remainder is spread over
/// the leading groups so none falls below the minimum.
fn group_sizes(total: usize) -> Vec<usize> {
    if total == 0 {
        return Vec::new();
    }
    if total < MIN_SENTENCES_PER_CHUNK {
        return vec![total];
    }

    let group_count = total / MIN_SENTENCES_PER_CHUNK;
    let mut remainder = total % MIN_SENTENCES_PER_CHUNK;
    let extra = remainder.div_ceil(group_count);

    let mut sizes = Vec::with_capacity(group_count);
    for _ in 0..group_count {
        let bonus = remainder.min(extra);
        sizes.push(MIN_SENTENCES_PER_CHUNK + bonus);
        remainder -= bonus;
    }

    sizes
}

/// Chunks a story document into bounded groups of sentences.
///
/// The returned chunks are a lossless, order-preserving partition of the
/// cleaned text: concatenating them reproduces `strip_markup(doc_html)`
/// exactly. Chunking is deterministic, so an unchanged document always yields
/// the same chunk boundaries and indices.
pub fn chunk_document(doc_html: &str) -> Vec<String> {
    let clean_text = strip_markup(doc_html);
    if clean_text.trim().is_empty() {
        return Vec::new();
    }

    let spans = sentence_spans(&clean_text);
    let mut chunks = Vec::new();
    let mut cursor = 0;

    for size in group_sizes(spans.len()) {
        let chunk = spans[cursor..cursor + size].concat();
        cursor += size;
        chunks.push(chunk);
    }

    chunks
}
