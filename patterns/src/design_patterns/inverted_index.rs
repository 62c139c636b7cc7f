//! Inverted index: every word mapped to the documents containing it, with
//! per-document frequencies.

use super::TOPIC;
use crate::support::{banner, section, sorted_by_key};
use dalgo_common::data_path;
use dalgo_core::{FlowContext, FlowRdd};
use std::collections::HashMap;
use std::path::Path;

pub const STOP_WORDS: [&str; 12] = [
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "of", "is",
];

pub const SEARCH_TERMS: [&str; 4] = ["fox", "bear", "honey", "jumped"];

/// `(document, frequency)` postings, most frequent first.
pub type Postings = Vec<(String, u64)>;

pub fn document_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map_or_else(|| path.to_string(), |name| name.to_string_lossy().into_owned())
}

/// Lowercased whitespace tokens minus stop words.
pub fn index_terms(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
}

/// `((word, document), 1)` for every indexed word of a document.
pub fn word_doc_pairs((document, content): (String, String)) -> Vec<((String, String), u64)> {
    index_terms(&content)
        .map(|word| ((word, document.clone()), 1))
        .collect()
}

fn sort_postings(mut postings: Postings) -> Postings {
    postings.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    postings
}

/// Build the index from `(path, content)` records.
pub fn build_inverted_index(documents: &FlowRdd<(String, String)>) -> FlowRdd<(String, Postings)> {
    documents
        .map(|(path, content)| (document_name(&path), content))
        .flat_map(word_doc_pairs)
        .reduce_by_key(|a, b| a + b)
        .map(|((word, document), frequency)| (word, (document, frequency)))
        .group_by_key()
        .map_values(sort_postings)
}

pub fn load_documents(ctx: &FlowContext) -> anyhow::Result<FlowRdd<(String, String)>> {
    Ok(ctx.whole_text_files(data_path(TOPIC, "documents"), 2)?)
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Inverted Index Design Pattern");
    let documents = load_documents(ctx)?;
    println!("Documents found: {}\n", documents.count()?);

    section("document contents");
    for (path, content) in documents.collect()? {
        println!(
            "  {}: {} words",
            document_name(&path),
            content.split_whitespace().count()
        );
    }
    println!();

    let index = sorted_by_key(build_inverted_index(&documents).collect()?);
    section("inverted index");
    for (word, postings) in &index {
        let postings: Vec<String> = postings.iter().map(|(doc, f)| format!("{doc}:{f}")).collect();
        println!("  {word:12} -> [{}]", postings.join(", "));
    }
    println!();

    section("search");
    let lookup: HashMap<String, Postings> = index.into_iter().collect();
    for term in SEARCH_TERMS {
        match lookup.get(term) {
            Some(postings) => {
                let docs: Vec<&str> = postings.iter().map(|(doc, _)| doc.as_str()).collect();
                println!("  \"{term}\": found in {docs:?}");
            }
            None => println!("  \"{term}\": not found"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_common::SessionConfig;
    use dalgo_core::create_session_with;

    fn postings(entries: &[(&str, u64)]) -> Postings {
        entries.iter().map(|(d, f)| (d.to_string(), *f)).collect()
    }

    #[test]
    fn test_terms_skip_stop_words() {
        let terms: Vec<String> = index_terms("The Bear and THE honey").collect();
        assert_eq!(terms, vec!["bear", "honey"]);
        assert_eq!(document_name("/tmp/docs/doc1.txt"), "doc1.txt");
    }

    #[test]
    fn test_index_over_documents() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let index: HashMap<String, Postings> = build_inverted_index(&load_documents(&ctx).unwrap())
            .collect()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(index["fox"], postings(&[("doc1.txt", 2), ("doc2.txt", 1)]));
        assert_eq!(index["bear"], postings(&[("doc2.txt", 2), ("doc3.txt", 1)]));
        assert_eq!(index["honey"], postings(&[("doc3.txt", 2), ("doc2.txt", 1)]));
        assert_eq!(index["woods"], postings(&[("doc1.txt", 1), ("doc2.txt", 1)]));
        assert!(!index.contains_key("jumped"));
        assert!(!index.contains_key("the"));
    }
}
