//! TF-IDF text features, once with the hashing trick and once with a
//! learned vocabulary.

use super::{load_frame, show_frame};
use crate::support::{banner, section};
use dalgo_core::FlowContext;
use dalgo_mllib_local::{
    CountVectorizer, Estimator, FeatureFrame, HashingTF, Idf, MlResult, Pipeline,
    PipelineStage, Tokenizer, Transformer,
};

pub const HASH_FEATURES: usize = 128;
pub const VOCABULARY_PREVIEW: usize = 20;

/// Tokenizer -> HashingTF -> IDF.
pub fn hashing_tfidf(documents: &FeatureFrame) -> MlResult<FeatureFrame> {
    let pipeline = Pipeline::new(vec![
        PipelineStage::transformer(Tokenizer::new("text", "words")),
        PipelineStage::transformer(HashingTF::new("words", "raw_features", HASH_FEATURES)?),
        PipelineStage::estimator(Idf::new("raw_features", "tfidf_features")),
    ]);
    pipeline.fit(documents)?.transform(documents)
}

/// Tokenizer -> CountVectorizer -> IDF; also returns the fitted vocabulary.
pub fn count_tfidf(documents: &FeatureFrame) -> MlResult<(Vec<String>, FeatureFrame)> {
    let words = Tokenizer::new("text", "words").transform(documents)?;
    let vectorizer = CountVectorizer::new("words", "raw_features").fit(&words)?;
    let counted = vectorizer.transform(&words)?;
    let idf = Idf::new("raw_features", "tfidf_features").fit(&counted)?;
    Ok((vectorizer.vocabulary().to_vec(), idf.transform(&counted)?))
}

fn print_comparison() {
    println!("| Property              | HashingTF           | CountVectorizer     |");
    println!("| --------------------- | ------------------- | ------------------- |");
    println!("| Vector size           | Fixed (numFeatures) | Vocabulary size     |");
    println!("| Vocabulary needed     | No                  | Yes (built at fit)  |");
    println!("| Hash collisions       | Possible            | None                |");
    println!("| Inverse mapping       | Not possible        | Term <-> index      |");
    println!("| Best for              | Large, streaming    | Moderate, offline   |");
    println!();
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Text Feature Engineering: TF-IDF");
    let documents = load_frame(ctx, "documents.csv").await?;
    println!("Input documents:");
    show_frame(ctx, &documents, &["label", "text"], 20).await?;

    section("TF-IDF with HashingTF");
    let hashed = hashing_tfidf(&documents)?;
    println!("Tokenized words:");
    show_frame(ctx, &hashed, &["label", "words"], 20).await?;
    println!("TF-IDF feature vectors (HashingTF, {HASH_FEATURES} dimensions):");
    show_frame(ctx, &hashed, &["label", "tfidf_features"], 20).await?;

    section("TF-IDF with CountVectorizer");
    let (vocabulary, counted) = count_tfidf(&documents)?;
    println!("Vocabulary ({} terms):", vocabulary.len());
    for (i, term) in vocabulary.iter().take(VOCABULARY_PREVIEW).enumerate() {
        println!("  [{i}] {term}");
    }
    println!(
        "\nTF-IDF feature vectors (CountVectorizer, {} dimensions):",
        vocabulary.len()
    );
    show_frame(ctx, &counted, &["label", "tfidf_features"], 20).await?;

    section("Comparison: HashingTF vs CountVectorizer");
    print_comparison();
    Ok(())
}
