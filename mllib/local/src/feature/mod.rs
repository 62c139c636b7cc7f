//! Feature transformers and estimators.

mod bucketing;
mod encoding;
mod scaling;
mod text;

pub use bucketing::{Bucketizer, QuantileDiscretizer};
pub use encoding::{
    OneHotEncoder, OneHotEncoderModel, StringIndexer, StringIndexerModel, VectorAssembler,
};
pub use scaling::{MinMaxScaler, MinMaxScalerModel, Normalizer};
pub use text::{CountVectorizer, CountVectorizerModel, HashingTF, Idf, IdfModel, Tokenizer, murmur3_32};
