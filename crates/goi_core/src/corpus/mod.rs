pub mod builder;
pub mod chunking;
pub mod model;
mod templates;

pub use builder::CorpusBuilder;
pub use chunking::{chunk_text, split_sentences};
pub use model::{kind, Chunk, Corpus, MetaValue};
