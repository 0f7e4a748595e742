pub mod embedder;

pub use embedder::{select_embedder, ExternalEmbedder, OllamaEmbedder};
