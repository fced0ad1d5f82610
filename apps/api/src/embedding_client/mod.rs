// Embedding backends behind `matching::EmbeddingProvider`. Which one runs is decided once at startup
// from EMBEDDING_BACKEND; the scorer never switches backends on failure.

pub mod hashed;
pub mod http;

pub use hashed::HashedTokenEmbedder;
pub use http::HttpEmbeddingProvider;
