pub mod chunker;
pub mod proofreader;
pub mod translator;

pub use chunker::chunk_text;
pub use proofreader::Proofreader;
pub use translator::Translator;
