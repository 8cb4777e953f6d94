pub mod language;
pub mod page;
pub mod progress;
pub mod unit;

pub use language::Language;
pub use page::PageImage;
pub use progress::ProgressSnapshot;
pub use unit::Unit;
