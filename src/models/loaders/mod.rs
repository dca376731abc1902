pub mod toml_loader;

pub use toml_loader::{load_catalog, load_question_bank, parse_catalog, parse_question_bank};
