pub mod loaders;
pub mod paper_config;
pub mod pattern_codec;
pub mod question;
pub mod question_type;
pub mod subject;

pub use loaders::{load_catalog, load_question_bank};
pub use paper_config::{
    compute_total_marks, language_for_subject, Difficulty, PaperConfig, Pattern,
    QuestionTypeDetail,
};
pub use pattern_codec::{decode_pattern, encode_pattern};
pub use question::{
    AiQuestion, BankQuestion, Choices, Provenance, Question, QuestionId, SingleQuestion,
    AI_GENERATED_CHAPTER,
};
pub use question_type::QuestionType;
pub use subject::{SubjectCatalog, SubjectDetails};
