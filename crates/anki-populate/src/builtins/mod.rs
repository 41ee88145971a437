mod concat_fields;
mod copy_field;
mod furigana;
mod jap_llm;
mod remove_brackets;

pub use concat_fields::ConcatFieldsPopulator;
pub use copy_field::CopyFieldPopulator;
pub use furigana::FuriganaPopulator;
pub use jap_llm::JapLlmSentenceAnalyzerPopulator;
pub use remove_brackets::RemoveTextInParenthesesPopulator;
