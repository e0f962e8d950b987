//! Classification prompt assembly for labelprep.
//!
//! A prompt is the static instruction text, the category's guidance ontology
//! serialized deterministically, and one segment's text, substituted into a
//! fixed three-section template. Nothing here talks to a model.

pub mod assemble;
pub mod ontology;
pub mod template;

pub use assemble::{
    CLASSIFICATION_TEMPLATE, PromptAssembler, PromptMessage, Role, assemble, load_instruction,
};
pub use ontology::{load_guidance, serialize_guidance};
pub use template::PromptTemplate;
