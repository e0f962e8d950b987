//! Classification prompt assembly: instructions + ontology + one segment.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use labelprep_shared::{LabelPrepError, Result};

use crate::ontology::{load_guidance, serialize_guidance};
use crate::template::PromptTemplate;

/// The fixed three-section classification message.
pub const CLASSIFICATION_TEMPLATE: &str = "{instruction_text}

### Ontology Codes
{guidance_string}

### Command
Please classify the following text segment using the provided guidance:
Segment Text: \"{segment_text}\"
";

/// Placeholders every classification template must be able to fill.
const VARIABLES: [&str; 3] = ["instruction_text", "guidance_string", "segment_text"];

/// Who a chat message is from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// A rendered chat message, ready for an external model client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

/// Renders classification prompts from a template.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    template: PromptTemplate,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self {
            template: PromptTemplate::parse(CLASSIFICATION_TEMPLATE)
                .expect("built-in classification template parses"),
        }
    }
}

impl PromptAssembler {
    /// Use a custom template. It may only reference `instruction_text`,
    /// `guidance_string` and `segment_text`.
    pub fn with_template(source: &str) -> Result<Self> {
        let template = PromptTemplate::parse(source)?;
        if let Some(unknown) = template.variables().into_iter().find(|v| !VARIABLES.contains(v)) {
            return Err(LabelPrepError::template(format!(
                "unknown placeholder '{unknown}', expected one of {}",
                VARIABLES.join(", ")
            )));
        }
        Ok(Self { template })
    }

    /// Fill the template from already-loaded parts.
    pub fn render(
        &self,
        instruction_text: &str,
        guidance: &Value,
        segment_text: &str,
    ) -> Result<PromptMessage> {
        let guidance_string = serialize_guidance(guidance)?;
        let content = self.template.render(&[
            ("instruction_text", instruction_text),
            ("guidance_string", guidance_string.as_str()),
            ("segment_text", segment_text),
        ])?;

        Ok(PromptMessage {
            role: Role::User,
            content,
        })
    }

    /// Load the instruction and guidance files and render a prompt for `segment_text`.
    #[instrument(skip_all, fields(guidance = %guidance_path.display(), instruction = %instruction_path.display()))]
    pub fn assemble(
        &self,
        segment_text: &str,
        guidance_path: &Path,
        instruction_path: &Path,
    ) -> Result<PromptMessage> {
        let instruction_text = load_instruction(instruction_path)?;
        let guidance = load_guidance(guidance_path)?;
        let message = self.render(&instruction_text, &guidance, segment_text)?;

        debug!(chars = message.content.chars().count(), "prompt assembled");
        Ok(message)
    }
}

/// Read instruction text verbatim.
pub fn load_instruction(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| LabelPrepError::missing_resource(path, e))
}

/// Assemble a prompt with the built-in classification template.
pub fn assemble(segment_text: &str, guidance_path: &Path, instruction_path: &Path) -> Result<PromptMessage> {
    PromptAssembler::default().assemble(segment_text, guidance_path, instruction_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "labelprep-prompt-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_fixtures(dir: &Path, guidance: &str) -> (PathBuf, PathBuf) {
        let instruction = dir.join("prompt.txt");
        let guidance_path = dir.join("Safety_guidance.json");
        std::fs::write(&instruction, "Classify.").unwrap();
        std::fs::write(&guidance_path, guidance).unwrap();
        (guidance_path, instruction)
    }

    #[test]
    fn renders_full_message() {
        let tmp = temp_dir();
        let (guidance, instruction) = write_fixtures(&tmp, r#"[{"code":"A","desc":"Alert"}]"#);

        let message = assemble("stop", &guidance, &instruction).unwrap();
        assert_eq!(message.role, Role::User);
        assert_eq!(
            message.content,
            "Classify.\n\
             \n\
             ### Ontology Codes\n\
             [\n{\n\"code\": \"A\",\n\"desc\": \"Alert\"\n}\n]\n\
             \n\
             ### Command\n\
             Please classify the following text segment using the provided guidance:\n\
             Segment Text: \"stop\"\n"
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn non_ascii_guidance_is_not_escaped() {
        let tmp = temp_dir();
        let (guidance, instruction) =
            write_fixtures(&tmp, r#"[{"code":"A","desc":"Alerte générale – 警报"}]"#);

        let message = assemble("stop", &guidance, &instruction).unwrap();
        assert!(message.content.contains("Segment Text: \"stop\""));
        assert!(message.content.contains("\"code\": \"A\""));
        assert!(message.content.contains("Alerte générale – 警报"));
        assert!(!message.content.contains("\\u"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn segment_text_is_inserted_verbatim() {
        let assembler = PromptAssembler::default();
        let guidance: Value = serde_json::from_str("[]").unwrap();
        let message = assembler
            .render("I", &guidance, "say \"{guidance_string}\"")
            .unwrap();
        assert!(message.content.ends_with("Segment Text: \"say \"{guidance_string}\"\"\n"));
    }

    #[test]
    fn missing_instruction_is_missing_resource() {
        let tmp = temp_dir();
        let (guidance, _) = write_fixtures(&tmp, "[]");

        let err = assemble("stop", &guidance, &tmp.join("nope.txt")).unwrap_err();
        assert!(matches!(err, LabelPrepError::MissingResource { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_guidance_is_missing_resource() {
        let tmp = temp_dir();
        let (_, instruction) = write_fixtures(&tmp, "[]");

        let err = assemble("stop", &tmp.join("nope.json"), &instruction).unwrap_err();
        assert!(matches!(err, LabelPrepError::MissingResource { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn invalid_guidance_is_malformed() {
        let tmp = temp_dir();
        let (guidance, instruction) = write_fixtures(&tmp, "[{\"code\": ");

        let err = assemble("stop", &guidance, &instruction).unwrap_err();
        assert!(matches!(err, LabelPrepError::MalformedGuidance { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn custom_template_rejects_unknown_placeholders() {
        assert!(PromptAssembler::with_template("{segment_text} {extra}").is_err());

        let assembler = PromptAssembler::with_template("<{segment_text}>").unwrap();
        let message = assembler
            .render("unused", &Value::Array(vec![]), "go")
            .unwrap();
        assert_eq!(message.content, "<go>");
    }

    #[test]
    fn message_serializes_for_chat_clients() {
        let message = PromptMessage {
            role: Role::User,
            content: "hi".into(),
        };
        assert_eq!(
            serde_json::to_string(&message).unwrap(),
            r#"{"role":"user","content":"hi"}"#
        );
    }
}
