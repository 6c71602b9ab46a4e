/*!
 * Prompt templates for document translation.
 *
 * The templates instruct the model to behave as a professional translator
 * and to return nothing but the translated text, so the response can be
 * substituted into the document verbatim.
 */

/// System prompt template for document translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt for document translation.
    pub const DOCUMENT_TRANSLATOR: &'static str = "\
You are a professional translator. Translate the text you are given from \
{source_language} to {target_language}. Maintain the same tone, style, and \
formatting of the original text. Only return the translated text without any \
additional comments or explanations.";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default document translator template.
    pub fn document_translator() -> Self {
        Self::new(Self::DOCUMENT_TRANSLATOR)
    }

    /// Render the template with the given language names.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::document_translator()
    }
}

/// Build the user message carrying the text to translate.
///
/// The original text is quoted and labelled with its language name, followed
/// by an optional context line and the target-language lead-in the model
/// completes.
pub fn build_user_prompt(
    text: &str,
    source_name: &str,
    target_name: &str,
    context: Option<&str>,
) -> String {
    let context_str = context
        .map(|c| format!("\nContext: {}", c))
        .unwrap_or_default();

    format!(
        "Original text ({source_name}):\n\"{text}\"{context_str}\n\nTranslation ({target_name}):"
    )
}
