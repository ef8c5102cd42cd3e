// Shared prompt fragments.
// Each agent defines its own templates in agents/prompts.rs; this file holds
// the cross-cutting pieces appended to every system prompt.

/// Appended to every system prompt so the model answers through the tool.
pub const STRUCTURED_OUTPUT_INSTRUCTION: &str = "\
    Respond ONLY by calling the provided tool with arguments that satisfy its schema exactly. \
    Every numeric score must stay inside its declared range. \
    Every enumerated field must use one of the listed values verbatim. \
    Do NOT include text outside the tool call.";

/// Joins an agent's system prompt with the structured-output instruction.
pub fn with_structured_output(system: &str) -> String {
    format!("{system}\n\n{STRUCTURED_OUTPUT_INSTRUCTION}")
}
