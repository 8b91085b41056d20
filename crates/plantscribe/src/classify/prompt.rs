//! Prompt construction for classification delegates

use crate::core::{DiagramType, RequestContext};

pub const SYSTEM_PROMPT: &str = "You decide which UML diagram type a software description asks for, \
or ask the user one clarifying question when it cannot be decided yet.";

const TEXT_OPEN: &str = "Text:\n\"\"\"\n";
const TEXT_CLOSE: &str = "\n\"\"\"";

/// Label vocabulary, recent history and the description itself
pub fn build_prompt(text: &str, context: &RequestContext, history_limit: usize) -> String {
    let mut out = String::with_capacity(text.len() + 1024);

    out.push_str("Classify the text into exactly one of these labels:\n");
    for diagram_type in DiagramType::all() {
        out.push_str("- ");
        out.push_str(diagram_type.label());
        out.push_str(": ");
        out.push_str(diagram_type.description());
        out.push('\n');
    }
    out.push_str(
        "\nAnswer only with JSON using the keys:\n\
         - resolved: true|false (whether the type can be decided now)\n\
         - diagram_type: one of the labels above, or null\n\
         - confidence: a number between 0 and 1\n\
         - question: when resolved is false, one clear question for the user\n\n",
    );

    let history = context.recent(history_limit);
    if !history.is_empty() {
        out.push_str("Previous messages, oldest first:\n");
        for entry in history {
            match entry.intent {
                Some(intent) => out.push_str(&format!("- [{}] {}\n", intent, entry.text)),
                None => out.push_str(&format!("- {}\n", entry.text)),
            }
        }
        out.push('\n');
    }

    out.push_str(TEXT_OPEN);
    out.push_str(text);
    out.push_str(TEXT_CLOSE);
    out.push_str(
        "\n\nExample of a valid answer:\n\
         {\"resolved\": true, \"diagram_type\": \"class\", \"confidence\": 0.9, \"question\": null}\n",
    );
    out
}

/// The description embedded in a prompt from [`build_prompt`]
///
/// Prompts built elsewhere are returned whole.
pub fn description_of(prompt: &str) -> &str {
    let Some(start) = prompt.find(TEXT_OPEN).map(|i| i + TEXT_OPEN.len()) else {
        return prompt;
    };
    match prompt[start..].rfind(TEXT_CLOSE) {
        Some(end) => &prompt[start..start + end],
        None => &prompt[start..],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HistoryEntry;

    #[test]
    fn test_prompt_lists_every_label() {
        let prompt = build_prompt("una clase Usuario", &RequestContext::new(), 5);
        for diagram_type in DiagramType::all() {
            assert!(prompt.contains(&format!("- {}:", diagram_type.label())));
        }
        assert!(!prompt.contains("Previous messages"));
    }

    #[test]
    fn test_prompt_keeps_only_recent_history() {
        let context = RequestContext::new()
            .with_history(HistoryEntry::new("first"))
            .with_history(HistoryEntry::classified("second", DiagramType::Class))
            .with_history(HistoryEntry::new("third"));
        let prompt = build_prompt("ahora añade Pedido", &context, 2);
        assert!(!prompt.contains("- first"));
        assert!(prompt.contains("- [class] second"));
        assert!(prompt.contains("- third"));
    }

    #[test]
    fn test_description_round_trip() {
        let text = "clase Usuario con \"comillas\"\ny dos líneas";
        let prompt = build_prompt(text, &RequestContext::new(), 5);
        assert_eq!(description_of(&prompt), text);
        assert_eq!(description_of("just text"), "just text");
    }
}
