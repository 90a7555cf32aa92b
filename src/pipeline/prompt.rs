//! Prompt assembly: preamble, context, optional history, question.

/// Fixed instruction preamble. The wording is a contract: it directs the
/// model to answer only from the supplied context and to say so when the
/// context does not contain the answer.
const PREAMBLE: &str =
    "You are a helpful news assistant. Use the following context to answer the question.";

const CLOSING: &str = "Answer based on the context provided. If the answer isn't in the context, \
say so. Keep your answer concise and relevant.";

/// Compose the generation payload in fixed order: preamble, context block,
/// optional previous-conversation block, current question. When the history
/// block is empty the conversation section is omitted entirely rather than
/// rendered as an empty header.
pub fn build_prompt(context: &str, history: &str, question: &str) -> String {
    let history_section = if history.is_empty() {
        String::new()
    } else {
        format!("Previous conversation:\n{}\n\n", history)
    };

    format!(
        "{}\n\nContext from news articles:\n{}\n\n{}User Question: {}\n\n{}",
        PREAMBLE, context, history_section, question, CLOSING
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_the_grounding_instructions_verbatim() {
        let prompt = build_prompt("[Document 1]", "", "what happened?");
        assert!(prompt.starts_with(
            "You are a helpful news assistant. Use the following context to answer the question."
        ));
        assert!(prompt.contains("If the answer isn't in the context, say so."));
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let prompt = build_prompt("CTX", "User: hi\nAssistant: hello", "next?");
        let ctx = prompt.find("Context from news articles:\nCTX").unwrap();
        let hist = prompt.find("Previous conversation:\nUser: hi").unwrap();
        let question = prompt.find("User Question: next?").unwrap();
        assert!(ctx < hist && hist < question);
    }

    #[test]
    fn empty_history_omits_the_conversation_section() {
        let prompt = build_prompt("CTX", "", "next?");
        assert!(!prompt.contains("Previous conversation:"));
        assert!(prompt.contains("Context from news articles:\nCTX\n\nUser Question: next?"));
    }
}
