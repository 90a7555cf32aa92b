//! History windowing: the most recent turns, formatted for the prompt.

use crate::session::{Role, Turn};

/// Select the last `max_turns` turns in original order and format them as
/// alternating `User:` / `Assistant:` lines. Empty input yields an empty
/// block; the prompt builder then omits the conversation section entirely.
pub fn window_history(turns: &[Turn], max_turns: usize) -> String {
    let start = turns.len().saturating_sub(max_turns);
    turns[start..]
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            format!("{}: {}", speaker, turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
