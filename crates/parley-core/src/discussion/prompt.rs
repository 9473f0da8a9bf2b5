//! Prompt text for agent turns.

use std::fmt::Write;

use crate::agent::model::Agent;
use crate::message::model::Message;

pub const DEFAULT_TOPIC: &str =
    "Open discussion: share your perspective on a subject you find important today";

/// Order the recent agent messages for `speaker`: oldest first, without the
/// speaker's own lines.
pub fn context_window<'a>(newest_first: &'a [Message], speaker_id: &str) -> Vec<&'a Message> {
    newest_first
        .iter()
        .rev()
        .filter(|m| m.agent_id.as_deref() != Some(speaker_id))
        .collect()
}

fn round_instruction(agent: &Agent, round: u32, has_history: bool) -> String {
    match round {
        1 => format!(
            "As a {}, give your opening view from your professional angle. Keep it short and punchy.",
            agent.role
        ),
        2 if has_history => {
            "Develop your view further, or respond to and build on what the others said.".to_string()
        }
        2 => "Develop your view further with more detail.".to_string(),
        3 => "Summarise your core position, or offer a new angle or recommendation.".to_string(),
        _ => "Keep the discussion going with further insight, reflection or practical advice.".to_string(),
    }
}

/// Full prompt for `agent`'s turn in `round`. `history` is only shown from
/// round 2 on.
pub fn build_prompt(agent: &Agent, topic: &str, round: u32, history: &[&Message]) -> String {
    let mut prompt = format!(
        "You are a {}. Personality: {}.\nCurrent topic: {}\n",
        agent.role, agent.personality, topic
    );

    let shown = round > 1 && !history.is_empty();
    if shown {
        prompt.push_str("\nRecent discussion:\n");
        for message in history {
            let speaker = message.agent_name.as_deref().unwrap_or("Someone");
            let _ = writeln!(prompt, "{}: {}", speaker, message.content);
        }
        prompt.push_str("\nBuilding on the discussion above: ");
    } else {
        prompt.push('\n');
    }
    prompt.push_str(&round_instruction(agent, round, shown));

    prompt.push_str(
        "\n\nGuidelines:\n\
         1. Stay in character and keep your professional voice\n\
         2. Be logical and constructive\n\
         3. Do not repeat points already made\n\
         4. Answer in roughly 100 to 200 words",
    );
    prompt
}

/// Placeholder content when an agent's generation fails.
pub fn fallback_reply(agent: &Agent, error: &impl std::fmt::Display) -> String {
    format!("{} is unable to speak right now: {}", agent.name, error)
}
