use std::io::Write;

use crate::models::{ChatMessage, GirlProfile, RelationshipStage, Role};
use crate::questionnaire::questions::Question;

/// Quick-start prompts offered when a conversation is empty.
pub const SUGGESTIONS: [&str; 4] = ["Analyze screenshot", "Date ideas", "Reply help", "Profile review"];

pub const NO_PROFILE_REMINDER: &str =
    "No profile selected. Create one with /new or pick one from /profiles with /select <n>.";

pub const REPLY_FAILED: &str = "Sorry, something went wrong. Please try again.";

pub fn help() -> String {
    [
        "Commands:",
        "  /profiles        list saved profiles",
        "  /new             create a profile (name, stage, 15 questions)",
        "  /select <n>      chat about profile n",
        "  /delete <n>      delete profile n and its conversation",
        "  /show            show the selected profile's analysis",
        "  /close           leave the selected profile",
        "  /clear           clear the selected profile's conversation",
        "  /ideas           show conversation starters",
        "  /help            show this help",
        "  /quit            exit",
        "Anything else is sent to the coach. Ctrl-C stops a reply in progress.",
    ]
    .join("\n")
}

pub fn profile_list(profiles: &[GirlProfile], current: Option<&GirlProfile>) -> String {
    if profiles.is_empty() {
        return "No profiles yet. Use /new to create one.".to_string();
    }
    profiles
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let marker = if current.is_some_and(|c| c.id == p.id) { '*' } else { ' ' };
            let archetype = p.archetype.as_deref().unwrap_or("-");
            format!("{marker} {}. {} [{}] {archetype}", i + 1, p.name, p.stage.label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn profile_card(profile: &GirlProfile) -> String {
    let mut lines = vec![
        format!("== {} ==", profile.name),
        format!("Stage: {} ({})", profile.stage.label(), profile.stage.description()),
    ];
    if let Some(traits) = &profile.traits {
        lines.push(format!("Traits: {}", traits.summary()));
    }
    if let Some(archetype) = &profile.archetype {
        lines.push(format!("Archetype: {archetype}"));
    }
    if !profile.description.is_empty() {
        lines.push(String::new());
        lines.push(profile.description.clone());
    }
    lines.join("\n")
}

pub fn history(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .filter(|m| !m.content.is_empty())
        .map(|m| format!("{} {}", speaker(m.role), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "you>",
        Role::Assistant => "coach>",
    }
}

pub fn ideas() -> String {
    SUGGESTIONS
        .iter()
        .map(|s| format!("  - {s}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn stage_menu() -> String {
    RelationshipStage::ALL
        .iter()
        .enumerate()
        .map(|(i, s)| format!("  {}. {} - {}", i + 1, s.label(), s.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn question_prompt(question: &Question, answered: usize, total: usize) -> String {
    format!(
        "[{}/{total}] {}\n  a) {}\n  b) {}\n  (a / b / s = skip / back / cancel)",
        answered + 1,
        question.text,
        question.left,
        question.right
    )
}

/// Prints typewriter frames to stdout as they grow.
///
/// Frames normally extend what is already on screen, so only the new suffix
/// is written. If a frame is not an extension (the reply was replaced), the
/// line is restarted.
#[derive(Debug, Default)]
pub struct TypewriterPrinter {
    printed: String,
}

impl TypewriterPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&mut self, displayed: &str) {
        let delta = self.delta(displayed);
        if delta.is_empty() {
            return;
        }
        let mut out = std::io::stdout().lock();
        // A closed stdout only loses the echo.
        let _ = out.write_all(delta.as_bytes());
        let _ = out.flush();
    }

    /// What has to be written so the screen shows `displayed`.
    fn delta(&mut self, displayed: &str) -> String {
        if let Some(suffix) = displayed.strip_prefix(self.printed.as_str()) {
            let suffix = suffix.to_string();
            self.printed.push_str(&suffix);
            suffix
        } else {
            self.printed = displayed.to_string();
            format!("\n{} {displayed}", speaker(Role::Assistant))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewProfile;

    fn profile(name: &str) -> GirlProfile {
        GirlProfile::create(NewProfile {
            name: name.to_string(),
            stage: RelationshipStage::Friend,
            description: "喜欢安静".to_string(),
            traits: None,
            archetype: Some("知性型".to_string()),
        })
    }

    #[test]
    fn test_printer_writes_only_new_suffix() {
        let mut printer = TypewriterPrinter::new();
        assert_eq!(printer.delta("He"), "He");
        assert_eq!(printer.delta("Hell"), "ll");
        assert_eq!(printer.delta("Hell"), "");
        assert_eq!(printer.delta("Hello"), "o");
    }

    #[test]
    fn test_printer_restarts_on_replaced_text() {
        let mut printer = TypewriterPrinter::new();
        printer.delta("Hello");
        assert_eq!(printer.delta("Help"), "\ncoach> Help");
        assert_eq!(printer.delta("Help!"), "!");
    }

    #[test]
    fn test_profile_list_marks_current() {
        let a = profile("小美");
        let b = profile("小红");
        let out = profile_list(&[a.clone(), b.clone()], Some(&b));
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("  1. 小美"));
        assert!(lines[1].starts_with("* 2. 小红"));
        assert!(lines[1].ends_with("知性型"));
    }

    #[test]
    fn test_history_skips_empty_placeholder() {
        let msgs = vec![ChatMessage::user("hi"), ChatMessage::assistant_placeholder()];
        assert_eq!(history(&msgs), "you> hi");
    }

    #[test]
    fn test_stage_menu_is_numbered_from_one() {
        let menu = stage_menu();
        assert_eq!(menu.lines().count(), RelationshipStage::ALL.len());
        assert!(menu.lines().next().unwrap().starts_with("  1. "));
    }
}
