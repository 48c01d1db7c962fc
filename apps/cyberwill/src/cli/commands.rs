use crate::questionnaire::Choice;

/// One line typed at the main prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Profiles,
    New,
    /// 1-based position in the profile list.
    Select(usize),
    Delete(usize),
    Show,
    /// Leave the current profile and go back to the profile list.
    Close,
    Clear,
    Ideas,
    Help,
    Quit,
    /// Plain text: a chat message.
    Say(String),
    Invalid(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Say(line.to_string());
    };
    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    match (name, arg) {
        ("profiles" | "ls", None) => Command::Profiles,
        ("new", None) => Command::New,
        ("select" | "use", Some(n)) => parse_position(n).map_or_else(
            || Command::Invalid(format!("not a profile number: {n}")),
            Command::Select,
        ),
        ("delete" | "rm", Some(n)) => parse_position(n).map_or_else(
            || Command::Invalid(format!("not a profile number: {n}")),
            Command::Delete,
        ),
        ("show", None) => Command::Show,
        ("close" | "back", None) => Command::Close,
        ("clear", None) => Command::Clear,
        ("ideas", None) => Command::Ideas,
        ("help" | "?", None) => Command::Help,
        ("quit" | "exit" | "q", None) => Command::Quit,
        _ => Command::Invalid(format!("unknown command: /{rest}")),
    }
}

fn parse_position(s: &str) -> Option<usize> {
    s.parse::<usize>().ok().filter(|n| *n >= 1)
}

/// Input at a questionnaire prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardInput {
    Answer(Choice),
    Back,
    Cancel,
}

pub fn parse_wizard_input(line: &str) -> Option<WizardInput> {
    match line.trim().to_lowercase().as_str() {
        "a" | "1" => Some(WizardInput::Answer(Choice::A)),
        "b" | "2" => Some(WizardInput::Answer(Choice::B)),
        "s" | "0" | "skip" | "" => Some(WizardInput::Answer(Choice::Skip)),
        "back" | "<" => Some(WizardInput::Back),
        "cancel" | "/cancel" => Some(WizardInput::Cancel),
        _ => None,
    }
}
