//! Line-oriented terminal front-end: profile management, the creation
//! wizard, and streamed chat with a typing effect.

pub mod commands;
pub mod render;

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::{begin_turn, run_typewriter, stream_reply, ReplyOutcome, ReplyView};
use crate::errors::AppError;
use crate::models::{RelationshipStage, Role};
use crate::questionnaire::{complete_profile, ProfileDraft};
use crate::state::AppState;
use commands::{parse_command, parse_wizard_input, Command, WizardInput};
use render::TypewriterPrinter;

/// Reads prompt lines from stdin. Ctrl-C at a prompt reads as end of input.
pub struct Terminal {
    lines: Lines<BufReader<Stdin>>,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    pub async fn read_line(&mut self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        let _ = std::io::stdout().flush();
        tokio::select! {
            line = self.lines.next_line() => match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to read stdin: {e}");
                    None
                }
            },
            _ = tokio::signal::ctrl_c() => {
                println!();
                None
            }
        }
    }
}

/// Runs the interactive loop until `/quit`, end of input, or Ctrl-C at the prompt.
pub async fn run(state: &mut AppState) -> anyhow::Result<()> {
    let mut term = Terminal::new();

    println!("CyberWill dating coach ({})", state.config.backend_url());
    println!("Type /help for commands.");
    if !state.store.profiles().is_empty() {
        println!("{}", render::profile_list(state.store.profiles(), state.store.current()));
    }
    println!("{}", render::NO_PROFILE_REMINDER);

    loop {
        let prompt = match state.store.current() {
            Some(p) => format!("[{}] you> ", p.name),
            None => "you> ".to_string(),
        };
        let Some(line) = term.read_line(&prompt).await else {
            break;
        };

        let result = match parse_command(&line) {
            Command::Quit => break,
            Command::Say(text) if text.is_empty() => Ok(()),
            Command::Say(text) => chat_turn(state, &text).await,
            Command::Profiles => {
                println!("{}", render::profile_list(state.store.profiles(), state.store.current()));
                Ok(())
            }
            Command::New => create_profile(state, &mut term).await,
            Command::Select(n) => select_profile(state, n),
            Command::Delete(n) => delete_profile(state, n),
            Command::Show => {
                match state.store.current() {
                    Some(p) => {
                        println!("{}", render::profile_card(p));
                        if let Some(id) = state.session.session_id() {
                            println!("Chat session: {id}");
                        }
                    }
                    None => println!("{}", render::NO_PROFILE_REMINDER),
                }
                Ok(())
            }
            Command::Close => {
                if let Some(p) = state.store.current() {
                    println!("Closed {}.", p.name);
                }
                state.session.reset();
                state.store.clear_current();
                println!("{}", render::profile_list(state.store.profiles(), None));
                Ok(())
            }
            Command::Clear => clear_conversation(state),
            Command::Ideas => {
                println!("{}", render::ideas());
                Ok(())
            }
            Command::Help => {
                println!("{}", render::help());
                Ok(())
            }
            Command::Invalid(reason) => {
                println!("{reason} (try /help)");
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!(code = e.code(), "Command failed: {e}");
            println!("Error: {e}");
        }
    }

    if state.session.is_loading() {
        state.session.stop_generation();
    }
    info!("Session ended");
    Ok(())
}

fn profile_id_at(state: &AppState, position: usize) -> Result<Uuid, AppError> {
    state
        .store
        .profiles()
        .get(position - 1)
        .map(|p| p.id)
        .ok_or_else(|| AppError::NotFound(format!("profile #{position}")))
}

fn select_profile(state: &mut AppState, position: usize) -> Result<(), AppError> {
    let id = profile_id_at(state, position)?;
    state.session.reset();
    let profile = state.store.select_profile(id)?;
    println!("{}", render::profile_card(profile));

    let messages = state.store.messages(id);
    if messages.is_empty() {
        println!("No conversation yet. Some ideas:\n{}", render::ideas());
    } else {
        println!("{}", render::history(messages));
    }
    Ok(())
}

fn delete_profile(state: &mut AppState, position: usize) -> Result<(), AppError> {
    let id = profile_id_at(state, position)?;
    let was_current = state.store.current().is_some_and(|p| p.id == id);
    let removed = state.store.delete_profile(id)?;
    if was_current {
        state.session.reset();
    }
    println!("Deleted {}.", removed.name);
    Ok(())
}

fn clear_conversation(state: &mut AppState) -> Result<(), AppError> {
    let Some(id) = state.store.current().map(|p| p.id) else {
        println!("{}", render::NO_PROFILE_REMINDER);
        return Ok(());
    };
    state.session.reset();
    state.store.clear_messages(id)?;
    println!("Conversation cleared.");
    Ok(())
}

/// Name and stage, then the questionnaire. `back` on the first question
/// returns to the name prompt; `cancel` anywhere abandons the draft.
async fn create_profile(state: &mut AppState, term: &mut Terminal) -> Result<(), AppError> {
    'details: loop {
        let Some(name) = term.read_line("Name (or cancel): ").await else {
            return Ok(());
        };
        if name.trim() == "cancel" {
            return Ok(());
        }

        println!("Relationship stage:\n{}", render::stage_menu());
        let stage = loop {
            let Some(input) = term.read_line("Stage [1-6]: ").await else {
                return Ok(());
            };
            match input.trim().parse::<usize>().ok().and_then(RelationshipStage::from_position) {
                Some(stage) => break stage,
                None => println!("Pick a number from 1 to {}.", RelationshipStage::ALL.len()),
            }
        };

        let mut draft = match ProfileDraft::new(&name, stage) {
            Ok(draft) => draft,
            Err(e) => {
                println!("{e}");
                continue 'details;
            }
        };

        while let Some(question) = draft.questionnaire.current_question() {
            let (answered, total) = draft.questionnaire.progress();
            println!("{}", render::question_prompt(question, answered, total));
            let Some(input) = term.read_line("> ").await else {
                return Ok(());
            };
            match parse_wizard_input(&input) {
                Some(WizardInput::Answer(choice)) => {
                    draft.questionnaire.answer(choice)?;
                }
                Some(WizardInput::Back) => {
                    if draft.questionnaire.back().is_none() {
                        continue 'details;
                    }
                }
                Some(WizardInput::Cancel) => {
                    println!("Profile creation cancelled.");
                    return Ok(());
                }
                None => println!("Answer a, b or s (skip)."),
            }
        }

        println!("Analyzing {}...", draft.name);
        let profile = complete_profile(&draft, state.analyzer.as_ref(), &mut state.store).await?;
        state.session.reset();
        println!("{}", render::profile_card(&profile));
        return Ok(());
    }
}

/// Sends one message and types the reply out as it streams in.
/// Ctrl-C while the reply is arriving stops it; the partial text is kept.
async fn chat_turn(state: &mut AppState, text: &str) -> Result<(), AppError> {
    let Some(profile_id) = state.store.current().map(|p| p.id) else {
        println!("{}", render::NO_PROFILE_REMINDER);
        return Ok(());
    };
    let Some(stream) = begin_turn(&mut state.store, &state.session, profile_id, text)? else {
        return Ok(());
    };

    let (view_tx, view_rx) = watch::channel(ReplyView::streaming());
    let mut printer = TypewriterPrinter::new();
    print!("{} ", render::speaker(Role::Assistant));
    let _ = std::io::stdout().flush();
    let typewriter = tokio::spawn(run_typewriter(view_rx, move |frame| printer.frame(frame)));

    let outcome = {
        let reply = stream_reply(&mut state.store, profile_id, stream, &view_tx);
        tokio::pin!(reply);
        loop {
            tokio::select! {
                outcome = &mut reply => break outcome,
                _ = tokio::signal::ctrl_c() => {
                    state.session.stop_generation();
                }
            }
        }
    };
    drop(view_tx);
    if let Err(e) = typewriter.await {
        warn!("Typewriter task failed: {e}");
    }
    println!();

    match outcome? {
        ReplyOutcome::Completed(_) => {}
        ReplyOutcome::Cancelled => println!("[stopped]"),
        ReplyOutcome::Failed(reason) => {
            warn!(%reason, "Reply failed");
            println!("{}", render::REPLY_FAILED);
        }
    }
    Ok(())
}
