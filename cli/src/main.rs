use clap::Parser;
use config::{PathManager, Settings, load_env_file, resolve_api_key};
use conversation::{Conversation, InputSource, UserInput, document_excerpt};
use llm::ModelProvider;
use llm::providers::openrouter::{DEFAULT_BASE_URL, OpenRouterProvider};
use parley_audio::{WhisperTranscriber, transcribe_clip};

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod render;

const DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3-0324:free";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model identifier on the completion endpoint
    #[arg(long, env = "PARLEY_MODEL")]
    model: Option<String>,

    /// Custom base URL for the completion endpoint (e.g., for a proxy)
    #[arg(long, env = "OPENROUTER_BASE_URL")]
    base_url: Option<String>,

    /// System message prepended to every request
    #[arg(long)]
    system_message: Option<String>,

    /// Path to a Whisper GGML model, used by /voice
    #[arg(long, env = "WHISPER_MODEL")]
    whisper_model: Option<PathBuf>,

    #[arg(long, short)]
    tracing: bool,
}

// Application state
struct AppState {
    conversation: Conversation,
    provider: OpenRouterProvider,
    model_id: String,
    whisper_model: Option<PathBuf>,
    transcriber: Option<WhisperTranscriber>,
    /// Index of the user turn currently being edited, if any
    editing: Option<usize>,
    /// Full text of the attached document; the next messages are sent
    /// with its opening excerpt as context
    document: Option<String>,
    /// Summary line for the most recent upload
    last_upload: Option<String>,
}

impl AppState {
    fn ensure_transcriber(&mut self) -> anyhow::Result<&WhisperTranscriber> {
        if self.transcriber.is_none() {
            let path = self.whisper_model.as_ref().ok_or_else(|| {
                anyhow::anyhow!(
                    "No Whisper model configured. Pass --whisper-model, set WHISPER_MODEL, or add whisper_model to settings.toml"
                )
            })?;
            self.transcriber = Some(WhisperTranscriber::new(path)?);
        }
        self.transcriber
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Transcriber unavailable"))
    }
}

fn setup_tracing(enable: bool) {
    if enable {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::TRACE)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Setting default subscriber failed");
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::ERROR)
            .with_writer(|| std::io::sink())
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Setting default subscriber failed");
    }
}

fn print_status_bar(state: &AppState) {
    let terminal_width: usize = 80;
    let attachment = match &state.last_upload {
        Some(summary) => format!(" • {}", summary),
        None => String::new(),
    };
    let status = format!(" openrouter • {}{} ", state.model_id, attachment);
    let padding = terminal_width.saturating_sub(status.len());
    let left_pad = padding / 2;
    let right_pad = padding - left_pad;

    println!("┌{}┐", "─".repeat(terminal_width - 2));
    println!("│{}{}{}│", " ".repeat(left_pad), status, " ".repeat(right_pad));
    println!("└{}┘", "─".repeat(terminal_width - 2));
}

fn source_tag(source: InputSource) -> &'static str {
    match source {
        InputSource::Text => "",
        InputSource::Voice => " (voice)",
        InputSource::FileAugmented => " (file)",
    }
}

async fn submit(state: &mut AppState, input: UserInput) {
    let reply = state.conversation.send(input).await;
    println!("Bot: {}", reply.content);
}

/// Send typed text, augmenting it with the attached document when present.
async fn submit_typed(state: &mut AppState, text: &str) {
    let input = match &state.document {
        Some(document) => UserInput::with_document(text, document),
        None => UserInput::typed(text),
    };
    submit(state, input).await;
}

// Slash command parsing and handling
mod commands {
    use super::*;

    pub enum Command {
        Quit,
        Help,
        Clear,
        History,
        Models,
        Show(usize),
        Edit { index: usize, text: Option<String> },
        Cancel,
        Upload(PathBuf),
        Voice(PathBuf),
        Save(PathBuf),
    }

    pub enum CommandResult {
        Continue,
        Exit,
    }

    impl Command {
        pub fn parse(input: &str) -> Result<Self, String> {
            if !input.starts_with('/') {
                return Err("Not a command".to_string());
            }

            let parts: Vec<&str> = input[1..].split_whitespace().collect();
            if parts.is_empty() {
                return Err("Empty command".to_string());
            }

            match parts[0] {
                "quit" | "exit" => Ok(Command::Quit),
                "help" => Ok(Command::Help),
                "clear" => Ok(Command::Clear),
                "history" => Ok(Command::History),
                "models" => Ok(Command::Models),
                "cancel" => Ok(Command::Cancel),
                "show" => {
                    let index = parse_index(parts.get(1), "Usage: /show <turn>")?;
                    Ok(Command::Show(index))
                }
                "edit" => {
                    let index = parse_index(parts.get(1), "Usage: /edit <turn> [new text]")?;
                    let text = if parts.len() > 2 {
                        Some(parts[2..].join(" "))
                    } else {
                        None
                    };
                    Ok(Command::Edit { index, text })
                }
                "upload" => Ok(Command::Upload(parse_path(
                    parts.get(1..),
                    "Usage: /upload <file>",
                )?)),
                "voice" => Ok(Command::Voice(parse_path(
                    parts.get(1..),
                    "Usage: /voice <audio file>",
                )?)),
                "save" => Ok(Command::Save(parse_path(
                    parts.get(1..),
                    "Usage: /save <file>",
                )?)),
                _ => Err(format!(
                    "Unknown command: /{}. Type /help for available commands.",
                    parts[0]
                )),
            }
        }

        pub async fn execute(self, state: &mut AppState) -> CommandResult {
            match self {
                Command::Quit => {
                    println!("Goodbye!");
                    CommandResult::Exit
                }
                Command::Help => {
                    print_help();
                    println!();
                    CommandResult::Continue
                }
                Command::Clear => {
                    state.conversation.clear();
                    state.editing = None;
                    state.document = None;
                    state.last_upload = None;
                    println!("Conversation history cleared.");
                    println!();
                    CommandResult::Continue
                }
                Command::History => {
                    if state.conversation.turn_count() == 0 {
                        println!("No turns yet.");
                    }
                    for (idx, turn) in state.conversation.turns().iter().enumerate() {
                        let speaker = match turn.role {
                            llm::Role::User => "You",
                            _ => "Bot",
                        };
                        println!(
                            "[{}] {}{}: {}",
                            idx,
                            speaker,
                            source_tag(turn.source),
                            turn.content
                        );
                    }
                    println!();
                    CommandResult::Continue
                }
                Command::Models => {
                    match state.provider.list_models().await {
                        Ok(models) => {
                            for model in &models {
                                println!("  {}", model.id);
                            }
                            println!("{} models available.", models.len());
                        }
                        Err(e) => {
                            eprintln!("Failed to list models: {:#}", e);
                        }
                    }
                    println!();
                    CommandResult::Continue
                }
                Command::Show(index) => {
                    match state.conversation.turns().get(index) {
                        Some(turn) => println!("{}", turn.content),
                        None => println!("No turn at index {}.", index),
                    }
                    println!();
                    CommandResult::Continue
                }
                Command::Edit { index, text } => {
                    if let Err(e) = state.conversation.validate_edit(index) {
                        println!("{}", e);
                        println!();
                        return CommandResult::Continue;
                    }
                    match text {
                        Some(text) => {
                            apply_edit(state, index, &text).await;
                        }
                        None => {
                            state.editing = Some(index);
                            println!(
                                "Editing turn {}. Type the replacement, or /cancel.",
                                index
                            );
                            println!("Current: {}", state.conversation.turns()[index].content);
                        }
                    }
                    println!();
                    CommandResult::Continue
                }
                Command::Cancel => {
                    if state.editing.take().is_some() {
                        println!("Edit cancelled.");
                    } else {
                        println!("Nothing to cancel.");
                    }
                    println!();
                    CommandResult::Continue
                }
                Command::Upload(path) => {
                    match std::fs::read_to_string(&path) {
                        Ok(text) => {
                            let summary = format!(
                                "{} ({} chars)",
                                path.display(),
                                text.chars().count()
                            );
                            println!("File uploaded: {}", summary);
                            println!("Context excerpt:\n{}", document_excerpt(&text));
                            println!("Your next messages will include this excerpt.");
                            state.document = Some(text);
                            state.last_upload = Some(summary);
                        }
                        Err(e) => {
                            eprintln!("Could not read {}: {}", path.display(), e);
                        }
                    }
                    println!();
                    CommandResult::Continue
                }
                Command::Voice(path) => {
                    let transcript = {
                        let stt = match state.ensure_transcriber() {
                            Ok(stt) => stt,
                            Err(e) => {
                                eprintln!("{:#}", e);
                                println!();
                                return CommandResult::Continue;
                            }
                        };
                        transcribe_clip(stt, &path)
                    };
                    println!("You (voice): {}", transcript);
                    submit(state, UserInput::voice(transcript)).await;
                    println!();
                    CommandResult::Continue
                }
                Command::Save(path) => {
                    match render::save_transcript(state.conversation.turns(), &path) {
                        Ok(()) => println!("Transcript saved to {}.", path.display()),
                        Err(e) => eprintln!("Failed to save transcript: {:#}", e),
                    }
                    println!();
                    CommandResult::Continue
                }
            }
        }
    }

    fn parse_index(part: Option<&&str>, usage: &str) -> Result<usize, String> {
        part.ok_or_else(|| usage.to_string())?
            .parse::<usize>()
            .map_err(|_| usage.to_string())
    }

    fn parse_path(parts: Option<&[&str]>, usage: &str) -> Result<PathBuf, String> {
        match parts {
            Some(parts) if !parts.is_empty() => Ok(PathBuf::from(parts.join(" "))),
            _ => Err(usage.to_string()),
        }
    }

    pub async fn apply_edit(state: &mut AppState, index: usize, text: &str) {
        match state.conversation.resend_edited(index, text).await {
            Ok(reply) => println!("Bot: {}", reply.content),
            Err(e) => println!("{}", e),
        }
    }

    fn print_help() {
        println!("Available commands:");
        println!("  /quit, /exit           - Exit the chat");
        println!("  /clear                 - Clear conversation history and attachments");
        println!("  /history               - List all turns with their indices");
        println!("  /show <n>              - Print the raw content of turn n");
        println!("  /edit <n> [text]       - Rewrite user turn n and regenerate its reply");
        println!("  /cancel                - Leave edit mode");
        println!("  /upload <file>         - Attach a text file; its opening excerpt is sent as context");
        println!("  /voice <file>          - Transcribe a WAV clip and send it as a message");
        println!("  /save <file>           - Export the transcript as HTML");
        println!("  /models                - List models available on the endpoint");
        println!("  /help                  - Show this help message");
        println!("  Ctrl+D                 - Exit the chat");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env_file();
    let args = Args::parse();

    setup_tracing(args.tracing);

    let settings = Settings::load();
    let api_key = resolve_api_key(&settings)?;

    let base_url = args
        .base_url
        .or(settings.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let model_id = args
        .model
        .or(settings.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let whisper_model = args
        .whisper_model
        .or(settings.whisper_model.clone().map(PathBuf::from))
        .or_else(PathManager::whisper_model_path);

    let provider = OpenRouterProvider::new(&base_url, &api_key)?;
    let model = provider.create_chat_model(&model_id);

    let conversation = match args.system_message {
        Some(system) => Conversation::with_system_message(model, system),
        None => Conversation::new(model),
    };

    let mut state = AppState {
        conversation,
        provider,
        model_id,
        whisper_model,
        transcriber: None,
        editing: None,
        document: None,
        last_upload: None,
    };

    println!();
    println!("Type /help for commands, Ctrl+D or /quit to exit.");
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print_status_bar(&state);
        if let Some(index) = state.editing {
            println!("(editing turn {} - type the replacement, or /cancel)", index);
        }
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
            None => {
                println!();
                println!("Goodbye!");
                break;
            }
        };

        let input = line.trim();

        if input.is_empty() {
            continue;
        }

        // Try to parse as command
        if input.starts_with('/') {
            match commands::Command::parse(input) {
                Ok(cmd) => match cmd.execute(&mut state).await {
                    commands::CommandResult::Exit => break,
                    commands::CommandResult::Continue => continue,
                },
                Err(err) => {
                    println!("{}", err);
                    println!();
                    continue;
                }
            }
        }

        // In edit mode the line is the replacement text
        if let Some(index) = state.editing.take() {
            commands::apply_edit(&mut state, index, input).await;
            println!();
            continue;
        }

        // Regular message
        submit_typed(&mut state, input).await;
        println!();
    }

    println!(
        "Conversation had {} messages",
        state.conversation.turn_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::commands::Command;

    #[test]
    fn test_parse_simple_commands() {
        assert!(matches!(Command::parse("/quit"), Ok(Command::Quit)));
        assert!(matches!(Command::parse("/exit"), Ok(Command::Quit)));
        assert!(matches!(Command::parse("/help"), Ok(Command::Help)));
        assert!(matches!(Command::parse("/clear"), Ok(Command::Clear)));
        assert!(matches!(Command::parse("/history"), Ok(Command::History)));
    }

    #[test]
    fn test_parse_edit_with_and_without_text() {
        match Command::parse("/edit 2 new question text") {
            Ok(Command::Edit { index, text }) => {
                assert_eq!(index, 2);
                assert_eq!(text.as_deref(), Some("new question text"));
            }
            _ => panic!("unexpected parse result"),
        }

        match Command::parse("/edit 0") {
            Ok(Command::Edit { index, text }) => {
                assert_eq!(index, 0);
                assert!(text.is_none());
            }
            _ => panic!("unexpected parse result"),
        }
    }

    #[test]
    fn test_parse_edit_rejects_bad_index() {
        assert!(Command::parse("/edit").is_err());
        assert!(Command::parse("/edit two").is_err());
    }

    #[test]
    fn test_parse_paths_allow_spaces() {
        match Command::parse("/upload my notes.txt") {
            Ok(Command::Upload(path)) => assert_eq!(path.to_str(), Some("my notes.txt")),
            _ => panic!("unexpected parse result"),
        }
        assert!(Command::parse("/upload").is_err());
    }

    #[test]
    fn test_unknown_command_is_an_error() {
        let err = Command::parse("/frobnicate").unwrap_err();
        assert!(err.contains("/frobnicate"));
    }
}
