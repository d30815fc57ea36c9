use std::path::PathBuf;

use ragdesk_core::Msg;

pub const HELP_TEXT: &str = "\
commands:
  refresh          reload the file list
  upload <path>    upload a local file
  remove <name>    remove a file
  shot <name>      show a file in the preview pane
  rag <name>       start a RAG job for a file
  chat <text>      send a chat message
  help             show this text
  quit             exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Msg),
    Help,
    Quit,
    Invalid(String),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "refresh" => Command::Dispatch(Msg::RefreshRequested),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "upload" => with_argument(verb, rest, |path| Msg::UploadRequested {
            path: PathBuf::from(path),
        }),
        "remove" => with_argument(verb, rest, |filename| Msg::RemoveClicked {
            filename: filename.to_string(),
        }),
        "shot" => with_argument(verb, rest, |filename| Msg::ScreenshotClicked {
            filename: filename.to_string(),
        }),
        "rag" => with_argument(verb, rest, |filename| Msg::StartRagClicked {
            filename: filename.to_string(),
        }),
        "chat" => with_argument(verb, rest, |text| Msg::ChatSubmitted(text.to_string())),
        other => Command::Invalid(format!("unknown command '{other}', try 'help'")),
    };
    Some(command)
}

fn with_argument(verb: &str, rest: &str, build: impl FnOnce(&str) -> Msg) -> Command {
    if rest.is_empty() {
        Command::Invalid(format!("'{verb}' needs an argument, try 'help'"))
    } else {
        Command::Dispatch(build(rest))
    }
}
