//! Line-oriented input: plain lines extend the text, `:` lines are commands.

use tokenscope_core::{provider, AppState, Msg};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a line to the end of the text.
    Append(String),
    /// Replace the whole text.
    Replace(String),
    Tab(String),
    Model {
        provider: Option<String>,
        model: String,
    },
    Example,
    Clear,
    Dismiss,
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "\
Type text to append a line. Commands:
  :set <text>              replace the text
  :tab <provider>          switch provider (anthropic, cohere, llama, mistral)
  :model [provider] <name> pick a model (defaults to the active provider)
  :example                 load the example text
  :clear                   clear the text and results
  :dismiss                 hide the current notification
  :help                    show this help
  :quit                    exit
A line starting with `::` is appended with one leading colon.";

pub fn parse_line(line: &str) -> Command {
    if let Some(literal) = line.strip_prefix("::") {
        return Command::Append(format!(":{literal}"));
    }
    let Some(body) = line.strip_prefix(':') else {
        return Command::Append(line.to_string());
    };

    let body = body.trim_start();
    let (name, args) = body
        .split_once(char::is_whitespace)
        .unwrap_or((body, ""));

    match name {
        "set" => Command::Replace(args.to_string()),
        "tab" if !args.trim().is_empty() => Command::Tab(args.trim().to_ascii_lowercase()),
        "model" => {
            let words: Vec<&str> = args.split_whitespace().collect();
            match words[..] {
                [model] => Command::Model {
                    provider: None,
                    model: model.to_string(),
                },
                [provider, model] => Command::Model {
                    provider: Some(provider.to_ascii_lowercase()),
                    model: model.to_string(),
                },
                _ => Command::Unknown(line.to_string()),
            }
        }
        "example" => Command::Example,
        "clear" => Command::Clear,
        "dismiss" => Command::Dismiss,
        "help" | "h" => Command::Help,
        "quit" | "q" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Unknown provider `{0}`. Choose one of: {keys}.", keys = provider_keys())]
    UnknownProvider(String),
    #[error("Unknown model `{model}` for {provider}. Choose one of: {models}.", models = models_of(.provider))]
    UnknownModel { provider: String, model: String },
}

fn provider_keys() -> String {
    tokenscope_core::PROVIDERS
        .iter()
        .map(|p| p.key)
        .collect::<Vec<_>>()
        .join(", ")
}

fn models_of(key: &str) -> String {
    provider(key).map(|p| p.models.join(", ")).unwrap_or_default()
}

/// Translate a command into a message for the current state. Commands that
/// the front-end handles itself yield `None`; unknown providers and models are
/// rejected.
pub fn to_msg(command: Command, state: &AppState) -> Result<Option<Msg>, InputError> {
    let msg = match command {
        Command::Append(line) => {
            let text = if state.text().is_empty() {
                line
            } else {
                format!("{}\n{}", state.text(), line)
            };
            Some(Msg::InputChanged(text))
        }
        Command::Replace(text) => Some(Msg::InputChanged(text)),
        Command::Tab(key) => {
            if provider(&key).is_none() {
                return Err(InputError::UnknownProvider(key));
            }
            Some(Msg::TabSelected(key))
        }
        Command::Model {
            provider: key,
            model,
        } => {
            let key = key.unwrap_or_else(|| state.active_provider().to_string());
            match provider(&key) {
                None => return Err(InputError::UnknownProvider(key)),
                Some(info) if !info.offers(&model) => {
                    return Err(InputError::UnknownModel {
                        provider: key,
                        model,
                    })
                }
                Some(_) => Some(Msg::ModelSelected {
                    provider: key,
                    model,
                }),
            }
        }
        Command::Example => Some(Msg::ExampleClicked),
        Command::Clear => Some(Msg::ClearClicked),
        Command::Dismiss => Some(Msg::NotificationDismissed),
        Command::Help | Command::Quit | Command::Unknown(_) => None,
    };
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tokenscope_core::update;

    use super::*;

    #[test]
    fn plain_lines_and_escapes_append() {
        assert_eq!(parse_line("hello world"), Command::Append("hello world".into()));
        assert_eq!(parse_line("::colon"), Command::Append(":colon".into()));
        assert_eq!(parse_line(""), Command::Append(String::new()));
    }

    #[test]
    fn commands_are_recognised() {
        assert_eq!(parse_line(":set  two  spaces"), Command::Replace(" two  spaces".into()));
        assert_eq!(parse_line(":tab Llama"), Command::Tab("llama".into()));
        assert_eq!(
            parse_line(":model claude-3-opus"),
            Command::Model {
                provider: None,
                model: "claude-3-opus".into()
            }
        );
        assert_eq!(
            parse_line(":model cohere command-r"),
            Command::Model {
                provider: Some("cohere".into()),
                model: "command-r".into()
            }
        );
        assert_eq!(parse_line(":q"), Command::Quit);
        assert_eq!(parse_line(":tab"), Command::Unknown(":tab".into()));
        assert_eq!(parse_line(":frobnicate"), Command::Unknown(":frobnicate".into()));
    }

    #[test]
    fn appended_lines_join_with_newlines() {
        let state = AppState::new();
        let msg = to_msg(Command::Append("first".into()), &state).unwrap().unwrap();
        assert_eq!(msg, Msg::InputChanged("first".into()));

        let (state, _) = update(state, msg);
        let msg = to_msg(Command::Append("second".into()), &state).unwrap().unwrap();
        assert_eq!(msg, Msg::InputChanged("first\nsecond".into()));
    }

    #[test]
    fn model_defaults_to_active_provider() {
        let state = AppState::new();
        let msg = to_msg(
            Command::Model {
                provider: None,
                model: "claude-3-opus".into(),
            },
            &state,
        );
        assert_eq!(
            msg,
            Ok(Some(Msg::ModelSelected {
                provider: "anthropic".into(),
                model: "claude-3-opus".into()
            }))
        );
        assert_eq!(to_msg(Command::Help, &state), Ok(None));
    }

    #[test]
    fn unknown_provider_is_rejected_with_a_hint() {
        let state = AppState::new();
        let err = to_msg(parse_line(":tab openai"), &state).unwrap_err();
        assert_eq!(err, InputError::UnknownProvider("openai".into()));
        assert_eq!(
            err.to_string(),
            "Unknown provider `openai`. Choose one of: anthropic, cohere, llama, mistral."
        );

        let err = to_msg(parse_line(":model openai gpt-4"), &state).unwrap_err();
        assert_eq!(err, InputError::UnknownProvider("openai".into()));
        assert_eq!(
            to_msg(parse_line(":tab cohere"), &state),
            Ok(Some(Msg::TabSelected("cohere".into())))
        );
    }

    #[test]
    fn unknown_model_is_rejected_with_a_hint() {
        let state = AppState::new();
        let err = to_msg(parse_line(":model cohere nope"), &state).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown model `nope` for cohere. Choose one of: command-r+, command-r, command-light."
        );

        let err = to_msg(parse_line(":model command-r"), &state).unwrap_err();
        assert_eq!(
            err,
            InputError::UnknownModel {
                provider: "anthropic".into(),
                model: "command-r".into()
            }
        );
    }
}
