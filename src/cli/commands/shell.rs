//! Interactive session.
//!
//! Each line becomes one inbound event for the bot router:
//! - `#N` presses the Nth button of the last view
//! - `!<action>` sends a raw action identifier
//! - `:upload <ref>|<performer>|<title>` simulates an audio upload
//! - `:quit` ends the session
//! - anything else is sent as a chat message (commands start with `/`)

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Runtime;

use crate::bot::{Bot, Inbound};
use crate::cli::console::{ConsoleChannel, ConsolePresenter};
use crate::upload::AudioUpload;

use super::{Cli, open_services};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellInput {
    Empty,
    Quit,
    Press(usize),
    Action(String),
    Upload {
        external_ref: String,
        performer: Option<String>,
        title: Option<String>,
    },
    Text(String),
    Invalid(&'static str),
}

impl ShellInput {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ShellInput::Empty;
        }

        if let Some(n) = line.strip_prefix('#') {
            return match n.trim().parse::<usize>() {
                Ok(n) if n > 0 => ShellInput::Press(n),
                _ => ShellInput::Invalid("Usage: #N presses the Nth button"),
            };
        }

        if let Some(action) = line.strip_prefix('!') {
            return ShellInput::Action(action.trim().to_string());
        }

        if let Some(rest) = line.strip_prefix(':') {
            let (word, args) = rest.split_once(' ').unwrap_or((rest, ""));
            return match word {
                "quit" | "q" | "exit" => ShellInput::Quit,
                "upload" => parse_upload(args),
                _ => ShellInput::Invalid("Unknown shell command (:upload, :quit)"),
            };
        }

        ShellInput::Text(line.to_string())
    }
}

fn parse_upload(args: &str) -> ShellInput {
    let mut parts = args.split('|').map(str::trim);
    let external_ref = parts.next().unwrap_or_default();
    if external_ref.is_empty() {
        return ShellInput::Invalid("Usage: :upload <ref>|<performer>|<title>");
    }

    let mut field = || parts.next().filter(|s| !s.is_empty()).map(String::from);
    let performer = field();
    let title = field();

    ShellInput::Upload {
        external_ref: external_ref.to_string(),
        performer,
        title,
    }
}

/// Read lines from stdin and feed them through the bot until EOF
pub fn cmd_shell(rt: &Runtime, cli: &Cli) -> anyhow::Result<()> {
    rt.block_on(async {
        let services = open_services(cli).await?;
        let name = services.config.bot.name.clone();
        let bot = Bot::new(services, Arc::new(ConsoleChannel));
        let presenter = ConsolePresenter::new();

        println!("{} console (user {}). Type /help, #N to press a button, :quit to exit.\n", name, cli.user_id);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let event = match ShellInput::parse(&line) {
                ShellInput::Empty => continue,
                ShellInput::Quit => break,
                ShellInput::Invalid(usage) => {
                    eprintln!("{}", usage);
                    continue;
                }
                ShellInput::Press(n) => match presenter.button_action(n) {
                    Some(id) => Inbound::Action {
                        user_id: cli.user_id,
                        id,
                    },
                    None => {
                        eprintln!("No button {} on the last view", n);
                        continue;
                    }
                },
                ShellInput::Action(id) => Inbound::Action {
                    user_id: cli.user_id,
                    id,
                },
                ShellInput::Upload {
                    external_ref,
                    performer,
                    title,
                } => Inbound::Upload(AudioUpload {
                    user_id: cli.user_id,
                    external_ref,
                    title,
                    performer,
                    ..Default::default()
                }),
                ShellInput::Text(text) => Inbound::Text {
                    user_id: cli.user_id,
                    text,
                },
            };

            bot.handle(event, &presenter).await;
        }

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_press_and_action() {
        assert_eq!(ShellInput::parse("#3"), ShellInput::Press(3));
        assert!(matches!(ShellInput::parse("#0"), ShellInput::Invalid(_)));
        assert!(matches!(ShellInput::parse("#x"), ShellInput::Invalid(_)));
        assert_eq!(
            ShellInput::parse("!albums:Queen::1"),
            ShellInput::Action("albums:Queen::1".to_string())
        );
    }

    #[test]
    fn test_parse_text_and_commands() {
        assert_eq!(ShellInput::parse("   "), ShellInput::Empty);
        assert_eq!(ShellInput::parse(":quit"), ShellInput::Quit);
        assert_eq!(ShellInput::parse("/stats"), ShellInput::Text("/stats".to_string()));
        assert_eq!(ShellInput::parse(" queen "), ShellInput::Text("queen".to_string()));
        assert!(matches!(ShellInput::parse(":dance"), ShellInput::Invalid(_)));
    }

    #[test]
    fn test_parse_upload() {
        assert_eq!(
            ShellInput::parse(":upload file-1|The Weeknd|Blinding Lights"),
            ShellInput::Upload {
                external_ref: "file-1".to_string(),
                performer: Some("The Weeknd".to_string()),
                title: Some("Blinding Lights".to_string()),
            }
        );
        assert_eq!(
            ShellInput::parse(":upload file-2||"),
            ShellInput::Upload {
                external_ref: "file-2".to_string(),
                performer: None,
                title: None,
            }
        );
        assert!(matches!(ShellInput::parse(":upload"), ShellInput::Invalid(_)));
    }
}
