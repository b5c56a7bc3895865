use crate::effect::Effect;
use clap::{ColorChoice, CommandFactory, FromArgMatches, Parser};

/// Media effects bot. Attach a video or audio file to the message with the command.
#[derive(Parser, Debug)]
#[command(
    name = "cv",
    no_binary_name = true,
    disable_version_flag = true,
    arg_required_else_help = true,
    color = ColorChoice::Never
)]
struct ChatCommand {
    #[command(subcommand)]
    effect: Effect,
}

#[derive(Debug, PartialEq)]
pub(crate) enum Dispatch {
    Effect(Effect),
    /// The command is malformed or the user asked for help
    Usage(String),
}

/// Parses the text of the message. Returns `None` if the message doesn't
/// start with the `prefix`, i.e. it isn't addressed to the bot.
///
/// The text after the prefix is split into words with the shell rules, so
/// quoted ffmpeg arguments may contain spaces.
pub(crate) fn parse(prefix: &str, content: &str) -> Option<Dispatch> {
    let command = content.strip_prefix(prefix)?;

    let Some(words) = shlex::split(command) else {
        return Some(Dispatch::Usage(
            "error: the command has an unbalanced quote".to_owned(),
        ));
    };

    let matches = ChatCommand::command()
        .bin_name(prefix.trim())
        .try_get_matches_from(words)
        .and_then(|matches| ChatCommand::from_arg_matches(&matches));

    let dispatch = match matches {
        Ok(command) => Dispatch::Effect(command.effect),
        Err(err) => Dispatch::Usage(err.render().to_string().trim_end().to_owned()),
    };

    Some(dispatch)
}
