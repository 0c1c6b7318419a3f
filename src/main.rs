use std::{env, process};

use pubsub_echo::{echo, notifier, publisher};

/// Exit code for a command line that could not be understood.
const USAGE_EXIT: i32 = 2;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Publish,
    Echo,
    Notify {
        event_type: String,
        payload: Option<String>,
    },
}

fn parse_args(args: &[String]) -> Option<Command> {
    match args.get(1)?.as_str() {
        "publish" => Some(Command::Publish),
        "echo" => Some(Command::Echo),
        "notify" => Some(Command::Notify {
            event_type: args.get(2)?.clone(),
            payload: args.get(3).cloned(),
        }),
        _ => None,
    }
}

/// A missing .env is fine, everything has a default. Returns a warning for
/// any other failure.
fn dotenv_warning(result: dotenvy::Result<std::path::PathBuf>) -> Option<String> {
    match result {
        Ok(_) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(format!("warning: .env not loaded: {e}")),
    }
}

fn main() {
    if let Some(warning) = dotenv_warning(dotenvy::dotenv()) {
        eprintln!("{warning}");
    }

    let args: Vec<String> = env::args().collect();

    let Some(command) = parse_args(&args) else {
        print_usage();
        process::exit(USAGE_EXIT);
    };

    let result = match command {
        Command::Publish => publisher::main(),
        Command::Echo => echo::main(),
        Command::Notify {
            event_type,
            payload,
        } => notifier::notify(event_type, payload),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("Pub/Sub emulator examples");
    println!("Usage:");
    println!("  pubsub-echo publish                    - Publish a greeting to PUBLISH_TOPIC_ID");
    println!("  pubsub-echo echo                       - Print and ack messages from ECHO_SUBSCRIPTION");
    println!("  pubsub-echo notify <EventType> [json]  - Publish a user event to PUBLISH_TOPIC_ID");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn known_subcommands_parse() {
        assert_eq!(parse_args(&args(&["bin", "publish"])), Some(Command::Publish));
        assert_eq!(parse_args(&args(&["bin", "echo"])), Some(Command::Echo));
        assert_eq!(
            parse_args(&args(&["bin", "notify", "CreateUser", "{}"])),
            Some(Command::Notify {
                event_type: "CreateUser".into(),
                payload: Some("{}".into()),
            })
        );
    }

    #[test]
    fn usage_errors_all_parse_to_none() {
        assert_eq!(parse_args(&args(&["bin"])), None);
        assert_eq!(parse_args(&args(&["bin", "subscribe"])), None);
        assert_eq!(parse_args(&args(&["bin", "notify"])), None);
    }

    #[test]
    fn missing_dotenv_is_silent() {
        let missing = dotenvy::Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no .env",
        ));
        assert_eq!(dotenv_warning(Err(missing)), None);
    }

    #[test]
    fn broken_dotenv_is_reported() {
        let broken = dotenvy::Error::LineParse("KEY='unterminated".into(), 4);
        let warning = dotenv_warning(Err(broken)).unwrap();
        assert!(warning.contains(".env not loaded"));

        let denied = dotenvy::Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(dotenv_warning(Err(denied)).is_some());
    }
}
