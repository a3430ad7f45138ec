use crate::config::{
    ENV_ACCESS_KEY_ID, ENV_CLIENT_ID, ENV_ENDPOINT, ENV_REGION, ENV_SECRET_ACCESS_KEY,
    ENV_TOKEN_NAME,
};
use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    Command::new("cognito-session")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("COGNITO_SESSION_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("region")
                .long("region")
                .help("Region of the Cognito user pool, example: eu-west-1")
                .env(ENV_REGION),
        )
        .arg(
            Arg::new("client-id")
                .long("client-id")
                .help("User pool app client id")
                .env(ENV_CLIENT_ID),
        )
        .arg(
            Arg::new("access-key-id")
                .long("access-key-id")
                .help("Access key id used to sign provider requests")
                .env(ENV_ACCESS_KEY_ID),
        )
        .arg(
            Arg::new("secret-access-key")
                .long("secret-access-key")
                .help("Secret access key used to sign provider requests")
                .env(ENV_SECRET_ACCESS_KEY)
                .hide_env_values(true),
        )
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .help("Override the regional Cognito endpoint")
                .env(ENV_ENDPOINT),
        )
        .arg(
            Arg::new("token-name")
                .long("token-name")
                .help("Name of the session cookie")
                .env(ENV_TOKEN_NAME),
        )
        .arg(
            Arg::new("secure-cookie")
                .long("secure-cookie")
                .help("Mark the session cookie Secure")
                .env("COGNITO_SESSION_SECURE_COOKIE")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .help("Log output format: text or json")
                .env("COGNITO_SESSION_LOG_FORMAT")
                .default_value("text")
                .global(true)
                .value_parser(["text", "json"]),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("COGNITO_SESSION_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
