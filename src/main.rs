//! notirun CLI
//!
//! Run a command, tee its output, then push a ntfy.sh notification (or send
//! an email) summarizing the outcome. The process always exits with the
//! child command's exit code, independent of notification delivery.

use anyhow::Result;
use clap::Parser;
use notirun::config::{self, EmailConfig, NtfyConfig};
use notirun::{run_command, EmailChannel, NotificationDispatcher, NtfyChannel, SendResult};
use std::env;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "notirun")]
#[command(about = "Run a command and receive a push or email notification when it finishes")]
#[command(version)]
#[command(after_help = "Use -- to separate notirun options from the command:\n  notirun -- python train.py --epochs 100")]
struct Cli {
    /// Address suffix for the ntfy topic 'notirun-<addr>'; falls back to the
    /// NOTIRUN_TOPIC env var, then a built-in default
    #[arg(long, short = 'a', value_name = "ADDR")]
    addr: Option<String>,

    /// Send an email to this address instead of a push notification
    #[arg(long, value_name = "TO")]
    email: Option<String>,

    /// Run the command but skip sending the notification (useful for testing)
    #[arg(long)]
    no_notify: bool,

    /// The command (and its arguments) to run
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required = true,
        value_name = "COMMAND"
    )]
    command: Vec<String>,
}

fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("notirun=info"));
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let command = match resolve_command(&cli.command) {
        Some(command) => command,
        None => anyhow::bail!("no command provided; example: notirun -- sleep 5"),
    };

    let dispatcher = build_dispatcher(&cli);

    println!("[notirun] Running: {}", command);
    let result = run_command(&command)?;

    let status_label = if result.succeeded() {
        "finished successfully".to_string()
    } else {
        format!("failed (exit {})", result.exit_code)
    };
    println!("[notirun] Command {}.", status_label);

    if cli.no_notify {
        println!("[notirun] --no-notify set, skipping notification.");
    } else if dispatcher.channel_count() > 0 {
        println!(
            "[notirun] Sending notification via {} …",
            dispatcher.channel_names().join(", ")
        );
        let host = gethostname::gethostname().to_string_lossy().into_owned();
        for (name, outcome) in dispatcher.dispatch(&result, &host) {
            match outcome {
                SendResult::Sent => println!("[notirun] Notification sent ({}).", name),
                SendResult::Failed(reason) => {
                    eprintln!("[notirun] WARNING: {} delivery failed: {}", name, reason)
                }
            }
        }
    }

    std::process::exit(result.exit_code);
}

/// Join the trailing args into one shell command string, stripping a leading
/// '--' separator if the user wrote: notirun [opts] -- cmd. Quoting follows
/// shell word rules so arguments survive the round trip through `sh -c`.
fn resolve_command(parts: &[String]) -> Option<String> {
    let parts: Vec<&str> = parts
        .iter()
        .map(String::as_str)
        .skip_while(|p| *p == "--")
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(shell_words::join(parts))
    }
}

/// Resolve channel configuration from flags and the environment.
///
/// A misconfigured channel is reported up front and left unregistered; the
/// command still runs and its exit code still becomes the process exit code.
fn build_dispatcher(cli: &Cli) -> NotificationDispatcher {
    let mut dispatcher = NotificationDispatcher::new();
    if cli.no_notify {
        return dispatcher;
    }

    if cli.email.is_some() {
        let smtp_port = env::var(config::ENV_SMTP_PORT)
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(config::DEFAULT_SMTP_PORT);
        let email_config = EmailConfig::new(cli.email.clone())
            .with_smtp_host(
                env::var(config::ENV_SMTP_HOST).unwrap_or_else(|_| config::DEFAULT_SMTP_HOST.to_string()),
            )
            .with_smtp_port(smtp_port)
            .with_credentials(
                env::var(config::ENV_SMTP_USER).ok(),
                env::var(config::ENV_SMTP_PASS).ok(),
            )
            .with_from(env::var(config::ENV_FROM_ADDR).ok());

        match email_config.validate() {
            Ok(()) => dispatcher.register_channel(Arc::new(EmailChannel::new(email_config))),
            Err(e) => {
                eprintln!("[notirun] WARNING: email notification disabled: {}", e);
                warn!(error = %e, "Email channel misconfigured, continuing without notification");
            }
        }
        return dispatcher;
    }

    let topic = NtfyConfig::resolve_topic(
        cli.addr.as_deref(),
        env::var(config::ENV_TOPIC).ok().as_deref(),
    );
    match NtfyChannel::new(NtfyConfig::new(topic)) {
        Ok(channel) => dispatcher.register_channel(Arc::new(channel)),
        Err(e) => {
            eprintln!("[notirun] WARNING: push notification disabled: {}", e);
            warn!(error = %e, "ntfy channel could not be constructed");
        }
    }
    dispatcher
}

#[cfg(test)]
mod tests {
    use super::resolve_command;

    fn parts(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolve_command_passes_plain_args_through() {
        let command = resolve_command(&parts(&["python", "train.py", "--epochs=100"]));
        assert_eq!(command.as_deref(), Some("python train.py --epochs=100"));
    }

    #[test]
    fn resolve_command_strips_a_leading_separator() {
        let command = resolve_command(&parts(&["--", "sleep", "5"]));
        assert_eq!(command.as_deref(), Some("sleep 5"));
    }

    #[test]
    fn resolve_command_quotes_args_with_whitespace_and_quotes() {
        let command = resolve_command(&parts(&["echo", "a b", "it's"])).unwrap();
        let split = shell_words::split(&command).unwrap();
        assert_eq!(split, vec!["echo", "a b", "it's"]);
    }

    #[test]
    fn resolve_command_rejects_an_empty_command() {
        assert_eq!(resolve_command(&parts(&[])), None);
        assert_eq!(resolve_command(&parts(&["--"])), None);
    }
}
