use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

const PASSWORD_ENV: &str = "HOSTAUTH_PASSWORD";

/// Check a username/password pair against the host PAM stack.
#[derive(Parser, Debug)]
#[command(name = "hostauth", version)]
struct Cli {
    /// User to authenticate.
    username: String,

    /// PAM service (policy file under /etc/pam.d).
    #[arg(long, env = "HOSTAUTH_SERVICE", default_value = "login")]
    service: String,

    /// Read the password from the first line of this file instead of
    /// the HOSTAUTH_PASSWORD environment variable or stdin.
    #[arg(long)]
    password_file: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let password = resolve_password(
        cli.password_file.as_deref(),
        std::env::var(PASSWORD_ENV).ok(),
        std::io::stdin().lock(),
    )?;

    tracing::info!(service = %cli.service, username = %cli.username, "authenticating");
    hostauth_pam::authenticate(&cli.service, &cli.username, &password)
        .map_err(|err| anyhow::anyhow!("{err}"))?;
    println!("authentication succeeded for {}", cli.username);
    Ok(())
}

/// Precedence: explicit file, then environment, then first stdin line.
fn resolve_password(
    file: Option<&std::path::Path>,
    from_env: Option<String>,
    stdin: impl Read,
) -> anyhow::Result<String> {
    if let Some(path) = file {
        let reader = BufReader::new(std::fs::File::open(path)?);
        return first_line(reader, "password file is empty");
    }
    if let Some(password) = from_env {
        return Ok(password);
    }
    first_line(BufReader::new(stdin), "no password on stdin")
}

fn first_line(mut reader: impl BufRead, empty_message: &str) -> anyhow::Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        anyhow::bail!("{empty_message}");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter)?)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to init logging: {err}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn password_file_takes_precedence() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "from-file").expect("write");
        let password = resolve_password(
            Some(file.path()),
            Some("from-env".to_string()),
            &b"from-stdin\n"[..],
        )
        .expect("password");
        assert_eq!(password, "from-file");
    }

    #[test]
    fn environment_beats_stdin() {
        let password =
            resolve_password(None, Some("from-env".to_string()), &b"from-stdin\n"[..])
                .expect("password");
        assert_eq!(password, "from-env");
    }

    #[test]
    fn stdin_is_the_fallback_and_is_trimmed() {
        let password = resolve_password(None, None, &b"from-stdin\r\n"[..]).expect("password");
        assert_eq!(password, "from-stdin");
    }

    #[test]
    fn empty_stdin_is_an_error() {
        let err = resolve_password(None, None, &b""[..]).expect_err("must fail");
        assert!(err.to_string().contains("no password"));
    }

    #[test]
    fn empty_password_file_is_an_error() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let err = resolve_password(Some(file.path()), None, &b""[..]).expect_err("must fail");
        assert!(err.to_string().contains("password file is empty"));
    }
}
