use clap::Parser;
use gitbuild::{
    auth::InstallationId,
    client::{handle_fetch_command, ArchiveFormat},
    config::{Config, ConfigLoader},
    error::AppError,
    server::run_server,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gitbuild")]
#[command(about = "GitHub App webhook gateway and repository archive fetcher")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub enum Cli {
    /// Receive GitHub webhooks and dispatch build jobs
    Server {
        #[arg(short, long, env = "GITBUILD_CONFIG")]
        config: Option<String>,
        /// Host to bind to (overrides config)
        #[arg(long, env = "SERVER_HOST")]
        host: Option<String>,
        /// Port to bind to (overrides config)
        #[arg(long, env = "SERVER_PORT")]
        port: Option<u16>,
    },
    /// Authenticate as an installation and download a repository archive
    Fetch {
        #[arg(short, long, env = "GITBUILD_CONFIG")]
        config: Option<String>,
        #[arg(long)]
        installation_id: Option<InstallationId>,
        /// Branch, tag or sha (defaults to the repository default branch)
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        repo: Option<String>,
        #[arg(long, value_enum)]
        format: Option<ArchiveFormat>,
        /// File to write the archive to
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gitbuild=info")),
        )
        .init();

    match Cli::parse() {
        Cli::Server { config, host, port } => {
            info!("Starting gitbuild webhook gateway");
            let mut config = ConfigLoader::load(config.as_deref())?;
            apply_server_overrides(&mut config, host, port);
            run_server(config).await
        }
        Cli::Fetch {
            config,
            installation_id,
            branch,
            owner,
            repo,
            format,
            output,
        } => {
            let mut config = ConfigLoader::load(config.as_deref())?;
            apply_fetch_overrides(
                &mut config,
                FetchOverrides {
                    installation_id,
                    branch,
                    owner,
                    repo,
                    format,
                    output,
                },
            );
            handle_fetch_command(&config).await
        }
    }
}

fn apply_server_overrides(config: &mut Config, host: Option<String>, port: Option<u16>) {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
}

#[derive(Default)]
struct FetchOverrides {
    installation_id: Option<InstallationId>,
    branch: Option<String>,
    owner: Option<String>,
    repo: Option<String>,
    format: Option<ArchiveFormat>,
    output: Option<String>,
}

fn apply_fetch_overrides(config: &mut Config, overrides: FetchOverrides) {
    let builder = &mut config.builder;
    if overrides.installation_id.is_some() {
        builder.installation_id = overrides.installation_id;
    }
    if overrides.branch.is_some() {
        builder.branch = overrides.branch;
    }
    if overrides.owner.is_some() {
        builder.owner = overrides.owner;
    }
    if overrides.repo.is_some() {
        builder.repo = overrides.repo;
    }
    if let Some(format) = overrides.format {
        builder.archive_format = format;
    }
    if overrides.output.is_some() {
        builder.output = overrides.output;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_server_command_argument_parsing() {
        std::env::remove_var("GITBUILD_CONFIG");
        std::env::remove_var("SERVER_HOST");
        std::env::remove_var("SERVER_PORT");

        let cli = Cli::try_parse_from(["gitbuild", "server"]).unwrap();
        match cli {
            Cli::Server { config, host, port } => {
                assert!(config.is_none());
                assert!(host.is_none());
                assert!(port.is_none());
            }
            _ => panic!("Expected Server command"),
        }

        let cli = Cli::try_parse_from([
            "gitbuild", "server", "-c", "hooks.toml", "--host", "0.0.0.0", "--port", "3000",
        ])
        .unwrap();
        match cli {
            Cli::Server { config, host, port } => {
                assert_eq!(config.as_deref(), Some("hooks.toml"));
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(3000));
            }
            _ => panic!("Expected Server command"),
        }
    }

    #[test]
    #[serial]
    fn test_server_port_from_environment() {
        std::env::set_var("SERVER_PORT", "9999");
        let cli = Cli::try_parse_from(["gitbuild", "server"]);
        std::env::remove_var("SERVER_PORT");

        match cli.unwrap() {
            Cli::Server { port, .. } => assert_eq!(port, Some(9999)),
            _ => panic!("Expected Server command"),
        }
    }

    #[test]
    fn test_fetch_command_argument_parsing() {
        let cli = Cli::try_parse_from([
            "gitbuild",
            "fetch",
            "--installation-id",
            "42",
            "--branch",
            "dev",
            "--owner",
            "octo",
            "--repo",
            "hello",
            "--format",
            "tarball",
            "-o",
            "src.tar.gz",
        ])
        .unwrap();

        match cli {
            Cli::Fetch {
                installation_id,
                branch,
                owner,
                repo,
                format,
                output,
                ..
            } => {
                assert_eq!(installation_id, Some(InstallationId::new(42)));
                assert_eq!(branch.as_deref(), Some("dev"));
                assert_eq!(owner.as_deref(), Some("octo"));
                assert_eq!(repo.as_deref(), Some("hello"));
                assert_eq!(format, Some(ArchiveFormat::Tarball));
                assert_eq!(output.as_deref(), Some("src.tar.gz"));
            }
            _ => panic!("Expected Fetch command"),
        }
    }

    #[test]
    fn test_invalid_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["gitbuild", "fetch", "--installation-id", "abc"]).is_err());
        assert!(Cli::try_parse_from(["gitbuild", "fetch", "--format", "rar"]).is_err());
        assert!(Cli::try_parse_from(["gitbuild", "server", "--port", "70000"]).is_err());
        assert!(Cli::try_parse_from(["gitbuild", "pull"]).is_err());
    }

    #[test]
    fn test_cli_flags_override_config() {
        let mut config = Config::default();
        config.builder.branch = Some("from-env".to_string());
        config.builder.owner = Some("file-owner".to_string());

        apply_fetch_overrides(
            &mut config,
            FetchOverrides {
                branch: Some("from-flag".to_string()),
                format: Some(ArchiveFormat::Tarball),
                ..Default::default()
            },
        );
        apply_server_overrides(&mut config, None, Some(4000));

        assert_eq!(config.builder.branch.as_deref(), Some("from-flag"));
        assert_eq!(config.builder.owner.as_deref(), Some("file-owner"));
        assert_eq!(config.builder.archive_format, ArchiveFormat::Tarball);
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.host, "127.0.0.1");
    }
}
