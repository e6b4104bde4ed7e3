use std::io::{self, BufRead};

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use artillery::config::{LogArgs, SolverArgs};
use artillery::logging::init_logging;
use artillery::server::build_app_with_state;
use artillery::server_cli::{handle_cli_command, print_prompt};

#[derive(Parser, Debug)]
#[command(version, about = "Indirect-fire calculator web API")]
struct Args {
    /// Address the HTTP API listens on
    #[arg(long, env = "ARTILLERY_BIND", default_value = "0.0.0.0:3000")]
    bind: String,
    /// Serve the API only, even when stdin is a terminal
    #[arg(long)]
    no_console: bool,
    #[command(flatten)]
    solver: SolverArgs,
    #[command(flatten)]
    log: LogArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log.log_config())?;

    let solver = args.solver.solver_config()?;
    let (app, state) = build_app_with_state(solver);

    let listener = TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!(addr = %listener.local_addr()?, "server listening");

    let interactive = !args.no_console && atty::is(atty::Stream::Stdin);

    if interactive {
        // Spawn web server in background
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "server stopped");
            }
        });

        // CLI loop
        let stdin = io::stdin();
        let reader = stdin.lock();

        print_prompt();

        for line in reader.lines() {
            match line {
                Ok(input) => {
                    let cmd = input.trim();
                    if cmd == "exit" || cmd == "quit" || cmd == "q" {
                        println!("Shutting down...");
                        break;
                    }
                    handle_cli_command(cmd, &state);
                }
                Err(_) => break,
            }

            print_prompt();
        }
    } else {
        info!("running in non-interactive mode (web server only)");
        axum::serve(listener, app).await?;
    }

    Ok(())
}
