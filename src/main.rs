use clap::Parser;
use rustyline::completion::Completer;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use tracing::error;

use artillery::config::{LogArgs, SolverArgs};
use artillery::logging::init_logging;
use artillery::server::AppState;
use artillery::server_cli::{handle_cli_command, print_help, COMMANDS};

const HISTORY_FILE: &str = ".artillery_history";

#[derive(Parser, Debug)]
#[command(version, about = "Interactive indirect-fire calculator")]
struct Cli {
    #[command(flatten)]
    solver: SolverArgs,
    #[command(flatten)]
    log: LogArgs,
}

// =====================
// Autocomplete helper
// =====================
struct CommandHelper {
    commands: Vec<&'static str>,
    munitions: Vec<&'static str>,
}

impl Completer for CommandHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let line = &line[..pos];
        let start = line.rfind(' ').map(|i| i + 1).unwrap_or(0);
        let prefix = &line[start..];

        // first word is a command, second word a munition name
        let candidates = match line[..start].split_whitespace().count() {
            0 => &self.commands,
            1 => &self.munitions,
            _ => return Ok((start, Vec::new())),
        };

        let matches: Vec<String> = candidates
            .iter()
            .filter(|c| c.starts_with(prefix))
            .map(|c| c.to_string())
            .collect();

        Ok((start, matches))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}
impl Highlighter for CommandHelper {}
impl Validator for CommandHelper {}
impl rustyline::Helper for CommandHelper {}

// =====================
// CLI loop
// =====================
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log.log_config())?;

    let state = AppState {
        solver: cli.solver.solver_config()?,
    };

    print_help();
    wait_for_command(&state)
}

fn wait_for_command(state: &AppState) -> anyhow::Result<()> {
    use rustyline::error::ReadlineError;
    use rustyline::history::DefaultHistory;
    use rustyline::{Config, Editor};

    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<CommandHelper, DefaultHistory> = Editor::with_config(config)?;

    let helper = CommandHelper {
        commands: COMMANDS.to_vec(),
        munitions: artillery::MunitionProfile::all().iter().map(|p| p.name).collect(),
    };
    rl.set_helper(Some(helper));
    let _ = rl.load_history(HISTORY_FILE);

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let cmd = line.trim();
                if matches!(cmd, "exit" | "quit" | "q") {
                    break;
                }
                handle_cli_command(cmd, state);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("exit");
                break;
            }
            Err(err) => {
                error!(%err, "readline failed");
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
    Ok(())
}
