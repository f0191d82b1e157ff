use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, Command};
use scenekeep_cli::{
    diff_documents, init_logging, load_document, load_script, render_text, run_script, LogFormat,
};
use scenekeep_model::ChangeOptions;
use scenekeep_session::SessionConfig;
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("scenekeep")
        .version(scenekeep_session::VERSION)
        .about("Edit-session tooling for dashboard documents")
        .subcommand_required(true)
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("pretty")
                .value_parser(value_parser!(LogFormat))
                .help("Log line format on stderr (pretty or json)"),
        )
        .subcommand(
            Command::new("replay")
                .about("Replay an edit script through a session")
                .arg(
                    Arg::new("script")
                        .long("script")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to the JSON script"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Session configuration (TOML)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output the full report as JSON"),
                ),
        )
        .subcommand(
            Command::new("diff")
                .about("Show what changed between two documents")
                .arg(
                    Arg::new("initial")
                        .long("initial")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Baseline document (JSON)"),
                )
                .arg(
                    Arg::new("changed")
                        .long("changed")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Changed document (JSON)"),
                )
                .arg(
                    Arg::new("include-view-state")
                        .long("include-view-state")
                        .action(ArgAction::SetTrue)
                        .help("Count time range, refresh and variable values as changes"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    let log_format = matches
        .get_one::<LogFormat>("log-format")
        .copied()
        .unwrap_or_default();
    init_logging(log_format, "info")?;

    match matches.subcommand() {
        Some(("replay", args)) => {
            let config = match args.get_one::<PathBuf>("config") {
                Some(path) => SessionConfig::from_toml_file(path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => SessionConfig::default(),
            };
            let script_path = args
                .get_one::<PathBuf>("script")
                .context("--script is required")?;
            let script = load_script(script_path)?;
            let report = run_script(script, config)?;

            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for step in &report.steps {
                    println!("{:>3}  {:<16} {}", step.index, step.op, step.outcome);
                }
                println!();
                println!("Title:   {}", report.document.title);
                println!("Editing: {}", report.is_editing);
                println!("Dirty:   {}", report.is_dirty);
                println!("History: {} undo / {} redo", report.undo_depth, report.redo_depth);
                if let Some(changes) = &report.changes {
                    println!();
                    print!("{}", render_text(changes));
                }
            }
        }
        Some(("diff", args)) => {
            let initial_path = args
                .get_one::<PathBuf>("initial")
                .context("--initial is required")?;
            let changed_path = args
                .get_one::<PathBuf>("changed")
                .context("--changed is required")?;
            let options = if args.get_flag("include-view-state") {
                ChangeOptions {
                    save_time_range: true,
                    save_variables: true,
                    save_refresh: true,
                }
            } else {
                ChangeOptions::default()
            };

            let changes = diff_documents(
                &load_document(initial_path)?,
                &load_document(changed_path)?,
                options,
            )?;
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&changes)?);
            } else {
                print!("{}", render_text(&changes));
            }
            if changes.has_changes {
                std::process::exit(1);
            }
        }
        _ => unreachable!("subcommand_required"),
    }
    Ok(())
}
