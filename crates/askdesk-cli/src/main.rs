//! askdesk CLI: Command-line interface for the campus support assistant

use askdesk_engine::{
    load_resources, probe_command, resolve_pending, submit, Config, Language, Resolution, Session,
    SubmitOutcome,
};
use clap::{Parser, Subcommand};
use std::path::Path;
use std::time::Duration;

/// Multilingual campus support assistant with TUI
#[derive(Parser)]
#[command(name = "askdesk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui,

    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        question: String,

        /// Language to ask and answer in (en, fr, es)
        #[arg(long, default_value = "en")]
        language: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize .askdesk/ directory and config
    Init,

    /// Check that the configured pipeline commands respond
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

const ASKDESK_DIR: &str = ".askdesk";

fn main() {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Tui) => {
            cmd_tui();
        }
        Some(Commands::Ask {
            question,
            language,
            json,
        }) => {
            cmd_ask(&question, &language, json);
        }
        Some(Commands::Init) => {
            cmd_init();
        }
        Some(Commands::Doctor { json }) => {
            cmd_doctor(json);
        }
    }
}

fn load_config() -> Config {
    let config_path = Path::new(ASKDESK_DIR).join("config.json");
    if config_path.exists() {
        match Config::load(&config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {e}", config_path.display());
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    }
}

fn cmd_tui() {
    let data_dir = std::env::current_dir()
        .expect("Failed to get current directory")
        .join(ASKDESK_DIR);
    let config = load_config();

    let pipeline = match load_resources(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Run `askdesk doctor` to check the pipeline commands.");
            std::process::exit(1);
        }
    };

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    if let Err(e) = rt.block_on(askdesk_tui::run_tui(&data_dir, &config, pipeline)) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_ask(question: &str, language: &str, json: bool) {
    let language: Language = match language.parse() {
        Ok(language) => language,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let config = load_config();
    let pipeline = match load_resources(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let mut session = Session::new();
    session.set_language(language);
    session.set_input(question);

    if submit(&mut session) != SubmitOutcome::Submitted {
        eprintln!("Error: question is empty");
        std::process::exit(1);
    }

    let resolution = resolve_pending(&mut session, &pipeline, &config.error_reply);

    let answer = session.last_answer().unwrap_or(&config.error_reply);

    if json {
        let out = serde_json::json!({
            "question": question,
            "language": language.code(),
            "answer": answer,
            "recovered": resolution == Resolution::Recovered,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).expect("failed to serialize")
        );
    } else {
        println!("{answer}");
    }

    if resolution == Resolution::Recovered {
        std::process::exit(1);
    }
}

fn cmd_init() {
    let askdesk_dir = Path::new(ASKDESK_DIR);

    if let Err(e) = std::fs::create_dir_all(askdesk_dir.join("sessions")) {
        eprintln!("Failed to create {}: {e}", askdesk_dir.display());
        std::process::exit(1);
    }

    let config_path = askdesk_dir.join("config.json");
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
    } else {
        let config = Config::default();
        match config.save(&config_path) {
            Ok(()) => println!("Created {}", config_path.display()),
            Err(e) => {
                eprintln!("Failed to write config: {e}");
                std::process::exit(1);
            }
        }
    }

    println!("\nInitialization complete!");
    println!(
        "Edit {} to point at your retrieval and translation commands",
        config_path.display()
    );
}

fn cmd_doctor(json: bool) {
    let config = load_config();
    let timeout = Duration::from_secs(10);

    let reports = [
        ("answer", probe_command(&config.answer_argv, timeout)),
        ("translate", probe_command(&config.translate_argv, timeout)),
    ];

    if json {
        let out: Vec<_> = reports
            .iter()
            .map(|(role, report)| serde_json::json!({ "role": role, "report": report }))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&out).expect("failed to serialize")
        );
        return;
    }

    println!("Pipeline Command Check\n");

    for (role, report) in &reports {
        let status = if report.responded {
            "ready"
        } else if report.found {
            "found but not responding"
        } else {
            "not found"
        };

        println!("  {} ({}) - {}", report.command, role, status);

        if let Some(path) = &report.path {
            println!("    Path: {path}");
        }
        if let Some(ms) = report.response_time_ms {
            println!("    Response time: {ms}ms");
        }
        for issue in &report.issues {
            println!("    Issue: {issue}");
        }
        println!();
    }

    let ready_count = reports.iter().filter(|(_, r)| r.responded).count();
    println!("{ready_count}/2 command(s) ready");
}
