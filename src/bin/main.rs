/// CLI tool for the CodeAdventure engine
use codeadventure_engine::config::load_config_from_env;
use codeadventure_engine::persistence::FolderRepository;
use codeadventure_engine::{diagnostic, load_program, CompleteRequest, Engine, ErrorCode, LevelCatalog};
use serde::Serialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const DEFAULT_STUDENT: &str = "local";

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  codeadventure levels                                  List the bundled levels");
    eprintln!("  codeadventure run <level> <file> [options]            Run a program on a level");
    eprintln!("  codeadventure map <student> [--profiles DIR]          Show a student's level map");
    eprintln!("  codeadventure hint <level> <attempts> [ERROR_CODE]    Show the next hint");
    eprintln!("  codeadventure --help                                  Show this help message");
    eprintln!();
    eprintln!("Run options:");
    eprintln!("  --student ID      Student to run as (default: {DEFAULT_STUDENT})");
    eprintln!("  --profiles DIR    Load and save student profiles in DIR");
    eprintln!("  --complete        Record the run as a level completion");
    eprintln!();
    eprintln!("Programs ending in .json are read as instruction JSON, anything else as text:");
    eprintln!("  repeat 4");
    eprintln!("      move");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CODEADVENTURE_CONFIG_PATH          Engine config JSON file");
    eprintln!("  CODEADVENTURE_UNLOCK_ALL_LEVELS    Report every level as unlocked");
    eprintln!("  RUST_LOG                           Log filter, e.g. codeadventure_engine=debug");
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Remove `--name VALUE` from `args`
fn take_option(args: &mut Vec<String>, name: &str) -> Option<String> {
    let index = args.iter().position(|arg| arg == name)?;
    if index + 1 >= args.len() {
        fail(format!("{} needs a value", name));
    }
    let value = args.remove(index + 1);
    args.remove(index);
    Some(value)
}

/// Remove `--name` from `args`, reporting whether it was present
fn take_flag(args: &mut Vec<String>, name: &str) -> bool {
    match args.iter().position(|arg| arg == name) {
        Some(index) => {
            args.remove(index);
            true
        }
        None => false,
    }
}

fn print_json(value: &impl Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(e),
    }
}

fn build_engine() -> Engine {
    let (config, _path) = load_config_from_env();
    Engine::new(LevelCatalog::builtin(), config)
}

async fn hydrate(engine: &Engine, profiles: Option<&FolderRepository>, student: &str) {
    if let Some(repository) = profiles {
        if let Err(e) = engine.hydrate(repository, student).await {
            fail(e);
        }
    }
}

fn list_levels(engine: &Engine) {
    let catalog = engine.catalog();
    for chapter in catalog.chapters() {
        println!("{}  {}", chapter.id, chapter.title);
        for level in chapter.level_ids.iter().filter_map(|id| catalog.level(id)) {
            println!("    {:<12} {} (par {} steps)", level.id, level.name, level.best_steps);
        }
    }
}

async fn run(engine: &Engine, mut args: Vec<String>) {
    let student = take_option(&mut args, "--student").unwrap_or_else(|| DEFAULT_STUDENT.to_string());
    let profiles = take_option(&mut args, "--profiles").map(|dir| FolderRepository::new(PathBuf::from(dir)));
    let complete = take_flag(&mut args, "--complete");
    let [level_id, file] = args.as_slice() else {
        print_usage();
        process::exit(1);
    };

    let source = fs::read_to_string(file)
        .unwrap_or_else(|e| fail(format!("cannot read program file '{}': {}", file, e)));
    let program = load_program(&source, file.ends_with(".json")).unwrap_or_else(|e| {
        eprint!("{}", diagnostic::report_program_error(file, &source, &e));
        process::exit(1);
    });

    hydrate(engine, profiles.as_ref(), &student).await;
    let result = engine
        .run_program(&student, level_id, &program)
        .unwrap_or_else(|e| fail(e));
    print_json(&result);

    if complete {
        let progress = engine
            .complete_level(&student, level_id, CompleteRequest::from_result(&result))
            .unwrap_or_else(|e| fail(e));
        print_json(&progress);
        if let Some(repository) = &profiles {
            if let Err(e) = engine.persist(repository, &student).await {
                fail(e);
            }
        }
    }
}

async fn map(engine: &Engine, mut args: Vec<String>) {
    let profiles = take_option(&mut args, "--profiles").map(|dir| FolderRepository::new(PathBuf::from(dir)));
    let [student] = args.as_slice() else {
        print_usage();
        process::exit(1);
    };
    hydrate(engine, profiles.as_ref(), student).await;
    print_json(&engine.map(student));
}

fn hint(engine: &Engine, args: Vec<String>) {
    let (level_id, attempts, code) = match args.as_slice() {
        [level_id, attempts] => (level_id, attempts, None),
        [level_id, attempts, code] => (level_id, attempts, Some(code)),
        _ => {
            print_usage();
            process::exit(1);
        }
    };
    let attempts = attempts
        .parse::<u32>()
        .unwrap_or_else(|e| fail(format!("invalid attempt count '{}': {}", attempts, e)));
    let last_error = code.and_then(|code| match code.parse::<ErrorCode>() {
        Ok(code) => Some(code),
        Err(e) => {
            warn!(error = %e, "ignoring unrecognized error code");
            None
        }
    });
    let text = engine
        .hint(DEFAULT_STUDENT, level_id, attempts, last_error.as_ref())
        .unwrap_or_else(|e| fail(e));
    println!("{}", text);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        print_usage();
        process::exit(1);
    }
    let command = args.remove(0);
    if command == "--help" || command == "-h" {
        print_usage();
        process::exit(0);
    }

    let engine = build_engine();
    match command.as_str() {
        "levels" => list_levels(&engine),
        "run" => run(&engine, args).await,
        "map" => map(&engine, args).await,
        "hint" => hint(&engine, args),
        other => {
            eprintln!("Unknown command '{}'", other);
            print_usage();
            process::exit(1);
        }
    }
}
