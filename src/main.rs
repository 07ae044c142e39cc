//! gitwiki - A Git-backed versioned document store
//!
//! This is the command-line front end over the content store.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use gitwiki::storage::{Author, RevisionSpec};
use gitwiki::wiki::{ContentStore, SaveOutcome, StoreConfig, WikiConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

enum Command {
    Show { title: String, revision: Option<String> },
    Save { title: String },
    History { title: String },
    Search { keyword: String },
}

struct Options {
    data_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    verbose: bool,
    json: bool,
    message: String,
    author: Option<String>,
    user: Option<String>,
    positional: Vec<String>,
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    // Parse simple command line args.
    let mut opts = Options {
        data_dir: None,
        config: None,
        verbose: false,
        json: false,
        message: String::new(),
        author: None,
        user: None,
        positional: Vec::new(),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--data-dir" => {
                i += 1;
                if i < args.len() {
                    opts.data_dir = Some(PathBuf::from(&args[i]));
                }
            }
            "-c" | "--config" => {
                i += 1;
                if i < args.len() {
                    opts.config = Some(PathBuf::from(&args[i]));
                }
            }
            "-m" | "--message" => {
                i += 1;
                if i < args.len() {
                    opts.message = args[i].clone();
                }
            }
            "-a" | "--author" => {
                i += 1;
                if i < args.len() {
                    opts.author = Some(args[i].clone());
                }
            }
            "-u" | "--user" => {
                i += 1;
                if i < args.len() {
                    opts.user = Some(args[i].clone());
                }
            }
            "-v" | "--verbose" => {
                opts.verbose = true;
            }
            "--json" => {
                opts.json = true;
            }
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "--version" => {
                println!("gitwiki v{}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            arg => {
                if !arg.starts_with('-') {
                    opts.positional.push(arg.to_string());
                } else {
                    eprintln!("Unknown option: {}", arg);
                    return ExitCode::FAILURE;
                }
            }
        }
        i += 1;
    }

    init_tracing(opts.verbose);

    let command = match parse_command(&opts.positional) {
        Some(command) => command,
        None => {
            print_help();
            return ExitCode::FAILURE;
        }
    };

    match run(&opts, command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "gitwiki=debug" } else { "gitwiki=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_command(positional: &[String]) -> Option<Command> {
    let (name, rest) = positional.split_first()?;
    let command = match (name.as_str(), rest) {
        ("show", [title]) => Command::Show { title: title.clone(), revision: None },
        ("show", [title, revision]) => Command::Show {
            title: title.clone(),
            revision: Some(revision.clone()),
        },
        ("save", [title]) => Command::Save { title: title.clone() },
        ("history", [title]) => Command::History { title: title.clone() },
        ("search", [keyword]) => Command::Search { keyword: keyword.clone() },
        _ => return None,
    };
    Some(command)
}

fn print_help() {
    println!("gitwiki - A Git-backed versioned document store");
    println!();
    println!("Usage: gitwiki [OPTIONS] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  show <title> [revision]  Print a document (default: current revision)");
    println!("  save <title>             Save stdin as the new body of a document");
    println!("  history <title>          List revisions, most recent first");
    println!("  search <keyword>         Case-insensitive full-text search");
    println!();
    println!("Options:");
    println!("  -d, --data-dir PATH      Working tree directory (default: ./data)");
    println!("  -c, --config FILE        Read settings from a TOML file");
    println!("  -m, --message TEXT       Commit message for save");
    println!("  -a, --author 'N <E>'     Author for save");
    println!("  -u, --user NAME          Author for save, looked up in the config users");
    println!("      --json               Print records as JSON");
    println!("  -v, --verbose            Enable debug logging");
    println!("  -h, --help               Show this help message");
    println!("  --version                Show version");
}

fn run(opts: &Options, command: Command) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let site = match &opts.config {
        Some(path) => WikiConfig::from_file(path)?,
        None => WikiConfig::default(),
    };
    let mut config: StoreConfig = site.store_config();
    if let Some(dir) = &opts.data_dir {
        config.path = dir.clone();
    }
    let store = ContentStore::open(config)?;

    match command {
        Command::Show { title, revision } => {
            let revision = RevisionSpec::from(revision.as_deref());
            match store.load(&title, &revision) {
                Ok(doc) if opts.json => println!("{}", serde_json::to_string_pretty(&doc)?),
                Ok(doc) => print!("{}", doc.body),
                Err(e) if e.is_not_found() => {
                    eprintln!("{} not found at {}", title, revision);
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Save { title } => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            let author = resolve_author(opts, &site)?;
            match store.save(&title, &body, &opts.message, &author)? {
                SaveOutcome::Committed { revision } => println!("{}", revision),
                SaveOutcome::Unchanged => println!("unchanged"),
            }
        }
        Command::History { title } => {
            let revisions = store.history(&title)?;
            if opts.json {
                println!("{}", serde_json::to_string_pretty(&revisions)?);
            } else {
                for rev in &revisions {
                    println!("{}\t{}\t{}\t{}", rev.object_id, rev.timestamp, rev.author, rev.description);
                }
            }
        }
        Command::Search { keyword } => {
            let results = store.search(&keyword);
            if opts.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for result in &results {
                    println!("{}: {}", result.title, result.content);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn resolve_author(opts: &Options, site: &WikiConfig) -> Result<Author, String> {
    if let Some(raw) = &opts.author {
        return Author::parse(raw).ok_or_else(|| format!("invalid author {:?}, expected 'Name <email>'", raw));
    }
    Ok(opts.user.as_deref().map(|u| site.author_for(u)).unwrap_or_default())
}
