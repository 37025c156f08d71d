use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use scanprobe::config::{Config, Selection};
use scanprobe::harness::Harness;
use scanprobe::report::Reporter;
use scanprobe::scanner::ScannerRegistry;

#[derive(Parser)]
#[command(name = "scanprobe", version, about = "Differential fuzz and regression harness for scanners")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the suite in a directory of example collections
    Run {
        /// Suite root containing one subdirectory per collection
        #[arg(default_value = "suite")]
        suite: PathBuf,
        /// Size preset: fast, default or deluxe
        #[arg(long, default_value = "default")]
        preset: String,
        /// Maximum fuzz size in bytes (overrides the preset)
        #[arg(long)]
        max: Option<usize>,
        /// Abort on the first failure instead of aggregating
        #[arg(long)]
        strict: bool,
        /// Skip the random-bytes fuzz category
        #[arg(long)]
        no_random: bool,
        /// Skip the truncated-prefix fuzz category
        #[arg(long)]
        no_incremental: bool,
        /// Skip the word-shuffle fuzz category
        #[arg(long)]
        no_shuffled: bool,
        /// Skip the token-reassembly identity check
        #[arg(long)]
        no_identity: bool,
        /// Skip HTML rendering of results
        #[arg(long)]
        no_highlighting: bool,
        /// Restrict the run to a selection, e.g. "source" or "source.hello"
        #[arg(long)]
        only: Option<String>,
        /// Accept current output as the new baseline for a selection
        #[arg(long)]
        accept: Option<String>,
    },
    /// List collections and examples in a suite
    List {
        #[arg(default_value = "suite")]
        suite: PathBuf,
    },
}

fn parse_preset(name: &str) -> Result<Config, String> {
    match name {
        "fast" => Ok(Config::fast()),
        "default" => Ok(Config::default()),
        "deluxe" => Ok(Config::deluxe()),
        other => Err(format!("unknown preset '{other}'; expected 'fast', 'default' or 'deluxe'")),
    }
}

fn parse_selection(spec: Option<&str>) -> Option<Selection> {
    match spec.map(Selection::parse).transpose() {
        Ok(selection) => selection,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let colored = !cli.no_color && std::io::stdout().is_terminal();
    let reporter = if colored { Reporter::colored() } else { Reporter::plain() };
    let registry = ScannerRegistry::with_builtins();

    match cli.command {
        Commands::Run {
            suite,
            preset,
            max,
            strict,
            no_random,
            no_incremental,
            no_shuffled,
            no_identity,
            no_highlighting,
            only,
            accept,
        } => {
            let mut config = match parse_preset(&preset) {
                Ok(config) => config,
                Err(msg) => {
                    eprintln!("error: {msg}");
                    std::process::exit(1);
                }
            };
            if let Some(max) = max {
                config.max = max;
            }
            config.strict = strict;
            config.no_random = no_random;
            config.no_incremental = no_incremental;
            config.no_shuffled = no_shuffled;
            config.no_identity = no_identity;
            config.no_highlighting = no_highlighting;
            config.only = parse_selection(only.as_deref());
            config.accept = parse_selection(accept.as_deref());
            // Accepting a baseline implies running only that selection.
            if config.only.is_none() {
                config.only = config.accept.clone();
            }

            match Harness::new(config, &registry, &reporter).run(&suite) {
                Ok(summary) if summary.passed() => {}
                Ok(_) => std::process::exit(1),
                Err(err) => {
                    eprintln!("error: {err}");
                    std::process::exit(1);
                }
            }
        }
        Commands::List { suite } => {
            let collections = match scanprobe::example::discover_collections(&suite) {
                Ok(collections) => collections,
                Err(err) => {
                    eprintln!("error: {err}");
                    std::process::exit(1);
                }
            };
            for collection in collections {
                let Some(scanner) = registry.get(&collection.name) else {
                    println!("{} (no scanner registered)", collection.name);
                    continue;
                };
                println!("{}", collection.name);
                match scanprobe::example::discover_examples(&collection.dir, scanner.file_extension())
                {
                    Ok(examples) => {
                        for example in examples {
                            println!("  {} ({} bytes)", example.name, example.size);
                        }
                    }
                    Err(err) => eprintln!("  error: {err}"),
                }
            }
        }
    }
}
