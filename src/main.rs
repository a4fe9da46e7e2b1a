use clap::{Parser, Subcommand};
use llmstxt::{config, output, session};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "llmstxt")]
#[command(about = "Generate llms.txt documentation artifacts from markdown")]
#[command(long_about = "\
Generate llms.txt documentation artifacts from markdown

Point llmstxt at a directory of markdown files and it produces the plain
text files LLMs consume:

  llms.txt        an index with a table of contents linking every page
  llms-full.txt   the full documentation concatenated into one file
  *.md pages      per-page markdown stripped of site chrome

Content conventions:

  docs/
  ├── llmstxt.toml              # Config (optional — defaults work)
  ├── index.md                  # Supplies the site title and description
  ├── guide/
  │   ├── index.md              # Collapses to guide.md in the output
  │   └── getting-started.md
  └── api/
      └── reference.md

Markdown files may carry YAML frontmatter (title, description) and the
processing tags <llm-only>, <llm-exclude>, and <!-- @llm-include path -->.

Run 'llmstxt gen-config' to print a documented llmstxt.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Docs directory (overrides work_dir from config)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Output directory (overrides out_dir from config)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Directory containing llmstxt.toml
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Prepare all documents and write the configured artifacts
    Build,
    /// Validate the docs directory without writing anything
    Check,
    /// Print a stock llmstxt.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let session = build_session(&cli)?;
            println!("==> Building {}", session.work_dir().display());
            let report = session.run()?;
            output::print_build_output(&report);
        }
        Command::Check => {
            let session = build_session(&cli)?;
            println!("==> Checking {}", session.work_dir().display());
            let report = session.check()?;
            output::print_check_output(&report);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load config from the root directory and apply CLI directory overrides.
fn build_session(cli: &Cli) -> Result<session::BuildSession, config::ConfigError> {
    let mut config = config::load_config(&cli.root)?;
    if let Some(source) = &cli.source {
        config.work_dir = source.to_string_lossy().into_owned();
    }
    if let Some(output) = &cli.output {
        config.out_dir = output.to_string_lossy().into_owned();
    }
    Ok(session::BuildSession::new(config, cli.root.clone()))
}
