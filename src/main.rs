use clap::{Parser, Subcommand};
use snapship::commands;
use snapship::core::error::{print_error, ShipError};
use std::path::PathBuf;

/// Release automation for snap packages
#[derive(Parser)]
#[command(name = "snapship")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Packaging repository to operate on (defaults to the current directory)
  #[arg(long, global = true)]
  workspace: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a full release: build, diff, changelog, commit, tag, push
  Release {
    /// Branch to release (defaults to the current branch)
    branch: Option<String>,
    /// Print the plan without building or pushing anything
    #[arg(long)]
    dry_run: bool,
  },

  /// Synthesize a changelog entry from merge history and print it
  #[command(disable_version_flag = true)]
  Changelog {
    /// Commit range to scan (defaults to everything since the last tag)
    range: Option<String>,
    /// Version for the entry header (defaults to the recipe version)
    #[arg(long)]
    version: Option<String>,
    /// File whose content is appended verbatim after the author groups
    #[arg(long)]
    trailing: Option<PathBuf>,
    /// Output the entry in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Inspect dependency manifests
  Manifest {
    #[command(subcommand)]
    command: ManifestCommands,
  },
}

#[derive(Subcommand)]
enum ManifestCommands {
  /// Diff two manifest files and print the package changes
  Diff {
    /// Baseline manifest file
    old: PathBuf,
    /// New manifest file
    new: PathBuf,
    /// File-path pattern to exclude (repeatable)
    #[arg(long)]
    exclude: Vec<String>,
    /// Directory of per-package changelog fragments for excerpts
    #[arg(long)]
    docs: Option<PathBuf>,
    /// Output the changes in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Resolve the baseline manifest for a channel and print it
  Baseline {
    /// Channel to resolve (defaults to the configured channel)
    #[arg(long)]
    channel: Option<String>,
    /// Architecture to resolve (defaults to the configured default)
    #[arg(long)]
    arch: Option<String>,
    /// Manifest cache directory (defaults to the configured manifest dir)
    #[arg(long)]
    cache: Option<PathBuf>,
  },
}

fn main() {
  // Usage errors exit 1, matching the rest of the user-error taxonomy
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(err) => {
      let code = match err.kind() {
        clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
        _ => 1,
      };
      let _ = err.print();
      std::process::exit(code);
    }
  };

  let workspace = match cli.workspace {
    Some(workspace) => workspace,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => {
        eprintln!("Error: Failed to get current directory: {}", e);
        std::process::exit(2);
      }
    },
  };

  let result = match cli.command {
    Commands::Release { branch, dry_run } => commands::release::run_release(&workspace, branch, dry_run),
    Commands::Changelog {
      range,
      version,
      trailing,
      json,
    } => commands::changelog::run_changelog(&workspace, range, version, trailing.as_deref(), json),
    Commands::Manifest { command } => match command {
      ManifestCommands::Diff {
        old,
        new,
        exclude,
        docs,
        json,
      } => commands::manifest::run_manifest_diff(&workspace, &old, &new, &exclude, docs.as_deref(), json),
      ManifestCommands::Baseline { channel, arch, cache } => {
        commands::manifest::run_manifest_baseline(&workspace, channel, arch, cache)
      }
    },
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ShipError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}
