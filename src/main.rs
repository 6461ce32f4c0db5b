use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use splint_patcher::diagnostics::{
    annotate, decode, Annotation, DiagnosticRecord, Severity, TextDocument, ToolOutput,
};
use splint_patcher::exclude::{plan_exclusion, rule_has_exclusion};
use splint_patcher::settings::{self, Settings};
use splint_patcher::{Edit, EditResult};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "splint-patcher")]
#[command(about = "Manage splint exclusions and place splint diagnostics", long_about = None)]
#[command(version)]
struct Cli {
    /// Log planning and decoding details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exclude a path from a rule in .splint.edn
    Exclude {
        /// Rule or genre key, e.g. `lint/eq-nil` or `performance`
        rule: String,

        /// Path or pattern to exclude, e.g. `glob:**/foo.clj`
        path: String,

        /// Project root containing .splint.edn
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Show what would change without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Append even if the path is already excluded
        #[arg(long)]
        allow_duplicate: bool,
    },

    /// Check whether a rule already excludes a path (exit 1 if not)
    Check {
        rule: String,
        path: String,

        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },

    /// Place splint's JSON output on a source file
    Annotate {
        /// Source file the output refers to
        source: PathBuf,

        /// File holding splint's stdout (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Exit code of the splint run
        #[arg(long, default_value_t = 0)]
        exit_code: i32,

        /// File holding splint's stderr
        #[arg(long)]
        stderr: Option<PathBuf>,

        /// Apply every available quick fix to SOURCE
        #[arg(long)]
        fix: bool,
    },

    /// Show effective settings
    Settings {
        /// Settings file (defaults to ~/.config/splint-patcher/settings.toml)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Show the splint arguments used to analyse this file
        #[arg(short, long)]
        source: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Exclude {
            rule,
            path,
            root,
            dry_run,
            diff,
            allow_duplicate,
        } => cmd_exclude(&root, &rule, &path, dry_run, diff, allow_duplicate),

        Commands::Check { rule, path, root } => cmd_check(&root, &rule, &path),

        Commands::Annotate {
            source,
            input,
            exit_code,
            stderr,
            fix,
        } => cmd_annotate(&source, input, exit_code, stderr, fix),

        Commands::Settings { file, source } => cmd_settings(file, source),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let line = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", line);
    }
    if !modified.ends_with('\n') {
        println!();
    }
}

fn cmd_exclude(
    root: &Path,
    rule: &str,
    path: &str,
    dry_run: bool,
    show_diff: bool,
    allow_duplicate: bool,
) -> Result<()> {
    if !allow_duplicate && rule_has_exclusion(root, rule, path) {
        println!(
            "{} {} is already excluded from {}",
            "⊙".yellow(),
            path,
            rule
        );
        return Ok(());
    }

    let plan = plan_exclusion(root, rule, path)
        .with_context(|| format!("Failed to plan exclusion for {}", rule))?;

    if plan.replaces_malformed() {
        eprintln!(
            "{}",
            format!(
                "Warning: {} has no closing brace and will be replaced",
                plan.file.display()
            )
            .yellow()
        );
    }

    if show_diff {
        display_diff(&plan.file, plan.before.as_deref().unwrap_or_default(), &plan.after);
    }

    if dry_run {
        println!("{}", "[DRY RUN - nothing written]".cyan());
        println!(
            "{} would exclude {} from {} ({})",
            "✓".green(),
            path,
            rule,
            plan.strategy
        );
        return Ok(());
    }

    plan.apply()
        .with_context(|| format!("Failed to write {}", plan.file.display()))?;
    println!(
        "{} excluded {} from {} ({})",
        "✓".green(),
        path,
        rule,
        plan.strategy
    );
    Ok(())
}

fn cmd_check(root: &Path, rule: &str, path: &str) -> Result<()> {
    if rule_has_exclusion(root, rule, path) {
        println!("{} {}: {}", "✓".green(), rule, "EXCLUDED".green().bold());
        Ok(())
    } else {
        println!("{} {}: {}", "✗".red(), rule, "NOT EXCLUDED".yellow().bold());
        std::process::exit(1);
    }
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read splint output from stdin")?;
            Ok(buf)
        }
    }
}

fn cmd_annotate(
    source: &Path,
    input: Option<PathBuf>,
    exit_code: i32,
    stderr: Option<PathBuf>,
    fix: bool,
) -> Result<()> {
    let text = fs::read_to_string(source)
        .with_context(|| format!("Failed to read {}", source.display()))?;
    let output = ToolOutput {
        exit_code,
        stdout: read_input(input.as_deref())?,
        stderr: match stderr {
            Some(path) => fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            None => String::new(),
        },
    };

    let records: Vec<DiagnosticRecord> = match output.classify() {
        Ok(stdout) => decode(stdout),
        Err(failure) => {
            eprintln!("{} {}", "✗".red(), failure);
            std::process::exit(1);
        }
    };

    let doc = TextDocument::new(&text);
    let annotations = annotate(&doc, &records);
    for annotation in &annotations {
        print_annotation(source, &doc, annotation);
    }

    if fix {
        apply_fixes(source, &doc, &annotations)?;
    }

    Ok(())
}

fn print_annotation(source: &Path, doc: &TextDocument<'_>, annotation: &Annotation) {
    let (start_line, start_col) = doc.line_col(annotation.range.start);
    let (end_line, end_col) = doc.line_col(annotation.range.end);
    let severity = match annotation.severity {
        Severity::Error => annotation.severity.to_string().red().bold(),
        Severity::Warning => annotation.severity.to_string().yellow().bold(),
        Severity::Information => annotation.severity.to_string().cyan().bold(),
    };
    println!(
        "{}:{}:{}-{}:{} {}: {}",
        source.display(),
        start_line + 1,
        start_col + 1,
        end_line + 1,
        end_col + 1,
        severity,
        annotation.message
    );
    if let Some(fix) = &annotation.fix {
        println!("  {}", fix.label().dimmed());
    }
}

fn apply_fixes(source: &Path, doc: &TextDocument<'_>, annotations: &[Annotation]) -> Result<()> {
    let edits: Vec<Edit> = annotations
        .iter()
        .filter_map(|annotation| annotation.fix.as_ref())
        .filter_map(|fix| fix.to_edit(doc, source))
        .collect();

    if edits.is_empty() {
        println!("{}", "No fixes to apply".yellow());
        return Ok(());
    }

    let results = Edit::apply_batch(edits)
        .with_context(|| format!("Failed to apply fixes to {}", source.display()))?;
    let applied = results
        .iter()
        .filter(|result| matches!(result, EditResult::Applied { .. }))
        .count();
    println!(
        "{} applied {} fix(es) to {}",
        "✓".green(),
        applied,
        source.display()
    );
    Ok(())
}

fn cmd_settings(file: Option<PathBuf>, source: Option<String>) -> Result<()> {
    let (settings, origin): (Settings, String) = match file {
        Some(path) => (
            settings::load_from_path(&path)?,
            path.display().to_string(),
        ),
        None => (
            settings::load_default()?,
            settings::default_settings_path()
                .filter(|path| path.is_file())
                .map_or_else(|| "defaults".to_string(), |path| path.display().to_string()),
        ),
    };

    println!("{}", "Splint settings".bold());
    println!("Source: {}", origin);
    println!("  executable_path = {}", settings.executable_path);
    println!("  enable_auto_analysis = {}", settings.enable_auto_analysis);
    println!(
        "  analysis_timeout_seconds = {}",
        settings.analysis_timeout_seconds
    );
    println!("  additional_args = {:?}", settings.additional_args);

    if let Some(source) = source {
        println!();
        println!(
            "{} {}",
            settings.executable_path,
            settings.analysis_args(&source).join(" ")
        );
    }
    Ok(())
}
