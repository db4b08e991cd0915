use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use route_patcher::config::{builtin_plan, load_from_path, FixPlan};
use route_patcher::document;
use route_patcher::verify::block_hash_hex;
use route_patcher::{PatchReport, Patcher, RunOptions, SaveOptions, Transformation};
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "route-patcher")]
#[command(
    about = "Remove duplicate route handlers and add auth middleware to a server source file",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a fix plan to the target file (default)
    Apply(ApplyArgs),

    /// Report what a fix plan would change without writing
    Check {
        #[command(flatten)]
        source: PlanArgs,
    },

    /// Print the ranges and rules of a fix plan
    Show {
        /// Fix plan TOML (defaults to the built-in plan)
        #[arg(short, long)]
        plan: Option<PathBuf>,
    },
}

#[derive(Args, Default)]
struct PlanArgs {
    /// Fix plan TOML (defaults to the built-in plan)
    #[arg(short, long)]
    plan: Option<PathBuf>,

    /// File to patch (overrides the plan's target)
    #[arg(short, long)]
    target: Option<PathBuf>,
}

#[derive(Args, Default)]
struct ApplyArgs {
    #[command(flatten)]
    source: PlanArgs,

    /// Write the result here instead of over the target
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep a copy of the original as <target>.bak
    #[arg(short, long)]
    backup: bool,

    /// Dry run - show what would be changed without modifying files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show unified diff of changes
    #[arg(short, long)]
    diff: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => cmd_apply(ApplyArgs::default()),
        Some(Commands::Apply(args)) => cmd_apply(args),
        Some(Commands::Check { source }) => cmd_check(source),
        Some(Commands::Show { plan }) => cmd_show(plan),
    }
}

/// Helper: Load the plan from --plan, or fall back to the built-in one
fn resolve_plan(plan: Option<&Path>) -> Result<FixPlan> {
    match plan {
        Some(path) => Ok(load_from_path(path)?),
        None => Ok(builtin_plan().context("built-in fix plan is invalid")?),
    }
}

fn resolve_target(cli_target: Option<PathBuf>, plan: &FixPlan) -> PathBuf {
    cli_target.unwrap_or_else(|| PathBuf::from(&plan.meta.target))
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for hunk in diff.unified_diff().context_radius(2).iter_hunks() {
        println!("{}", format!("{}", hunk.header()).cyan());
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => format!("-{}", change).red(),
                ChangeTag::Insert => format!("+{}", change).green(),
                ChangeTag::Equal => format!(" {}", change).normal(),
            };
            print!("{}", sign);
            if change.missing_newline() {
                println!();
            }
        }
    }
}

/// Helper: Print the removal and substitution steps of a transformation
fn print_transformation(t: &Transformation, dry_run: bool) {
    let verb = if dry_run { "Would remove" } else { "Removing" };

    println!("Original file: {} lines", t.original_lines);
    for span in &t.removed {
        let label = span
            .label
            .as_deref()
            .map(|l| format!(" [{l}]"))
            .unwrap_or_default();
        println!(
            "{} lines {}-{} ({} lines){}",
            verb,
            span.start + 1,
            span.end,
            span.count(),
            label.dimmed()
        );
    }
    println!("After removing duplicates: {} lines", t.lines_after_removal);
    println!();

    for matched in &t.substitution.matched {
        let name = matched.label.as_deref().unwrap_or(&matched.pattern);
        println!("{} Added auth to: {}", "✓".green(), name);
    }
    for missing in &t.substitution.unmatched {
        let name = missing.label.as_deref().unwrap_or(&missing.pattern);
        println!("{} {}", "⊙".yellow(), format!("No match: {name}").dimmed());
        if let Some((line, text)) = &missing.closest {
            println!(
                "    {}",
                format!("closest line {}: {}", line + 1, text).dimmed()
            );
        }
    }

    println!();
    println!(
        "Added authentication to {} endpoints",
        format!("{}", t.substitution.applied()).green()
    );
}

fn cmd_apply(args: ApplyArgs) -> Result<()> {
    // 1. Load plan and resolve the target
    let plan = resolve_plan(args.source.plan.as_deref())?;
    let target = resolve_target(args.source.target, &plan);
    let patcher = Patcher::new(&plan)?;

    if !plan.meta.name.is_empty() {
        println!("Plan: {}", plan.meta.name);
    }
    println!("Target: {}", target.display());
    if args.dry_run {
        println!("{}", "[DRY RUN - nothing will be written]".cyan());
    }
    println!();

    // 2. Run the pipeline
    let options = RunOptions {
        save: SaveOptions {
            output: args.output,
            backup: args.backup,
        },
        dry_run: args.dry_run,
    };
    let report: PatchReport = patcher
        .run(&target, &options)
        .with_context(|| format!("failed to patch {}", target.display()))?;

    // 3. Report results
    let t = &report.transformation;
    print_transformation(t, args.dry_run);
    println!("\nFinal file: {} lines", t.final_lines());

    if args.diff && report.original != t.text() {
        display_diff(&report.target, &report.original, t.text());
    }

    match &report.saved {
        Some(saved) => {
            println!("Wrote {}", saved.written.display());
            if let Some(backup) = &saved.backup {
                println!("{}", format!("Backup: {}", backup.display()).dimmed());
            }
            println!("✅ {}", "Fixes applied successfully!".green().bold());
        }
        None => println!("{}", "Dry run complete, target unchanged".cyan()),
    }

    println!("\n{}", "Changes made:".bold());
    println!(
        "- Removed {} duplicate blocks ({} lines)",
        t.removed.len(),
        t.removed_count()
    );
    println!(
        "- Added authMiddleware to {} endpoints",
        t.substitution.applied()
    );

    if report.saved.is_some() {
        println!("\nPlease restart the server: {}", plan.meta.restart_hint);
    }

    Ok(())
}

fn cmd_check(source: PlanArgs) -> Result<()> {
    let plan = resolve_plan(source.plan.as_deref())?;
    let target = resolve_target(source.target, &plan);
    let patcher = Patcher::new(&plan)?;

    println!("{}", "Fix Plan Check".bold());
    println!("Target: {}", target.display());
    println!();

    // Read-only: transform in memory and report
    let lines = document::load(&target)?;
    let t = patcher.transform(&lines)?;

    println!("{}", "Ranges:".bold());
    for range in patcher.ranges() {
        let (start, end) = range.clamped(lines.len());
        if start == end {
            println!("  {} [{}, {}) empty after clamping", "⊘".cyan(), range.start, range.end);
            continue;
        }
        let block = document::join_lines(&lines[start..end]);
        println!(
            "  {} [{}, {}) {} lines, xxh3 {}",
            "-".normal(),
            start,
            end,
            end - start,
            block_hash_hex(&block).dimmed()
        );
    }
    println!();

    println!("{}", "Rules:".bold());
    for matched in &t.substitution.matched {
        let name = matched.label.as_deref().unwrap_or(&matched.pattern);
        println!(
            "  {} {}: would apply ({} occurrence{})",
            "⊙".yellow(),
            name,
            matched.occurrences,
            if matched.occurrences == 1 { "" } else { "s" }
        );
    }
    for missing in &t.substitution.unmatched {
        let name = missing.label.as_deref().unwrap_or(&missing.pattern);
        println!("  {} {}: no match", "✓".green(), name);
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} lines would be removed", t.removed_count());
    println!(
        "  {} rules pending",
        format!("{}", t.substitution.applied()).yellow()
    );
    println!(
        "  {} rules without a match",
        format!("{}", t.substitution.unmatched.len()).green()
    );

    if t.substitution.applied() > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_show(plan: Option<PathBuf>) -> Result<()> {
    let plan = resolve_plan(plan.as_deref())?;

    let name = if plan.meta.name.is_empty() {
        "(unnamed)"
    } else {
        plan.meta.name.as_str()
    };
    println!("{} {}", "Plan:".bold(), name);
    if let Some(description) = &plan.meta.description {
        println!("{}", description.dimmed());
    }
    println!("Target: {}", plan.meta.target);
    println!();

    println!("{} ({})", "Ranges".bold(), plan.ranges.len());
    for range in &plan.ranges {
        let label = range.label.as_deref().unwrap_or("");
        let mut flags = Vec::new();
        if range.verify.is_some() {
            flags.push("verify");
        }
        if range.ensure_duplicate {
            flags.push("ensure_duplicate");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!("  [{}, {}) {}{}", range.start, range.end, label, flags.dimmed());
    }
    println!();

    println!("{} ({})", "Rules".bold(), plan.rules.len());
    for rule in &plan.rules {
        match &rule.label {
            Some(label) => println!("  {}", label),
            None => println!("  {}", rule.pattern),
        }
        println!("    {} {}", "pattern:".dimmed(), rule.pattern);
        println!("    {} {}", "replace:".dimmed(), rule.replacement);
    }

    Ok(())
}
