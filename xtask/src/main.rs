//! Development automation tasks for the `guestdir` workspace.
//!
//! Run with: `cargo xtask <command>`
//!
//! This is a CLI tool for developers, so `println!` and `eprintln!` are
//! intentionally used for user-facing output rather than structured logging.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::process::{Command, ExitCode};

use anyhow::{bail, Context};

mod features;

type Task = fn() -> anyhow::Result<()>;

/// Steps run by `cargo xtask ci`, in order.
const CI_STEPS: &[(&str, Task)] = &[
    ("Checking Rust format", run_fmt),
    ("Running Clippy", run_clippy),
    ("Verifying guestdir-common feature tiers", features::test_feature_matrix),
    ("Running tests", run_test),
    ("Checking dependencies", run_deny),
    ("Auditing dependencies", run_audit),
];

fn main() -> ExitCode {
    let task = env::args().nth(1);

    let result = match task.as_deref() {
        Some("ci") => run_ci(),
        Some("fmt") => run_fmt(),
        Some("clippy") => run_clippy(),
        Some("test") => run_test(),
        Some("deny") => run_deny(),
        Some("audit") => run_audit(),
        Some("test-features") => features::test_feature_matrix(),
        Some("help") | None => {
            print_help();
            Ok(())
        }
        Some(unknown) => {
            eprintln!("Unknown task: {unknown}");
            eprintln!();
            print_help();
            Err(anyhow::anyhow!("Unknown task"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Task failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("guestdir Development Tasks");
    println!();
    println!("USAGE:");
    println!("    cargo xtask <TASK>");
    println!();
    println!("TASKS:");
    println!("    ci             Run every check below in sequence");
    println!("    fmt            Check Rust code formatting");
    println!("    clippy         Run Clippy over all targets and features");
    println!("    test           Run all workspace tests");
    println!("    test-features  Verify guestdir-common feature tiers compile");
    println!("    deny           Check dependencies with cargo-deny");
    println!("    audit          Audit dependencies for security vulnerabilities");
    println!("    help           Show this help message");
}

fn run_ci() -> anyhow::Result<()> {
    println!("==> Running CI checks...");

    for (index, (label, task)) in CI_STEPS.iter().enumerate() {
        println!("\n==> Step {}/{}: {label}...", index + 1, CI_STEPS.len());
        task().with_context(|| format!("CI step '{label}' failed"))?;
    }

    println!("\n✓ All CI checks passed!");
    Ok(())
}

/// Run `cargo <args>`, failing with `hint` on a non-zero exit
fn cargo(args: &[&str], hint: &str) -> anyhow::Result<()> {
    let status = Command::new("cargo")
        .args(args)
        .status()
        .with_context(|| format!("Failed to spawn cargo {}", args.join(" ")))?;

    if !status.success() {
        bail!("{hint}");
    }
    Ok(())
}

/// Ensure an optional cargo subcommand such as `cargo-deny` is installed
fn require_subcommand(name: &str) -> anyhow::Result<()> {
    let installed = Command::new("cargo")
        .args([name, "--version"])
        .output()
        .is_ok_and(|output| output.status.success());

    if !installed {
        eprintln!("cargo-{name} is not installed.");
        eprintln!("Install it with: cargo install cargo-{name}");
        bail!("cargo-{name} not found");
    }
    Ok(())
}

fn run_fmt() -> anyhow::Result<()> {
    cargo(&["fmt", "--all", "--", "--check"], "Format check failed. Run 'cargo fmt --all' to fix.")
}

fn run_clippy() -> anyhow::Result<()> {
    cargo(
        &["clippy", "--workspace", "--all-targets", "--all-features"],
        "Clippy run failed. See output above.",
    )
}

fn run_test() -> anyhow::Result<()> {
    cargo(&["test", "--workspace", "--all-features"], "Tests failed")
}

fn run_deny() -> anyhow::Result<()> {
    require_subcommand("deny")?;
    cargo(&["deny", "check"], "cargo-deny found issues")
}

fn run_audit() -> anyhow::Result<()> {
    require_subcommand("audit")?;
    cargo(&["audit"], "cargo-audit found vulnerabilities")
}
