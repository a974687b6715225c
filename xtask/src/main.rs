use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use std::process::{exit, Command, ExitStatus};

use bedrock_actions_core::registry::{ActionGroupVariant, OperationRegistry};
use bedrock_actions_core::schema::SchemaSummary;
use clap::{Parser, Subcommand, ValueEnum};
use zip::result::ZipResult;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "bedrock_actions_lambda";
const LAMBDA_BINARY: &str = "action_handler";
const DIST_DIR: &str = "infra/dist";
const ACTION_HANDLER_ZIP: &str = "action-handler.zip";
/// Entry name the Lambda custom runtime executes.
const BOOTSTRAP_ENTRY: &str = "bootstrap";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the Bedrock action group workspace",
    long_about = "A unified CLI for packaging the action handler Lambda,\n\
                  checking action group schemas, and running CI checks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the action handler and package it with its schema document
    ServerlessPackage {
        /// Compilation target triple for the Lambda binary
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for the binary
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
        /// Operation set the deployment serves
        #[arg(value_enum, long, env = "ACTION_GROUP_VARIANT", default_value_t = VariantArg::CustomerService)]
        variant: VariantArg,
    },
    /// Verify every schema document matches its registered operations
    SchemaCheck,
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Schema consistency for every variant
    Schemas,
    /// Run check + schemas
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    Greeting,
    CustomerService,
}

impl From<VariantArg> for ActionGroupVariant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::Greeting => Self::Greeting,
            VariantArg::CustomerService => Self::CustomerService,
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_action_handler(target: &str, profile: BuildProfile, variant: ActionGroupVariant) {
    check_schema(variant);
    preflight_target(target);

    step("Build action handler binary");

    let mut cargo_args = vec![
        "build",
        "-p",
        LAMBDA_PACKAGE,
        "--target",
        target,
        "--bin",
        LAMBDA_BINARY,
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package action handler zip and schema document");
    let dist_dir = Path::new(DIST_DIR);
    fs::create_dir_all(dist_dir).expect("failed to create infra/dist");

    let zip_path = dist_dir.join(ACTION_HANDLER_ZIP);
    zip_action_handler(&handler_binary_path(target, profile), &zip_path);

    let schema_path = dist_dir.join(format!("{variant}-schema.json"));
    fs::write(&schema_path, variant.schema_document()).expect("failed to write schema document");

    eprintln!(
        "\nPackaged artifacts for action group {} ({}), set ACTION_GROUP_VARIANT={variant}:\n- {}\n- {}",
        variant.action_group_name(),
        variant.description(),
        zip_path.display(),
        schema_path.display()
    );
}

fn check_schema(variant: ActionGroupVariant) {
    step(&format!("Check {variant} schema"));

    let summary = match variant.schema_summary() {
        Ok(value) => value,
        Err(error) => {
            eprintln!("error: {variant} schema is invalid: {error}");
            exit(1);
        }
    };

    let registry = variant.registry();
    for line in operation_report(&summary, &registry) {
        eprintln!("  {line}");
    }

    let drift = summary.drift_from(&registry);
    if !drift.is_empty() {
        eprintln!(
            "error: {variant} schema and handlers disagree\n  declared without handler: {:?}\n  handled but undeclared: {:?}",
            drift.unhandled_paths, drift.undeclared_paths
        );
        exit(1);
    }
}

/// Declared operations marked by whether a handler serves them, followed by
/// handled paths the schema never mentions.
fn operation_report(summary: &SchemaSummary, registry: &OperationRegistry) -> Vec<String> {
    let mut lines: Vec<String> = summary
        .operations
        .iter()
        .map(|operation| {
            let status = if registry.contains(&operation.path) {
                "handled"
            } else {
                "no handler"
            };
            format!(
                "{} {} ({}) params={:?} [{status}]",
                operation.method.to_uppercase(),
                operation.path,
                operation.operation_id,
                operation.request_properties
            )
        })
        .collect();

    lines.extend(
        registry
            .paths()
            .filter(|path| summary.operation(path).is_none())
            .map(|path| format!("{path} [not declared]")),
    );
    lines
}

/// Skips the check when rustup itself is unavailable; a missing target aborts.
fn preflight_target(target: &str) {
    let listing = match Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
    {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).into_owned()
        }
        Ok(output) => {
            eprintln!(
                "warning: rustup could not list targets ({}); skipping {target} preflight",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return;
        }
        Err(error) => {
            eprintln!("warning: rustup unavailable ({error}); skipping {target} preflight");
            return;
        }
    };

    if !target_is_installed(&listing, target) {
        eprintln!(
            "error: action handler target `{target}` is missing.\n  rustup target add {target}\n  cargo run -p xtask -- serverless-package --target {target}"
        );
        exit(1);
    }
}

fn target_is_installed(listing: &str, target: &str) -> bool {
    listing.lines().map(str::trim).any(|line| line == target)
}

fn handler_binary_path(target: &str, profile: BuildProfile) -> PathBuf {
    let file_name = if target.contains("windows") {
        format!("{LAMBDA_BINARY}.exe")
    } else {
        LAMBDA_BINARY.to_string()
    };
    Path::new("target")
        .join(target)
        .join(profile.dir_name())
        .join(file_name)
}

fn zip_action_handler(binary_path: &Path, zip_path: &Path) {
    let binary = fs::read(binary_path).unwrap_or_else(|error| {
        panic!(
            "action handler binary not readable at '{}': {error}",
            binary_path.display()
        )
    });
    let file = fs::File::create(zip_path)
        .unwrap_or_else(|error| panic!("cannot create '{}': {error}", zip_path.display()));
    write_bootstrap_zip(&binary, file).expect("failed to write action handler zip");
}

/// Writes `binary` as a single executable `bootstrap` entry.
fn write_bootstrap_zip<W: Write + Seek>(binary: &[u8], writer: W) -> ZipResult<W> {
    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file(BOOTSTRAP_ENTRY, options)?;
    zip.write_all(binary)?;
    zip.finish()
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test bedrock_actions_core");
    run_cargo(&["test", "-p", "bedrock_actions_core"]);

    step("Test bedrock_actions_lambda");
    run_cargo(&["test", "-p", LAMBDA_PACKAGE]);
}

fn ci_schemas() {
    for variant in ActionGroupVariant::ALL {
        check_schema(variant);
    }
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::ServerlessPackage {
            target,
            profile,
            variant,
        } => {
            package_action_handler(&target, profile, variant.into());
        }
        Commands::SchemaCheck => {
            ci_schemas();
            eprintln!("\nAll schemas match their handlers.");
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Schemas => ci_schemas(),
                CiJob::All => {
                    ci_check();
                    ci_schemas();
                }
            }
            eprintln!("\nCI job passed.");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use super::*;

    #[test]
    fn handler_binary_path_follows_target_and_profile() {
        assert_eq!(
            handler_binary_path("x86_64-pc-windows-msvc", BuildProfile::Debug),
            Path::new("target/x86_64-pc-windows-msvc/debug/action_handler.exe")
        );
        assert_eq!(
            handler_binary_path("aarch64-unknown-linux-gnu", BuildProfile::Release),
            Path::new("target/aarch64-unknown-linux-gnu/release/action_handler")
        );
    }

    #[test]
    fn target_listing_matches_whole_lines_only() {
        let listing = "aarch64-unknown-linux-gnu\n  x86_64-unknown-linux-gnu  \n";

        assert!(target_is_installed(listing, "x86_64-unknown-linux-gnu"));
        assert!(target_is_installed(listing, "aarch64-unknown-linux-gnu"));
        assert!(!target_is_installed(listing, "x86_64-unknown-linux-musl"));
        assert!(!target_is_installed(listing, "linux-gnu"));
        assert!(!target_is_installed("", "x86_64-unknown-linux-gnu"));
    }

    #[test]
    fn bootstrap_zip_holds_one_executable_entry() {
        let binary = b"\x7fELF fake action handler".to_vec();
        let cursor = write_bootstrap_zip(&binary, Cursor::new(Vec::new()))
            .expect("zip should be written");

        let mut archive =
            zip::ZipArchive::new(Cursor::new(cursor.into_inner())).expect("zip should open");
        assert_eq!(archive.len(), 1);

        let mut entry = archive
            .by_name(BOOTSTRAP_ENTRY)
            .expect("bootstrap entry should exist");
        assert_eq!(entry.unix_mode().map(|mode| mode & 0o777), Some(0o755));

        let mut contents = Vec::new();
        entry
            .read_to_end(&mut contents)
            .expect("bootstrap entry should read");
        assert_eq!(contents, binary);
    }

    #[test]
    fn operation_report_marks_every_path_handled_for_matching_schemas() {
        for variant in ActionGroupVariant::ALL {
            let summary = variant.schema_summary().expect("schema should parse");
            let report = operation_report(&summary, &variant.registry());

            assert_eq!(report.len(), summary.operations.len(), "{variant}");
            assert!(
                report.iter().all(|line| line.ends_with("[handled]")),
                "{variant}: {report:?}"
            );
        }
    }

    #[test]
    fn operation_report_flags_both_directions_of_mismatch() {
        let summary = ActionGroupVariant::Greeting
            .schema_summary()
            .expect("schema should parse");
        let report = operation_report(&summary, &ActionGroupVariant::CustomerService.registry());

        assert!(report
            .iter()
            .any(|line| line.contains("/sayHello") && line.ends_with("[no handler]")));
        assert!(report.contains(&"/checkOrderStatus [not declared]".to_string()));
        assert!(report.contains(&"/processReturn [not declared]".to_string()));
    }

    #[test]
    fn variant_arg_maps_to_registry_variant() {
        assert_eq!(
            ActionGroupVariant::from(VariantArg::Greeting),
            ActionGroupVariant::Greeting
        );
        assert_eq!(
            ActionGroupVariant::from(VariantArg::CustomerService),
            ActionGroupVariant::CustomerService
        );
    }

    #[test]
    fn cli_parses_package_variant() {
        let cli = Cli::try_parse_from(["xtask", "serverless-package", "--variant", "greeting"])
            .expect("cli should parse");
        match cli.command {
            Commands::ServerlessPackage { variant, .. } => {
                assert_eq!(ActionGroupVariant::from(variant), ActionGroupVariant::Greeting);
            }
            _ => panic!("expected serverless-package command"),
        }
    }
}
