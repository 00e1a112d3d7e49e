//! Run orchestration: read, transform, write.
//!
//! Each run is all-or-nothing. Output existence is checked before a key is
//! generated, the key artifact is written before any field is sealed, and the
//! document is written only after the whole transform has succeeded.

use std::path::{Path, PathBuf};

use common::{Mode, SchemaWarning, SealError, TransformStats};
use sealer::{key, storage, transform, SealKey};
use tracing::{info, warn};

use crate::cli::{Action, Cli};
use crate::config::Config;
use crate::paths;

/// Fully resolved options for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub action: Action,
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub keyfile: Option<PathBuf>,
    pub tag: String,
    pub force: bool,
    pub max_input_bytes: u64,
}

impl RunOptions {
    /// Merge command-line flags over the environment configuration.
    pub fn new(cli: &Cli, cfg: &Config) -> Self {
        Self {
            action: cli.action(),
            input: cli.input.clone(),
            output: cli.output.clone(),
            keyfile: cli.keyfile.clone(),
            tag: cli.tag.clone().unwrap_or_else(|| cfg.tag.clone()),
            force: cli.force,
            max_input_bytes: cfg.max_input_bytes,
        }
    }
}

/// Outcome of a run, printed by `main`.
#[derive(Debug)]
pub enum Report {
    Sealed {
        output: PathBuf,
        stats: TransformStats,
        key_path: PathBuf,
        key_created: bool,
        warnings: Vec<SchemaWarning>,
    },
    Opened {
        output: PathBuf,
        stats: TransformStats,
        warnings: Vec<SchemaWarning>,
    },
    Inspected(sealer::Inspection),
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Report::Sealed {
                output,
                stats,
                key_path,
                key_created,
                warnings,
            } => {
                writeln!(
                    f,
                    "Wrote: {} (encrypted values: {}, already encrypted: {})",
                    output.display(),
                    stats.changed,
                    stats.skipped
                )?;
                if *key_created {
                    writeln!(f, "Wrote: {}", key_path.display())?;
                } else {
                    writeln!(f, "Used key: {}", key_path.display())?;
                }
                write!(
                    f,
                    "Keep {} secret and safe: without it the encrypted values cannot be recovered.",
                    key_path.display()
                )?;
                write_warnings(f, warnings)
            }
            Report::Opened {
                output,
                stats,
                warnings,
            } => {
                write!(
                    f,
                    "Wrote: {} (decrypted values: {})",
                    output.display(),
                    stats.changed
                )?;
                write_warnings(f, warnings)
            }
            Report::Inspected(report) => {
                write!(
                    f,
                    "state: {} (targets: {}, encrypted: {}, plaintext: {}, malformed: {})",
                    report.state,
                    report.locations,
                    report.tokens,
                    report.plaintext,
                    report.malformed
                )?;
                if let Some(fp) = &report.key_fingerprint {
                    write!(f, "\nkey fingerprint: {fp}")?;
                }
                write_warnings(f, &report.warnings)
            }
        }
    }
}

/// One line per schema warning, each prefixed with a newline.
fn write_warnings(f: &mut std::fmt::Formatter<'_>, warnings: &[SchemaWarning]) -> std::fmt::Result {
    for warning in warnings {
        write!(f, "\nwarning: {warning}")?;
    }
    Ok(())
}

/// Execute one run.
///
/// # Errors
///
/// Propagates every [`SealError`]; nothing is written for the failing step.
pub fn run(opts: &RunOptions) -> Result<Report, SealError> {
    match opts.action {
        Action::Encrypt => seal(opts),
        Action::Decrypt => open(opts),
        Action::Inspect => {
            let document = storage::read_document(&opts.input, opts.max_input_bytes)?;
            Ok(Report::Inspected(sealer::inspect(&document)))
        }
    }
}

fn seal(opts: &RunOptions) -> Result<Report, SealError> {
    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| paths::sealed_output(&opts.input, &opts.tag));
    ensure_writable(&output, opts.force)?;

    let document = storage::read_document(&opts.input, opts.max_input_bytes)?;

    let key_path = opts
        .keyfile
        .clone()
        .unwrap_or_else(|| paths::key_file(&opts.input, &opts.tag));
    let (seal_key, key_created) = load_or_create_key(&key_path)?;

    let sealed = transform(&document, Mode::Encrypt, &seal_key)?;
    storage::write_document(&output, &sealed.document, opts.force)?;
    info!(output = %output.display(), changed = sealed.stats.changed, "sealed export written");

    Ok(Report::Sealed {
        output,
        stats: sealed.stats,
        key_path,
        key_created,
        warnings: sealed.warnings,
    })
}

fn open(opts: &RunOptions) -> Result<Report, SealError> {
    let key_path = opts
        .keyfile
        .as_ref()
        .ok_or_else(|| SealError::Usage("--decrypt requires --keyfile <PATH>".into()))?;
    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| paths::opened_output(&opts.input, &opts.tag));
    ensure_writable(&output, opts.force)?;

    let seal_key = key::load(key_path)?;
    let document = storage::read_document(&opts.input, opts.max_input_bytes)?;

    let opened = transform(&document, Mode::Decrypt, &seal_key)?;
    storage::write_document(&output, &opened.document, opts.force)?;
    info!(output = %output.display(), changed = opened.stats.changed, "decrypted export written");

    Ok(Report::Opened {
        output,
        stats: opened.stats,
        warnings: opened.warnings,
    })
}

/// Reuse an existing key artifact, or generate and export a new one.
fn load_or_create_key(path: &Path) -> Result<(SealKey, bool), SealError> {
    if path.exists() {
        return Ok((key::load(path)?, false));
    }
    let seal_key = key::generate();
    key::save(&seal_key, path, false)?;
    warn!(path = %path.display(), "new key generated; losing it makes the sealed values unrecoverable");
    Ok((seal_key, true))
}

fn ensure_writable(output: &Path, force: bool) -> Result<(), SealError> {
    if output.exists() && !force {
        return Err(SealError::io(
            output,
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "refusing to overwrite existing file (use --force)",
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::DocumentState;
    use serde_json::json;

    fn options(action: Action, input: &Path) -> RunOptions {
        RunOptions {
            action,
            input: input.to_path_buf(),
            output: None,
            keyfile: None,
            tag: "t".into(),
            force: false,
            max_input_bytes: 1 << 20,
        }
    }

    fn write_export(dir: &Path) -> PathBuf {
        let input = dir.join("export.json");
        let doc = json!({
            "encrypted": false,
            "items": [{"type": 1, "login": {"password": "hunter2"}}]
        });
        std::fs::write(&input, serde_json::to_vec(&doc).unwrap()).unwrap();
        input
    }

    #[test]
    fn seal_creates_key_and_output_then_opens() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_export(dir.path());

        let report = run(&options(Action::Encrypt, &input)).unwrap();
        let Report::Sealed { output, key_path, key_created, stats, .. } = report else {
            panic!("expected a sealed report");
        };
        assert!(key_created);
        assert_eq!(stats.changed, 1);
        assert_eq!(output, dir.path().join("export_t_encrypted.json"));
        assert_eq!(key_path, dir.path().join("export_t_decryption_key.txt"));

        let mut opts = options(Action::Decrypt, &output);
        opts.keyfile = Some(key_path);
        let Report::Opened { output: opened, stats, .. } = run(&opts).unwrap() else {
            panic!("expected an opened report");
        };
        assert_eq!(stats.changed, 1);
        assert_eq!(opened, dir.path().join("export_t_decrypted.json"));
        assert_eq!(
            storage::read_document(&opened, 1 << 20).unwrap(),
            storage::read_document(&input, 1 << 20).unwrap()
        );
    }

    #[test]
    fn second_seal_reuses_key() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_export(dir.path());
        run(&options(Action::Encrypt, &input)).unwrap();

        let mut opts = options(Action::Encrypt, &input);
        opts.force = true;
        let Report::Sealed { key_created, .. } = run(&opts).unwrap() else {
            panic!("expected a sealed report");
        };
        assert!(!key_created);
    }

    #[test]
    fn existing_output_blocks_before_key_creation() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_export(dir.path());
        std::fs::write(dir.path().join("export_t_encrypted.json"), "{}").unwrap();

        let err = run(&options(Action::Encrypt, &input)).unwrap_err();
        assert!(matches!(err, SealError::Io { .. }));
        assert!(!dir.path().join("export_t_decryption_key.txt").exists());
    }

    #[test]
    fn decrypt_without_keyfile_is_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_export(dir.path());
        let err = run(&options(Action::Decrypt, &input)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn failed_decrypt_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_export(dir.path());
        let Report::Sealed { output, .. } = run(&options(Action::Encrypt, &input)).unwrap() else {
            panic!("expected a sealed report");
        };

        let other_key = dir.path().join("other.txt");
        key::save(&key::generate(), &other_key, false).unwrap();
        let mut opts = options(Action::Decrypt, &output);
        opts.keyfile = Some(other_key);

        let err = run(&opts).unwrap_err();
        assert!(matches!(err, SealError::Authentication(_)));
        assert!(!dir.path().join("export_t_decrypted.json").exists());
    }

    #[test]
    fn report_lists_schema_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("export.json");
        let doc = json!({"items": ["not an item", {"type": 1, "login": {"password": "pw"}}]});
        std::fs::write(&input, serde_json::to_vec(&doc).unwrap()).unwrap();

        let sealed = run(&options(Action::Encrypt, &input)).unwrap();
        let shown = sealed.to_string();
        assert!(shown.contains("warning: items[0] is not an object"), "{shown}");

        let inspected = run(&options(Action::Inspect, &input)).unwrap().to_string();
        assert!(inspected.contains("warning: items[0] is not an object"), "{inspected}");
    }

    #[test]
    fn report_without_warnings_has_no_warning_lines() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_export(dir.path());
        let shown = run(&options(Action::Encrypt, &input)).unwrap().to_string();
        assert!(!shown.contains("warning:"));
    }

    #[test]
    fn inspect_reports_state() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_export(dir.path());
        let Report::Inspected(report) = run(&options(Action::Inspect, &input)).unwrap() else {
            panic!("expected an inspection report");
        };
        assert_eq!(report.state, DocumentState::Plaintext);
    }
}
