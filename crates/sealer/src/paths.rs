//! Default output and key file names derived from the input path.

use std::path::{Path, PathBuf};

const ENCRYPTED_SUFFIX: &str = "_encrypted";

fn stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".into())
}

/// `<stem>_<tag>_encrypted.json`, next to the input.
pub fn sealed_output(input: &Path, tag: &str) -> PathBuf {
    input.with_file_name(format!("{}_{tag}{ENCRYPTED_SUFFIX}.json", stem(input)))
}

/// `<stem>_<tag>_decryption_key.txt`, next to the input.
pub fn key_file(input: &Path, tag: &str) -> PathBuf {
    input.with_file_name(format!("{}_{tag}_decryption_key.txt", stem(input)))
}

/// Decrypted output name.
///
/// `x_encrypted.json` becomes `x_decrypted.json`; any other input becomes
/// `<stem>_<tag>_decrypted.json`.
pub fn opened_output(input: &Path, tag: &str) -> PathBuf {
    let stem = stem(input);
    let name = match stem.strip_suffix(ENCRYPTED_SUFFIX) {
        Some(base) => format!("{base}_decrypted.json"),
        None => format!("{stem}_{tag}_decrypted.json"),
    };
    input.with_file_name(name)
}
