//! Embedded downloader script and deployment utilities.
//!
//! The script is stored as a string constant and written to the project's
//! data directory on first use, or when the embedded version changes
//! (detected via hash comparison).

use crate::config::PathsConfig;
use crate::error::{IoResultExt, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the deployed downloader script.
pub const DOWNLOADER_NAME: &str = "download_model.py";

/// Python downloader invoked inside the project virtualenv.
///
/// Prints a single JSON object on the last stdout line describing what
/// was materialized; prints nothing when there is nothing to record.
pub const DOWNLOADER_SCRIPT: &str = r#"#!/usr/bin/env python3
"""Download a model (or just resolve its configuration) for modelforge.

Emits one JSON object on the final stdout line: path, module, class and
options of the materialized model. Exits non-zero on failure.
"""
import argparse
import importlib
import json
import os
import shutil
import sys

DEFAULT_CLASSES = {
    "diffusers": "DiffusionPipeline",
    "transformers": "AutoModel",
}


def fail(message, code=1):
    print(message, file=sys.stderr)
    sys.exit(code)


def main():
    parser = argparse.ArgumentParser(description="Download a model")
    parser.add_argument("models_dir", help="Directory models are materialized under")
    parser.add_argument("model_name", help="owner/repo identifier")
    parser.add_argument("module", help="Python module used for download")
    parser.add_argument("--class", dest="class_name", default=None)
    parser.add_argument("--options", nargs="*", default=[], help="key=value pairs")
    parser.add_argument("--only-configuration", action="store_true")
    parser.add_argument("--overwrite", action="store_true")
    args = parser.parse_args()

    if args.module not in DEFAULT_CLASSES:
        fail(f"Module '{args.module}' is not supported.", 2)

    class_name = args.class_name or DEFAULT_CLASSES[args.module]

    try:
        module = importlib.import_module(args.module)
        model_class = getattr(module, class_name)
    except (ImportError, AttributeError) as e:
        fail(f"Cannot resolve {args.module}.{class_name}: {e}", 2)

    options = {}
    for pair in args.options:
        key, sep, value = pair.partition("=")
        if not sep:
            fail(f"Malformed option '{pair}', expected key=value.")
        options[key] = value

    model_path = os.path.join(args.models_dir, args.model_name)

    if not args.only_configuration:
        if os.path.exists(model_path):
            if not args.overwrite:
                fail(f"Model path already exists: {model_path}")
            shutil.rmtree(model_path)
        try:
            model = model_class.from_pretrained(args.model_name, **options)
            model.save_pretrained(model_path)
        except Exception as e:
            fail(f"Download failed for '{args.model_name}': {e}")

    report = {
        "path": model_path if not args.only_configuration else None,
        "module": args.module,
        "class": class_name,
        "options": [f"{k}={v}" for k, v in options.items()],
    }
    print(json.dumps(report), flush=True)


if __name__ == "__main__":
    main()
"#;

/// Compute a short hash of a string for staleness checking.
fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let hash = hasher.finalize();
    hex::encode(&hash[..8])
}

/// Get the path to the deployed scripts directory.
pub fn scripts_dir(project_root: &Path) -> PathBuf {
    project_root
        .join(PathsConfig::DATA_DIR_NAME)
        .join(PathsConfig::SCRIPTS_DIR_NAME)
}

/// Get the path to the Python binary inside the project venv.
pub fn venv_python(project_root: &Path) -> PathBuf {
    let venv = project_root.join(PathsConfig::VENV_DIR_NAME);
    if cfg!(windows) {
        venv.join("Scripts").join("python.exe")
    } else {
        venv.join("bin").join("python")
    }
}

/// Deploy the embedded downloader to disk if missing or outdated.
///
/// Uses a `.hash` sidecar file to detect when the embedded script has
/// changed and needs to be rewritten.
pub fn ensure_scripts_deployed(project_root: &Path) -> Result<PathBuf> {
    let dir = scripts_dir(project_root);
    std::fs::create_dir_all(&dir).with_path(&dir)?;

    let script_path = dir.join(DOWNLOADER_NAME);
    let hash_path = dir.join(format!("{}.hash", DOWNLOADER_NAME));
    let current_hash = content_hash(DOWNLOADER_SCRIPT);

    if script_path.exists() {
        if let Ok(stored_hash) = std::fs::read_to_string(&hash_path) {
            if stored_hash.trim() == current_hash {
                return Ok(script_path);
            }
        }
    }

    std::fs::write(&script_path, DOWNLOADER_SCRIPT).with_path(&script_path)?;
    std::fs::write(&hash_path, &current_hash).with_path(&hash_path)?;
    debug!("Deployed downloader script to {}", script_path.display());
    Ok(script_path)
}
