//! PDF file discovery and output naming

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::error::ConvertError;

const PDF_SUFFIX: &str = ".pdf";
const OCR_SUFFIX: &str = "_ocr.pdf";
const COMPRESSED_SUFFIX: &str = "_ocr_compressed.pdf";

/// Create `path` and any missing ancestors. Succeeds if it already exists.
pub fn ensure_output_directory(path: &Path) -> Result<(), ConvertError> {
    fs::create_dir_all(path).map_err(|source| ConvertError::DirectoryCreation {
        path: path.to_path_buf(),
        source,
    })
}

/// Collect the PDF files in a directory
///
/// A file matches when its name ends with `.pdf` (case-sensitive). Regular
/// files and symlinks to regular files are returned, sorted by path so runs
/// are reproducible. Directories (including links to them) are skipped.
///
/// # Arguments
/// * `dir` - Directory to scan
/// * `recursive` - Whether to scan subdirectories recursively
pub fn list_pdf_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, ConvertError> {
    let input_error = |source: std::io::Error| ConvertError::InputDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut pdf_files = Vec::new();

    if recursive {
        for entry in WalkDir::new(dir).follow_links(false) {
            let entry = entry.map_err(|e| input_error(e.into()))?;
            let is_file = if entry.path_is_symlink() {
                resolves_to_file(entry.path())
            } else {
                entry.file_type().is_file()
            };
            if is_file && has_pdf_suffix(entry.path()) {
                pdf_files.push(entry.into_path());
            }
        }
    } else {
        for entry in fs::read_dir(dir).map_err(input_error)? {
            let entry = entry.map_err(input_error)?;
            let path = entry.path();
            if has_pdf_suffix(&path) && resolves_to_file(&path) {
                pdf_files.push(path);
            }
        }
    }

    pdf_files.sort();
    Ok(pdf_files)
}

/// Follows symlinks; dangling links are not files
fn resolves_to_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

fn has_pdf_suffix(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(PDF_SUFFIX))
        .unwrap_or(false)
}

/// Drop files this converter produced when the output directory overlaps the input
///
/// With `output_dir` strictly inside `input_dir` everything under it is
/// dropped. With both the same directory, names ending in `_ocr.pdf` or
/// `_ocr_compressed.pdf` are dropped, so a source genuinely named that way is
/// not converted in that layout. Disjoint directories leave the list unchanged.
pub fn exclude_generated_outputs(
    files: Vec<PathBuf>,
    input_dir: &Path,
    output_dir: &Path,
) -> Vec<PathBuf> {
    let (Ok(input_root), Ok(output_root)) = (input_dir.canonicalize(), output_dir.canonicalize())
    else {
        return files;
    };
    if !output_root.starts_with(&input_root) {
        return files;
    }

    files
        .into_iter()
        .filter(|path| !is_generated_output(path, &input_root, &output_root))
        .collect()
}

fn is_generated_output(path: &Path, input_root: &Path, output_root: &Path) -> bool {
    // Canonicalize the parent only, so a symlinked source is judged by where it sits
    let Some(parent) = path.parent().and_then(|p| p.canonicalize().ok()) else {
        return false;
    };
    if !parent.starts_with(output_root) {
        return false;
    }
    if output_root != input_root {
        return true;
    }
    path.file_name()
        .map(|name| {
            let name = name.to_string_lossy();
            name.ends_with(OCR_SUFFIX) || name.ends_with(COMPRESSED_SUFFIX)
        })
        .unwrap_or(false)
}

/// File name with its final extension removed
///
/// `v1.2.scan.pdf` gives `v1.2.scan`; a name without a `.` is returned as is.
/// Non-UTF-8 names keep their original bytes.
pub fn base_name(path: &Path) -> OsString {
    match path.file_name() {
        Some(name) => strip_extension(name),
        None => OsString::new(),
    }
}

#[cfg(unix)]
fn strip_extension(name: &OsStr) -> OsString {
    use std::os::unix::ffi::OsStrExt;

    let bytes = name.as_bytes();
    match bytes.iter().rposition(|&b| b == b'.') {
        Some(idx) => OsStr::from_bytes(&bytes[..idx]).to_os_string(),
        None => name.to_os_string(),
    }
}

// TODO: split on the raw encoded bytes on Windows too; non-UTF-8 names are
// lossily converted here.
#[cfg(not(unix))]
fn strip_extension(name: &OsStr) -> OsString {
    let name = name.to_string_lossy().into_owned();
    match name.rfind('.') {
        Some(idx) => OsString::from(&name[..idx]),
        None => OsString::from(name),
    }
}

/// Directory that receives the outputs for `source`
///
/// Files directly inside `input_root` map to `output_root`; files found in
/// subdirectories keep their relative parent under `output_root`.
pub fn output_dir_for(source: &Path, input_root: &Path, output_root: &Path) -> PathBuf {
    match source.parent().and_then(|p| p.strip_prefix(input_root).ok()) {
        Some(relative) if !relative.as_os_str().is_empty() => output_root.join(relative),
        _ => output_root.to_path_buf(),
    }
}

fn with_suffix(output_dir: &Path, base: &OsStr, suffix: &str) -> PathBuf {
    let mut name = base.to_os_string();
    name.push(suffix);
    output_dir.join(name)
}

/// `{output_dir}/{base}_ocr.pdf`
pub fn intermediate_path(output_dir: &Path, base: impl AsRef<OsStr>) -> PathBuf {
    with_suffix(output_dir, base.as_ref(), OCR_SUFFIX)
}

/// `{output_dir}/{base}_ocr_compressed.pdf`
pub fn final_path(output_dir: &Path, base: impl AsRef<OsStr>) -> PathBuf {
    with_suffix(output_dir, base.as_ref(), COMPRESSED_SUFFIX)
}
