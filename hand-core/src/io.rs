use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Numeric id encoded in a file name, e.g. `"./data/styles/3.style"` → `3`.
///
/// `None` when the stem is missing or not a plain number.
pub(crate) fn numeric_stem(path: &Path) -> Option<usize> {
	path.file_stem()?.to_str()?.parse().ok()
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub(crate) fn normalize_folder(input: &Path) -> PathBuf {
	if input == Path::new(".") || input == Path::new("./") {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		input.to_path_buf()
	}
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths). A missing directory yields an empty list.
pub(crate) fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();
	let dir = dir.as_ref();
	if !dir.is_dir() {
		return Ok(files);
	}

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn numeric_stem_reads_style_ids() {
		assert_eq!(numeric_stem(Path::new("./data/styles/3.style")), Some(3));
		assert_eq!(numeric_stem(Path::new("12.style")), Some(12));
		assert_eq!(numeric_stem(Path::new("model.bin")), None);
		assert_eq!(numeric_stem(Path::new("-1.style")), None);
	}

	#[test]
	fn normalize_resolves_current_dir() {
		assert_eq!(normalize_folder(Path::new("data")), PathBuf::from("data"));
		assert!(normalize_folder(Path::new(".")).is_absolute());
	}

	#[test]
	fn missing_directory_lists_nothing() {
		let files = list_files("/definitely/not/here", "style").unwrap();
		assert!(files.is_empty());
	}
}
