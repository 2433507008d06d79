use crate::error::Result;
use crate::utils::constants::{
    ATTRIBUTES_EXTENSION, BUFR_EXTENSION, PROFILE_EXTENSION, SOURCE_FILE_PREFIX,
};
use std::path::{Path, PathBuf};

/// Replace the input extension with the BUFR extension
pub fn output_file_name(input: &Path) -> PathBuf {
    let file_name = input.file_name().map(PathBuf::from).unwrap_or_default();
    file_name.with_extension(BUFR_EXTENSION)
}

/// Artifact path for an input file inside the output directory
pub fn bufr_output_path(input: &Path, output_dir: &Path) -> PathBuf {
    output_dir.join(output_file_name(input))
}

/// Dataset attributes live next to the profile as `<stem>.json`
pub fn attributes_path(profile_path: &Path) -> PathBuf {
    profile_path.with_extension(ATTRIBUTES_EXTENSION)
}

/// Profile identifier embedded in the file name
///
/// `MOANA_0058_434_230228081912_qc.nc` -> `230228081912`
pub fn profile_name_from_filename(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let parts: Vec<&str> = stem.split('_').collect();

    if parts.len() < 2 {
        return None;
    }

    let name = parts[parts.len() - 2];
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Find profile files in a directory, optionally for one sensor serial number
pub fn find_profile_files(input_dir: &Path, serial_number: Option<u32>) -> Result<Vec<PathBuf>> {
    let file_pattern = match serial_number {
        Some(serial) => format!(
            "{}_{:04}*.{}",
            SOURCE_FILE_PREFIX, serial, PROFILE_EXTENSION
        ),
        None => format!("*.{}", PROFILE_EXTENSION),
    };

    let escaped_dir = glob::Pattern::escape(&input_dir.to_string_lossy());
    let pattern = format!("{}/{}", escaped_dir, file_pattern);

    let mut files: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    Ok(files)
}
