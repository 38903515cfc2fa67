use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use osa_core::{ErrorInfo, OsaError};
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::analysis::Analysis;
use crate::document::analysis_document;

fn bundle_error(code: &str, err: impl ToString) -> OsaError {
    OsaError::Bundle(ErrorInfo::new(code, err.to_string()))
}

/// Writes the OSA zip bundle for `analysis` to `out`.
///
/// Layout: `analysis.json`, `seeds/`, `weather/`, `measures/<dir>/`,
/// `lib/<library>/` and `gems/`. Sources missing on disk are skipped.
pub fn save_osa_zip(analysis: &Analysis, out: &Path) -> Result<(), OsaError> {
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent).map_err(|err| OsaError::io("bundle_dir", parent, err))?;
    }
    let file = File::create(out).map_err(|err| OsaError::io("bundle_create", out, err))?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default();

    let json = osa_core::to_pretty_json_string(&analysis_document(analysis))?;
    writer
        .start_file("analysis.json", options)
        .map_err(|err| bundle_error("bundle_entry", err))?;
    writer
        .write_all(json.as_bytes())
        .map_err(|err| bundle_error("bundle_write", err))?;

    if let Some(seed) = &analysis.seed_model {
        add_file(&mut writer, seed, "seeds")?;
    }
    if let Some(weather) = &analysis.weather_file {
        add_file(&mut writer, weather, "weather")?;
        for extension in ["ddy", "stat"] {
            let sibling = weather.with_extension(extension);
            if sibling.exists() {
                add_file(&mut writer, &sibling, "weather")?;
            }
        }
    }
    let mut bundled = HashSet::new();
    for measure in analysis.workflow.iter() {
        if bundled.contains(measure.definition_dir.as_str()) {
            continue;
        }
        match &measure.local_dir {
            Some(dir) if dir.is_dir() => {
                bundled.insert(measure.definition_dir.as_str());
                add_directory(&mut writer, dir, &format!("measures/{}", measure.definition_dir))?;
            }
            _ => warn!(measure = %measure.name, "measure directory unavailable, not bundled"),
        }
    }
    for library in &analysis.libraries {
        if library.path.is_dir() {
            add_directory(&mut writer, &library.path, &format!("lib/{}", library.name))?;
        } else {
            warn!(library = %library.name, path = %library.path.display(), "library directory missing, not bundled");
        }
    }
    for gem_file in &analysis.gem_files {
        add_file(&mut writer, gem_file, "gems")?;
    }
    writer
        .finish()
        .map_err(|err| bundle_error("bundle_finish", err))?;
    debug!(bundle = %out.display(), "analysis zip written");
    Ok(())
}

fn add_file(writer: &mut ZipWriter<File>, path: &Path, folder: &str) -> Result<(), OsaError> {
    if !path.is_file() {
        warn!(path = %path.display(), "file missing, not bundled");
        return Ok(());
    }
    let Some(file_name) = path.file_name() else {
        return Ok(());
    };
    let entry = format!("{folder}/{}", file_name.to_string_lossy());
    write_entry(writer, path, &entry)
}

fn add_directory(writer: &mut ZipWriter<File>, root: &Path, prefix: &str) -> Result<(), OsaError> {
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");
        write_entry(writer, entry.path(), &format!("{prefix}/{relative}"))?;
    }
    Ok(())
}

fn write_entry(writer: &mut ZipWriter<File>, source: &Path, entry: &str) -> Result<(), OsaError> {
    let data = fs::read(source).map_err(|err| OsaError::io("bundle_read", source, err))?;
    writer
        .start_file(entry, FileOptions::default())
        .map_err(|err| bundle_error("bundle_entry", err))?;
    writer
        .write_all(&data)
        .map_err(|err| bundle_error("bundle_write", err))
}
