use anyhow::{Context, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes `value` as pretty-printed JSON.
///
/// The document is written to a temp file next to `path` and renamed into
/// place, so an interrupted run never leaves a partial file that a later
/// run would treat as already converted.
pub fn write_json_atomic<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;

    let mut temp_file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {:?}", dir))?;
    {
        let mut writer = BufWriter::new(temp_file.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");

        write_json_atomic(&path, &json!([{ "text": "hi" }])).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "[\n  {\n    \"text\": \"hi\"\n  }\n]");

        // no temp files left behind
        let entries = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_overwrite_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_json_atomic(&path, &json!([1, 2, 3])).unwrap();
        write_json_atomic(&path, &json!([])).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }
}
