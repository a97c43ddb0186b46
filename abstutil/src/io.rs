use std::io::Write;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn to_json<T: Serialize>(obj: &T) -> String {
    serde_json::to_string_pretty(obj).unwrap()
}

pub fn write_json<T: Serialize>(path: &str, obj: &T) -> Result<()> {
    write_lines(path, std::iter::once(to_json(obj)))
}

pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let contents = slurp_file(path)?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path))
}

pub fn slurp_file(path: &str) -> Result<String> {
    Ok(fs_err::read_to_string(path)?)
}

/// Creates any missing parent directories, then writes one line per item.
pub fn write_lines<I, S>(path: &str, lines: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs_err::create_dir_all(parent)?;
        }
    }
    let mut file = std::io::BufWriter::new(fs_err::File::create(path)?);
    for line in lines {
        writeln!(file, "{}", line.as_ref())?;
    }
    file.flush()?;
    info!("Wrote {}", path);
    Ok(())
}
