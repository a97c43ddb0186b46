//! Paths are stored as text, one `(x, y)` pair per line.

use anyhow::{anyhow, Context, Result};

use abstutil::{slurp_file, write_lines};
use geom::Pt2D;

pub fn write_path(path: &str, pts: &[Pt2D]) -> Result<()> {
    write_lines(path, pts.iter().map(|pt| format_pt(*pt)))
}

pub fn read_path(path: &str) -> Result<Vec<Pt2D>> {
    let contents = slurp_file(path)?;
    let mut pts = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        pts.push(parse_pt(line).with_context(|| format!("line {} of {}", idx + 1, path))?);
    }
    Ok(pts)
}

// Debug formatting keeps the trailing .0 on whole numbers
fn format_pt(pt: Pt2D) -> String {
    format!("({:?}, {:?})", pt.x(), pt.y())
}

fn parse_pt(line: &str) -> Result<Pt2D> {
    let inner = line
        .trim()
        .strip_prefix('(')
        .and_then(|x| x.strip_suffix(')'))
        .ok_or_else(|| anyhow!("{} isn't wrapped in parentheses", line))?;
    let (x, y) = inner
        .split_once(',')
        .ok_or_else(|| anyhow!("{} isn't an x, y pair", line))?;
    let x: f64 = x.trim().parse()?;
    let y: f64 = y.trim().parse()?;
    if !x.is_finite() || !y.is_finite() {
        return Err(anyhow!("{} isn't a finite point", line));
    }
    Ok(Pt2D::new(x, y))
}
