// output.rs - Console summary and snapshot file output

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use massing_engine::{DesignSnapshot, MassingMetrics};

pub fn print_summary(m: &MassingMetrics, resolution: usize) {
    let total = resolution * resolution;
    let pct = if total == 0 { 0.0 } else { m.occupied_cells as f32 / total as f32 * 100.0 };

    println!("    Spans: {}", m.span_count);
    println!("    Coverage: {:.1}% ({} of {} cells)", pct, m.occupied_cells, total);
    println!("    Footprint: ~{:.1} sq units", m.footprint_area);
    println!("    Max height: {:.2}", m.max_height);
}

pub fn write_snapshot(path: &Path, snapshot: &DesignSnapshot) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut f = BufWriter::new(file);
    f.write_all(snapshot.to_json_pretty()?.as_bytes())?;
    writeln!(f)?;
    f.flush()?;
    Ok(())
}
