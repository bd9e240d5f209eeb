use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use perc_core::{DistributionTable, SweepResult, distribution_tables, summary_table};

pub fn summary_file_name(l: usize, trials: usize) -> String {
    format!("Ave_L{}_T{}.txt", l, trials)
}

/// Most decimals used for p in distribution file names.
const MAX_P_DECIMALS: usize = 12;

pub fn distribution_file_name(p: f64, decimals: usize, l: usize, trials: usize) -> String {
    format!("Dist_p{:.*}_L{}_T{}.txt", decimals, p, l, trials)
}

/// Fewest decimals, at least 2, that keep every swept p distinct once formatted.
pub fn p_decimals(ps: &[f64]) -> usize {
    (2..=MAX_P_DECIMALS)
        .find(|&d| {
            let mut seen = HashSet::new();
            ps.iter().all(|p| seen.insert(format!("{:.*}", d, p)))
        })
        .unwrap_or(MAX_P_DECIMALS)
}

pub fn json_file_name(l: usize, trials: usize) -> String {
    format!("sweep_L{}_T{}.json", l, trials)
}

/// Write the averaged table and one distribution file per swept p.
/// Returns the paths written, summary first.
pub fn write_tables(result: &SweepResult, out: &Path) -> Result<Vec<PathBuf>> {
    let (l, trials) = (result.params.l, result.params.trials);
    let mut written = Vec::new();

    let summary_path = out.join(summary_file_name(l, trials));
    write_rows(&summary_path, summary_table(result).as_slice())?;
    written.push(summary_path);

    let tables = distribution_tables(result);
    let ps: Vec<f64> = tables.iter().map(|t| t.p).collect();
    let decimals = p_decimals(&ps);

    let mut names = HashSet::new();
    for DistributionTable { index, p, rows } in tables {
        let name = distribution_file_name(p, decimals, l, trials);
        if !names.insert(name.clone()) {
            bail!("sweep index {} (p = {}) would overwrite {}", index, p, name);
        }
        let path = out.join(name);
        write_rows(&path, rows.as_slice())?;
        written.push(path);
    }

    Ok(written)
}

pub fn write_json(result: &SweepResult, out: &Path) -> Result<PathBuf> {
    let path = out.join(json_file_name(result.params.l, result.params.trials));
    let mut w = BufWriter::new(
        File::create(&path).with_context(|| format!("creating {}", path.display()))?,
    );
    serde_json::to_writer_pretty(&mut w, result)?;
    w.write_all(b"\n")?;
    w.flush()?;
    Ok(path)
}

fn write_rows<R: std::fmt::Display>(path: &Path, rows: &[R]) -> Result<()> {
    let mut w = BufWriter::new(
        File::create(path).with_context(|| format!("creating {}", path.display()))?,
    );
    for row in rows {
        writeln!(w, "{}", row)?;
    }
    w.flush()?;
    Ok(())
}
