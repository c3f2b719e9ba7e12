use anyhow::{Context, Result};
use boxcsv::{footprint_issues, is_wall_file, read_file, wall_path_for, write_file, WallLayout, GRID_SIZE};
use clap::Parser;
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use walkdir::WalkDir;

/// Build the matching wall file for every shape in a directory.
#[derive(Parser, Debug, Clone)]
#[command(name = "shape2wall", version)]
struct Args {
    #[arg(long, default_value = "assets/shapes")]
    input_dir: PathBuf,

    /// Rewrite walls that already exist.
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Only report footprint problems; write nothing.
    #[arg(long, default_value_t = false)]
    check: bool,

    /// Write a JSON report of every shape processed.
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct WallReport {
    shape: PathBuf,
    wall: PathBuf,
    boxes: usize,
    open_cells: Vec<(i32, i32)>,
    filled_cells: usize,
    written: bool,
    issues: Vec<String>,
}

fn shape_files(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("csv"))
        .filter(|p| !is_wall_file(p))
        .collect();
    paths.sort();
    paths
}

fn process_one(shape: &Path, args: &Args) -> Result<WallReport> {
    let boxes = read_file(shape)?;
    let layout = WallLayout::from_footprint(&boxes);
    let wall = wall_path_for(shape);

    let issues: Vec<String> = footprint_issues(&boxes).iter().map(ToString::to_string).collect();
    for issue in &issues {
        warn!("{}: {}", shape.display(), issue);
    }

    let written = if args.check {
        false
    } else if wall.exists() && !args.overwrite {
        info!("Skipping {} (exists)", wall.display());
        false
    } else {
        write_file(&wall, &layout.to_boxes())
            .with_context(|| format!("writing wall for {}", shape.display()))?;
        true
    };

    Ok(WallReport {
        shape: shape.to_path_buf(),
        wall,
        boxes: boxes.len(),
        open_cells: layout.open_cells(),
        filled_cells: layout.filled_count(),
        written,
        issues,
    })
}

fn run(args: &Args) -> Result<Vec<WallReport>> {
    let shapes = shape_files(&args.input_dir);
    if shapes.is_empty() {
        warn!("No shape files found in '{}'", args.input_dir.display());
    }
    info!("Processing {} shapes...", shapes.len());

    let reports: Vec<WallReport> = shapes
        .par_iter()
        .filter_map(|shape| match process_one(shape, args) {
            Ok(report) => Some(report),
            Err(err) => {
                log::error!("{}: {err:#}", shape.display());
                None
            }
        })
        .collect();

    if let Some(path) = &args.summary {
        let json = serde_json::to_string_pretty(&reports)?;
        fs::write(path, json).with_context(|| format!("writing summary {}", path.display()))?;
        info!("Summary written to {}", path.display());
    }

    Ok(reports)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let start = Instant::now();
    let reports = run(&args)?;

    let written = reports.iter().filter(|r| r.written).count();
    let flagged = reports.iter().filter(|r| !r.issues.is_empty()).count();
    info!(
        "Done: {} shapes, {} walls written, {} with footprint issues ({} cells per wall) in {:.2?}",
        reports.len(),
        written,
        flagged,
        GRID_SIZE * GRID_SIZE,
        start.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(dir: &Path, extra: &[&str]) -> Args {
        let mut argv = vec![
            "shape2wall".to_owned(),
            "--input-dir".to_owned(),
            dir.display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        Args::parse_from(argv)
    }

    #[test]
    fn test_builds_walls_and_skips_existing() {
        let dir = tempfile::tempdir().unwrap();
        let ell = "0,0,0,1,1,1,\n1,0,0,1,1,1,\n0,1,0,1,1,1,\n";
        fs::write(dir.path().join("ell.csv"), ell).unwrap();

        let reports = run(&args(dir.path(), &[])).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].written);
        assert_eq!(reports[0].filled_cells, 78);
        assert_eq!(reports[0].open_cells, vec![(0, 0), (1, 0), (0, 1)]);

        let wall = read_file(dir.path().join("ell - WALL.csv")).unwrap();
        assert_eq!(wall.len(), 78);

        // The wall itself is not picked up as a shape, and is not rewritten.
        let again = run(&args(dir.path(), &[])).unwrap();
        assert_eq!(again.len(), 1);
        assert!(!again[0].written);

        let forced = run(&args(dir.path(), &["--overwrite"])).unwrap();
        assert!(forced[0].written);
    }

    #[test]
    fn test_check_writes_nothing_and_reports_issues() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("odd.csv"), "0,0,0,2,1,1,\n9,0,0,1,1,1,\n").unwrap();
        let summary = dir.path().join("summary.json");

        let reports = run(&args(
            dir.path(),
            &["--check", "--summary", summary.to_str().unwrap()],
        ))
        .unwrap();

        assert!(!reports[0].written);
        assert_eq!(reports[0].issues.len(), 2);
        assert!(!dir.path().join("odd - WALL.csv").exists());

        let text = fs::read_to_string(summary).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json[0]["boxes"], 2);
        assert_eq!(json[0]["written"], false);
    }
}
