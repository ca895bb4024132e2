mod config;
mod provenance;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use polars::prelude::*;
use polyquery::geom2::{convex_hull, rectangle_from_bounds};
use polyquery::pipeline::{select_pm_polygon, CandidateFilters, Selection};
use polyquery::points::PointSet;
use polyquery::query::{serialize_polygon, QueryTemplate, CANDIDATE_QUERY};
use polyquery::store::PolygonStore;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

use config::SelectionCfg;
use provenance::Sidecar;

#[derive(Parser)]
#[command(name = "polyquery")]
#[command(about = "Proper-motion polygon selection and catalog query assembly")]
struct Cmd {
    /// Log more (-v debug, -vv trace); logs go to stderr
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Print the closed rectangle ring for the given bounds as a polygon string
    Rect {
        #[arg(long, allow_negative_numbers = true)]
        x_min: f64,
        #[arg(long, allow_negative_numbers = true)]
        x_max: f64,
        #[arg(long, allow_negative_numbers = true)]
        y_min: f64,
        #[arg(long, allow_negative_numbers = true)]
        y_max: f64,
    },
    /// Print the convex hull of two table columns as a polygon string
    Hull {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "pmra")]
        x: String,
        #[arg(long, default_value = "pmdec")]
        y: String,
    },
    /// Hull + sky ring → store entries, candidate query, provenance
    Select {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Assemble a query from polygon strings saved by `select`
    Query {
        #[arg(long)]
        store: PathBuf,
        /// Take table, columns, and cuts from this config
        #[arg(long)]
        config: Option<PathBuf>,
        /// Template file with `{name}` placeholders (default: candidate query)
        #[arg(long)]
        template: Option<PathBuf>,
        /// Write here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = match cmd.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    match cmd.action {
        Action::Rect {
            x_min,
            x_max,
            y_min,
            y_max,
        } => {
            println!("{}", rect(x_min, x_max, y_min, y_max)?);
            Ok(())
        }
        Action::Hull { input, x, y } => {
            println!("{}", hull(&input, &x, &y)?);
            Ok(())
        }
        Action::Select {
            input,
            config,
            store,
            out,
        } => select(&input, &config, &store, &out),
        Action::Query {
            store,
            config,
            template,
            out,
        } => {
            let text = query(&store, config.as_deref(), template.as_deref())?;
            match out {
                Some(out) => write_text(&out, &text),
                None => {
                    print!("{text}");
                    Ok(())
                }
            }
        }
        Action::Report => report(),
    }
}

/// Read a CSV or Parquet table, chosen by extension.
fn read_table(path: &Path) -> Result<DataFrame> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let lf = match ext {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(100))
            .finish()?,
        "parquet" => LazyFrame::scan_parquet(path, ScanArgsParquet::default())?,
        _ => bail!("unsupported table format {}", path.display()),
    };
    let df = lf
        .collect()
        .with_context(|| format!("reading table {}", path.display()))?;
    tracing::info!(rows = df.height(), cols = df.width(), "input_table_shape");
    Ok(df)
}

fn rect(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<String> {
    let ring = rectangle_from_bounds(x_min, x_max, y_min, y_max);
    // Same area check `select` applies to the sky box.
    convex_hull(&ring).context("rectangle encloses no area")?;
    Ok(serialize_polygon(&ring)?)
}

fn hull(input: &Path, x: &str, y: &str) -> Result<String> {
    let df = read_table(input)?;
    let points = PointSet::from_columns(&df, x, y)?;
    let hull = convex_hull(points.points())?;
    tracing::info!(points = points.len(), vertices = hull.len(), "hull");
    Ok(serialize_polygon(hull.points())?)
}

fn select(input: &Path, config: &Path, store: &Path, out: &Path) -> Result<()> {
    tracing::info!(input = %input.display(), config = %config.display(), "select");
    let cfg = SelectionCfg::load(config)?;
    let df = read_table(input)?;

    let pm = PointSet::from_columns(&df, &cfg.pm_columns.x, &cfg.pm_columns.y)?;
    let mask = match &cfg.prefilter {
        Some(pf) => {
            let pf_points = PointSet::from_columns(&df, &pf.columns.x, &pf.columns.y)?;
            Some(pf_points.mask_within(&pf.bounds))
        }
        None => None,
    };
    let hull = select_pm_polygon(&pm, mask.as_deref(), cfg.hull_cfg())
        .context("selecting proper-motion polygon")?;
    let selection = Selection::build(&cfg.sky.ring(), &hull)?;
    let text = selection.query(&cfg.filters)?;
    tracing::info!(
        rows = pm.len(),
        kept = mask.as_ref().map_or(pm.len(), |m| m.iter().filter(|k| **k).count()),
        vertices = hull.len(),
        "pm_polygon"
    );

    // Everything is computed; only now touch the filesystem.
    let store = PolygonStore::new(store);
    selection.persist(&store)?;
    write_text(out, &text)?;
    let params = serde_json::json!({
        "input": input.to_string_lossy(),
        "config": cfg,
        "hull_rows": hull.vertices(),
    });
    Sidecar::new("select", params)
        .output(out)
        .output(store.path())
        .write_next_to(out)?;
    Ok(())
}

fn query(store: &Path, config: Option<&Path>, template: Option<&Path>) -> Result<String> {
    let selection = Selection::load(&PolygonStore::new(store))?;
    let filters = match config {
        Some(path) => SelectionCfg::load(path)?.filters,
        None => CandidateFilters::default(),
    };
    let template = match template {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading template {}", path.display()))?;
            QueryTemplate::parse(&text)?
        }
        None => QueryTemplate::parse(CANDIDATE_QUERY)?,
    };
    Ok(selection.query_with(&template, &filters)?)
}

fn write_text(out: &Path, text: &str) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(out, text).with_context(|| format!("writing {}", out.display()))
}

fn report() -> Result<()> {
    let obj = serde_json::json!({
        "code_rev": provenance::current_git_rev(),
        "version": polyquery::VERSION,
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
