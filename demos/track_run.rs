//! Run Tracking Example
//!
//! Walks one training-style run end to end: allocate the session directory,
//! log progress, save arrays and plots, stash a custom format, and print the
//! closing report.
//!
//! Run with: cargo run --example track_run

use std::collections::BTreeMap;

use runout::{Error, FormatCodec, Plot, Plot3d, PlotRenderer, PlotStyle, Series2d, Session};

/// Stand-in for a real plotting backend: encodes the figure description
/// instead of rasterizing it. A production caller would wrap its plotting
/// library of choice behind the same trait.
struct SketchRenderer;

impl PlotRenderer for SketchRenderer {
    fn render(&self, plot: &Plot) -> runout::Result<Vec<u8>> {
        Ok(format!("sketch of {} series", plot.series.len()).into_bytes())
    }

    fn render_3d(&self, plot: &Plot3d) -> runout::Result<Vec<u8>> {
        Ok(format!("3d sketch of {} series", plot.series.len()).into_bytes())
    }
}

/// Comma-separated epoch,loss rows.
struct CsvCodec;

impl FormatCodec for CsvCodec {
    type Value = Vec<(u32, f64)>;

    fn format(&self) -> &str {
        "csv"
    }

    fn encode(&self, value: &Self::Value) -> runout::Result<Vec<u8>> {
        let mut out = String::from("epoch,loss\n");
        for (epoch, loss) in value {
            out.push_str(&format!("{epoch},{loss}\n"));
        }
        Ok(out.into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> runout::Result<Self::Value> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::Codec(format!("csv not utf8: {e}")))?;
        text.lines()
            .skip(1)
            .map(|line| {
                let (epoch, loss) = line
                    .split_once(',')
                    .ok_or_else(|| Error::Codec(format!("bad row: {line:?}")))?;
                Ok((
                    epoch.parse().map_err(|e| Error::Codec(format!("{e}")))?,
                    loss.parse().map_err(|e| Error::Codec(format!("{e}")))?,
                ))
            })
            .collect()
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Runout Run Tracking ===\n");

    // -------------------------------------------------------------------------
    // 1. Allocate the run directory
    // -------------------------------------------------------------------------
    println!("1. Creating session...");

    let mut session = Session::create()?;
    session.set_config("model", serde_json::json!("resnet50"));
    session.set_config("learning_rate", serde_json::json!(0.001));

    println!("   Output folder: {}\n", session.path().display());

    // -------------------------------------------------------------------------
    // 2. Log progress (file + console)
    // -------------------------------------------------------------------------
    println!("2. Logging...");
    session.logger().log("training started")?;

    // -------------------------------------------------------------------------
    // 3. Save arrays, plain and archived
    // -------------------------------------------------------------------------
    println!("\n3. Saving arrays...");

    let loss = vec![0.9, 0.5, 0.3, 0.22, 0.18];
    session.store().save_array(&loss, "loss", false)?;

    let mut checkpoint = BTreeMap::new();
    checkpoint.insert("weights".to_owned(), vec![0.1, 0.2, 0.3]);
    checkpoint.insert("biases".to_owned(), vec![0.01, 0.02]);
    session.store().save_array_members(&checkpoint, "checkpoint")?;

    let restored = session.store().load_array("loss", false)?;
    println!("   loss round-trips: {:?}", restored.into_single().unwrap());

    // -------------------------------------------------------------------------
    // 4. Save plots through the renderer capability
    // -------------------------------------------------------------------------
    println!("\n4. Saving plots...");

    let epochs: Vec<f64> = (1..=5).map(f64::from).collect();
    let curve = Plot::default().with_series(Series2d {
        x: epochs.clone(),
        y: loss.clone(),
        style: PlotStyle {
            label: Some("train loss".to_owned()),
            ..PlotStyle::default()
        },
    });
    let auto = session.store().save_plot(&curve, &SketchRenderer, None)?;
    let named = session
        .store()
        .save_plot(&curve, &SketchRenderer, Some("loss_curve"))?;
    println!("   auto-indexed: {}", auto.display());
    println!("   named:        {}", named.display());

    let surface = Plot3d::xyz(epochs.clone(), loss.clone(), vec![0.0; 5]);
    session.store().save_plot_3d(&surface, &SketchRenderer, None)?;

    // -------------------------------------------------------------------------
    // 5. Custom format via save_data
    // -------------------------------------------------------------------------
    println!("\n5. Saving custom format...");

    let history: Vec<(u32, f64)> = loss
        .iter()
        .enumerate()
        .map(|(i, l)| (u32::try_from(i).unwrap() + 1, *l))
        .collect();
    session.store().save_data(&history, "history", &CsvCodec)?;
    let reloaded = session.store().load_data("history", &CsvCodec)?;
    println!("   csv rows round-trip: {}", reloaded.len());

    // -------------------------------------------------------------------------
    // 6. Closing report
    // -------------------------------------------------------------------------
    println!("\n6. Report:\n");
    session.reporter().print()?;

    Ok(())
}
