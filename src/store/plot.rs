//! Plot persistence - typed figures rendered through a caller capability
//!
//! Rendering internals live outside this crate: callers hand the store a
//! [`PlotRenderer`] that turns a [`Plot`] or [`Plot3d`] value into encoded
//! PNG bytes, and the store owns naming, persistence, and the non-blocking
//! display hook. Style options are an enumerated [`PlotStyle`] rather than an
//! open key bag, so renderers see a typed value.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{entry_count, validate_name, write_atomic, ArtifactStore, Category};
use crate::Result;

/// Marker shape for plotted points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Marker {
    /// Single-pixel point
    Point,
    /// Open circle
    Circle,
    /// Filled square
    Square,
    /// Diagonal cross
    Cross,
}

/// Line style between points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineStyle {
    /// Continuous line (default)
    #[default]
    Solid,
    /// Dashed line
    Dashed,
    /// Dotted line
    Dotted,
    /// Markers only, no connecting line
    None,
}

/// Recognized rendering options for one series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotStyle {
    /// Series color, renderer-interpreted (e.g. `"red"`, `"#1f77b4"`)
    pub color: Option<String>,
    /// Legend label
    pub label: Option<String>,
    /// Point marker, if any
    pub marker: Option<Marker>,
    /// Line style between points
    pub line: LineStyle,
}

/// One 2-D series: paired x/y data plus its style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series2d {
    /// Horizontal coordinates
    pub x: Vec<f64>,
    /// Vertical coordinates, paired with `x`
    pub y: Vec<f64>,
    /// Rendering options for this series
    pub style: PlotStyle,
}

/// One 3-D series: x/y/z data plus its style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series3d {
    /// First axis coordinates
    pub x: Vec<f64>,
    /// Second axis coordinates
    pub y: Vec<f64>,
    /// Third axis coordinates
    pub z: Vec<f64>,
    /// Rendering options for this series
    pub style: PlotStyle,
}

/// A 2-D figure: one or more series drawn on shared axes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    /// Series in draw order
    pub series: Vec<Series2d>,
}

/// A figure drawn with a three-dimensional projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plot3d {
    /// Series in draw order
    pub series: Vec<Series3d>,
}

impl Plot {
    /// Single-series figure from paired x/y data with default style.
    #[must_use]
    pub fn xy(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            series: vec![Series2d {
                x,
                y,
                style: PlotStyle::default(),
            }],
        }
    }

    /// Append a series, builder style.
    #[must_use]
    pub fn with_series(mut self, series: Series2d) -> Self {
        self.series.push(series);
        self
    }
}

impl Plot3d {
    /// Single-series figure from x/y/z data with default style.
    #[must_use]
    pub fn xyz(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Self {
        Self {
            series: vec![Series3d {
                x,
                y,
                z,
                style: PlotStyle::default(),
            }],
        }
    }
}

/// Capability over an external plotting library.
///
/// `render`/`render_3d` produce an encoded PNG figure; the store never looks
/// inside the bytes. `display` presents the figure without blocking when a
/// display surface is available; the default is a headless no-op.
pub trait PlotRenderer {
    /// Render a 2-D figure to encoded PNG bytes.
    ///
    /// # Errors
    /// Returns error if the figure cannot be rendered.
    fn render(&self, plot: &Plot) -> Result<Vec<u8>>;

    /// Render a figure with a three-dimensional projection to PNG bytes.
    ///
    /// # Errors
    /// Returns error if the figure cannot be rendered.
    fn render_3d(&self, plot: &Plot3d) -> Result<Vec<u8>>;

    /// Present the rendered figure non-blockingly, if a surface exists.
    fn display(&self, _png: &[u8]) {}
}

impl ArtifactStore<'_> {
    /// Render a 2-D figure and persist it under `image/`.
    ///
    /// An explicit name saves to `image/<name>.png`, overwriting any prior
    /// artifact of that name. Without a name the file is auto-indexed as
    /// `image/plot_<k>.png` with `k` = current `image/` entry count + 1.
    /// After a successful write the figure is handed to the renderer's
    /// display hook.
    ///
    /// # Errors
    ///
    /// Returns the renderer's error if rendering fails, [`Error::InvalidName`]
    /// for malformed names, or [`Error::Filesystem`] on write failure.
    ///
    /// [`Error::InvalidName`]: crate::Error::InvalidName
    /// [`Error::Filesystem`]: crate::Error::Filesystem
    pub fn save_plot(
        &self,
        plot: &Plot,
        renderer: &dyn PlotRenderer,
        name: Option<&str>,
    ) -> Result<PathBuf> {
        let png = renderer.render(plot)?;
        self.persist_figure(&png, renderer, name)
    }

    /// Render a 3-D figure and persist it under `image/`.
    ///
    /// Identical contract to [`ArtifactStore::save_plot`], using the
    /// renderer's three-dimensional projection.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`ArtifactStore::save_plot`].
    pub fn save_plot_3d(
        &self,
        plot: &Plot3d,
        renderer: &dyn PlotRenderer,
        name: Option<&str>,
    ) -> Result<PathBuf> {
        let png = renderer.render_3d(plot)?;
        self.persist_figure(&png, renderer, name)
    }

    fn persist_figure(
        &self,
        png: &[u8],
        renderer: &dyn PlotRenderer,
        name: Option<&str>,
    ) -> Result<PathBuf> {
        let dir = self.category_dir(Category::Plot);
        let path = match name {
            Some(name) => {
                validate_name(name)?;
                dir.join(format!("{name}.png"))
            }
            None => {
                let k = entry_count(&dir)? + 1;
                dir.join(format!("plot_{k}.png"))
            }
        };
        write_atomic(&path, png)?;
        tracing::debug!(path = %path.display(), bytes = png.len(), "saved plot");
        renderer.display(png);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Session;
    use std::cell::Cell;

    struct StubRenderer {
        displayed: Cell<usize>,
    }

    impl StubRenderer {
        fn new() -> Self {
            Self {
                displayed: Cell::new(0),
            }
        }
    }

    impl PlotRenderer for StubRenderer {
        fn render(&self, plot: &Plot) -> Result<Vec<u8>> {
            Ok(format!("png:{}", plot.series.len()).into_bytes())
        }

        fn render_3d(&self, plot: &Plot3d) -> Result<Vec<u8>> {
            Ok(format!("png3d:{}", plot.series.len()).into_bytes())
        }

        fn display(&self, _png: &[u8]) {
            self.displayed.set(self.displayed.get() + 1);
        }
    }

    fn scratch_session(root: &std::path::Path) -> Session {
        use chrono::TimeZone;
        let now = chrono::Local.with_ymd_and_hms(2023, 7, 18, 14, 5, 0).unwrap();
        Session::create_in(root, now).unwrap()
    }

    #[test]
    fn test_auto_index_starts_at_one() {
        let root = tempfile::tempdir().unwrap();
        let session = scratch_session(root.path());
        let renderer = StubRenderer::new();
        let plot = Plot::xy(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]);

        let first = session.store().save_plot(&plot, &renderer, None).unwrap();
        let second = session.store().save_plot(&plot, &renderer, None).unwrap();

        assert!(first.ends_with("image/plot_1.png"));
        assert!(second.ends_with("image/plot_2.png"));
        assert_eq!(renderer.displayed.get(), 2);
    }

    #[test]
    fn test_explicit_name_ignores_auto_index() {
        let root = tempfile::tempdir().unwrap();
        let session = scratch_session(root.path());
        let renderer = StubRenderer::new();
        let plot = Plot::xy(vec![0.0], vec![0.0]);

        session.store().save_plot(&plot, &renderer, None).unwrap();
        let named = session
            .store()
            .save_plot(&plot, &renderer, Some("x"))
            .unwrap();

        assert!(named.ends_with("image/x.png"));
        assert!(named.is_file());
    }

    #[test]
    fn test_save_plot_3d_same_naming() {
        let root = tempfile::tempdir().unwrap();
        let session = scratch_session(root.path());
        let renderer = StubRenderer::new();
        let plot = Plot3d::xyz(vec![1.0], vec![2.0], vec![3.0]);

        let path = session.store().save_plot_3d(&plot, &renderer, None).unwrap();
        assert!(path.ends_with("image/plot_1.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"png3d:1");
    }

    #[test]
    fn test_named_plot_overwrites() {
        let root = tempfile::tempdir().unwrap();
        let session = scratch_session(root.path());
        let renderer = StubRenderer::new();

        let one = Plot::xy(vec![1.0], vec![1.0]);
        let two = one.clone().with_series(Series2d::default());
        session.store().save_plot(&one, &renderer, Some("x")).unwrap();
        let path = session.store().save_plot(&two, &renderer, Some("x")).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"png:2");
        assert_eq!(
            super::entry_count(&session.store().category_dir(Category::Plot)).unwrap(),
            1
        );
    }
}
