use std::path::{Path, PathBuf};

use lumen_io::{functional as F, png, IoError};

use crate::algorithm::{Output, Registry};
use crate::config::{AlgorithmParams, PipelineConfig};
use crate::error::LumenError;
use crate::grid::{render_contact_sheet, GridCell, GridLayout, ResultsTable, THUMBNAIL_SIZE};

/// Title of the grid cell holding the staged input.
pub const ORIGINAL_TITLE: &str = "Original";

/// File stem of the staged input in the work directory.
pub const ORIGINAL_STEM: &str = "original";

/// Title of the grid cell holding the metric table.
pub const RESULTS_TITLE: &str = "Results";

/// File name of the metric table in the work directory.
pub const RESULTS_FILE: &str = "results.json";

/// File name of the contact sheet in the work directory.
pub const CONTACT_SHEET_FILE: &str = "grid.png";

/// What a call to [`Pipeline::process`] produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    /// Image outputs as `(algorithm, path)` in execution order.
    pub images: Vec<(String, PathBuf)>,
    /// Scalar outputs in execution order.
    pub results: ResultsTable,
    /// Path of the written metric table, if any metric ran.
    pub results_path: Option<PathBuf>,
    /// Path of the written contact sheet, if the grid holds any image.
    pub contact_sheet: Option<PathBuf>,
}

/// Runs a selection of algorithms on an image and collects their outputs in a grid.
pub struct Pipeline {
    registry: Registry,
    config: PipelineConfig,
    grid: GridLayout,
}

impl Pipeline {
    /// Create a pipeline over a registry.
    pub fn new(registry: Registry, config: PipelineConfig) -> Self {
        Self {
            registry,
            config,
            grid: GridLayout::new(),
        }
    }

    /// The algorithms the pipeline can run.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The current configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The grid of the outputs produced so far.
    pub fn grid(&self) -> &GridLayout {
        &self.grid
    }

    /// Replace the selected algorithms.
    pub fn select<S: Into<String>>(&mut self, names: impl IntoIterator<Item = S>) {
        self.config.algorithms = names.into_iter().map(Into::into).collect();
    }

    /// Copy an input image into the work directory.
    ///
    /// The image is staged as `<work_dir>/original.<ext>` whatever its file name, so that no
    /// algorithm output overwrites it. The work directory is created when missing and the
    /// staged image becomes the first cell of the grid.
    ///
    /// # Returns
    ///
    /// The path of the staged image.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not a png or jpeg image, or if a
    /// registered algorithm writes its output under the staged file name.
    pub fn stage_input(&mut self, src: impl AsRef<Path>) -> Result<PathBuf, LumenError> {
        let src = src.as_ref();
        if !src.is_file() {
            return Err(IoError::FileDoesNotExist(src.to_path_buf()).into());
        }

        let extension = match src.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if F::is_supported_image(src) => ext.to_ascii_lowercase(),
            _ => return Err(IoError::InvalidFileExtension(src.to_path_buf()).into()),
        };

        let file_name = format!("{ORIGINAL_STEM}.{extension}");
        let staged = self.config.work_dir.join(&file_name);

        let reserved = file_name == RESULTS_FILE
            || file_name == CONTACT_SHEET_FILE
            || self
                .registry
                .iter()
                .any(|a| format!("{}.png", a.name()) == file_name);
        if reserved {
            return Err(LumenError::ReservedFileName(staged));
        }

        std::fs::create_dir_all(&self.config.work_dir)?;

        // copying a file onto itself would truncate it
        let already_staged = staged.exists()
            && std::fs::canonicalize(&staged)? == std::fs::canonicalize(src)?;
        if !already_staged {
            std::fs::copy(src, &staged)?;
        }

        log::info!("staged {} as {}", src.display(), staged.display());

        self.grid.push(GridCell::image(ORIGINAL_TITLE, &staged));

        Ok(staged)
    }

    /// Run the selected algorithms on an image.
    ///
    /// The algorithms run sorted by category. Every image output is written to
    /// `<work_dir>/<name>.png` and added to the grid; in pipeline mode it also becomes the input
    /// of the next algorithm, otherwise every algorithm sees the original image. Scalar outputs
    /// are collected into `<work_dir>/results.json` and a table cell. Finally the grid is
    /// rendered into `<work_dir>/grid.png`.
    ///
    /// # Errors
    ///
    /// Unknown algorithm names are reported before anything runs. Any failing algorithm stops
    /// the processing.
    pub fn process(&mut self, input: impl AsRef<Path>) -> Result<Report, LumenError> {
        let algorithms = self.registry.resolve(self.config.algorithms.as_slice())?;

        let mut report = Report::default();
        if algorithms.is_empty() {
            log::warn!("no algorithm selected, nothing to do");
            return Ok(report);
        }

        let work_dir = &self.config.work_dir;
        std::fs::create_dir_all(work_dir)?;

        let original = F::read_image_any_rgb8(input)?;
        let mut chained = None;

        for algorithm in algorithms {
            let name = algorithm.name();
            log::info!("performing {name}...");

            let image = match &chained {
                Some(image) if self.config.pipeline => image,
                _ => &original,
            };

            match algorithm.run(image)? {
                Output::Image(output) => {
                    let path = work_dir.join(format!("{name}.png"));
                    png::write_image_png_rgb8(&path, &output)?;

                    self.grid.push(GridCell::image(name, &path));
                    report.images.push((name.to_string(), path));

                    chained = Some(output);
                }
                Output::Scalar(value) => {
                    log::info!("{name}: {value}");
                    report.results.insert(name, value);
                }
            }

            log::info!("finished {name}");
        }

        if !report.results.is_empty() {
            let path = work_dir.join(RESULTS_FILE);
            report.results.write_json(&path)?;
            self.grid
                .push(GridCell::table(RESULTS_TITLE, report.results.clone()));
            report.results_path = Some(path);
        }

        if let Some(sheet) = render_contact_sheet(&self.grid, THUMBNAIL_SIZE)? {
            let path = work_dir.join(CONTACT_SHEET_FILE);
            png::write_image_png_rgb8(&path, &sheet)?;
            report.contact_sheet = Some(path);
        }

        Ok(report)
    }

    /// Delete the regular files of the work directory, clear the grid and the selection.
    ///
    /// The algorithm parameters go back to their defaults and the registered built-in
    /// algorithms are rebuilt with them; other registered algorithms are kept as they are.
    /// Subdirectories are left untouched and a missing work directory is not an error.
    pub fn reset(&mut self) -> Result<(), LumenError> {
        clean_work_dir(&self.config.work_dir)?;
        self.grid.clear();
        self.config.algorithms.clear();

        let params = AlgorithmParams::default();
        for algorithm in Registry::with_builtins(&params) {
            if self.registry.get(algorithm.name()).is_some() {
                self.registry.register(algorithm);
            }
        }
        self.config.params = params;

        Ok(())
    }
}

/// Delete the regular files of a directory.
///
/// Returns the number of deleted files.
pub fn clean_work_dir(work_dir: impl AsRef<Path>) -> Result<usize, LumenError> {
    let work_dir = work_dir.as_ref();
    if !work_dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in std::fs::read_dir(work_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            std::fs::remove_file(entry.path())?;
            removed += 1;
        } else {
            log::warn!("skipping {}", entry.path().display());
        }
    }

    log::debug!("removed {removed} files from {}", work_dir.display());

    Ok(removed)
}
