use std::fmt;
use std::path::{Path, PathBuf};

use serde::ser::{Serialize, SerializeMap, Serializer};

use lumen_image::{Image, ImageSize};
use lumen_imgproc::{crop::paste_image, interpolation::InterpolationMode, resize::resize_fast};
use lumen_io::functional::read_image_any_rgb8;

use crate::error::LumenError;

/// Number of columns of the grid.
pub const GRID_COLUMNS: usize = 3;

/// Size of an image cell in the contact sheet.
pub const THUMBNAIL_SIZE: ImageSize = ImageSize {
    width: 300,
    height: 200,
};

/// Padding around every cell of the contact sheet, in pixels.
pub const CELL_PADDING: usize = 10;

/// An ordered table of metric values keyed by algorithm name.
///
/// Serializes as a JSON object keeping the insertion order.
///
/// # Example
///
/// ```
/// use lumen::grid::ResultsTable;
///
/// let mut table = ResultsTable::new();
/// table.insert("mean_deviation", 0.5);
/// table.insert("ame", 0.25);
///
/// assert_eq!(
///     serde_json::to_string(&table).unwrap(),
///     r#"{"mean_deviation":0.5,"ame":0.25}"#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsTable {
    rows: Vec<(String, f64)>,
}

impl ResultsTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value, overwriting a previous value of the same algorithm in place.
    pub fn insert(&mut self, algorithm: impl Into<String>, value: f64) {
        let algorithm = algorithm.into();
        match self.rows.iter_mut().find(|(name, _)| *name == algorithm) {
            Some((_, existing)) => *existing = value,
            None => self.rows.push((algorithm, value)),
        }
    }

    /// The value recorded for an algorithm.
    pub fn get(&self, algorithm: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|(name, _)| name == algorithm)
            .map(|&(_, value)| value)
    }

    /// Iterate over the rows in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rows.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no row.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the table as a JSON object.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), LumenError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)?;
        Ok(())
    }
}

impl Serialize for ResultsTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for (name, value) in &self.rows {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl fmt::Display for ResultsTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const NAME_HEADING: &str = "Algorithm";
        const VALUE_HEADING: &str = "Value";

        let values = self
            .rows
            .iter()
            .map(|(_, value)| value.to_string())
            .collect::<Vec<_>>();

        let name_width = self
            .rows
            .iter()
            .map(|(name, _)| name.len())
            .fold(NAME_HEADING.len(), usize::max);
        let value_width = values
            .iter()
            .map(|value| value.len())
            .fold(VALUE_HEADING.len(), usize::max);

        writeln!(f, "{NAME_HEADING:<name_width$} | {VALUE_HEADING}")?;
        writeln!(f, "{}-+-{}", "-".repeat(name_width), "-".repeat(value_width))?;
        for ((name, _), value) in self.rows.iter().zip(values.iter()) {
            writeln!(f, "{name:<name_width$} | {value}")?;
        }

        Ok(())
    }
}

/// The content of a grid cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    /// An image stored on disk.
    Image(PathBuf),
    /// A table of metric values.
    Table(ResultsTable),
}

/// A titled cell of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    /// The title shown with the cell.
    pub title: String,
    /// The content of the cell.
    pub kind: CellKind,
}

impl GridCell {
    /// An image cell.
    pub fn image(title: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            kind: CellKind::Image(path.into()),
        }
    }

    /// A table cell.
    pub fn table(title: impl Into<String>, table: ResultsTable) -> Self {
        Self {
            title: title.into(),
            kind: CellKind::Table(table),
        }
    }
}

/// Row-major placement of cells in a grid of [`GRID_COLUMNS`] columns.
///
/// # Example
///
/// ```
/// use lumen::grid::{GridCell, GridLayout};
///
/// let mut layout = GridLayout::new();
///
/// assert_eq!(layout.push(GridCell::image("Original", "tmp/input.png")), (0, 0));
/// assert_eq!(layout.push(GridCell::image("ame", "tmp/ame.png")), (0, 1));
/// assert_eq!(layout.push(GridCell::image("bie", "tmp/bie.png")), (0, 2));
/// assert_eq!(layout.push(GridCell::image("zero_dce", "tmp/zero_dce.png")), (1, 0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridLayout {
    cells: Vec<(usize, usize, GridCell)>,
    row: usize,
    col: usize,
}

impl GridLayout {
    /// Create an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a cell at the cursor and advance it.
    ///
    /// Returns the `(row, col)` position of the cell.
    pub fn push(&mut self, cell: GridCell) -> (usize, usize) {
        let position = (self.row, self.col);
        self.cells.push((self.row, self.col, cell));

        if self.col == GRID_COLUMNS - 1 {
            self.row += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }

        position
    }

    /// Remove every cell and move the cursor back to the origin.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.row = 0;
        self.col = 0;
    }

    /// Iterate over the cells with their `(row, col)` positions.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &GridCell)> {
        self.cells.iter().map(|(row, col, cell)| (*row, *col, cell))
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the layout has no cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of rows holding at least one cell.
    pub fn num_rows(&self) -> usize {
        self.cells.last().map_or(0, |(row, _, _)| row + 1)
    }

    /// Number of columns holding at least one cell.
    pub fn num_cols(&self) -> usize {
        self.cells.len().min(GRID_COLUMNS)
    }
}

/// Compose the image cells of a layout into a single RGB8 contact sheet.
///
/// Every image is resized to `thumb_size` with Lanczos3 interpolation and placed at its grid
/// position with [`CELL_PADDING`] pixels around it on a white background. Table cells keep
/// their slot but stay blank.
///
/// Returns `None` when the layout holds no image cell.
pub fn render_contact_sheet(
    layout: &GridLayout,
    thumb_size: ImageSize,
) -> Result<Option<Image<u8, 3>>, LumenError> {
    if !layout
        .cells()
        .any(|(_, _, cell)| matches!(cell.kind, CellKind::Image(_)))
    {
        return Ok(None);
    }

    let cell_width = thumb_size.width + 2 * CELL_PADDING;
    let cell_height = thumb_size.height + 2 * CELL_PADDING;
    let sheet_size = ImageSize {
        width: layout.num_cols() * cell_width,
        height: layout.num_rows() * cell_height,
    };

    let mut sheet = Image::<u8, 3>::from_size_val(sheet_size, 255)?;
    let mut thumb = Image::<u8, 3>::from_size_val(thumb_size, 0)?;

    for (row, col, cell) in layout.cells() {
        let CellKind::Image(path) = &cell.kind else {
            continue;
        };

        let image = read_image_any_rgb8(path)?;
        resize_fast(&image, &mut thumb, InterpolationMode::Lanczos3)?;

        paste_image(
            &thumb,
            &mut sheet,
            col * cell_width + CELL_PADDING,
            row * cell_height + CELL_PADDING,
        )?;
    }

    Ok(Some(sheet))
}
