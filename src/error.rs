use thiserror::Error;

/// Errors surfaced by the rendering engine.
///
/// Configuration problems (bad DPI/scale, unusable tiled-layer setup) are
/// fatal to the operation that raised them and are returned to the caller.
/// Missing draw resources (surfaces, fonts) are *not* errors: those paths
/// degrade by skipping the affected draw and logging a warning.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid dpi: {0}")]
    InvalidDpi(f64),

    #[error("invalid scale denominator: {0}")]
    InvalidScale(f64),

    #[error("layer not found: {0}")]
    LayerNotFound(String),

    #[error("tile matrix set not found: {0}")]
    MatrixSetNotFound(String),

    #[error("no tile matrix set supports map CRS {0}")]
    UnsupportedCrs(String),

    #[error("tiled layer {0} declares no style")]
    NoStyle(String),

    #[error("layer {0} exposes neither a tile URL template nor a GetTile endpoint")]
    NoTileEndpoint(String),

    #[error("no projection registered from {from} to {to}")]
    ProjectionNotFound { from: String, to: String },

    #[error("tile index range inverted: cols {col_min}..{col_max}, rows {row_min}..{row_max}")]
    InvertedTileRange {
        col_min: i64,
        col_max: i64,
        row_min: i64,
        row_max: i64,
    },

    #[error("cannot allocate a {width}x{height} draw surface")]
    SurfaceAllocation { width: u32, height: u32 },

    #[error("unusable font data for face {0:?}")]
    FontLoad(String),

    #[error("document parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
