use model::GridError;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum TileGridError {
    #[error(transparent)]
    InvalidTileSize(#[from] GridError),
    #[error("batched render group capacity must be at least 1")]
    InvalidCapacity,
    #[error("tile grid needs {required} slots but the render group holds at most {capacity}")]
    PoolCapacityExceeded { required: usize, capacity: usize },
}

#[derive(Debug, thiserror::Error)]
#[error("viewport plugin '{plugin}' failed")]
pub struct PluginError {
    pub plugin: String,
    #[source]
    pub source: TileGridError,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginHostError {
    #[error("a viewport plugin named '{0}' is already registered")]
    DuplicatePlugin(String),
}
