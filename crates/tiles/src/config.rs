use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_TILES: usize = 1500;

/// Which display list the slots live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderGroupConfig {
    /// Plain unordered group without a size limit.
    Container,
    /// Batched group with a hard slot limit. Per-slot tint is only written
    /// when `tint` is set.
    Batched {
        #[serde(default = "default_max_tiles")]
        max_tiles: usize,
        #[serde(default)]
        tint: bool,
    },
}

fn default_max_tiles() -> usize {
    DEFAULT_MAX_TILES
}

impl Default for RenderGroupConfig {
    fn default() -> Self {
        Self::Batched {
            max_tiles: DEFAULT_MAX_TILES,
            tint: false,
        }
    }
}

impl RenderGroupConfig {
    pub fn capacity(self) -> Option<usize> {
        match self {
            Self::Container => None,
            Self::Batched { max_tiles, .. } => Some(max_tiles),
        }
    }

    pub fn allows_tint(self) -> bool {
        match self {
            Self::Container => true,
            Self::Batched { tint, .. } => tint,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileGridConfig {
    pub group: RenderGroupConfig,
    /// Drop trailing slots when fewer are needed instead of keeping them hidden.
    pub shrink: bool,
    /// Send a usage line to the debug sink after every non-idle update.
    pub debug: bool,
}

impl TileGridConfig {
    pub fn container() -> Self {
        Self {
            group: RenderGroupConfig::Container,
            ..Self::default()
        }
    }

    pub fn batched(max_tiles: usize, tint: bool) -> Self {
        Self {
            group: RenderGroupConfig::Batched { max_tiles, tint },
            ..Self::default()
        }
    }

    pub fn with_shrink(mut self, shrink: bool) -> Self {
        self.shrink = shrink;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_batched_without_tint() {
        let config = TileGridConfig::default();
        assert_eq!(
            config.group,
            RenderGroupConfig::Batched {
                max_tiles: 1500,
                tint: false
            }
        );
        assert!(!config.shrink);
        assert!(!config.debug);
        assert_eq!(config.group.capacity(), Some(1500));
        assert!(!config.group.allows_tint());
        assert!(RenderGroupConfig::Container.allows_tint());
        assert_eq!(RenderGroupConfig::Container.capacity(), None);
    }

    #[test]
    fn deserializes_partial_json_with_defaults() {
        let config: TileGridConfig =
            serde_json::from_str(r#"{ "shrink": true, "group": { "kind": "batched", "tint": true } }"#)
                .expect("parse config");
        assert_eq!(
            config,
            TileGridConfig::batched(DEFAULT_MAX_TILES, true).with_shrink(true)
        );

        let container: TileGridConfig =
            serde_json::from_str(r#"{ "group": { "kind": "container" }, "debug": true }"#)
                .expect("parse container config");
        assert_eq!(container, TileGridConfig::container().with_debug(true));
    }
}
