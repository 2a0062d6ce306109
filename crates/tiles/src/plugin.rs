use view::Viewport;

use crate::{PluginError, PluginHostError, TileGridError, TileGridRenderer, TileSource};

/// Hooks a viewport invokes on everything attached to it.
pub trait ViewportPlugin {
    fn name(&self) -> &str;
    /// Called after the screen or world size changed.
    fn layout(&mut self, viewport: &dyn Viewport) -> Result<(), TileGridError>;
    /// Called once per frame.
    fn update(&mut self, viewport: &dyn Viewport) -> Result<(), TileGridError>;
    /// Drops any cached view state so the next update starts from scratch.
    fn invalidate(&mut self) {}
}

impl<S: TileSource> ViewportPlugin for TileGridRenderer<S> {
    fn name(&self) -> &str {
        TileGridRenderer::name(self)
    }

    fn layout(&mut self, viewport: &dyn Viewport) -> Result<(), TileGridError> {
        TileGridRenderer::layout(self, viewport).map(|_| ())
    }

    fn update(&mut self, viewport: &dyn Viewport) -> Result<(), TileGridError> {
        TileGridRenderer::update(self, viewport).map(|_| ())
    }

    fn invalidate(&mut self) {
        TileGridRenderer::invalidate(self);
    }
}

/// Ordered set of uniquely named plugins driven by one viewport.
#[derive(Default)]
pub struct PluginHost {
    plugins: Vec<Box<dyn ViewportPlugin>>,
}

impl PluginHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.plugins.iter().map(|plugin| plugin.name())
    }

    pub fn add(&mut self, plugin: Box<dyn ViewportPlugin>) -> Result<(), PluginHostError> {
        if self.position(plugin.name()).is_some() {
            return Err(PluginHostError::DuplicatePlugin(plugin.name().to_owned()));
        }
        self.plugins.push(plugin);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Box<dyn ViewportPlugin>> {
        let index = self.position(name)?;
        Some(self.plugins.remove(index))
    }

    pub fn layout_all(&mut self, viewport: &dyn Viewport) -> Result<(), PluginError> {
        for plugin in &mut self.plugins {
            plugin.layout(viewport).map_err(|source| PluginError {
                plugin: plugin.name().to_owned(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn update_all(&mut self, viewport: &dyn Viewport) -> Result<(), PluginError> {
        for plugin in &mut self.plugins {
            plugin.update(viewport).map_err(|source| PluginError {
                plugin: plugin.name().to_owned(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn invalidate_all(&mut self) {
        for plugin in &mut self.plugins {
            plugin.invalidate();
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.plugins.iter().position(|plugin| plugin.name() == name)
    }
}
