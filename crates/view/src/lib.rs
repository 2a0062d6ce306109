//! Viewport state consumed by the tile grid.
//!
//! `ViewTransform` is the position/scale pair of the viewport's content
//! container. `Viewport` is the read-only surface the grid renderer queries,
//! and `ScrollViewport` is a host-side implementation with pan and zoom.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn same_scale(&self, other: &ViewTransform) -> bool {
        self.scale_x == other.scale_x && self.scale_y == other.scale_y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ViewportError {
    #[error("viewport scale must be finite and positive")]
    InvalidScale,
    #[error("viewport size must be finite and non-negative")]
    InvalidSize,
    #[error("viewport arithmetic produced a non-finite value")]
    NonFiniteValue,
}

/// Read-only view of a scrollable, zoomable world.
///
/// Lengths returned by the `world_*` accessors are in world units.
pub trait Viewport {
    /// World x coordinate of the left edge of the visible area.
    fn left(&self) -> f32;
    /// World y coordinate of the top edge of the visible area.
    fn top(&self) -> f32;
    fn world_screen_width(&self) -> f32;
    fn world_screen_height(&self) -> f32;
    fn world_width(&self) -> f32;
    fn world_height(&self) -> f32;
    fn transform(&self) -> ViewTransform;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollViewport {
    screen_width: f32,
    screen_height: f32,
    world_width: f32,
    world_height: f32,
    transform: ViewTransform,
}

impl ScrollViewport {
    pub fn new(
        screen_width: f32,
        screen_height: f32,
        world_width: f32,
        world_height: f32,
    ) -> Result<Self, ViewportError> {
        for size in [screen_width, screen_height, world_width, world_height] {
            check_size(size)?;
        }
        Ok(Self {
            screen_width,
            screen_height,
            world_width,
            world_height,
            transform: ViewTransform::default(),
        })
    }

    pub fn screen_width(&self) -> f32 {
        self.screen_width
    }

    pub fn screen_height(&self) -> f32 {
        self.screen_height
    }

    pub fn resize_screen(&mut self, width: f32, height: f32) -> Result<(), ViewportError> {
        check_size(width)?;
        check_size(height)?;
        self.screen_width = width;
        self.screen_height = height;
        Ok(())
    }

    /// Moves the content container by a screen-space delta.
    pub fn pan_by(&mut self, delta_x: f32, delta_y: f32) -> Result<(), ViewportError> {
        let x = checked_add(self.transform.x, delta_x)?;
        let y = checked_add(self.transform.y, delta_y)?;
        self.transform.x = x;
        self.transform.y = y;
        Ok(())
    }

    /// Places the top-left corner of the visible area at a world coordinate.
    pub fn move_corner(&mut self, left: f32, top: f32) -> Result<(), ViewportError> {
        let x = checked_mul(-left, self.transform.scale_x)?;
        let y = checked_mul(-top, self.transform.scale_y)?;
        self.transform.x = x;
        self.transform.y = y;
        Ok(())
    }

    pub fn set_zoom(&mut self, scale: f32) -> Result<(), ViewportError> {
        self.set_scale(scale, scale)
    }

    pub fn set_scale(&mut self, scale_x: f32, scale_y: f32) -> Result<(), ViewportError> {
        check_scale(scale_x)?;
        check_scale(scale_y)?;
        self.transform.scale_x = scale_x;
        self.transform.scale_y = scale_y;
        Ok(())
    }

    /// Multiplies both scales by `zoom_factor` while keeping the world point
    /// under `(point_x, point_y)` (screen space) fixed on screen.
    pub fn zoom_about_point(
        &mut self,
        zoom_factor: f32,
        point_x: f32,
        point_y: f32,
    ) -> Result<(), ViewportError> {
        check_scale(zoom_factor)?;
        if !point_x.is_finite() || !point_y.is_finite() {
            return Err(ViewportError::NonFiniteValue);
        }

        let next_scale_x = checked_mul(self.transform.scale_x, zoom_factor)?;
        let next_scale_y = checked_mul(self.transform.scale_y, zoom_factor)?;
        check_scale(next_scale_x)?;
        check_scale(next_scale_y)?;

        let keep_anchor_scale = checked_add(1.0, -zoom_factor)?;
        let scaled_x = checked_mul(self.transform.x, zoom_factor)?;
        let scaled_y = checked_mul(self.transform.y, zoom_factor)?;
        let anchor_x_contribution = checked_mul(point_x, keep_anchor_scale)?;
        let anchor_y_contribution = checked_mul(point_y, keep_anchor_scale)?;

        self.transform = ViewTransform {
            x: checked_add(scaled_x, anchor_x_contribution)?,
            y: checked_add(scaled_y, anchor_y_contribution)?,
            scale_x: next_scale_x,
            scale_y: next_scale_y,
        };
        Ok(())
    }

    pub fn screen_to_world(
        &self,
        screen_x: f32,
        screen_y: f32,
    ) -> Result<(f32, f32), ViewportError> {
        if !screen_x.is_finite() || !screen_y.is_finite() {
            return Err(ViewportError::NonFiniteValue);
        }
        let world_x = (screen_x - self.transform.x) / self.transform.scale_x;
        let world_y = (screen_y - self.transform.y) / self.transform.scale_y;
        if !world_x.is_finite() || !world_y.is_finite() {
            return Err(ViewportError::NonFiniteValue);
        }
        Ok((world_x, world_y))
    }
}

impl Viewport for ScrollViewport {
    fn left(&self) -> f32 {
        -self.transform.x / self.transform.scale_x
    }

    fn top(&self) -> f32 {
        -self.transform.y / self.transform.scale_y
    }

    fn world_screen_width(&self) -> f32 {
        self.screen_width / self.transform.scale_x
    }

    fn world_screen_height(&self) -> f32 {
        self.screen_height / self.transform.scale_y
    }

    fn world_width(&self) -> f32 {
        self.world_width
    }

    fn world_height(&self) -> f32 {
        self.world_height
    }

    fn transform(&self) -> ViewTransform {
        self.transform
    }
}

fn check_size(size: f32) -> Result<(), ViewportError> {
    if !size.is_finite() || size < 0.0 {
        return Err(ViewportError::InvalidSize);
    }
    Ok(())
}

fn check_scale(scale: f32) -> Result<(), ViewportError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(ViewportError::InvalidScale);
    }
    Ok(())
}

fn checked_add(current: f32, delta: f32) -> Result<f32, ViewportError> {
    if !delta.is_finite() {
        return Err(ViewportError::NonFiniteValue);
    }
    let next = current + delta;
    if !next.is_finite() {
        return Err(ViewportError::NonFiniteValue);
    }
    Ok(next)
}

fn checked_mul(left: f32, right: f32) -> Result<f32, ViewportError> {
    if !left.is_finite() || !right.is_finite() {
        return Err(ViewportError::NonFiniteValue);
    }
    let next = left * right;
    if !next.is_finite() {
        return Err(ViewportError::NonFiniteValue);
    }
    Ok(next)
}
