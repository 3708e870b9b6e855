use crate::{Components, ReconstructionSettings};
use manhattan_core::{LineIndex, RegionIndex, Scene};
use manhattan_geom::lines_scale;

/// Everything shared by the stages of one reconstruction run.
///
/// The context only borrows its inputs and is never mutated, so independent subgraphs
/// can be processed against the same context at once.
#[derive(Debug)]
pub struct Context<'a, C> {
    pub scene: &'a Scene<C>,
    pub settings: &'a ReconstructionSettings,
    pub regions: &'a Components<RegionIndex>,
    pub lines: &'a Components<LineIndex>,
    /// Radius of the sphere enclosing all unit-scale lines.
    pub scale: f64,
}

impl<'a, C> Context<'a, C> {
    pub fn new(
        scene: &'a Scene<C>,
        settings: &'a ReconstructionSettings,
        regions: &'a Components<RegionIndex>,
        lines: &'a Components<LineIndex>,
    ) -> Self {
        let scale = lines_scale(scene.unit_lines.values()).unwrap_or(1.0);
        Self {
            scene,
            settings,
            regions,
            lines,
            scale,
        }
    }
}

impl<'a, C> Clone for Context<'a, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, C> Copy for Context<'a, C> {}
