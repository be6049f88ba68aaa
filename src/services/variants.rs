use crate::models::RunConfig;

/// One concrete combination to export, together with the enumeration
/// indices the export loop needs (previews are captured only for the
/// first wall thickness, and grouped into height layers by z position).
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub z_index: usize,
    pub wall_width: f64,
    pub wall_index: usize,
    pub divisions: u32,
}

/// The ordered cartesian design space of a run.
///
/// Ordering is X, Y, Z, wall thickness, divisions from outermost to
/// innermost. The order matters: it is what groups preview file names
/// into height layers regardless of the other axes.
#[derive(Debug, Clone)]
pub struct VariantSpace {
    x_start: u32,
    x_end: u32,
    y_start: u32,
    y_end: u32,
    z_values: Vec<u32>,
    wall_widths: Vec<f64>,
    divisions_start: u32,
    divisions_end: u32,
}

impl VariantSpace {
    pub fn new(config: &RunConfig) -> Self {
        // checked arithmetic: a sequence running past u32::MAX ends at
        // the last representable value instead of wrapping
        let z_values = (0u32..)
            .map_while(|k| {
                let z = config.z_step.checked_mul(k)?.checked_add(config.z_start)?;
                (z <= config.z_end).then_some(z)
            })
            .collect();

        Self {
            x_start: config.x_start,
            x_end: config.x_end,
            y_start: config.y_start,
            y_end: config.y_end,
            z_values,
            wall_widths: config.wall_widths.clone(),
            divisions_start: config.divisions_start,
            divisions_end: config.divisions_end,
        }
    }

    /// Height values in ascending order, one per height layer.
    pub fn z_values(&self) -> &[u32] {
        &self.z_values
    }

    pub fn wall_widths(&self) -> &[f64] {
        &self.wall_widths
    }

    pub fn divisions(&self) -> impl Iterator<Item = u32> {
        self.divisions_start..=self.divisions_end
    }

    /// Exact number of variants this space will yield.
    ///
    /// Not reduced by the uselessness filter: useless variants still
    /// consume one progress tick as "skipped", so this is the progress
    /// maximum as well.
    pub fn total(&self) -> usize {
        (self.x_end + 1 - self.x_start) as usize
            * (self.y_end + 1 - self.y_start) as usize
            * self.z_values.len()
            * self.wall_widths.len()
            * (self.divisions_end + 1 - self.divisions_start) as usize
    }

    /// Lazy, restartable walk over the whole space.
    pub fn iter(&self) -> impl Iterator<Item = Variant> + '_ {
        (self.x_start..=self.x_end).flat_map(move |x| {
            (self.y_start..=self.y_end).flat_map(move |y| {
                self.z_values
                    .iter()
                    .copied()
                    .enumerate()
                    .flat_map(move |(z_index, z)| {
                        self.wall_widths
                            .iter()
                            .copied()
                            .enumerate()
                            .flat_map(move |(wall_index, wall_width)| {
                                (self.divisions_start..=self.divisions_end).map(move |divisions| {
                                    Variant {
                                        x,
                                        y,
                                        z,
                                        z_index,
                                        wall_width,
                                        wall_index,
                                        divisions,
                                    }
                                })
                            })
                    })
            })
        })
    }
}
