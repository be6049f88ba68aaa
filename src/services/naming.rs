use camino::{Utf8Path, Utf8PathBuf};

/// File name prefix shared by every exported mesh and preview image.
pub const MESH_PREFIX: &str = "gfbin1.2";

/// Format a wall thickness for folder and file names.
///
/// Values are rounded to two decimals. Whole values keep one decimal place
/// (`1.0`, not `1`) so names stay stable across runs and match the archive
/// and folder templates exactly.
pub fn format_wall(wall_width: f64) -> String {
    let rounded = (wall_width * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{:.1}", rounded)
    } else {
        format!("{}", rounded)
    }
}

/// Resolve the folder a variant's mesh belongs in:
/// `<base>/wall-<w>/divisions-<d>`.
///
/// Deterministic across runs so a re-run with "skip existing" finds the
/// outputs of a previous run.
pub fn variant_folder(base: &Utf8Path, wall_width: f64, divisions: u32) -> Utf8PathBuf {
    base.join(format!("wall-{}", format_wall(wall_width)))
        .join(format!("divisions-{}", divisions))
}

/// Resolve a variant's base file name (without extension):
/// `gfbin1.2_<x>x<y>x<z>_w<w>d<d>` with x, y, z and divisions zero-padded
/// to two digits and the wall thickness embedded unpadded.
pub fn variant_name(x: u32, y: u32, z: u32, wall_width: f64, divisions: u32) -> String {
    format!(
        "{}_{:02}x{:02}x{:02}_w{}d{:02}",
        MESH_PREFIX,
        x,
        y,
        z,
        format_wall(wall_width),
        divisions
    )
}

/// A bin is useless when its division count is implausibly high for its
/// width. The allowance grows with x; anything at x >= 10 is unrestricted.
pub fn is_useless(x: u32, divisions: u32) -> bool {
    (x == 1 && divisions > 2)
        || (x < 2 && divisions > 4)
        || (x < 3 && divisions > 5)
        || (x < 4 && divisions > 6)
        || (x < 5 && divisions > 8)
        || (x < 7 && divisions > 9)
        || (x < 10 && divisions > 10)
}
