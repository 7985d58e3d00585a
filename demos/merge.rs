//! This example imports splat files into an editing session, edits them, and writes the merged
//! result as both `.splat` and `.ply`.
//!
//! For example, to merge two models with an offset of (10, 0, 0) between each model, run:
//!
//! ```sh
//! cargo run --example merge -- -m "path/to/model1.splat" -m "path/to/model2.ply" --offset 10.0,0.0,0.0
//! ```
//!
//! To erase everything inside a sphere before exporting, run:
//!
//! ```sh
//! cargo run --example merge -- -m "path/to/model.splat" --erase-sphere 0.0,0.0,0.0,1.5
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use glam::*;

use splat_editor as se;

/// The command line arguments.
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "\
    Merge 3D Gaussian splat files into one.\n\
    \n\
    Each model is imported as an object, offset, scaled, and rotated about its centroid, \
    then the merged result is written to the output directory.\
    "
)]
struct Args {
    /// Path to the .splat or .ply files.
    #[arg(short, long, num_args = 1.., required = true)]
    models: Vec<PathBuf>,

    /// The offset of each model relative to the previous one.
    #[arg(
        short,
        long,
        num_args = 3,
        value_delimiter = ',',
        default_value = "0.0,0.0,0.0"
    )]
    offset: Vec<f32>,

    /// The scale applied to each model.
    #[arg(short, long, default_value_t = 1.0)]
    scale: f32,

    /// The rotation axis, one of x, y, z.
    #[arg(long, default_value = "y")]
    axis: se::Axis,

    /// The rotation in degrees.
    #[arg(long, default_value_t = 0.0)]
    degrees: f32,

    /// Recenter each model at the origin before the offset.
    #[arg(long)]
    recenter: bool,

    /// Erase the splats inside the sphere `x,y,z,radius`.
    #[arg(long, num_args = 4, value_delimiter = ',')]
    erase_sphere: Option<Vec<f32>>,

    /// Also write every model individually.
    #[arg(long)]
    each: bool,

    /// The output directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let offset = Vec3::from_slice(&args.offset);

    let mut session = se::EditorSession::new(se::NullRenderTarget);

    for (i, path) in args.models.iter().enumerate() {
        let file_name = file_name(path);
        let bytes = std::fs::read(path)?;

        log::debug!("Importing {}", path.display());
        let id = match path.extension().and_then(|ext| ext.to_str()) {
            Some("ply") => session.import_ply(&file_name, &bytes)?,
            _ => session.import_splat(&file_name, &bytes)?,
        };

        if args.recenter {
            session.recenter_object(id)?;
        }

        session.scale_object(id, args.scale)?;
        session.rotate_object(id, args.axis, args.degrees)?;
        session.translate_object(id, offset * i as f32)?;
    }

    if let Some(sphere) = &args.erase_sphere {
        let volume = se::SelectionVolume::sphere(Vec3::from_slice(&sphere[..3]), sphere[3]);
        let count = session.erase_in_volume(&volume)?;
        log::info!("Erased {count} splats inside the sphere");
    }

    for event in session.take_events() {
        log::debug!("{event:?}");
    }

    if let Some(bounds) = session.merged_bounds() {
        log::info!(
            "Merged {} splats, bounds {} to {}",
            session.merged().len(),
            bounds.min,
            bounds.max
        );
    }

    std::fs::create_dir_all(&args.out)?;

    for format in [se::ExportFormat::Splat, se::ExportFormat::Ply] {
        write(&args.out, &session.export_merged(format)?)?;

        if args.each {
            for export in session.export_each(format)? {
                write(&args.out, &export)?;
            }
        }
    }

    Ok(())
}

/// Get the file name of a path.
fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Write an export into the directory.
fn write(dir: &Path, export: &se::Export) -> std::io::Result<()> {
    let path = dir.join(&export.file_name);
    std::fs::write(&path, &export.bytes)?;

    log::info!("Wrote {}", path.display());
    Ok(())
}
