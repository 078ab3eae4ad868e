use std::ffi::OsString;

use anyhow::{Context, Result};
use boot_image_builder::{build_image_from_paths, BuildArgs, ImageLayout, StderrReporter};

fn main() -> Result<()> {
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let args = BuildArgs::parse(&args)?;

    let stdout = std::io::stdout();
    build_image_from_paths(
        &args,
        &ImageLayout::default(),
        stdout.lock(),
        &mut StderrReporter,
    )
    .with_context(|| {
        format!(
            "building image from '{}', '{}', '{}'",
            args.bootsect.display(),
            args.setup.display(),
            args.system.display()
        )
    })?;

    Ok(())
}
