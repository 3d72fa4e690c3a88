use std::process::ExitCode;

use clap::{Parser, Subcommand};

use lenscal_pipeline::{workflows, Context};

const OVERVIEW: &str = "\
This is an overview about the calibration steps.

To set up the required directory structure simply run:

    lenscal init

The next step is to copy the RAW files you created to the corresponding
directories.

Once you have done that run:

    lenscal distortion

This will create tiff files you can use to figure out the lens distortion
values (a), (b) and (c) using hugin. It will also create a lenses.conf where
you need to fill out missing values.

If you don't want to do distortion corrections you need to create the
lenses.conf file manually. It needs to look like this:

    [MODEL NAME]
    maker =
    mount =
    cropfactor =
    aspect_ratio =
    type =

The section name needs to be the lens model name you can figure out with:

    exiv2 -g LensModel -pt <raw file>

If you want TCA corrections just run:

    lenscal tca

If you want vignetting corrections run:

    lenscal vignetting

Once you have created data for all corrections you can generate an xml file
which can be consumed by lensfun. Just call:

    lenscal generate-xml

To use the data in your favourite software you just have to copy the generated
lensfun.xml file to:

    ~/.local/share/lensfun/

If you want to submit the data to the lensfun project run:

    lenscal ship

then create a bug report to add the lens calibration data to the project at:

    https://github.com/lensfun/lensfun/issues/

and provide the lenscal_calibration.tar.gz";

/// Calibrate camera lenses for lensfun.
#[derive(Parser)]
#[command(name = "lenscal", version, about, long_about = OVERVIEW)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Create the calibration directory structure
    Init,
    /// Convert distortion RAW files and create the lenses.conf template
    Distortion,
    /// Run TCA corrections
    Tca {
        /// Turns on non-linear polynomials for TCA
        #[arg(long)]
        complex_tca: bool,
    },
    /// Run vignetting corrections
    Vignetting,
    /// Generate the lensfun XML database from the collected data
    GenerateXml,
    /// Bundle the calibration data for submission
    Ship,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = lenscal_core::init_logger(cli.verbose);

    let root = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(err) => {
            log::error!("cannot determine working directory: {err}");
            return ExitCode::FAILURE;
        }
    };
    let ctx = Context::new(root);

    let result = match cli.action {
        Action::Init => workflows::init::run(&ctx),
        Action::Distortion => workflows::distortion::run(&ctx),
        Action::Tca { complex_tca } => {
            let ctx = ctx.with_complex_tca(complex_tca);
            workflows::tca::run(&ctx)
        }
        Action::Vignetting => workflows::vignetting::run(&ctx),
        Action::GenerateXml => workflows::generate::run(&ctx),
        Action::Ship => workflows::ship::run(&ctx),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
