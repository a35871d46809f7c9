use std::path::PathBuf;

use clap::Parser;
use merchpress::{raster, variants};

/// Generate the combinatorial logo variant matrix from one template SVG.
#[derive(Parser)]
#[command(name = "logo-variants", version)]
struct Cli {
    /// Logo template SVG
    input: PathBuf,

    /// Output root; SVGs land in <out>/svg, PNGs in <out>/png
    #[arg(short, long, default_value = "logos")]
    out: PathBuf,

    /// Also rasterize every variant to 512px and 1024px PNGs
    #[arg(long)]
    png: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("logo-variants: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> merchpress::Result<()> {
    let template = std::fs::read_to_string(&cli.input)?;

    let svg_root = cli.out.join("svg");
    let written = variants::generate(&template, &svg_root)?;
    println!("wrote {} variants under {}", written.len(), svg_root.display());

    if cli.png {
        let png_root = cli.out.join("png");
        let converted = raster::convert_dir(&svg_root, &png_root)?;
        println!("rasterized {} variants under {}", converted, png_root.display());
    }
    Ok(())
}
