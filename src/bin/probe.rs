use anyhow::{Context, Result};
use gridimage::{Index, Region, Volume};
use log::info;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "probe", about = "Read or write a single voxel of a filled volume.")]
struct Opt {
    /// Extent along X, Y and Z
    #[structopt(long, number_of_values = 3, required = true)]
    size: Vec<usize>,

    /// First index along X, Y and Z (defaults to 0 0 0)
    #[structopt(long, number_of_values = 3, allow_hyphen_values = true)]
    origin: Vec<i64>,

    /// Value written to every voxel after allocation
    #[structopt(long, default_value = "0")]
    fill: u16,

    /// Voxel to probe
    #[structopt(long, number_of_values = 3, allow_hyphen_values = true, required = true)]
    index: Vec<i64>,

    /// Value to store at the probed voxel before reading it back
    #[structopt(long)]
    set: Option<u16>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Opt::from_args();

    let (index, value) = run(&args)?;
    println!("{} = {}", index, value);

    Ok(())
}

fn run(args: &Opt) -> Result<(Index<3>, u16)> {
    let size: [usize; 3] = args.size.as_slice().try_into().context("--size takes 3 values")?;
    let origin: [i64; 3] = if args.origin.is_empty() {
        [0; 3]
    } else {
        args.origin
            .as_slice()
            .try_into()
            .context("--origin takes 3 values")?
    };
    let index: [i64; 3] = args.index.as_slice().try_into().context("--index takes 3 values")?;
    let index = Index(index);

    let mut image = Volume::with_region(Region::new(origin, size))?;
    image.fill_buffer(args.fill)?;

    if let Some(value) = args.set {
        info!("writing {} at {}", value, index);
        image.set_pixel(index, value)?;
    }

    Ok((index, image.get_pixel(index)?))
}
