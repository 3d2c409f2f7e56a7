use anyhow::Result;
use gridimage::{Index, Region, Size, Volume};
use log::info;

const EXTENT: usize = 200;

fn main() -> Result<()> {
    env_logger::init();

    // Region covering EXTENT pixels along X, Y and Z, starting at the origin
    let mut size = Size::<3>::default();
    size[0] = EXTENT;
    size[1] = EXTENT;
    size[2] = EXTENT;

    let mut start = Index::<3>::default();
    start[0] = 0;
    start[1] = 0;
    start[2] = 0;

    let mut region = Region::default();
    region.set_size(size);
    region.set_index(start);

    let mut image = Volume::new();
    image.set_regions(region);
    image.allocate()?;

    let initial_value = 0;
    image.fill_buffer(initial_value)?;

    let mut pixel_index = Index::<3>::default();
    pixel_index[0] = 27; // x
    pixel_index[1] = 29; // y
    pixel_index[2] = 37; // z

    let pixel_value = image.get_pixel(pixel_index)?;
    info!("read {} at {}", pixel_value, pixel_index);

    image.set_pixel(pixel_index, pixel_value + 1)?;

    println!("{} = {}", pixel_index, image.get_pixel(pixel_index)?);
    println!("{} = {}", start, image.get_pixel(start)?);

    Ok(())
}
