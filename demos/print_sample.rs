//! Sample a simulated integer stream and print the reservoir.
//!
//! Stream = 0..100, reservoir size = 10. The stream is driven through the
//! push API one element at a time, the way a real feed would be.

use cistern::ReservoirSampler;

const N_STREAM: u64 = 100;
const K_RESERVOIR: i64 = 10;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut sampler = ReservoirSampler::with_signed_capacity(K_RESERVOIR)?;
    for x in 0..N_STREAM {
        sampler.add(x);
    }
    println!("{:?}", sampler.into_sample());
    Ok(())
}
