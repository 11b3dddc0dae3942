//! Writes a deterministic sample JSONL dataset of business records, shaped
//! like the review-site dumps the filter is meant for. Handy for trying
//! out predicates without downloading a multi-GB archive.
//!
//! Usage: `generate_sample [output.jsonl] [n_records]`

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Serialize)]
struct Business {
    name: String,
    city: String,
    state: String,
    stars: f64,
    review_count: u32,
    is_open: u8,
    latitude: f64,
    longitude: f64,
    categories: Vec<String>,
}

/// Minimal deterministic PRNG (splitmix64).
struct SampleRng {
    state: u64,
}

impl SampleRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform float in [0, 1).
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

// (city, state, latitude, longitude)
const CITIES: &[(&str, &str, f64, f64)] = &[
    ("Philadelphia", "PA", 39.9526, -75.1652),
    ("Las Vegas", "NV", 36.1699, -115.1398),
    ("San Diego", "CA", 32.7157, -117.1611),
    ("Nashville", "TN", 36.1627, -86.7816),
];

const NAME_HEADS: &[&str] = &[
    "Blue Fish", "Golden Spoon", "Corner", "Liberty", "Desert", "Harbor", "Maple",
];
const NAME_TAILS: &[&str] = &["Grill", "Diner", "Cafe", "Bakery", "Tavern", "Market"];
const CATEGORIES: &[&str] = &[
    "Restaurants", "Coffee & Tea", "Nightlife", "Bakeries", "Seafood", "Breakfast & Brunch",
];

fn make_business(rng: &mut SampleRng, index: usize) -> Business {
    let &(city, state, lat, lon) = rng.pick(CITIES);
    let head = rng.pick(NAME_HEADS);
    let tail = rng.pick(NAME_TAILS);

    // half-star ratings between 1.0 and 5.0
    let stars = 1.0 + (rng.next_u64() % 9) as f64 * 0.5;
    let review_count = (rng.next_f64().powi(3) * 3000.0) as u32 + 3;

    let mut categories = vec![rng.pick(CATEGORIES).to_string()];
    if rng.next_f64() < 0.4 {
        categories.push(rng.pick(CATEGORIES).to_string());
    }

    Business {
        name: format!("{head} {tail} #{index}"),
        city: city.to_string(),
        state: state.to_string(),
        stars,
        review_count,
        is_open: u8::from(rng.next_f64() < 0.8),
        // scatter within roughly five miles of the city center
        latitude: lat + (rng.next_f64() - 0.5) * 0.15,
        longitude: lon + (rng.next_f64() - 0.5) * 0.15,
        categories,
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "sample_businesses.jsonl".to_string());
    let count: usize = args
        .next()
        .unwrap_or_else(|| "5000".to_string())
        .parse()
        .context("n_records must be an integer")?;

    let file = File::create(&path).with_context(|| format!("creating {path}"))?;
    let mut writer = BufWriter::new(file);

    let mut rng = SampleRng::new(0x5eed);
    for i in 0..count {
        let business = make_business(&mut rng, i);
        let line = serde_json::to_string(&business).context("serializing record")?;
        writeln!(writer, "{line}").context("writing record")?;
    }
    writer.flush().context("flushing output")?;

    log::info!("wrote {count} records to {path}");
    println!("Wrote {count} records to {path}");
    Ok(())
}
