//! Random benchmark datasets: person records or plain integers.

use crate::error::{Result, SortError};
use crate::model::Record;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const FIRST_NAMES: &[&str] = &[
    "Aaliyah", "Ben", "Carmen", "Dmitri", "Elena", "Farid", "Grace", "Hiro", "Isabel", "Jamal",
    "Keiko", "Liam", "Maya", "Nikolai", "Olivia", "Pedro", "Quinn", "Rosa", "Sanjay", "Tara",
    "Umar", "Valeria", "Wei", "Ximena", "Yusuf", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Bautista", "Chen", "Dubois", "Esposito", "Fischer", "Garcia", "Haddad", "Ivanova",
    "Johansson", "Kowalski", "Lopez", "Mendoza", "Nakamura", "O'Brien", "Petrov", "Quispe",
    "Reyes", "Santos", "Tanaka", "Umarov", "Villanueva", "Wright", "Xu", "Yilmaz", "Zhang",
];

/// Generate `count` records with unique shuffled ids (`1..=count`) and names drawn from fixed
/// pools. The same `seed` always yields the same dataset.
pub fn generate_records(count: usize, seed: Option<u64>) -> Vec<Record> {
    let mut rng = seeded_rng(seed);

    let mut ids: Vec<i64> = (1..=count as i64).collect();
    ids.shuffle(&mut rng);
    ids.into_iter()
        .map(|id| {
            let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
            let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
            Record::new(id, first, last)
        })
        .collect()
}

/// Generate `count` integers drawn uniformly from `min..=max`.
pub fn generate_values(count: usize, min: i64, max: i64, seed: Option<u64>) -> Result<Vec<i64>> {
    if min >= max {
        return Err(SortError::invalid(
            "minimum value must be less than maximum value",
        ));
    }
    let mut rng = seeded_rng(seed);
    Ok((0..count).map(|_| rng.gen_range(min..=max)).collect())
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
