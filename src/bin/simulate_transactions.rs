//! Generates a synthetic training CSV for the anomaly model.
//!
//! Writes 270 ordinary transactions plus a small suspicious tail (high amounts,
//! burst logins, drained balances), shuffled, with the column names the model
//! trainer expects. Usage:
//!
//! ```text
//! cargo run --bin simulate_transactions [output-path]
//! ```

use anyhow::Context;
use rand::{Rng, seq::SliceRandom};

const NORMAL_ROWS: usize = 270;
const SUSPICIOUS_ROWS: usize = 30;

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/bank_transactions.csv".to_string());

    let mut rng = rand::rng();
    let mut rows: Vec<[f64; 4]> = Vec::with_capacity(NORMAL_ROWS + SUSPICIOUS_ROWS);

    for _ in 0..NORMAL_ROWS {
        rows.push([
            (2000.0 + 1000.0 * gauss(&mut rng)).clamp(10.0, 8000.0),
            rng.random_range(18..=75) as f64,
            rng.random_range(1..=4) as f64,
            (9000.0 + 4000.0 * gauss(&mut rng)).clamp(100.0, 50_000.0),
        ]);
    }

    // Suspicious tail: very high amounts, burst activity, near-empty accounts
    for _ in 0..SUSPICIOUS_ROWS {
        rows.push([
            (15_000.0 + 5000.0 * gauss(&mut rng)).clamp(8000.0, 50_000.0),
            rng.random_range(18..=30) as f64,
            rng.random_range(10..=30) as f64,
            (400.0 + 300.0 * gauss(&mut rng)).clamp(0.0, 2000.0),
        ]);
    }

    rows.shuffle(&mut rng);

    if let Some(parent) = std::path::Path::new(&path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory for {path}"))?;
    }

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to open {path} for writing"))?;
    writer.write_record([
        "TransactionAmount",
        "CustomerAge",
        "LoginAttempts",
        "AccountBalance",
    ])?;
    for [amount, age, logins, balance] in &rows {
        writer.write_record([
            format!("{amount:.2}"),
            format!("{age:.0}"),
            format!("{logins:.0}"),
            format!("{balance:.2}"),
        ])?;
    }
    writer.flush()?;

    println!(
        "Generated {} transactions ({NORMAL_ROWS} normal, {SUSPICIOUS_ROWS} suspicious) at {path}",
        rows.len()
    );
    Ok(())
}

/// Standard-normal sample via the sum of twelve uniforms.
fn gauss<R: Rng>(rng: &mut R) -> f64 {
    (0..12).map(|_| rng.random::<f64>()).sum::<f64>() - 6.0
}
