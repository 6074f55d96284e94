use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Box-Muller transform for normal distribution
fn gauss(rng: &mut impl Rng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

/// One synthetic population: columns `age`, `income`, `visits`, `region`.
struct Population {
    age: Vec<Option<f64>>,
    income: Vec<f64>,
    visits: Vec<i64>,
    region: Vec<String>,
}

const REGIONS: [&str; 4] = ["north", "south", "east", "west"];

/// `shift` moves the age and income distributions; `missing_rate` blanks ages.
fn generate(rng: &mut StdRng, rows: usize, shift: f64, missing_rate: f64) -> Population {
    let mut p = Population {
        age: Vec::with_capacity(rows),
        income: Vec::with_capacity(rows),
        visits: Vec::with_capacity(rows),
        region: Vec::with_capacity(rows),
    };
    for _ in 0..rows {
        let age = gauss(rng, 41.0 + shift * 8.0, 12.0).clamp(18.0, 95.0).round();
        p.age
            .push(if rng.gen::<f64>() < missing_rate { None } else { Some(age) });
        // Log-normal income.
        p.income
            .push((gauss(rng, 10.6 + shift * 0.3, 0.5)).exp().round());
        // Geometric visit counts.
        let mut visits = 0;
        while rng.gen::<f64>() < 0.7 && visits < 60 {
            visits += 1;
        }
        p.visits.push(visits);
        p.region
            .push(REGIONS[rng.gen_range(0..REGIONS.len())].to_string());
    }
    p
}

fn write_csv(path: &Path, p: &Population) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["age", "income", "visits", "region"])?;
    for i in 0..p.income.len() {
        let age = p.age[i].map(|a| a.to_string()).unwrap_or_default();
        writer.write_record([
            age,
            p.income[i].to_string(),
            p.visits[i].to_string(),
            p.region[i].clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, p: &Population) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("age", DataType::Float64, true),
        Field::new("income", DataType::Float64, false),
        Field::new("visits", DataType::Int64, false),
        Field::new("region", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(p.age.clone())),
            Arc::new(Float64Array::from(p.income.clone())),
            Arc::new(Int64Array::from(p.visits.clone())),
            Arc::new(StringArray::from(
                p.region.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("Failed to create RecordBatch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let dir = Path::new(std::env::args().nth(1).as_deref().unwrap_or("data")).to_path_buf();
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut rng = StdRng::seed_from_u64(42);

    let reference = generate(&mut rng, 20_000, 0.0, 0.02);
    write_csv(&dir.join("customers.csv"), &reference)?;

    let same = generate(&mut rng, 6_000, 0.0, 0.0);
    write_parquet(&dir.join("customers_q2.parquet"), &same)?;

    let shifted = generate(&mut rng, 3_000, 0.5, 0.01);
    write_csv(&dir.join("customers_shifted.csv"), &shifted)?;

    println!(
        "Wrote customers.csv (20000 rows), customers_q2.parquet (6000 rows) and \
         customers_shifted.csv (3000 rows) to {}",
        dir.display()
    );
    Ok(())
}
