use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const MINUTES_PER_DAY: i64 = 1440;
const DAYS: i64 = 14;
/// Sampling interval of the multi-day recordings, in minutes.
const STEP: i64 = 20;
/// Sampling interval of the first-day per-subject traces.
const FIRST_DAY_STEP: i64 = 5;

const SUBJECTS: [&str; 8] = ["f1", "f2", "f3", "f4", "m1", "m2", "m3", "m4"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Core body temperature of one subject at `minute`: a circadian rhythm
/// peaking at night, plus a four-day cycle for females, plus noise.
fn body_temperature(subject: &str, minute: i64, offset: f64, rng: &mut SimpleRng) -> f64 {
    let tau = 2.0 * std::f64::consts::PI;
    let day_phase = (minute % MINUTES_PER_DAY) as f64 / MINUTES_PER_DAY as f64;
    let circadian = 0.6 * (tau * (day_phase - 0.25)).sin();
    let cycle = if subject.contains('m') {
        0.0
    } else {
        0.25 * (tau * minute as f64 / (4 * MINUTES_PER_DAY) as f64).sin()
    };
    37.0 + offset + circadian + cycle + rng.gauss(0.0, 0.08)
}

fn main() -> anyhow::Result<()> {
    let out_dir = std::env::args().nth(1).unwrap_or_else(|| "data".to_string());
    let out_dir = Path::new(&out_dir);
    std::fs::create_dir_all(out_dir)?;

    let mut rng = SimpleRng::new(42);
    let offsets: Vec<f64> = SUBJECTS.iter().map(|_| rng.gauss(0.0, 0.15)).collect();

    // ---- Multi-day: per-sex distance from the all-subject mean ----
    let mut error_rows: Vec<(i64, f64, &str)> = Vec::new();
    let mut cum_rows: Vec<(i64, f64, &str)> = Vec::new();
    let (mut cum_male, mut cum_female) = (0.0, 0.0);

    for minute in (0..DAYS * MINUTES_PER_DAY).step_by(STEP as usize) {
        let temps: Vec<f64> = SUBJECTS
            .iter()
            .zip(&offsets)
            .map(|(s, &o)| body_temperature(s, minute, o, &mut rng))
            .collect();
        let mean = temps.iter().sum::<f64>() / temps.len() as f64;

        let (mut male, mut female) = (Vec::new(), Vec::new());
        for (s, t) in SUBJECTS.iter().zip(&temps) {
            if s.contains('m') {
                male.push((t - mean).abs());
            } else {
                female.push((t - mean).abs());
            }
        }
        let male_err = male.iter().sum::<f64>() / male.len() as f64;
        let female_err = female.iter().sum::<f64>() / female.len() as f64;
        cum_male += male_err * STEP as f64;
        cum_female += female_err * STEP as f64;

        error_rows.push((minute, male_err, "male"));
        error_rows.push((minute, female_err, "female"));
        cum_rows.push((minute, cum_male, "male"));
        cum_rows.push((minute, cum_female, "female"));
    }

    write_csv(&out_dir.join("export_error.csv"), ["time", "error", "gender"], &error_rows)?;
    write_csv(&out_dir.join("cum_err.csv"), ["time", "cum_err", "gender"], &cum_rows)?;
    write_parquet(&out_dir.join("export_error.parquet"), &error_rows)?;

    // ---- First day: raw per-subject traces ----
    let mut writer = csv::Writer::from_path(out_dir.join("allfirstday.csv"))?;
    writer.write_record(["mouse", "index", "temp"])?;
    let mut first_day_rows = 0usize;
    for (subject, &offset) in SUBJECTS.iter().zip(&offsets) {
        for minute in (0..MINUTES_PER_DAY).step_by(FIRST_DAY_STEP as usize) {
            let temp = body_temperature(subject, minute, offset, &mut rng);
            writer.write_record([subject.to_string(), minute.to_string(), format!("{temp:.3}")])?;
            first_day_rows += 1;
        }
    }
    writer.flush()?;

    println!(
        "Wrote {} error rows, {} cumulative rows and {first_day_rows} first-day rows to {}",
        error_rows.len(),
        cum_rows.len(),
        out_dir.display()
    );
    Ok(())
}

fn write_csv(path: &Path, header: [&str; 3], rows: &[(i64, f64, &str)]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header)?;
    for (time, value, group) in rows {
        writer.write_record([time.to_string(), format!("{value:.5}"), group.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Same rows as the error CSV, for trying the Parquet loader.
fn write_parquet(path: &Path, rows: &[(i64, f64, &str)]) -> anyhow::Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("time", DataType::Int64, false),
        Field::new("error", DataType::Float64, false),
        Field::new("gender", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(rows.iter().map(|r| r.0).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.1).collect::<Vec<_>>())),
            Arc::new(StringArray::from(rows.iter().map(|r| r.2).collect::<Vec<_>>())),
        ],
    )?;

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
