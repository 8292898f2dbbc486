use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use parquet::arrow::ArrowWriter;

const DAYS: i64 = 3;
const STEP_MINUTES: i64 = 5;

/// Seeded noise source (splitmix64), so every run writes the same files.
struct Noise {
    counter: u64,
}

impl Noise {
    fn seeded(seed: u64) -> Self {
        Noise { counter: seed }
    }

    /// Uniform noise in `[-amplitude, amplitude)`.
    fn jitter(&mut self, amplitude: f64) -> f64 {
        self.counter = self.counter.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.counter;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        let unit = (z >> 11) as f64 / (1u64 << 53) as f64;
        (unit * 2.0 - 1.0) * amplitude
    }
}

/// One simulated reading.
struct Reading {
    at: NaiveDateTime,
    air_flow: f64,
    stack_temp: f64,
    steam_temp: f64,
    steam_pressure: f64,
    stack_o2: f64,
}

fn simulate(start: NaiveDateTime, rng: &mut Noise) -> Vec<Reading> {
    let steps = DAYS * 24 * 60 / STEP_MINUTES;
    (0..steps)
        .map(|i| {
            let at = start + Duration::minutes(i * STEP_MINUTES);
            let hours = (i * STEP_MINUTES) as f64 / 60.0;
            // load follows the working day; fouling creeps up over the run
            let load = 0.5 + 0.3 * ((hours - 6.0) / 24.0 * std::f64::consts::TAU).sin();
            let fouling = hours / 24.0 * 4.0;

            let air_flow = (30.0 + 40.0 * load + rng.jitter(2.0)).clamp(0.0, 100.0);
            let steam_temp = 180.0 + 5.0 * load + rng.jitter(0.5);
            let stack_temp = steam_temp + 95.0 + fouling + 10.0 * load + rng.jitter(1.5);
            let steam_pressure = 9.5 + 1.0 * load + rng.jitter(0.1);
            let stack_o2 = (6.0 - 3.0 * load + rng.jitter(0.3)).max(0.5);

            Reading {
                at,
                air_flow,
                stack_temp,
                steam_temp,
                steam_pressure,
                stack_o2,
            }
        })
        .collect()
}

fn write_csv(path: &Path, readings: &[Reading]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record([
        "Timestamp",
        "Air flow %",
        "StackTempMbus",
        "SteamTempMbus",
        "SteamPrMbus",
        "StackO2Mbus",
    ])?;
    for r in readings {
        writer.write_record([
            r.at.format("%Y-%m-%d %H:%M:%S").to_string(),
            format!("{:.2}", r.air_flow),
            format!("{:.2}", r.stack_temp),
            format!("{:.2}", r.steam_temp),
            format!("{:.3}", r.steam_pressure),
            format!("{:.2}", r.stack_o2),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, readings: &[Reading]) -> Result<()> {
    let column = |f: fn(&Reading) -> f64| {
        Float64Array::from(readings.iter().map(f).collect::<Vec<_>>())
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("Timestamp", DataType::Timestamp(TimeUnit::Millisecond, None), false),
        Field::new("Air flow %", DataType::Float64, false),
        Field::new("StackTempMbus", DataType::Float64, false),
        Field::new("SteamTempMbus", DataType::Float64, false),
        Field::new("SteamPrMbus", DataType::Float64, false),
        Field::new("StackO2Mbus", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(TimestampMillisecondArray::from(
                readings
                    .iter()
                    .map(|r| r.at.and_utc().timestamp_millis())
                    .collect::<Vec<_>>(),
            )),
            Arc::new(column(|r| r.air_flow)),
            Arc::new(column(|r| r.stack_temp)),
            Arc::new(column(|r| r.steam_temp)),
            Arc::new(column(|r| r.steam_pressure)),
            Arc::new(column(|r| r.stack_o2)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "data".into()));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;
    let mut rng = Noise::seeded(42);
    let readings = simulate(start, &mut rng);

    let csv_path = out_dir.join("df_clean.csv");
    write_csv(&csv_path, &readings)?;
    let parquet_path = out_dir.join("df_clean.parquet");
    write_parquet(&parquet_path, &readings)?;

    println!(
        "Wrote {} readings ({DAYS} days, every {STEP_MINUTES} min) to {} and {}",
        readings.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
