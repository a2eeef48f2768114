use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::{Format, Workbook};

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

struct Row {
    client: String,
    account: String,
    deposit_type: String,
    year: i64,
    month: i64,
    amount: f64,
    agency: String,
}

const HEADERS: [&str; 7] = [
    "Client",
    "Compte",
    "Types de Dépôts",
    "Année",
    "Mois",
    "Dépôts",
    "Désignation ",
];

fn generate_rows(rng: &mut SimpleRng) -> Vec<Row> {
    let agencies = ["Nouakchott Centre", "Nouadhibou", "Atar", "Kiffa", "Rosso"];
    let types = ["Dépôts à vue", "Dépôts à terme", "Épargne"];

    let mut rows = Vec::new();
    for client_no in 0..120u32 {
        let client = format!("CL{:05}", 10_000 + client_no);
        let agency = rng.pick(&agencies).to_string();
        // Log-normal scale: a few large depositors, many small ones.
        let scale = rng.gauss(13.0, 1.2).exp();

        let (mut year, mut month) = (2023i64, 10i64);
        while (year, month) <= (2025, 6) {
            if rng.next_f64() < 0.7 {
                let deposit_type = rng.pick(&types).to_string();
                let amount = (scale * (0.5 + rng.next_f64())).round();
                // A handful of reversed / empty entries exercise the cleaning pass.
                let amount = if rng.next_f64() < 0.01 { -amount } else { amount };
                rows.push(Row {
                    client: client.clone(),
                    account: format!("{client}-{}", 1 + rng.next_u64() % 2),
                    deposit_type,
                    year,
                    month,
                    amount,
                    agency: agency.clone(),
                });
            }
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
    }
    rows
}

fn write_xlsx(rows: &[Row], path: &str) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Feuil2")?;

    let bold = Format::new().set_bold();
    for (col, name) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &bold)?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, &row.client)?;
        sheet.write_string(r, 1, &row.account)?;
        sheet.write_string(r, 2, &row.deposit_type)?;
        sheet.write_number(r, 3, row.year as f64)?;
        sheet.write_number(r, 4, row.month as f64)?;
        sheet.write_number(r, 5, row.amount)?;
        sheet.write_string(r, 6, &row.agency)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("writing {path}"))?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let text = |f: fn(&Row) -> &str| StringArray::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new(HEADERS[0], DataType::Utf8, false),
        Field::new(HEADERS[1], DataType::Utf8, false),
        Field::new(HEADERS[2], DataType::Utf8, false),
        Field::new(HEADERS[3], DataType::Int64, false),
        Field::new(HEADERS[4], DataType::Int64, false),
        Field::new(HEADERS[5], DataType::Float64, false),
        Field::new(HEADERS[6], DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text(|r| r.client.as_str())),
            Arc::new(text(|r| r.account.as_str())),
            Arc::new(text(|r| r.deposit_type.as_str())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.year).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.month).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.amount).collect::<Vec<_>>())),
            Arc::new(text(|r| r.agency.as_str())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);

    write_xlsx(&rows, "sample_deposits.xlsx")?;
    write_parquet(&rows, "sample_deposits.parquet")?;

    println!(
        "Wrote {} deposit rows to sample_deposits.xlsx and sample_deposits.parquet",
        rows.len()
    );
    Ok(())
}
