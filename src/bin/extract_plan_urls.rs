// --- Extractor de plan URLs: portafolio XLSX -> programs_plan_urls.csv ---

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use recalc_etl::excel::{escribir_csv, extraer_plan_urls};

/// Extrae el primer hipervínculo de cada programa del workbook.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Workbook de portafolio (XLSX)
    #[arg(long, env = "RECALC_PORTAFOLIO_XLSX")]
    input: PathBuf,

    /// Archivo CSV de salida
    #[arg(long, default_value = "programs_plan_urls.csv")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let filas = extraer_plan_urls(&args.input)?;
    escribir_csv(&args.output, &filas)?;

    println!("wrote {} rows to {}", filas.len(), args.output.display());
    Ok(())
}
