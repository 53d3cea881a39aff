// --- Conversor de disponibilidad: portafolio XLSX -> availability_payload.json ---

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use recalc_etl::excel::{construir_disponibilidad, escribir_payload};

/// Convierte el workbook de portafolio en el payload de disponibilidad.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Workbook de portafolio (XLSX)
    #[arg(long, env = "RECALC_PORTAFOLIO_XLSX")]
    input: PathBuf,

    /// Archivo JSON de salida
    #[arg(long, default_value = "availability_payload.json")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let (payload, total) = construir_disponibilidad(&args.input)?;
    escribir_payload(&args.output, &payload)?;

    println!("Wrote {} entries to {}", total, args.output.display());
    Ok(())
}
