// --- Conversor de reglas de beneficio: tres CSV de precios -> benefit_rules.json ---

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use recalc_etl::beneficios::{construir_reglas, escribir_reglas};

/// Convierte los CSV de precios en reglas de porcentaje de beneficio.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// CSV de precios de licenciatura
    #[arg(long, env = "RECALC_PRECIOS_LIC_CSV")]
    licenciatura: PathBuf,

    /// CSV de precios de licenciatura online
    #[arg(long, env = "RECALC_PRECIOS_ONLINE_CSV")]
    online: PathBuf,

    /// CSV de precios de bachillerato
    #[arg(long, env = "RECALC_PRECIOS_BACH_CSV")]
    bachillerato: PathBuf,

    /// Archivo JSON de salida
    #[arg(long, default_value = "benefit_rules.json")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let reglas = construir_reglas(&args.licenciatura, &args.online, &args.bachillerato)?;
    escribir_reglas(&args.output, &reglas)?;

    println!("Wrote {} benefit rules to {}", reglas.len(), args.output.display());
    Ok(())
}
