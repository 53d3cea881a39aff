//! Primer hipervínculo por programa del workbook, volcado a un CSV
//! `programa,plan_url`.

use std::collections::HashMap;
use std::error::Error;
use std::path::Path;

use calamine::Data;
use log::debug;

use crate::models::ProgramaPlanUrl;
use crate::texto::{clave_programa, titulo_programa};

use super::io::leer_grillas;
use super::links::extraer_links;

/// Recorre todas las hojas en orden y se queda con el primer link de cada
/// clave de programa. Sólo cuentan celdas de texto no vacías con
/// hipervínculo; las ocurrencias posteriores de una clave se descartan.
pub fn extraer_plan_urls<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<ProgramaPlanUrl>, Box<dyn Error>> {
    let links = extraer_links(&path)?;
    let hojas = leer_grillas(&path)?;

    let mut por_clave: HashMap<String, ProgramaPlanUrl> = HashMap::new();

    for (nombre, grilla) in &hojas {
        let links_hoja = match links.get(nombre) {
            Some(l) => l,
            None => continue,
        };
        let mut celdas: Vec<(&(usize, usize), &String)> = links_hoja.por_celda.iter().collect();
        celdas.sort_by_key(|(pos, _)| **pos);

        for (&(fila, col), url) in celdas {
            let valor = match grilla.get(fila).and_then(|f| f.get(col)) {
                Some(Data::String(s)) => s.trim().to_string(),
                _ => continue,
            };
            if valor.is_empty() {
                continue;
            }
            let clave = clave_programa(&valor);
            if clave.is_empty() || por_clave.contains_key(&clave) {
                continue;
            }
            debug!("programa '{}' -> {}", valor, url);
            por_clave.insert(
                clave,
                ProgramaPlanUrl {
                    programa: titulo_programa(&valor),
                    plan_url: url.clone(),
                },
            );
        }
    }

    let mut filas: Vec<ProgramaPlanUrl> = por_clave.into_values().collect();
    filas.sort_by(|a, b| {
        a.programa
            .to_lowercase()
            .cmp(&b.programa.to_lowercase())
            .then_with(|| a.plan_url.cmp(&b.plan_url))
    });
    Ok(filas)
}

/// Escribe el CSV con encabezado `programa,plan_url`.
pub fn escribir_csv<P: AsRef<Path>>(
    path: P,
    filas: &[ProgramaPlanUrl],
) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["programa", "plan_url"])?;
    for fila in filas {
        writer.write_record([fila.programa.as_str(), fila.plan_url.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
