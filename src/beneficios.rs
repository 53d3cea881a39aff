//! Construcción de reglas de beneficio a partir de los tres CSV de precios
//! (licenciatura, licenciatura online y bachillerato).
//!
//! Los CSV no traen encabezados aprovechables: cada fuente usa índices de
//! columna fijos y todo acceso es acotado con cadena vacía por defecto, así
//! una fila corta produce cero reglas en vez de un error.

use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

use csv::{ReaderBuilder, StringRecord};
use log::debug;
use regex::Regex;

use crate::models::{LineaNegocio, ModalidadRegla, PayloadReglas, ReglaBeneficio};
use crate::texto::normalizar_texto;

fn regex_numero() -> &'static Regex {
    static NUMERO: OnceLock<Regex> = OnceLock::new();
    NUMERO.get_or_init(|| Regex::new(r"\d+(\.\d+)?").expect("patrón de número inválido"))
}

/// Primer número entero o decimal del texto, truncado a entero. Sin número
/// no hay regla.
pub fn parsear_porcentaje(valor: &str) -> Option<u32> {
    let coincidencia = regex_numero().find(valor)?;
    let numero: f64 = coincidencia.as_str().parse().ok()?;
    Some(numero as u32)
}

/// Modalidad de la regla por coincidencia de subcadenas; sin dato o dato
/// desconocido es comodín.
pub fn normalizar_modalidad(valor: &str) -> ModalidadRegla {
    let n = normalizar_texto(valor);
    if n.is_empty() {
        return ModalidadRegla::Cualquiera;
    }
    if n.contains("online") {
        ModalidadRegla::Online
    } else if n.contains("mixt") || n.contains("ejecutiv") {
        ModalidadRegla::Mixta
    } else if n.contains("presencial") || n.contains("escolar") {
        ModalidadRegla::Presencial
    } else {
        ModalidadRegla::Cualquiera
    }
}

/// El comentario se vacía cuando la celda era sólo una bandera booleana;
/// cualquier otro texto se conserva recortado.
pub fn normalizar_comentario(valor: &str) -> String {
    let n = normalizar_texto(valor);
    if matches!(n.as_str(), "true" | "false" | "si" | "no" | "1" | "0") {
        return String::new();
    }
    valor.trim().to_string()
}

/// Una celda "aplica" es afirmativa salvo que venga vacía o con una
/// negación explícita.
pub fn aplica(valor: &str) -> bool {
    let n = normalizar_texto(valor);
    if n.is_empty() {
        return false;
    }
    !matches!(n.as_str(), "false" | "no" | "0")
}

/// Plantel de una fila: columna 2 con respaldo en la 8, ignorando celdas
/// vacías y el rótulo "plantel" de las filas de encabezado.
pub fn plantel_de_fila(fila: &StringRecord) -> String {
    for idx in [2usize, 8] {
        if let Some(candidato) = fila.get(idx) {
            let n = normalizar_texto(candidato);
            if !candidato.is_empty() && !n.is_empty() && n != "plantel" {
                return candidato.trim().to_string();
            }
        }
    }
    String::new()
}

fn celda<'a>(fila: &'a StringRecord, idx: usize) -> &'a str {
    fila.get(idx).unwrap_or("")
}

fn leer_csv<P: AsRef<Path>>(path: P) -> Result<Vec<StringRecord>, Box<dyn Error>> {
    let mut lector = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut filas = Vec::new();
    for registro in lector.records() {
        filas.push(registro?);
    }
    Ok(filas)
}

fn agregar_regla(
    reglas: &mut Vec<ReglaBeneficio>,
    linea: LineaNegocio,
    plantel: &str,
    modalidad: ModalidadRegla,
    porcentaje: Option<u32>,
    comentario: String,
    plan: &str,
) {
    let porcentaje = match porcentaje {
        Some(p) => p,
        None => return,
    };
    if plantel.is_empty() {
        return;
    }
    reglas.push(ReglaBeneficio {
        linea_negocio: linea,
        plantel: vec![plantel.to_string()],
        modalidad,
        plan: plan.to_string(),
        activo: true,
        porcentaje,
        comentario,
    });
}

/// Construye las reglas de las tres fuentes, en el orden licenciatura,
/// online, bachillerato. El orden de emisión es parte del contrato: el
/// consumidor aplica la primera regla que coincida.
pub fn construir_reglas<P: AsRef<Path>>(
    licenciatura: P,
    online: P,
    bachillerato: P,
) -> Result<Vec<ReglaBeneficio>, Box<dyn Error>> {
    let mut reglas = Vec::new();

    for fila in leer_csv(licenciatura)? {
        let plantel = plantel_de_fila(&fila);
        if plantel.is_empty() {
            continue;
        }

        // candidata licenciatura: columnas 12-14
        let lic_aplica = celda(&fila, 12);
        if aplica(lic_aplica) {
            agregar_regla(
                &mut reglas,
                LineaNegocio::Licenciatura,
                &plantel,
                normalizar_modalidad(celda(&fila, 13)),
                parsear_porcentaje(celda(&fila, 14)),
                normalizar_comentario(lic_aplica),
                "*",
            );
        }

        // candidata salud: columnas 8-10, independiente de la anterior
        let salud_aplica = celda(&fila, 8);
        if aplica(salud_aplica) {
            agregar_regla(
                &mut reglas,
                LineaNegocio::Salud,
                &plantel,
                normalizar_modalidad(celda(&fila, 9)),
                parsear_porcentaje(celda(&fila, 10)),
                normalizar_comentario(salud_aplica),
                "*",
            );
        }
    }

    for fila in leer_csv(online)? {
        let plantel = plantel_de_fila(&fila);
        if plantel.is_empty() {
            continue;
        }

        let online_aplica = celda(&fila, 12);
        if aplica(online_aplica) {
            agregar_regla(
                &mut reglas,
                LineaNegocio::Licenciatura,
                &plantel,
                normalizar_modalidad(celda(&fila, 13)),
                parsear_porcentaje(celda(&fila, 14)),
                normalizar_comentario(online_aplica),
                "*",
            );
        }
    }

    for fila in leer_csv(bachillerato)? {
        let plantel = plantel_de_fila(&fila);
        if plantel.is_empty() {
            continue;
        }

        // plan: "6" si la columna 4 trae dato, "9" si la 10; la 10 se
        // evalúa después, así que gana cuando vienen las dos
        let mut plan = "*";
        if !celda(&fila, 4).trim().is_empty() {
            plan = "6";
        }
        if !celda(&fila, 10).trim().is_empty() {
            plan = "9";
        }

        let bach_aplica = celda(&fila, 14);
        if aplica(bach_aplica) {
            let comentario = {
                let dedicado = normalizar_comentario(celda(&fila, 15));
                if dedicado.is_empty() {
                    normalizar_comentario(bach_aplica)
                } else {
                    dedicado
                }
            };
            agregar_regla(
                &mut reglas,
                LineaNegocio::Preparatoria,
                &plantel,
                normalizar_modalidad(celda(&fila, 16)),
                parsear_porcentaje(celda(&fila, 17)),
                comentario,
                plan,
            );
        }
    }

    debug!("{} reglas construidas", reglas.len());
    Ok(reglas)
}

/// Escribe `{"rules": [...]}` con sangría de dos espacios, UTF-8 sin
/// escapar no-ASCII.
pub fn escribir_reglas<P: AsRef<Path>>(
    path: P,
    reglas: &[ReglaBeneficio],
) -> Result<(), Box<dyn Error>> {
    let payload = PayloadReglas {
        rules: reglas.to_vec(),
    };
    let mut archivo = File::create(path)?;
    archivo.write_all(serde_json::to_string_pretty(&payload)?.as_bytes())?;
    archivo.sync_all()?;
    Ok(())
}
