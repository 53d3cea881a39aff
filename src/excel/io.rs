use calamine::{open_workbook_auto, Data, Reader};
use std::error::Error;
use std::path::Path;

/// Grilla densa de una hoja, indexada desde A1 (coordenadas absolutas 0-based).
pub type Grilla = Vec<Vec<Data>>;

/// Convierte un `Data` de calamine a String (versión genérica para celdas).
/// Los flotantes enteros se colapsan ("1.0" -> "1") para que los números
/// escritos a mano en el workbook comparen como texto.
pub fn celda_a_texto(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => {
            if *b {
                "1".to_string()
            } else {
                "0".to_string()
            }
        }
        Data::Empty => String::new(),
        Data::Error(_) => String::new(),
        Data::DateTime(s) => s.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Lee todas las hojas del workbook, en orden, como (nombre, grilla).
///
/// La grilla se rellena desde el origen de la hoja hasta la última celda
/// usada, con `Data::Empty` en los huecos, para que los índices de las
/// heurísticas coincidan con las coordenadas reales de la hoja y no con el
/// rango usado que reporta calamine.
pub fn leer_grillas<P: AsRef<Path>>(path: P) -> Result<Vec<(String, Grilla)>, Box<dyn Error>> {
    let mut workbook = open_workbook_auto(path)?;
    let nombres = workbook.sheet_names().to_owned();
    let mut hojas = Vec::with_capacity(nombres.len());

    for nombre in nombres {
        let range = workbook.worksheet_range(&nombre)?;
        let grilla = match range.end() {
            Some((fila_max, col_max)) => {
                let mut filas = Vec::with_capacity(fila_max as usize + 1);
                for fila in 0..=fila_max {
                    let mut celdas = Vec::with_capacity(col_max as usize + 1);
                    for col in 0..=col_max {
                        celdas.push(range.get_value((fila, col)).cloned().unwrap_or(Data::Empty));
                    }
                    filas.push(celdas);
                }
                filas
            }
            None => Vec::new(),
        };
        hojas.push((nombre, grilla));
    }

    Ok(hojas)
}

/// Convierte letras de columna (ej: "AB") a índice 0-based (A=0).
pub fn letras_a_columna(s: &str) -> usize {
    let mut acc = 0usize;
    for ch in s.chars() {
        if ch.is_ascii_alphabetic() {
            acc = acc * 26 + ((ch.to_ascii_uppercase() as u8 - b'A') as usize + 1);
        }
    }
    acc.saturating_sub(1)
}
