//! Hipervínculos y filas ocultas leídos directamente del paquete XLSX.
//!
//! calamine entrega los valores de celda pero no expone hipervínculos ni la
//! visibilidad de filas, así que esos datos se leen de las partes XML del
//! paquete (workbook, hojas y relaciones) vía `zip` + `quick-xml`.

use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use super::io::letras_a_columna;

/// Hipervínculos y filas ocultas de una hoja, con índices 0-based.
#[derive(Debug, Default, Clone)]
pub struct LinksHoja {
    /// destino por celda exacta (fila, columna)
    pub por_celda: HashMap<(usize, usize), String>,
    /// primer destino de cada fila (la celda enlazada de menor columna)
    pub por_fila: HashMap<usize, String>,
    /// filas marcadas como ocultas en la hoja
    pub filas_ocultas: HashSet<usize>,
}

impl LinksHoja {
    /// Link de la celda exacta, si no el de la fila, si no cadena vacía.
    pub fn resolver(&self, fila: usize, col: usize) -> String {
        if let Some(url) = self.por_celda.get(&(fila, col)) {
            return url.clone();
        }
        self.por_fila.get(&fila).cloned().unwrap_or_default()
    }
}

/// Extrae links y filas ocultas de todas las hojas, indexado por nombre de
/// hoja. Sólo cuentan los hipervínculos externos (con URL destino); los
/// `location` internos del workbook se ignoran.
pub fn extraer_links<P: AsRef<Path>>(
    path: P,
) -> Result<HashMap<String, LinksHoja>, Box<dyn Error>> {
    let mut archive = ZipArchive::new(File::open(path)?)?;

    let workbook_xml = leer_entrada(&mut archive, "xl/workbook.xml")?
        .ok_or("xl/workbook.xml no encontrado en el paquete")?;
    let hojas = parsear_hojas(&workbook_xml)?;

    let rels_xml = leer_entrada(&mut archive, "xl/_rels/workbook.xml.rels")?.unwrap_or_default();
    let rels = parsear_relaciones(&rels_xml)?;

    let mut resultado = HashMap::new();
    for (nombre, rid) in hojas {
        let destino = match rels.get(&rid) {
            Some(d) => ruta_en_paquete(d),
            None => continue,
        };
        let hoja_xml = match leer_entrada(&mut archive, &destino)? {
            Some(xml) => xml,
            None => continue,
        };
        let hoja_rels_xml = leer_entrada(&mut archive, &ruta_rels(&destino))?.unwrap_or_default();
        let hoja_rels = parsear_relaciones(&hoja_rels_xml)?;
        resultado.insert(nombre, parsear_hoja(&hoja_xml, &hoja_rels)?);
    }

    Ok(resultado)
}

fn leer_entrada(
    archive: &mut ZipArchive<File>,
    nombre: &str,
) -> Result<Option<String>, Box<dyn Error>> {
    match archive.by_name(nombre) {
        Ok(mut entrada) => {
            let mut contenido = String::new();
            entrada.read_to_string(&mut contenido)?;
            Ok(Some(contenido))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// `xl/workbook.xml`: lista de hojas en orden, con su id de relación.
fn parsear_hojas(xml: &str) -> Result<Vec<(String, String)>, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut hojas = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => {
                if e.name().as_ref() == b"sheet" {
                    let mut nombre = String::new();
                    let mut rid = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => nombre = attr.unescape_value()?.into_owned(),
                            b"r:id" => rid = attr.unescape_value()?.into_owned(),
                            _ => {}
                        }
                    }
                    if !nombre.is_empty() && !rid.is_empty() {
                        hojas.push((nombre, rid));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(hojas)
}

/// Un archivo `.rels`: mapa Id -> Target.
fn parsear_relaciones(xml: &str) -> Result<HashMap<String, String>, Box<dyn Error>> {
    let mut rels = HashMap::new();
    if xml.is_empty() {
        return Ok(rels);
    }

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => {
                if e.name().as_ref() == b"Relationship" {
                    let mut id = String::new();
                    let mut destino = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = attr.unescape_value()?.into_owned(),
                            b"Target" => destino = attr.unescape_value()?.into_owned(),
                            _ => {}
                        }
                    }
                    if !id.is_empty() && !destino.is_empty() {
                        rels.insert(id, destino);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// XML de una hoja: filas ocultas e hipervínculos resueltos contra sus rels.
fn parsear_hoja(xml: &str, rels: &HashMap<String, String>) -> Result<LinksHoja, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut links = LinksHoja::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"row" => {
                    let mut fila: Option<usize> = None;
                    let mut oculta = false;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"r" => fila = attr.unescape_value()?.parse::<usize>().ok(),
                            b"hidden" => {
                                let valor = attr.unescape_value()?;
                                oculta = valor.as_ref() == "1" || valor.as_ref() == "true";
                            }
                            _ => {}
                        }
                    }
                    if oculta {
                        if let Some(f) = fila {
                            links.filas_ocultas.insert(f.saturating_sub(1));
                        }
                    }
                }
                b"hyperlink" => {
                    let mut referencia = String::new();
                    let mut rid = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"ref" => referencia = attr.unescape_value()?.into_owned(),
                            b"r:id" => rid = attr.unescape_value()?.into_owned(),
                            _ => {}
                        }
                    }
                    if let (Some((fila, col)), Some(url)) =
                        (parsear_ref(&referencia), rels.get(&rid))
                    {
                        links
                            .por_celda
                            .entry((fila, col))
                            .or_insert_with(|| url.clone());
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    // fallback por fila: gana la celda enlazada de menor columna
    let mut primera_por_fila: HashMap<usize, (usize, String)> = HashMap::new();
    for (&(fila, col), url) in &links.por_celda {
        let reemplazar = match primera_por_fila.get(&fila) {
            Some((col_actual, _)) => col < *col_actual,
            None => true,
        };
        if reemplazar {
            primera_por_fila.insert(fila, (col, url.clone()));
        }
    }
    links.por_fila = primera_por_fila
        .into_iter()
        .map(|(fila, (_, url))| (fila, url))
        .collect();

    Ok(links)
}

/// Referencia A1 (o rango "A1:B2", se toma la primera celda) a (fila, col)
/// 0-based.
fn parsear_ref(referencia: &str) -> Option<(usize, usize)> {
    let celda = referencia.split(':').next().unwrap_or(referencia);
    let letras: String = celda
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    let digitos: String = celda
        .chars()
        .skip_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letras.is_empty() || digitos.is_empty() {
        return None;
    }
    let fila = digitos.parse::<usize>().ok()?;
    Some((fila.saturating_sub(1), letras_a_columna(&letras)))
}

/// Target de una relación a ruta dentro del paquete.
fn ruta_en_paquete(destino: &str) -> String {
    match destino.strip_prefix('/') {
        Some(resto) => resto.to_string(),
        None => format!("xl/{}", destino),
    }
}

/// Ruta del `.rels` que acompaña a una parte del paquete.
fn ruta_rels(ruta_parte: &str) -> String {
    match ruta_parte.rfind('/') {
        Some(pos) => format!("{}/_rels/{}.rels", &ruta_parte[..pos], &ruta_parte[pos + 1..]),
        None => format!("_rels/{}.rels", ruta_parte),
    }
}
