//! Extracción de disponibilidad de programas a partir del workbook de
//! portafolio.
//!
//! El workbook trae una hoja por plantel más hojas "online". Ninguna hoja
//! tiene esquema fijo: los encabezados se buscan por palabras clave y las
//! regiones de datos se delimitan respecto de esos hallazgos. Las búsquedas
//! son funciones puras sobre la grilla y devuelven índices explícitos.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use calamine::Data;
use log::debug;

use crate::models::{DebugHoja, Disponibilidad, Modalidad, PayloadDisponibilidad};
use crate::texto::{clave_programa, normalizar_texto, titulo_programa};

use super::io::{celda_a_texto, leer_grillas, Grilla};
use super::links::{extraer_links, LinksHoja};

/// Programas que siempre deben tener una entrada online. Si el workbook no
/// trae una, se sintetiza con plantel "Online". La lista viene del negocio
/// tal cual; no se deduce nada de ella.
const PROGRAMAS_ONLINE: [&str; 49] = [
    "Licenciatura en Administración de Empresas",
    "Licenciatura en Administración de Empresas Turísticas",
    "Licenciatura en Administración de Tecnologías de la Información",
    "Licenciatura en Contaduría Pública",
    "Licenciatura en Ciencias de la Comunicación",
    "Licenciatura en Comercio Internacional",
    "Licenciatura en Mercadotecnia",
    "Licenciatura en Derecho",
    "Licenciatura en Diseño Gráfico",
    "Licenciatura en Arquitectura",
    "Licenciatura en Pedagogía",
    "Ingeniería Industrial y de Sistemas",
    "Ingeniería en Manufactura y Robótica",
    "Ingeniería en Sistemas Computacionales",
    "Licenciatura en Relaciones Internacionales",
    "Licenciatura en Negocios Internacionales",
    "Licenciatura en Economía y Finanzas",
    "Licenciatura en Administración Financiera",
    "Licenciatura en Administración de Recursos Humanos",
    "Ingeniería Industrial y Administración",
    "Ingeniería en Software y Redes",
    "Ingeniería en Logística",
    "Licenciatura en Seguridad Pública",
    "Licenciatura en Criminología",
    "Maestría en Administración de Negocios",
    "Maestría en Administración Financiera",
    "Maestría en Mercadotecnia",
    "Maestría en Gestión de Talento Humano",
    "Maestría en Gestión de Proyectos",
    "Maestría en Derecho Constitucional y Amparo",
    "Maestría en Derecho Corporativo",
    "Maestría en Derecho Fiscal y Administrativo",
    "Maestría en Derecho Laboral",
    "Maestría en Derecho Procesal",
    "Maestría en Derecho y Juicios Orales",
    "Maestría en Educación y Docencia",
    "Maestría en Gestión Educativa",
    "Maestría en Administración de Servicios de Salud",
    "Maestría en Administración de Negocios y Mercadotecnia",
    "Maestría en Finanzas",
    "Maestría en Administración Pública",
    "Maestría en Diseño Digital",
    "Maestría en Diseño Sostenible y Arquitectura Verde",
    "Maestría en Diseño Estratégico e Innovación",
    "Maestría en Robótica y Automatización",
    "Maestría en Inteligencia Artificial",
    "Maestría en Energías Renovables",
    "Maestría en Interacción y Experiencia del Usuario",
    "Maestría en Logística y Cadena de Suministro",
];

/// Texto de una celda con acceso acotado (fuera de rango es cadena vacía).
fn texto(grilla: &Grilla, fila: usize, col: usize) -> String {
    grilla
        .get(fila)
        .and_then(|f| f.get(col))
        .map(celda_a_texto)
        .unwrap_or_default()
}

fn norma(celda: &Data) -> String {
    normalizar_texto(&celda_a_texto(celda))
}

/// Interpreta una celda de disponibilidad. Los booleanos pasan directo; el
/// texto con palomita (✓ ✔ ✅) es verdadero sin importar el resto; si no,
/// se compara el texto normalizado contra los tokens afirmativos.
pub fn parsear_disponible(celda: &Data) -> bool {
    if let Data::Bool(b) = celda {
        return *b;
    }
    let crudo = celda_a_texto(celda);
    if crudo
        .chars()
        .any(|c| matches!(c, '\u{2713}' | '\u{2714}' | '\u{2705}'))
    {
        return true;
    }
    matches!(
        normalizar_texto(&crudo).as_str(),
        "si" | "true" | "1" | "disponible" | "activo" | "verdadero"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TipoHeaderOnline {
    Licenciatura,
    Posgrados,
}

impl TipoHeaderOnline {
    fn etiqueta(self) -> &'static str {
        match self {
            TipoHeaderOnline::Licenciatura => "licenciatura online",
            TipoHeaderOnline::Posgrados => "posgrados online",
        }
    }
}

/// Celdas de encabezado de una hoja online ("... online" combinado con
/// licenciatura o posgrados/maestría), ordenadas por (fila, columna).
fn encontrar_headers_online(grilla: &Grilla) -> Vec<(usize, usize, TipoHeaderOnline)> {
    let mut headers = Vec::new();
    for (f, fila) in grilla.iter().enumerate() {
        for (c, celda) in fila.iter().enumerate() {
            let n = norma(celda);
            if n.is_empty() || !n.contains("online") {
                continue;
            }
            if n.contains("licenciatura") {
                headers.push((f, c, TipoHeaderOnline::Licenciatura));
            } else if n.contains("posgrados") || n.contains("maestria") {
                headers.push((f, c, TipoHeaderOnline::Posgrados));
            }
        }
    }
    headers.sort_by_key(|&(f, c, _)| (f, c));
    headers
}

/// Extrae las entradas de una hoja "online". Cada encabezado define una
/// columna de programas cuya región corre desde la fila siguiente hasta el
/// próximo encabezado (del tipo que sea); las regiones de licenciatura se
/// cortan además en el primer encabezado de posgrados.
pub fn extraer_hoja_online(
    grilla: &Grilla,
    nombre_hoja: &str,
    links: &LinksHoja,
) -> Vec<Disponibilidad> {
    let headers = encontrar_headers_online(grilla);
    let inicio_posgrados = headers
        .iter()
        .filter(|h| h.2 == TipoHeaderOnline::Posgrados)
        .map(|h| h.0)
        .min();

    let mut entradas = Vec::new();

    let emitir_region = |fila_h: usize, col_h: usize, tipo: TipoHeaderOnline, tope: Option<usize>, entradas: &mut Vec<Disponibilidad>| {
        let siguiente = headers.iter().find(|h| h.0 > fila_h).map(|h| h.0);
        let mut fin = siguiente.unwrap_or(grilla.len());
        if let Some(t) = tope {
            fin = fin.min(t);
        }

        for f in fila_h + 1..fin {
            if links.filas_ocultas.contains(&f) {
                continue;
            }
            let programa = titulo_programa(&texto(grilla, f, col_h));
            if programa.is_empty() {
                continue;
            }
            let n = normalizar_texto(&programa);
            // duplicados del encabezado dentro de la región
            if n.contains("online") && (n.contains("licenciatura") || n.contains("posgrados")) {
                continue;
            }
            if n == "programa" || n == "programas" {
                continue;
            }
            entradas.push(Disponibilidad {
                id: format!(
                    "sheet-{}-{}-{}-{}-online",
                    nombre_hoja,
                    tipo.etiqueta(),
                    f,
                    col_h
                ),
                plantel: nombre_hoja.to_string(),
                programa,
                modalidad: Modalidad::Online,
                horario: String::new(),
                plan_url: links.resolver(f, col_h),
                activo: true,
            });
        }
    };

    for &(fila_h, col_h, tipo) in headers
        .iter()
        .filter(|h| h.2 == TipoHeaderOnline::Licenciatura)
    {
        emitir_region(fila_h, col_h, tipo, inicio_posgrados, &mut entradas);
    }
    for &(fila_h, col_h, tipo) in headers
        .iter()
        .filter(|h| h.2 == TipoHeaderOnline::Posgrados)
    {
        emitir_region(fila_h, col_h, tipo, None, &mut entradas);
    }

    entradas
}

/// Primera fila que combina una celda con "c1" y otra con "2026".
fn fila_encabezado(grilla: &Grilla) -> Option<usize> {
    grilla.iter().position(|fila| {
        let tiene_c1 = fila.iter().any(|c| norma(c).contains("c1"));
        let tiene_anio = fila.iter().any(|c| norma(c).contains("2026"));
        tiene_c1 && tiene_anio
    })
}

/// Afina la fila de año: celda exactamente "2026" en una ventana de 6 filas
/// desde el encabezado; si no aparece, queda el encabezado mismo.
fn fila_anio(grilla: &Grilla, encabezado: usize) -> usize {
    let limite = (encabezado + 6).min(grilla.len());
    (encabezado..limite)
        .find(|&f| grilla[f].iter().any(|c| norma(c) == "2026"))
        .unwrap_or(encabezado)
}

/// Fila de modalidades: "escolarizado" o "ejecutivo" en una ventana de 4
/// filas desde la fila de año; por defecto, la fila siguiente al año.
fn fila_modalidad(grilla: &Grilla, anio: usize) -> usize {
    let limite = (anio + 4).min(grilla.len());
    (anio..limite)
        .find(|&f| {
            grilla[f].iter().any(|c| {
                let n = norma(c);
                n.contains("escolarizado") || n.contains("ejecutivo")
            })
        })
        .unwrap_or_else(|| (anio + 1).min(grilla.len().saturating_sub(1)))
}

/// Columnas de la fila de modalidades cuyo texto contiene la palabra dada.
fn columnas_con(fila: &[Data], palabra: &str) -> Vec<usize> {
    fila.iter()
        .enumerate()
        .filter(|(_, c)| norma(c).contains(palabra))
        .map(|(i, _)| i)
        .collect()
}

/// Columna de disponibilidad de una modalidad: la primera a la izquierda de
/// "horarios" si ese encabezado existe, si no la primera que haya, si no el
/// índice fijo heredado del layout.
fn columna_disponibilidad(cols: &[usize], col_horarios: Option<usize>, por_defecto: usize) -> usize {
    if let Some(h) = col_horarios {
        if let Some(&c) = cols.iter().find(|&&c| c < h) {
            return c;
        }
    }
    cols.first().copied().unwrap_or(por_defecto)
}

/// Columna de horario de una modalidad: la primera a la derecha de
/// "horarios", si no el índice fijo heredado del layout.
fn columna_horario(cols: &[usize], col_horarios: Option<usize>, por_defecto: usize) -> usize {
    col_horarios
        .and_then(|h| cols.iter().find(|&&c| c > h).copied())
        .unwrap_or(por_defecto)
}

/// Primera fila de la hoja con una celda exactamente "horarios".
fn fila_horarios(grilla: &Grilla) -> Option<usize> {
    grilla
        .iter()
        .position(|fila| fila.iter().any(|c| norma(c) == "horarios"))
}

/// Extrae las entradas presencial/mixta de una hoja de plantel.
pub fn extraer_hoja_general(
    grilla: &Grilla,
    nombre_hoja: &str,
    links: &LinksHoja,
) -> Vec<Disponibilidad> {
    let encabezado = match fila_encabezado(grilla) {
        Some(f) => f,
        None => return Vec::new(),
    };
    let anio = fila_anio(grilla, encabezado);
    let modalidad = fila_modalidad(grilla, anio);

    let fila_mod = &grilla[modalidad];
    let cols_escolarizado = columnas_con(fila_mod, "escolarizado");
    let cols_ejecutivo = columnas_con(fila_mod, "ejecutivo");
    let col_horarios = grilla[encabezado].iter().position(|c| norma(c) == "horarios");

    let col_escolarizado = columna_disponibilidad(&cols_escolarizado, col_horarios, 2);
    let col_ejecutivo = columna_disponibilidad(&cols_ejecutivo, col_horarios, 3);
    let col_horario_escolarizado = columna_horario(&cols_escolarizado, col_horarios, 7);
    let col_horario_ejecutivo = columna_horario(&cols_ejecutivo, col_horarios, 8);

    let fin = match fila_horarios(grilla) {
        Some(f) if f > modalidad => f,
        _ => grilla.len(),
    };

    debug!(
        "hoja {}: encabezado={} anio={} modalidad={} escolarizado={} ejecutivo={} fin={}",
        nombre_hoja, encabezado, anio, modalidad, col_escolarizado, col_ejecutivo, fin
    );

    let vacia = Data::Empty;
    let mut entradas = Vec::new();

    for (offset, f) in (modalidad + 1..fin).enumerate() {
        if links.filas_ocultas.contains(&f) {
            continue;
        }
        let col1 = texto(grilla, f, 1);
        let (programa, col_programa) = if !col1.is_empty() {
            (col1, 1)
        } else {
            (texto(grilla, f, 0), 0)
        };
        if programa.is_empty() {
            continue;
        }
        let n = normalizar_texto(&programa);
        if matches!(n.as_str(), "modular" | "longitudinal" | "programa" | "programas") {
            continue;
        }

        let escolarizado_activo = parsear_disponible(
            grilla
                .get(f)
                .and_then(|fila| fila.get(col_escolarizado))
                .unwrap_or(&vacia),
        );
        let ejecutivo_activo = parsear_disponible(
            grilla
                .get(f)
                .and_then(|fila| fila.get(col_ejecutivo))
                .unwrap_or(&vacia),
        );
        if !escolarizado_activo && !ejecutivo_activo {
            continue;
        }

        let plan_url = links.resolver(f, col_programa);

        if escolarizado_activo {
            entradas.push(Disponibilidad {
                id: format!("sheet-{}-{}-presencial", nombre_hoja, offset),
                plantel: nombre_hoja.to_string(),
                programa: titulo_programa(&programa),
                modalidad: Modalidad::Presencial,
                horario: texto(grilla, f, col_horario_escolarizado),
                plan_url: plan_url.clone(),
                activo: true,
            });
        }
        if ejecutivo_activo {
            entradas.push(Disponibilidad {
                id: format!("sheet-{}-{}-mixta", nombre_hoja, offset),
                plantel: nombre_hoja.to_string(),
                programa: titulo_programa(&programa),
                modalidad: Modalidad::Mixta,
                horario: texto(grilla, f, col_horario_ejecutivo),
                plan_url,
                activo: true,
            });
        }
    }

    entradas
}

/// Clave de programa -> primer planUrl no vacío entre las entradas no
/// online. Es la fuente para rellenar los links de las entradas online.
fn plan_urls_por_programa(entradas: &[Disponibilidad]) -> HashMap<String, String> {
    let mut urls = HashMap::new();
    for entrada in entradas {
        if entrada.modalidad == Modalidad::Online {
            continue;
        }
        let clave = clave_programa(&entrada.programa);
        if !entrada.plan_url.is_empty() && !clave.is_empty() && !urls.contains_key(&clave) {
            urls.insert(clave, entrada.plan_url.clone());
        }
    }
    urls
}

/// Pasada final sobre todas las hojas: rellena planUrl de entradas online,
/// sintetiza las entradas de `PROGRAMAS_ONLINE` que falten y deduplica las
/// online por (clave de programa, plantel). Las no online pasan tal cual.
/// Devuelve el payload y el total de entradas previo al dedupe, que es lo
/// que reporta el resumen del conversor.
pub fn armar_payload(
    mut disponibilidad: Vec<Disponibilidad>,
    debug_hojas: Vec<DebugHoja>,
) -> (PayloadDisponibilidad, usize) {
    let urls = plan_urls_por_programa(&disponibilidad);

    for entrada in disponibilidad.iter_mut() {
        if entrada.modalidad != Modalidad::Online || !entrada.plan_url.is_empty() {
            continue;
        }
        if let Some(url) = urls.get(&clave_programa(&entrada.programa)) {
            entrada.plan_url = url.clone();
        }
    }

    let claves_online: HashSet<String> = disponibilidad
        .iter()
        .filter(|e| e.modalidad == Modalidad::Online)
        .map(|e| clave_programa(&e.programa))
        .collect();

    for programa in PROGRAMAS_ONLINE {
        let clave = clave_programa(programa);
        if claves_online.contains(&clave) {
            continue;
        }
        disponibilidad.push(Disponibilidad {
            id: format!("online-allowlist-{}", clave),
            plantel: "Online".to_string(),
            programa: titulo_programa(programa),
            modalidad: Modalidad::Online,
            horario: String::new(),
            plan_url: urls.get(&clave).cloned().unwrap_or_default(),
            activo: true,
        });
    }

    let total = disponibilidad.len();

    // dedupe online conservando el orden de inserción
    let mut availability = Vec::new();
    let mut orden_online: Vec<String> = Vec::new();
    let mut online: HashMap<String, Disponibilidad> = HashMap::new();
    for entrada in disponibilidad {
        if entrada.modalidad != Modalidad::Online {
            availability.push(entrada);
            continue;
        }
        let clave = format!(
            "{}::online::{}",
            clave_programa(&entrada.programa),
            normalizar_texto(&entrada.plantel)
        );
        match online.entry(clave) {
            Entry::Vacant(hueco) => {
                orden_online.push(hueco.key().clone());
                hueco.insert(entrada);
            }
            Entry::Occupied(mut ocupada) => {
                let actual = ocupada.get_mut();
                if actual.plan_url.is_empty() && !entrada.plan_url.is_empty() {
                    *actual = entrada;
                } else if actual.horario.is_empty() && !entrada.horario.is_empty() {
                    *actual = entrada;
                }
            }
        }
    }
    for clave in orden_online {
        if let Some(entrada) = online.remove(&clave) {
            availability.push(entrada);
        }
    }

    (
        PayloadDisponibilidad {
            availability,
            debug: debug_hojas,
        },
        total,
    )
}

/// Construye el payload completo a partir del workbook de portafolio.
/// La hoja "oferta general" se salta entera; las hojas cuyo nombre contiene
/// "online" usan la forma de tabla online y el resto la forma general.
pub fn construir_disponibilidad<P: AsRef<Path>>(
    path: P,
) -> Result<(PayloadDisponibilidad, usize), Box<dyn Error>> {
    let links = extraer_links(&path)?;
    let hojas = leer_grillas(&path)?;

    let sin_links = LinksHoja::default();
    let mut disponibilidad = Vec::new();
    let mut debug_hojas = Vec::new();

    for (nombre, grilla) in &hojas {
        let nombre_norm = normalizar_texto(nombre);
        if nombre_norm == "oferta general" {
            continue;
        }
        let links_hoja = links.get(nombre).unwrap_or(&sin_links);
        let entradas = if nombre_norm.contains("online") {
            extraer_hoja_online(grilla, nombre, links_hoja)
        } else {
            extraer_hoja_general(grilla, nombre, links_hoja)
        };
        debug!("hoja {}: {} entradas", nombre, entradas.len());
        debug_hojas.push(DebugHoja {
            plantel: nombre.clone(),
            entries: entradas.len(),
        });
        disponibilidad.extend(entradas);
    }

    Ok(armar_payload(disponibilidad, debug_hojas))
}

/// Serializa el payload como JSON compacto, UTF-8 sin escapar no-ASCII.
pub fn escribir_payload<P: AsRef<Path>>(
    path: P,
    payload: &PayloadDisponibilidad,
) -> Result<(), Box<dyn Error>> {
    let mut archivo = File::create(path)?;
    archivo.write_all(serde_json::to_string(payload)?.as_bytes())?;
    archivo.sync_all()?;
    Ok(())
}
