// Estructuras de datos de los payloads que consume la app de precios.
// Los nombres de campo JSON (lineaNegocio, planUrl, ...) son contrato
// con la app y no se tocan.

use serde::Serialize;

/// Modalidad de cursado de un programa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Modalidad {
    Presencial,
    Mixta,
    Online,
}

/// Línea de negocio de una regla de beneficio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineaNegocio {
    Licenciatura,
    Salud,
    Preparatoria,
}

/// Modalidad de una regla: una modalidad concreta o el comodín "*".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalidadRegla {
    Presencial,
    Mixta,
    Online,
    #[serde(rename = "*")]
    Cualquiera,
}

/// Una entrada de disponibilidad programa/plantel/modalidad.
#[derive(Debug, Clone, Serialize)]
pub struct Disponibilidad {
    pub id: String,
    pub plantel: String,
    pub programa: String,
    pub modalidad: Modalidad,
    pub horario: String,
    #[serde(rename = "planUrl")]
    pub plan_url: String,
    pub activo: bool,
}

/// Conteo por hoja para la sección `debug` del payload.
#[derive(Debug, Clone, Serialize)]
pub struct DebugHoja {
    pub plantel: String,
    pub entries: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PayloadDisponibilidad {
    pub availability: Vec<Disponibilidad>,
    pub debug: Vec<DebugHoja>,
}

/// Regla de porcentaje de beneficio. Sin clave propia: el orden de emisión
/// es la única identidad y el consumidor aplica first-match-wins.
#[derive(Debug, Clone, Serialize)]
pub struct ReglaBeneficio {
    #[serde(rename = "lineaNegocio")]
    pub linea_negocio: LineaNegocio,
    pub plantel: Vec<String>,
    pub modalidad: ModalidadRegla,
    pub plan: String,
    pub activo: bool,
    pub porcentaje: u32,
    pub comentario: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PayloadReglas {
    pub rules: Vec<ReglaBeneficio>,
}

/// Fila del CSV `programa,plan_url`.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramaPlanUrl {
    pub programa: String,
    pub plan_url: String,
}
