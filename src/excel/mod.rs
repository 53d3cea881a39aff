//! Módulo `excel` dividido en submódulos para mantener el código organizado.
//!
//! Submódulos:
//! - `io`: lectura de celdas y grillas vía calamine
//! - `links`: hipervínculos y filas ocultas leídos del paquete XLSX
//! - `disponibilidad`: extracción de disponibilidad por hoja y payload final
//! - `plan_urls`: primer hipervínculo por programa

/// Helpers de lectura de celdas y grillas
mod io;

/// Hipervínculos y filas ocultas del paquete XLSX
mod links;

/// Extracción de disponibilidad: `construir_disponibilidad`
pub mod disponibilidad;

/// Primer hipervínculo por programa: `extraer_plan_urls`
pub mod plan_urls;

pub use disponibilidad::{
    armar_payload, construir_disponibilidad, escribir_payload, extraer_hoja_general,
    extraer_hoja_online, parsear_disponible,
};
pub use io::{celda_a_texto, leer_grillas, letras_a_columna, Grilla};
pub use links::{extraer_links, LinksHoja};
pub use plan_urls::{escribir_csv, extraer_plan_urls};
