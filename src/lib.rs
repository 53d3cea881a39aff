// Biblioteca raíz del crate `recalc-etl`.
// Reexporta los módulos que comparten los tres conversores por lotes
// (disponibilidad, reglas de beneficio y plan URLs).
pub mod beneficios;
pub mod excel;
pub mod models;
pub mod texto;
