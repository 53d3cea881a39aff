//! Normalización de texto compartida por los tres conversores.

/// Prefijos de nivel académico que se quitan al construir la clave de
/// programa. El orden importa: "licenciatura en " se prueba antes que
/// "licenciatura " y sólo se quita el primero que coincida.
const PREFIJOS_NIVEL: [&str; 6] = [
    "licenciatura en ",
    "maestria en ",
    "ingenieria en ",
    "ingenieria ",
    "licenciatura ",
    "maestria ",
];

/// Pasa a minúsculas, convierte acentos comunes en español/latam a su letra
/// base ASCII y recorta los extremos. Puntuación y espacios internos quedan
/// como están.
pub fn normalizar_texto(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    // mapa simple de acentos comunes en español/latam
    for ch in s.chars() {
        let c = match ch {
            'Á' | 'À' | 'Ä' | 'Â' | 'Ã' | 'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
            'É' | 'È' | 'Ë' | 'Ê' | 'é' | 'è' | 'ë' | 'ê' => 'e',
            'Í' | 'Ì' | 'Ï' | 'Î' | 'í' | 'ì' | 'ï' | 'î' => 'i',
            'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Õ' | 'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'Ú' | 'Ù' | 'Ü' | 'Û' | 'ú' | 'ù' | 'ü' | 'û' => 'u',
            'Ñ' | 'ñ' => 'n',
            'Ç' | 'ç' => 'c',
            other => other,
        };
        for bajo in c.to_lowercase() {
            out.push(bajo);
        }
    }
    out.trim().to_string()
}

/// Clave de matching de un programa: texto normalizado, sin el primer
/// prefijo de nivel reconocido y con espacios colapsados. Se usa sólo para
/// dedupe/lookup, nunca se emite como campo.
pub fn clave_programa(s: &str) -> String {
    let mut normalizado = normalizar_texto(s);
    for prefijo in PREFIJOS_NIVEL {
        if let Some(resto) = normalizado.strip_prefix(prefijo) {
            normalizado = resto.to_string();
            break;
        }
    }
    normalizado.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Title-case palabra por palabra: primera letra en mayúscula, el resto en
/// minúsculas, unido con espacios simples.
pub fn titulo_programa(s: &str) -> String {
    s.split_whitespace()
        .map(|palabra| {
            let mut letras = palabra.chars();
            match letras.next() {
                Some(primera) => {
                    primera.to_uppercase().collect::<String>() + &letras.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
