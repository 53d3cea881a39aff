use calamine::Data;

use recalc_etl::excel::{
    armar_payload, construir_disponibilidad, escribir_payload, extraer_hoja_general,
    extraer_hoja_online, extraer_links, parsear_disponible, Grilla, LinksHoja,
};
use recalc_etl::models::{DebugHoja, Disponibilidad, Modalidad};

/// Grilla de celdas de texto; las cadenas vacías quedan como `Data::Empty`.
fn grilla(filas: &[&[&str]]) -> Grilla {
    filas
        .iter()
        .map(|fila| {
            fila.iter()
                .map(|celda| {
                    if celda.is_empty() {
                        Data::Empty
                    } else {
                        Data::String(celda.to_string())
                    }
                })
                .collect()
        })
        .collect()
}

fn entrada_online(programa: &str, plantel: &str, plan_url: &str, horario: &str) -> Disponibilidad {
    Disponibilidad {
        id: format!("test-{programa}"),
        plantel: plantel.to_string(),
        programa: programa.to_string(),
        modalidad: Modalidad::Online,
        horario: horario.to_string(),
        plan_url: plan_url.to_string(),
        activo: true,
    }
}

#[test]
fn disponible_segun_tokens_y_palomitas() {
    assert!(parsear_disponible(&Data::Bool(true)));
    assert!(!parsear_disponible(&Data::Bool(false)));
    assert!(parsear_disponible(&Data::String("Sí".into())));
    assert!(parsear_disponible(&Data::String("SI".into())));
    assert!(parsear_disponible(&Data::String("activo".into())));
    assert!(parsear_disponible(&Data::String("1".into())));
    assert!(parsear_disponible(&Data::Float(1.0)));
    assert!(parsear_disponible(&Data::String("✓".into())));
    assert!(parsear_disponible(&Data::String("abierto ✔".into())));
    assert!(!parsear_disponible(&Data::String("No".into())));
    assert!(!parsear_disponible(&Data::String("0".into())));
    assert!(!parsear_disponible(&Data::String("tal vez".into())));
    assert!(!parsear_disponible(&Data::Empty));
}

#[test]
fn hoja_online_corta_la_region_en_posgrados() {
    let hoja = grilla(&[
        &["", ""],
        &["", ""],
        &["", "Licenciaturas Online"],
        &["", "Programas"],
        &["", "Licenciatura en Derecho"],
        &["", "Licenciatura en Mercadotecnia"],
        &["", ""],
        &["", ""],
        &["", ""],
        &["", ""],
        &["", "Posgrados Online"],
        &["", "Maestría en Finanzas"],
        &["", "Maestría en Derecho Procesal"],
    ]);

    let entradas = extraer_hoja_online(&hoja, "Online", &LinksHoja::default());

    // la región de licenciatura termina en la fila del encabezado de
    // posgrados; "Programas" no es dato
    let licenciaturas: Vec<&str> = entradas
        .iter()
        .filter(|e| e.id.contains("licenciatura online"))
        .map(|e| e.programa.as_str())
        .collect();
    assert_eq!(
        licenciaturas,
        vec!["Licenciatura En Derecho", "Licenciatura En Mercadotecnia"]
    );

    let posgrados: Vec<&str> = entradas
        .iter()
        .filter(|e| e.id.contains("posgrados online"))
        .map(|e| e.programa.as_str())
        .collect();
    assert_eq!(
        posgrados,
        vec!["Maestría En Finanzas", "Maestría En Derecho Procesal"]
    );

    assert_eq!(entradas[0].id, "sheet-Online-licenciatura online-4-1-online");
    assert_eq!(entradas[0].modalidad, Modalidad::Online);
    assert_eq!(entradas[0].horario, "");
}

#[test]
fn hoja_general_emite_solo_modalidades_activas() {
    let hoja = grilla(&[
        &[""],
        &[""],
        &[""],
        &[""],
        &[""],
        &["", "", "C1", "", "2026", "", "", "Horarios"],
        &["", "", "Escolarizado", "Ejecutivo", "", "", "", ""],
        &["", "Derecho", "Sí", "", "", "", "", "L-V 07:00-10:00"],
    ]);

    let entradas = extraer_hoja_general(&hoja, "Plantel Centro", &LinksHoja::default());

    assert_eq!(entradas.len(), 1);
    assert_eq!(entradas[0].id, "sheet-Plantel Centro-0-presencial");
    assert_eq!(entradas[0].programa, "Derecho");
    assert_eq!(entradas[0].modalidad, Modalidad::Presencial);
    assert_eq!(entradas[0].horario, "L-V 07:00-10:00");
}

#[test]
fn hoja_general_usa_columnas_fijas_sin_encabezados() {
    // sin "horarios" ni fila de modalidades: valen los índices heredados
    // (escolarizado=2, ejecutivo=3, horarios=7/8) y el programa sale de la
    // columna 0 cuando la 1 viene vacía
    let hoja = grilla(&[
        &[""],
        &[""],
        &[""],
        &[""],
        &[""],
        &["Oferta C1", "2026 Enero"],
        &[""],
        &["Derecho", "", "Sí", "", "", "", "", "Matutino", ""],
        &["Gastronomía", "", "", "✓", "", "", "", "", "Vespertino"],
        &["Horarios"],
        &["Medicina", "", "Sí", "", "", "", "", "", ""],
    ]);

    let entradas = extraer_hoja_general(&hoja, "Campus Norte", &LinksHoja::default());

    // la fila "Horarios" corta la región: "Medicina" queda fuera
    assert_eq!(entradas.len(), 2);
    assert_eq!(entradas[0].programa, "Derecho");
    assert_eq!(entradas[0].modalidad, Modalidad::Presencial);
    assert_eq!(entradas[0].horario, "Matutino");
    assert_eq!(entradas[1].id, "sheet-Campus Norte-1-mixta");
    assert_eq!(entradas[1].programa, "Gastronomía");
    assert_eq!(entradas[1].modalidad, Modalidad::Mixta);
    assert_eq!(entradas[1].horario, "Vespertino");
}

#[test]
fn dedupe_online_prefiere_plan_url_poblado() {
    let entradas = vec![
        entrada_online("Licenciatura en Derecho", "Campus Norte", "", ""),
        entrada_online("Licenciatura en Derecho", "Campus Norte", "https://uvm.mx/derecho", ""),
    ];

    let (payload, total) = armar_payload(entradas, Vec::new());

    assert_eq!(total, 2 + 48); // las dos entradas más la allowlist sin "derecho"
    let norte: Vec<&Disponibilidad> = payload
        .availability
        .iter()
        .filter(|e| e.plantel == "Campus Norte")
        .collect();
    assert_eq!(norte.len(), 1);
    assert_eq!(norte[0].plan_url, "https://uvm.mx/derecho");
}

#[test]
fn dedupe_online_conserva_horario_cuando_no_hay_url() {
    let entradas = vec![
        entrada_online("Maestría en Finanzas", "Campus Sur", "https://uvm.mx/mf", ""),
        entrada_online("Maestría en Finanzas", "Campus Sur", "", "Sabatino"),
    ];

    let (payload, _total) = armar_payload(entradas, Vec::new());

    let sur: Vec<&Disponibilidad> = payload
        .availability
        .iter()
        .filter(|e| e.plantel == "Campus Sur")
        .collect();
    assert_eq!(sur.len(), 1);
    // la segunda reemplaza a la primera por traer horario; su planUrl
    // vacío viaja con ella
    assert_eq!(sur[0].horario, "Sabatino");
    assert_eq!(sur[0].plan_url, "");
}

#[test]
fn online_hereda_plan_url_de_las_entradas_presenciales() {
    let presencial = Disponibilidad {
        id: "sheet-Campus Norte-0-presencial".to_string(),
        plantel: "Campus Norte".to_string(),
        programa: "Licenciatura En Derecho".to_string(),
        modalidad: Modalidad::Presencial,
        horario: "L-V".to_string(),
        plan_url: "https://uvm.mx/derecho".to_string(),
        activo: true,
    };
    let online = entrada_online("Derecho", "Online", "", "");

    let (payload, _total) = armar_payload(vec![presencial, online], Vec::new());

    let rellenada = payload
        .availability
        .iter()
        .find(|e| e.modalidad == Modalidad::Online && e.plantel == "Online")
        .unwrap();
    assert_eq!(rellenada.plan_url, "https://uvm.mx/derecho");
}

#[test]
fn allowlist_completa_los_programas_online_faltantes() {
    let (payload, total) = armar_payload(Vec::new(), Vec::new());

    assert_eq!(total, 49);
    assert_eq!(payload.availability.len(), 49);
    assert!(payload
        .availability
        .iter()
        .all(|e| e.plantel == "Online" && e.modalidad == Modalidad::Online && e.activo));

    let ia = payload
        .availability
        .iter()
        .find(|e| e.id == "online-allowlist-inteligencia artificial")
        .unwrap();
    assert_eq!(ia.programa, "Maestría En Inteligencia Artificial");
    assert_eq!(ia.plan_url, "");
}

fn escribir_workbook(ruta: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();

    // hoja que se salta entera
    let hoja = workbook.add_worksheet();
    hoja.set_name("Oferta General")?;
    hoja.write_string(0, 0, "Resumen")?;

    // hoja de plantel con encabezados, fila oculta y link en el programa
    let hoja = workbook.add_worksheet();
    hoja.set_name("Durango")?;
    hoja.write_string(5, 2, "C1")?;
    hoja.write_string(5, 4, "2026")?;
    hoja.write_string(5, 7, "Horarios")?;
    hoja.write_string(6, 2, "Escolarizado")?;
    hoja.write_string(6, 3, "Ejecutivo")?;
    hoja.write_url_with_text(7, 1, "https://uvm.mx/derecho", "Derecho")?;
    hoja.write_string(7, 2, "Sí")?;
    hoja.write_string(7, 7, "L-V 07:00-10:00")?;
    hoja.write_string(8, 1, "Medicina")?;
    hoja.write_string(8, 2, "Sí")?;
    hoja.set_row_hidden(8)?;
    hoja.write_string(9, 1, "Modular")?;
    hoja.write_string(9, 2, "Sí")?;

    // hoja online con los dos bloques
    let hoja = workbook.add_worksheet();
    hoja.set_name("Online")?;
    hoja.write_string(2, 1, "Licenciaturas Online")?;
    hoja.write_string(3, 1, "Licenciatura en Derecho")?;
    hoja.write_string(4, 1, "Licenciatura en Mercadotecnia")?;
    hoja.write_string(10, 1, "Posgrados Online")?;
    hoja.write_string(11, 1, "Maestría en Finanzas")?;

    workbook.save(ruta)?;
    Ok(())
}

#[test]
fn links_y_filas_ocultas_del_workbook() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::TempDir::new()?;
    let ruta = dir.path().join("portafolio.xlsx");
    escribir_workbook(&ruta)?;

    let links = extraer_links(&ruta)?;
    let durango = links.get("Durango").unwrap();

    assert_eq!(
        durango.por_celda.get(&(7, 1)).map(String::as_str),
        Some("https://uvm.mx/derecho")
    );
    assert_eq!(durango.resolver(7, 1), "https://uvm.mx/derecho");
    // fallback por fila
    assert_eq!(durango.resolver(7, 0), "https://uvm.mx/derecho");
    assert_eq!(durango.resolver(6, 1), "");
    assert!(durango.filas_ocultas.contains(&8));
    assert!(!durango.filas_ocultas.contains(&7));

    Ok(())
}

#[test]
fn workbook_completo_de_punta_a_punta() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::TempDir::new()?;
    let ruta = dir.path().join("portafolio.xlsx");
    escribir_workbook(&ruta)?;

    let (payload, total) = construir_disponibilidad(&ruta)?;

    // "Oferta General" no aparece ni en datos ni en debug
    let debug: Vec<(&str, usize)> = payload
        .debug
        .iter()
        .map(|DebugHoja { plantel, entries }| (plantel.as_str(), *entries))
        .collect();
    assert_eq!(debug, vec![("Durango", 1), ("Online", 3)]);

    // Durango: sólo Derecho presencial; la fila oculta de Medicina y la de
    // "Modular" no cuentan
    assert_eq!(payload.availability[0].id, "sheet-Durango-0-presencial");
    assert_eq!(payload.availability[0].programa, "Derecho");
    assert_eq!(payload.availability[0].horario, "L-V 07:00-10:00");
    assert_eq!(payload.availability[0].plan_url, "https://uvm.mx/derecho");
    assert!(!payload.availability.iter().any(|e| e.programa == "Medicina"));

    // la entrada online de Derecho hereda el link de la presencial
    let derecho_online = payload
        .availability
        .iter()
        .find(|e| e.modalidad == Modalidad::Online && e.programa == "Licenciatura En Derecho")
        .unwrap();
    assert_eq!(derecho_online.plan_url, "https://uvm.mx/derecho");

    // tres online del workbook más 46 de la allowlist (derecho,
    // mercadotecnia y finanzas ya existen)
    assert_eq!(total, 1 + 3 + 46);
    assert_eq!(payload.availability.len(), total);

    let salida = dir.path().join("availability_payload.json");
    escribir_payload(&salida, &payload)?;
    let crudo = std::fs::read_to_string(&salida)?;
    assert!(crudo.starts_with("{\"availability\":"));
    // no-ASCII sin escapar
    assert!(crudo.contains("Maestría En Finanzas"));
    assert!(crudo.contains("\"planUrl\":\"https://uvm.mx/derecho\""));

    let valor: serde_json::Value = serde_json::from_str(&crudo)?;
    assert_eq!(valor["debug"][0]["plantel"], "Durango");
    assert_eq!(valor["debug"][0]["entries"], 1);
    assert_eq!(valor["availability"][0]["modalidad"], "presencial");
    assert_eq!(valor["availability"][0]["activo"], true);

    Ok(())
}
