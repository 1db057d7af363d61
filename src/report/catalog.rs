//! Known alert categories and their chart colours.

use std::collections::HashMap;

pub const DEFAULT_ALERT_COLOR: &str = "#A0A0A0";

/// Id, label and chart colour of every alert the backend reports.
static ALERT_CATEGORIES: &[(i64, &str, &str)] = &[
    (1, "Alerta de pérdida de video", "#000000"),
    (3, "Alerta de cobertura de cámara", "#FF0000"),
    (13, "Alerta de Emergencia", "#00FF99"),
    (18, "Alerta de geo-cercado", "#005005"),
    (19, "Apagado ilegal", "#FFC6DE"),
    (20, "Apagado forzado", "#FF00FF"),
    (29, "Alerta de temperatura", "#00A8CD"),
    (36, "Alerta de distancia", "#A0A0A0"),
    (38, "Alerta de cambio de carril", "#F5FF70"),
    (47, "Alerta de cambios anormales de temperatura", "#0033FF"),
    (58, "Fatiga de conductor", "#9A00FF"),
    (60, "Detección de teléfono", "#3283FF"),
    (61, "Detección de conductor fumando", "#3D4040"),
    (62, "Detección de conductor distraído", "#FFFF00"),
    (63, "Salida de carril", "#FF7F00"),
    (64, "Aviso de colisión frontal", "#695141"),
    (74, "Alerta de arranque anormal", "#03737E"),
    (160, "Alerta de exceso de velocidad", "#ACCDFF"),
    (162, "Control de la distancia de seguimiento", "#00FF00"),
    (163, "Advertencia de colisión de peatones", "#630000"),
    (164, "Detección de bostezos", "#380055"),
    (169, "Detección de cinturón de seguridad", "#E4B7FF"),
    (392, "Zona ciega", "#C54200"),
];

/// Recognition events that are charted but never listed on a device sheet.
static UNLISTED_CATEGORIES: &[&str] = &[
    "Persona peligrosidad baja",
    "Persona peligrosidad media",
    "Persona peligrosidad alta",
    "Reconocimiento de placa",
    "Personal reconocido",
    "Persona no reconocida",
    "Fin del recorrido",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertKind {
    pub id: i64,
    pub label: &'static str,
    pub color: &'static str,
}

/// Immutable alert catalog keyed by display label.
#[derive(Debug, Clone)]
pub struct AlertCatalog {
    by_label: HashMap<&'static str, AlertKind>,
}

impl Default for AlertCatalog {
    fn default() -> Self {
        let by_label = ALERT_CATEGORIES
            .iter()
            .map(|&(id, label, color)| (label, AlertKind { id, label, color }))
            .collect();
        Self { by_label }
    }
}

impl AlertCatalog {
    pub fn by_label(&self, label: &str) -> Option<&AlertKind> {
        self.by_label.get(label)
    }

    /// Chart colour for a category: catalog colour, then `fallback`, then the default.
    pub fn color_for<'a>(&'a self, label: &str, fallback: Option<&'a str>) -> &'a str {
        self.by_label(label)
            .map(|kind| kind.color)
            .or(fallback)
            .unwrap_or(DEFAULT_ALERT_COLOR)
    }

    pub fn is_listed(&self, label: &str) -> bool {
        !UNLISTED_CATEGORIES.iter().any(|c| *c == label)
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_every_category() {
        let catalog = AlertCatalog::default();
        assert_eq!(catalog.len(), 23);
        assert_eq!(catalog.by_label("Zona ciega").map(|k| k.id), Some(392));
    }

    #[test]
    fn test_color_fallbacks() {
        let catalog = AlertCatalog::default();

        assert_eq!(catalog.color_for("Fatiga de conductor", Some("#123456")), "#9A00FF");
        assert_eq!(catalog.color_for("Desconocida", Some("#123456")), "#123456");
        assert_eq!(catalog.color_for("Desconocida", None), DEFAULT_ALERT_COLOR);
    }

    #[test]
    fn test_recognition_events_are_not_listed() {
        let catalog = AlertCatalog::default();

        assert!(!catalog.is_listed("Reconocimiento de placa"));
        assert!(!catalog.is_listed("Fin del recorrido"));
        assert!(catalog.is_listed("Zona ciega"));
    }
}
