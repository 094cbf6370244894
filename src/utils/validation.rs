//! Utilidades de validación
//!
//! Funciones helper usadas por los `#[validate(custom = ...)]` de los modelos
//! y por el listado de atendidas para normalizar nombres de taller.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("static regex");
}

/// Validar que un string no esté vacío (los espacios no cuentan)
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Recorta y colapsa cada racha de espacios internos a un único espacio.
pub fn normalize_whitespace(value: &str) -> String {
    WHITESPACE_RUN.replace_all(value.trim(), " ").into_owned()
}

/// Un campo de texto opcional cuenta como presente sólo si no está en blanco.
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_empty() {
        assert!(validate_not_empty("brake pad").is_ok());
        assert!(validate_not_empty("").is_err());
        assert!(validate_not_empty("   ").is_err());
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("Acme "), "Acme");
        assert_eq!(normalize_whitespace(" Beta  Shop"), "Beta Shop");
        assert_eq!(normalize_whitespace("North\t\tShop\n"), "North Shop");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some(" ")));
        assert!(!is_blank(Some("ref1")));
    }
}
