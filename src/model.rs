//! Model name resolution for the server-side Imagen variants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Server-side model variants accepted by ImageFX.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelType {
    /// Imagen 3.1.
    #[default]
    #[serde(rename = "IMAGEN_3_1")]
    Imagen31,
}

/// Short name aliases for the wire identifiers.
const ALIASES: &[(&str, &str)] = &[
    ("imagen-3.1", "IMAGEN_3_1"),
    ("imagen3.1", "IMAGEN_3_1"),
];

impl ModelType {
    /// Identifier sent as `modelInput.modelNameType`.
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Imagen31 => "IMAGEN_3_1",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match resolve_model(s).as_str() {
            "IMAGEN_3_1" => Ok(Self::Imagen31),
            other => Err(format!("Unknown model '{other}'. Valid: IMAGEN_3_1 (alias imagen-3.1)")),
        }
    }
}

/// Resolve a model name (alias or exact, any case) to the wire identifier.
#[must_use]
pub fn resolve_model(name: &str) -> String {
    let lowered = name.trim().to_ascii_lowercase();
    for &(alias, full) in ALIASES {
        if lowered == alias {
            return full.to_string();
        }
    }
    name.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_aliases() {
        assert_eq!(resolve_model("imagen-3.1"), "IMAGEN_3_1");
        assert_eq!(resolve_model("Imagen3.1"), "IMAGEN_3_1");
    }

    #[test]
    fn resolve_exact_name_passthrough() {
        assert_eq!(resolve_model("IMAGEN_3_1"), "IMAGEN_3_1");
        assert_eq!(resolve_model("imagen_3_1"), "IMAGEN_3_1");
    }

    #[test]
    fn parse_known_model() {
        assert_eq!("IMAGEN_3_1".parse::<ModelType>().unwrap(), ModelType::Imagen31);
        assert_eq!("imagen-3.1".parse::<ModelType>().unwrap(), ModelType::Imagen31);
    }

    #[test]
    fn parse_unknown_model() {
        assert!("IMAGEN_2".parse::<ModelType>().is_err());
        assert!("dall-e-3".parse::<ModelType>().is_err());
    }

    #[test]
    fn serializes_as_wire_name() {
        assert_eq!(serde_json::to_string(&ModelType::Imagen31).unwrap(), "\"IMAGEN_3_1\"");
    }
}
