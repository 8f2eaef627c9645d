//! Form categories and the canonical table declarations for each.
//!
//! Every category owns an isolated triple of tables (cases, hechos,
//! perfiles); the user table is shared across categories.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::table::TableSpec;

/// Natural-key field of the case table.
pub const OT_TE_FIELD: &str = "OT-TE";
/// Foreign-key field of the hecho and perfil tables.
pub const ID_CASO_FIELD: &str = "ID_Caso";

pub const CASOS_HEADER: &[&str] = &[
  "ID_Caso",
  "Timestamp",
  "OT-TE",
  "Edad",
  "Sexo",
  "Departamento",
  "Municipio",
  "Solicitante",
  "Nivel de Riesgo",
  "Observaciones",
  "Analista",
  "Usuario Analista",
];

pub const HECHOS_HEADER: &[&str] = &[
  "ID_Hecho",
  "ID_Caso",
  "OT-TE",
  "Tipo de Hecho",
  "Fecha del Hecho",
  "Lugar",
  "Autor",
  "Descripcion",
  "Analista",
  "Usuario Analista",
];

pub const PERFILES_HEADER: &[&str] = &[
  "ID_Perfil",
  "ID_Caso",
  "OT-TE",
  "Grupo",
  "Estructura",
  "Rol",
  "Fecha de Desmovilizacion",
  "Observaciones",
  "Analista",
  "Usuario Analista",
];

/// The two form families. Each maps to its own table triple; data never
/// crosses categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Individual,
  Collective,
}

impl Category {
  pub fn as_str(&self) -> &'static str {
    match self {
      Category::Individual => "individual",
      Category::Collective => "collective",
    }
  }

  /// Suffix shared by this category's three table names.
  fn table_suffix(&self) -> &'static str {
    match self {
      Category::Individual => "Individual",
      Category::Collective => "Colectivo",
    }
  }

  pub fn casos_spec(&self) -> TableSpec {
    TableSpec::new(&format!("Casos_{}", self.table_suffix()), CASOS_HEADER)
      .with_unique_key(OT_TE_FIELD)
  }

  pub fn hechos_spec(&self) -> TableSpec {
    TableSpec::new(&format!("Hechos_{}", self.table_suffix()), HECHOS_HEADER)
      .with_lookup_key(ID_CASO_FIELD)
  }

  pub fn perfiles_spec(&self) -> TableSpec {
    TableSpec::new(&format!("Perfiles_{}", self.table_suffix()), PERFILES_HEADER)
      .with_lookup_key(ID_CASO_FIELD)
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Category {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "individual" => Ok(Category::Individual),
      "collective" => Ok(Category::Collective),
      other => Err(format!("unknown category: {other:?}")),
    }
  }
}
