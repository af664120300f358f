use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Select value that switches the document type to free text.
pub const DOCUMENT_TYPE_OTHER: &str = "Outro";

pub const COMPANY_PLACEHOLDER: &str = "Selecione a empresa...";
pub const DOCUMENT_TYPE_PLACEHOLDER: &str = "Selecione o tipo...";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! select_options {
    ($name:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Select value, which doubles as the display label.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownOption;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownOption {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

select_options!(Company, "company", {
    AvaRj => "AVA RJ",
    AvaSp => "AVA SP",
    AvaSpGuarulhos => "AVA SP - GUARULHOS",
    Burn => "BURN",
    Limppano => "LIMPPANO",
    LimppanoRs => "LIMPPANO - RS",
    LimppanoTextil => "LIMPPANO - TÊXTIL",
    Van => "VAN",
});

select_options!(DocumentKind, "document type", {
    Federal => "Certidão Federal",
    Estadual => "Certidão Estadual",
    Municipal => "Certidão Municipal",
    Trabalhista => "Certidão Trabalhista",
});

impl Company {
    pub fn cnpj(self) -> &'static str {
        match self {
            Company::AvaRj => "17.336.663/0001-84",
            Company::AvaSp => "11.880.018/0001-41",
            Company::AvaSpGuarulhos => "11.880.018/0002-22",
            Company::Burn => "11.636.336/0001-61",
            Company::Limppano => "33.033.556/0001-33",
            Company::LimppanoRs => "33.033.556/0007-29",
            Company::LimppanoTextil => "33.033.556/0006-48",
            Company::Van => "19.047.654/0001-07",
        }
    }
}

/// CNPJ registered for a company select value, `None` when the value is not in the catalog.
pub fn cnpj_for(company: &str) -> Option<&'static str> {
    company.parse::<Company>().ok().map(Company::cnpj)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentType {
    Fixed(DocumentKind),
    Custom(String),
}

impl DocumentType {
    /// Resolves a document-type select value. The "Outro" sentinel starts an empty custom type.
    pub fn from_selection(value: &str) -> Option<Self> {
        if value.is_empty() {
            return None;
        }
        if value == DOCUMENT_TYPE_OTHER {
            return Some(DocumentType::Custom(String::new()));
        }
        Some(match value.parse::<DocumentKind>() {
            Ok(kind) => DocumentType::Fixed(kind),
            Err(_) => DocumentType::Custom(value.to_string()),
        })
    }

    pub fn as_wire(&self) -> &str {
        match self {
            DocumentType::Fixed(kind) => kind.as_str(),
            DocumentType::Custom(text) => text,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, DocumentType::Custom(_))
    }
}

/// Options offered by the document-type select, sentinel last.
pub fn document_type_options() -> impl Iterator<Item = &'static str> {
    DocumentKind::ALL
        .iter()
        .map(|kind| kind.as_str())
        .chain(std::iter::once(DOCUMENT_TYPE_OTHER))
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
