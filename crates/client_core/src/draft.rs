use std::str::FromStr;

use shared::{
    domain::{cnpj_for, DocumentType},
    protocol::{CertidaoEnvelope, CertidaoRecord},
};
use thiserror::Error;

use crate::email::EmailList;

/// Inputs of the certidão form, named after the form's input names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Company,
    TaxId,
    EmailInput,
    DocumentTypeSelection,
    DocumentTypeText,
    IssuingBody,
    IssuedOn,
    ValidUntil,
    StatusNote,
}

impl FormField {
    pub fn as_str(self) -> &'static str {
        match self {
            FormField::Company => "empresa",
            FormField::TaxId => "cnpj",
            FormField::EmailInput => "emailInput",
            FormField::DocumentTypeSelection => "docTypeSelect",
            FormField::DocumentTypeText => "tipoDocumento",
            FormField::IssuingBody => "orgao",
            FormField::IssuedOn => "dataEmissao",
            FormField::ValidUntil => "fimVigencia",
            FormField::StatusNote => "statusNovoVenc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown form field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for FormField {
    type Err = UnknownField;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(match name {
            "empresa" => FormField::Company,
            "cnpj" => FormField::TaxId,
            "emailInput" => FormField::EmailInput,
            "docTypeSelect" => FormField::DocumentTypeSelection,
            "tipoDocumento" => FormField::DocumentTypeText,
            "orgao" => FormField::IssuingBody,
            "dataEmissao" => FormField::IssuedOn,
            "fimVigencia" => FormField::ValidUntil,
            "statusNovoVenc" => FormField::StatusNote,
            other => return Err(UnknownField(other.to_string())),
        })
    }
}

/// One certidão being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub company: String,
    pub tax_id: String,
    pub emails: EmailList,
    pub document_type: Option<DocumentType>,
    pub issuing_body: String,
    pub issued_on: String,
    pub valid_until: String,
    pub status_note: String,
}

impl Draft {
    /// Selecting a company overwrites the tax ID from the catalog.
    pub fn select_company(&mut self, company: &str) {
        self.company = company.to_string();
        self.tax_id = cnpj_for(company).unwrap_or_default().to_string();
    }

    pub fn select_document_type(&mut self, selection: &str) {
        self.document_type = DocumentType::from_selection(selection);
    }

    /// Returns false when no custom document type is active.
    pub fn set_custom_document_type(&mut self, text: &str) -> bool {
        match &mut self.document_type {
            Some(DocumentType::Custom(current)) => {
                *current = text.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn document_type_wire(&self) -> &str {
        self.document_type
            .as_ref()
            .map(DocumentType::as_wire)
            .unwrap_or_default()
    }

    pub fn to_record(&self) -> CertidaoRecord {
        CertidaoRecord {
            company: self.company.clone(),
            tax_id: self.tax_id.clone(),
            email: self.emails.to_wire(),
            document_type: self.document_type_wire().to_string(),
            issuing_body: self.issuing_body.clone(),
            issued_on: self.issued_on.clone(),
            valid_until: self.valid_until.clone(),
            status_note: self.status_note.clone(),
        }
    }

    pub fn to_envelope(&self) -> CertidaoEnvelope {
        CertidaoEnvelope {
            certidao: self.to_record(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
