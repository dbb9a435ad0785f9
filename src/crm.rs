//! CRM form validation and list filtering.
//!
//! Everything here is pure: validation happens before any storage call, and
//! filtering runs over the already-loaded client set (no re-query per
//! keystroke).

use crate::errors::FieldError;
use crate::models::{Client, NewClientRequest};
use phonenumber::country::Id as CountryId;
use phonenumber::Mode;
use regex::Regex;

/// Marker appended to the name of a duplicated client.
pub const COPY_MARKER: &str = " (cópia)";

/// Validate email address syntax.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 5 || !email.contains('@') || !email.contains('.') {
        return false;
    }

    // RFC 5322 simplified email regex
    // Matches: local@domain.tld
    let email_regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .unwrap();

    email_regex.is_match(email)
}

/// Normalize a Brazilian phone number to E.164 when it parses as one.
///
/// Phone fields are optional and free-form, so this never rejects: numbers
/// that fail to parse or validate are kept verbatim, with a warning.
pub fn normalize_br_phone(raw: &str) -> String {
    if raw.trim().is_empty() || raw.len() < 8 {
        return raw.to_string();
    }

    match phonenumber::parse(Some(CountryId::BR), raw) {
        Ok(number) if phonenumber::is_valid(&number) => {
            let formatted = number.format().mode(Mode::E164).to_string();
            tracing::debug!("Normalized BR phone: {} -> {}", raw, formatted);
            formatted
        }
        _ => {
            tracing::warn!("Keeping unnormalizable phone verbatim: {}", raw);
            raw.to_string()
        }
    }
}

/// Validate a new-client submission.
///
/// Rules from the form: name >= 2 chars, tax id >= 11 chars, email required
/// and syntactically valid, sector >= 2 chars, lead source >= 2 chars. All
/// other fields optional.
pub fn validate_new_client(req: &NewClientRequest) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if req.name.trim().chars().count() < 2 {
        errors.push(FieldError::new("name", "Informe o nome ou razão social"));
    }
    if req.tax_id.trim().chars().count() < 11 {
        errors.push(FieldError::new("tax_id", "Informe CPF ou CNPJ"));
    }
    if !is_valid_email(req.email.trim()) {
        errors.push(FieldError::new("email", "E-mail inválido"));
    }
    if req.sector.trim().chars().count() < 2 {
        errors.push(FieldError::new("sector", "Informe o setor de atuação"));
    }
    if req.lead_source.trim().chars().count() < 2 {
        errors.push(FieldError::new("lead_source", "Informe a origem do lead"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Case-insensitive substring match of `term` against name, company and
/// email. A missing email never matches on that field. An empty term returns
/// the full set unfiltered.
pub fn filter_clients<'a>(clients: &'a [Client], term: &str) -> Vec<&'a Client> {
    let needle = term.to_lowercase();
    clients
        .iter()
        .filter(|client| {
            client.name.to_lowercase().contains(&needle)
                || client
                    .company
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&needle))
                || client
                    .email
                    .as_deref()
                    .is_some_and(|e| e.to_lowercase().contains(&needle))
        })
        .collect()
}
