//! Contract editor: fills the fixed service-agreement template with form
//! fields and renders it twice — once as a flat preview string, once as an
//! exportable paginated document with fixed absolute line positions.
//!
//! There is no reflow or wrapping: a long field value overflows its line,
//! exactly like the on-screen editor it replaces.

use crate::errors::FieldError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const CONTRACTOR_NAME: &str = "NEXA PULSE LTDA";
const CONTRACTOR_CNPJ: &str = "53.548.850/0001-95";
const CONTRACTOR_CITY: &str = "Valparaíso de Goiás";

const TITLE: &str = "CONTRATO DE PRESTAÇÃO DE SERVIÇOS DE GESTÃO DE TRÁFEGO PAGO";

/// Page geometry for the exported document. Positions are in the same
/// millimetre-style units the original editor used; a line placed past
/// `PAGE_LIMIT` starts a new page.
const MARGIN: u32 = 20;
const PAGE_LIMIT: u32 = 280;

/// Fixed service plans selectable in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServicePlan {
    Basic,
    Standard,
    Premium,
    Enterprise,
}

impl ServicePlan {
    pub fn price(&self) -> u32 {
        match self {
            ServicePlan::Basic => 1200,
            ServicePlan::Standard => 1700,
            ServicePlan::Premium => 2500,
            ServicePlan::Enterprise => 4000,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServicePlan::Basic => "Plano Básico - R$ 1.200",
            ServicePlan::Standard => "Plano Padrão - R$ 1.700",
            ServicePlan::Premium => "Plano Premium - R$ 2.500",
            ServicePlan::Enterprise => "Plano Enterprise - R$ 4.000",
        }
    }
}

/// Form state of the contract editor.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContractForm {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_tax_id: String,
    #[serde(default)]
    pub client_address: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    pub plan: Option<ServicePlan>,
    #[serde(default)]
    pub additional_terms: String,
}

impl ContractForm {
    /// Selecting a plan fills the value field with the plan price.
    pub fn apply_plan(&mut self, plan: ServicePlan) {
        self.plan = Some(plan);
        self.value = plan.price().to_string();
    }
}

/// Required-field gate shared by export and send-for-signature: client name
/// and value must be non-empty.
pub fn validate_for_export(form: &ContractForm) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if form.client_name.trim().is_empty() {
        errors.push(FieldError::new(
            "client_name",
            "Preencha pelo menos o nome do cliente e o valor do contrato",
        ));
    }
    if form.value.trim().is_empty() {
        errors.push(FieldError::new(
            "value",
            "Preencha pelo menos o nome do cliente e o valor do contrato",
        ));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

/// Render the on-screen preview: the full template as one string, with
/// bracketed placeholders standing in for empty fields.
pub fn render_preview(form: &ContractForm, today: NaiveDate) -> String {
    let name = or_placeholder(&form.client_name, "[NOME DO CLIENTE]");
    let cnpj = or_placeholder(&form.client_tax_id, "[CNPJ]");
    let address = or_placeholder(&form.client_address, "[ENDEREÇO]");
    let value = or_placeholder(&form.value, "[VALOR]");
    let start = or_placeholder(&form.start_date, "[DATA INÍCIO]");
    let end = or_placeholder(&form.end_date, "[DATA TÉRMINO]");

    let mut out = String::new();
    out.push_str(TITLE);
    out.push_str("\n\n");
    out.push_str("CONTRATADA:\n");
    out.push_str(&format!(
        "{} inscrito no CNPJ sob o nº {}, com endereço na Conjunto Residencial 7, \
         Condomínio 1, SN, Bloco B, Apt 3, Parque das Cachoeiras, {} - GO, CEP 72872-700.\n\n",
        CONTRACTOR_NAME, CONTRACTOR_CNPJ, CONTRACTOR_CITY
    ));
    out.push_str("CONTRATANTE:\n");
    out.push_str(&format!(
        "{}, inscrita no CNPJ sob o nº {}, com endereço na {}.\n\n",
        name, cnpj, address
    ));
    out.push_str("CLÁUSULA 1 – DO OBJETO E VALORES\n");
    out.push_str(&format!(
        "O presente contrato tem por objeto a prestação de serviços de gestão de \
         tráfego pago em multiplataformas digitais. O valor acordado entre as partes \
         é de R$ {}.\n\n",
        value
    ));
    out.push_str("CLÁUSULA 2 – DO PRAZO\n");
    out.push_str(&format!(
        "O presente contrato terá duração de 60 (sessenta) dias corridos, com início \
         em {} e término em {}.\n\n",
        start, end
    ));
    out.push_str("CLÁUSULA 3 – DO PAGAMENTO\n");
    out.push_str(
        "O pagamento será efetuado por meio de sistema automatizado de cobrança \
         recorrente via plataforma Asaas.\n\n",
    );
    if !form.additional_terms.trim().is_empty() {
        out.push_str("TERMOS ADICIONAIS:\n");
        out.push_str(form.additional_terms.trim());
        out.push_str("\n\n");
    }
    out.push_str(&format!(
        "{}, {}\n\n",
        CONTRACTOR_CITY,
        today.format("%d/%m/%Y")
    ));
    out.push_str(&format!(
        "_________________________________\n{}\nCNPJ: {}\n\n",
        CONTRACTOR_NAME, CONTRACTOR_CNPJ
    ));
    out.push_str(&format!(
        "_________________________________\n{}\nCNPJ: {}\n",
        name, cnpj
    ));
    out
}

/// A line placed at an absolute vertical position on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedLine {
    pub y: u32,
    pub bold: bool,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

/// The exportable paginated document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractDocument {
    pub filename: String,
    pub pages: Vec<Page>,
}

impl ContractDocument {
    /// Flatten to plain text, one form feed between pages.
    pub fn to_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| {
                page.lines
                    .iter()
                    .map(|line| line.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect::<Vec<_>>()
            .join("\u{c}")
    }
}

/// Manual page-position bookkeeping: lines go at the current y, and stepping
/// past the page limit opens a fresh page.
struct DocumentWriter {
    pages: Vec<Page>,
    y: u32,
}

impl DocumentWriter {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: MARGIN,
        }
    }

    fn text(&mut self, text: impl Into<String>, bold: bool) {
        let line = PlacedLine {
            y: self.y,
            bold,
            text: text.into(),
        };
        self.pages.last_mut().unwrap().lines.push(line);
    }

    fn advance(&mut self, dy: u32) {
        self.y += dy;
        if self.y > PAGE_LIMIT {
            self.pages.push(Page::default());
            self.y = MARGIN;
        }
    }

    fn finish(self, filename: String) -> ContractDocument {
        ContractDocument {
            filename,
            pages: self.pages,
        }
    }
}

/// Filename pattern: `Contrato_<ClientName>_<ISODate>.txt`, whitespace in the
/// name replaced by underscores.
pub fn contract_filename(client_name: &str, today: NaiveDate) -> String {
    let name = client_name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("Contrato_{}_{}.txt", name, today.format("%Y-%m-%d"))
}

/// Render the exportable document. Callers must run [`validate_for_export`]
/// first; this function assumes the gate has passed.
pub fn export_document(form: &ContractForm, today: NaiveDate) -> ContractDocument {
    let mut doc = DocumentWriter::new();

    doc.text(TITLE, true);
    doc.advance(20);

    doc.text("CONTRATADA:", true);
    doc.advance(8);
    doc.text(
        format!(
            "{} inscrito no CNPJ sob o nº {},",
            CONTRACTOR_NAME, CONTRACTOR_CNPJ
        ),
        false,
    );
    doc.advance(6);
    doc.text(
        "com endereço na Conjunto Residencial 7, Condomínio 1, SN, Bloco B, Apt 3,",
        false,
    );
    doc.advance(6);
    doc.text(
        format!(
            "Parque das Cachoeiras, {} - GO, CEP 72872-700.",
            CONTRACTOR_CITY
        ),
        false,
    );
    doc.advance(15);

    doc.text("CONTRATANTE:", true);
    doc.advance(8);
    doc.text(
        format!(
            "{}, inscrita no CNPJ sob o nº {},",
            form.client_name, form.client_tax_id
        ),
        false,
    );
    doc.advance(6);
    doc.text(format!("com endereço na {}.", form.client_address), false);
    doc.advance(15);

    doc.text("CLÁUSULA 1 – DO OBJETO E VALORES", true);
    doc.advance(8);
    doc.text(
        "O presente contrato tem por objeto a prestação de serviços de gestão",
        false,
    );
    doc.advance(6);
    doc.text(
        "de tráfego pago em multiplataformas digitais. O valor acordado entre",
        false,
    );
    doc.advance(6);
    doc.text(format!("as partes é de R$ {}.", form.value), false);
    doc.advance(15);

    doc.text("CLÁUSULA 2 – DO PRAZO", true);
    doc.advance(8);
    doc.text(
        "O presente contrato terá duração de 60 (sessenta) dias corridos,",
        false,
    );
    doc.advance(6);
    doc.text(
        format!(
            "com início em {} e término em {}.",
            form.start_date, form.end_date
        ),
        false,
    );
    doc.advance(15);

    doc.text("CLÁUSULA 3 – DO PAGAMENTO", true);
    doc.advance(8);
    doc.text(
        "O pagamento será efetuado por meio de sistema automatizado de cobrança",
        false,
    );
    doc.advance(6);
    doc.text("recorrente via plataforma Asaas.", false);
    doc.advance(15);

    if !form.additional_terms.trim().is_empty() {
        doc.text("TERMOS ADICIONAIS:", true);
        doc.advance(8);
        // One placed line per paragraph line; no wrapping.
        for line in form.additional_terms.trim().lines() {
            doc.text(line, false);
            doc.advance(6);
        }
        doc.advance(9);
    }

    doc.advance(30);
    doc.text(
        format!("{}, {}", CONTRACTOR_CITY, today.format("%d/%m/%Y")),
        false,
    );
    doc.advance(30);
    doc.text("_________________________________", false);
    doc.advance(6);
    doc.text(CONTRACTOR_NAME, false);
    doc.advance(6);
    doc.text(format!("CNPJ: {}", CONTRACTOR_CNPJ), false);
    doc.advance(20);
    doc.text("_________________________________", false);
    doc.advance(6);
    doc.text(form.client_name.clone(), false);
    doc.advance(6);
    doc.text(format!("CNPJ: {}", form.client_tax_id), false);

    doc.finish(contract_filename(&form.client_name, today))
}

/// Stub "send for signature": no real transport behind it.
pub fn signature_notice(client_name: &str) -> String {
    format!(
        "Contrato enviado para {}. Integração com sistema de assinatura digital será implementada.",
        client_name
    )
}
