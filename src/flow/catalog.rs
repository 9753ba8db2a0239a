//! Static catalog of starter flows.

use lazy_static::lazy_static;
use serde::Serialize;
use serde_json::{json, Value};

use super::types::{ContactMapping, FlowMapping, FlowSpec};

/// Read-only catalog entry used to seed a new flow
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub flow_json: Value,
    pub default_mapping: FlowMapping,
}

fn custom_fields(pairs: &[(&str, &str)]) -> std::collections::BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, field)| (key.to_string(), field.to_string()))
        .collect()
}

fn footer(label: &str) -> Value {
    json!({
        "type": "Footer",
        "label": label,
        "on-click-action": { "name": "complete" }
    })
}

fn options(ids: &[&str]) -> Value {
    Value::Array(
        ids.iter()
            .map(|id| json!({ "id": id, "title": id }))
            .collect(),
    )
}

fn single_screen(id: &str, title: &str, children: Vec<Value>) -> Value {
    json!({
        "version": "7.3",
        "screens": [{
            "id": id,
            "title": title,
            "terminal": true,
            "layout": {
                "type": "SingleColumnLayout",
                "children": children
            }
        }]
    })
}

lazy_static! {
    static ref FLOW_TEMPLATES: Vec<FlowTemplate> = vec![
        FlowTemplate {
            key: "lead_cadastro_v1",
            name: "Lead / Cadastro (sem endpoint)",
            description: "Coleta nome, e-mail e interesse. Ideal para capturar lead rápido.",
            flow_json: single_screen(
                "CADASTRO",
                "Cadastro",
                vec![
                    json!({
                        "type": "RichText",
                        "text": "**Vamos te cadastrar rapidinho**\n\nPreencha os dados abaixo:"
                    }),
                    json!({"type": "TextEntry", "name": "lead_name", "label": "Nome", "required": true}),
                    json!({"type": "TextEntry", "name": "lead_email", "label": "E-mail", "required": true}),
                    json!({
                        "type": "Dropdown",
                        "name": "lead_interest",
                        "label": "Qual seu interesse?",
                        "required": false,
                        "options": [
                            {"id": "produto", "title": "Produto"},
                            {"id": "servico", "title": "Serviço"},
                            {"id": "orcamento", "title": "Orçamento"},
                            {"id": "outro", "title": "Outro"}
                        ]
                    }),
                    json!({
                        "type": "OptIn",
                        "name": "lead_optin",
                        "text": "Quero receber mensagens sobre novidades e promoções."
                    }),
                    footer("Enviar"),
                ],
            ),
            default_mapping: FlowMapping {
                version: 1,
                contact: Some(ContactMapping {
                    name_field: Some("lead_name".to_string()),
                    email_field: Some("lead_email".to_string()),
                }),
                custom_fields: custom_fields(&[
                    ("lead_interest", "lead_interest"),
                    ("lead_optin", "lead_optin"),
                ]),
            },
        },
        FlowTemplate {
            key: "agendamento_v1",
            name: "Agendamento (sem endpoint)",
            description: "Coleta serviço, data e horário. Sem validação de agenda ainda.",
            flow_json: single_screen(
                "AGENDAMENTO",
                "Agendamento",
                vec![
                    json!({
                        "type": "BasicText",
                        "text": "Escolha as opções abaixo para solicitar um agendamento."
                    }),
                    json!({
                        "type": "Dropdown",
                        "name": "service",
                        "label": "Serviço",
                        "required": true,
                        "options": [
                            {"id": "consulta", "title": "Consulta"},
                            {"id": "visita", "title": "Visita"},
                            {"id": "suporte", "title": "Suporte"}
                        ]
                    }),
                    json!({"type": "DatePicker", "name": "date", "label": "Data", "required": true}),
                    json!({
                        "type": "Dropdown",
                        "name": "time",
                        "label": "Horário",
                        "required": true,
                        "options": options(&["09:00", "10:00", "11:00", "14:00", "15:00", "16:00"])
                    }),
                    json!({
                        "type": "TextEntry",
                        "name": "notes",
                        "label": "Observações (opcional)",
                        "required": false
                    }),
                    footer("Solicitar agendamento"),
                ],
            ),
            default_mapping: FlowMapping {
                version: 1,
                contact: None,
                custom_fields: custom_fields(&[
                    ("appointment_service", "service"),
                    ("appointment_date", "date"),
                    ("appointment_time", "time"),
                    ("appointment_notes", "notes"),
                ]),
            },
        },
        FlowTemplate {
            key: "pesquisa_nps_v1",
            name: "Pesquisa / NPS (sem endpoint)",
            description: "Coleta score NPS (0-10) e comentário opcional.",
            flow_json: single_screen(
                "NPS",
                "Pesquisa",
                vec![
                    json!({
                        "type": "BasicText",
                        "text": "De 0 a 10, o quanto você recomendaria a gente para um amigo?"
                    }),
                    json!({
                        "type": "ChipsSelector",
                        "name": "nps_score",
                        "label": "Nota",
                        "required": true,
                        "options": options(&["0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10"])
                    }),
                    json!({
                        "type": "TextEntry",
                        "name": "nps_comment",
                        "label": "Quer contar o motivo? (opcional)",
                        "required": false
                    }),
                    footer("Enviar pesquisa"),
                ],
            ),
            default_mapping: FlowMapping {
                version: 1,
                contact: None,
                custom_fields: custom_fields(&[
                    ("nps_score", "nps_score"),
                    ("nps_comment", "nps_comment"),
                ]),
            },
        },
    ];
}

pub fn list_flow_templates() -> &'static [FlowTemplate] {
    &FLOW_TEMPLATES
}

pub fn flow_template(key: &str) -> Option<&'static FlowTemplate> {
    FLOW_TEMPLATES.iter().find(|t| t.key == key)
}

/// Fresh flow seeded from the catalog entry `key`, or `None` for unknown keys.
///
/// The returned spec owns a deep copy of the catalog JSON; editing it never
/// affects the catalog.
pub fn create_from_template(key: &str) -> Option<FlowSpec> {
    let template = flow_template(key)?;
    Some(FlowSpec {
        name: template.name.to_string(),
        meta_flow_id: None,
        spec_json: template.flow_json.clone(),
        default_mapping: Some(template.default_mapping.clone()),
    })
}
