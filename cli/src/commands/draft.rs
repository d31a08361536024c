//! Draft commands

use anyhow::Result;
use connecta_forms::ports::DraftStore;
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output;
use crate::DraftCommands;

#[derive(Debug, Serialize, Tabled)]
struct DraftRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

pub fn handle(context: &Context, action: DraftCommands) -> Result<()> {
    let drafts = context.drafts()?;
    match action {
        DraftCommands::Show { flow } => {
            let flow = context.config.forms.flow(flow);
            let Some(draft) = drafts.load(&flow.definition.draft_key)? else {
                println!("No saved draft for {}", flow.kind);
                return Ok(());
            };
            match context.format {
                output::OutputFormat::Table => {
                    println!("Saved {}", draft.saved_at.format("%Y-%m-%d %H:%M UTC"));
                    let rows: Vec<DraftRow> = draft
                        .data
                        .iter()
                        .filter(|(_, value)| !value.is_blank())
                        .map(|(field, value)| DraftRow {
                            field: field.to_string(),
                            value: serde_json::to_string(value).unwrap_or_default(),
                        })
                        .collect();
                    context.format.print_rows(&rows);
                }
                format => format.print(&draft),
            }
        }
        DraftCommands::Clear { flow } => {
            let flow = context.config.forms.flow(flow);
            drafts.clear(&flow.definition.draft_key)?;
            output::success(&format!("Draft for {} cleared", flow.kind));
        }
    }
    Ok(())
}
