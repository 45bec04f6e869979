//! Human-readable output formatting

use crate::engine::executor::{ExecutionResult, FrozenImage, ResultData};

pub fn format_human(result: &ExecutionResult) -> String {
    let body = match &result.data {
        ResultData::ActionResult(info) => {
            let mut output = String::new();
            for detail in &info.details {
                output.push_str(&format!("  {}\n", detail));
            }
            output.push_str(&format!("{}: {} affected", info.action_type, info.affected_count));
            output
        }
        ResultData::Containers(containers) => {
            if containers.is_empty() {
                String::new()
            } else {
                let name_width = column_width(containers.iter().map(|c| c.name.as_str()), "NAME");
                let id_width = column_width(containers.iter().map(|c| short_id(&c.id)), "ID");
                let mut output = format!("{:<name_width$}  {:<id_width$}  ADDRESS\n", "NAME", "ID");
                for container in containers {
                    output.push_str(&format!(
                        "{:<name_width$}  {:<id_width$}  {}\n",
                        container.name,
                        short_id(&container.id),
                        container.address
                    ));
                }
                output.trim_end().to_string()
            }
        }
        ResultData::Output(outputs) => {
            let mut output = String::new();
            for entry in outputs {
                if let Some(text) = &entry.output {
                    output.push_str(text);
                    if !text.is_empty() && !text.ends_with('\n') {
                        output.push('\n');
                    }
                }
                if let Some(frozen) = &entry.frozen {
                    output.push_str(&frozen_line(frozen));
                    output.push('\n');
                }
            }
            output.trim_end().to_string()
        }
        ResultData::Frozen(images) => images
            .iter()
            .map(frozen_line)
            .collect::<Vec<_>>()
            .join("\n"),
        ResultData::Message(msg) => msg.clone(),
        ResultData::Empty => String::new(),
    };

    match &result.message {
        Some(message) if body.is_empty() => message.clone(),
        Some(message) => format!("{}\n{}", message, body),
        None => body,
    }
}

fn frozen_line(frozen: &FrozenImage) -> String {
    format!(
        "Froze container '{}' into image '{}' ({})",
        frozen.container,
        frozen.image,
        short_id(&frozen.image_id)
    )
}

/// Ids as printed by `docker ps`
fn short_id(id: &str) -> &str {
    let id = id.strip_prefix("sha256:").unwrap_or(id);
    id.get(..12).unwrap_or(id)
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values.map(str::len).chain(std::iter::once(header.len())).max().unwrap_or(0)
}
