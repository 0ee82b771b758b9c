use anyhow::Result;
use clap::Args;
use colored::Colorize;
use postcraft_schema::{AttributeSpec, MarkSpec, NodeGroup, NodeSpec, Schema};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct TypesArgs {
    /// Print the registry as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TypeSummary {
    name: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'static str>,
    atom: bool,
    draggable: bool,
    attrs: Vec<AttrSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttrSummary {
    name: String,
    markup_name: String,
    default: serde_json::Value,
}

fn attr_summary(spec: &AttributeSpec) -> AttrSummary {
    AttrSummary {
        name: spec.name.clone(),
        markup_name: spec.markup_name(),
        default: serde_json::to_value(&spec.default).unwrap_or(serde_json::Value::Null),
    }
}

fn node_summary(spec: &NodeSpec) -> TypeSummary {
    TypeSummary {
        name: spec.name.clone(),
        kind: "node",
        content: Some(spec.content.as_str()),
        group: Some(match spec.group {
            NodeGroup::Block => "block",
            NodeGroup::Inline => "inline",
        }),
        atom: spec.atom,
        draggable: spec.draggable,
        attrs: spec.attrs.iter().map(attr_summary).collect(),
    }
}

fn mark_summary(spec: &MarkSpec) -> TypeSummary {
    TypeSummary {
        name: spec.name.clone(),
        kind: "mark",
        content: None,
        group: None,
        atom: false,
        draggable: false,
        attrs: spec.attrs.iter().map(attr_summary).collect(),
    }
}

fn summarize(schema: &Schema) -> Vec<TypeSummary> {
    schema
        .node_types()
        .iter()
        .map(node_summary)
        .chain(schema.mark_types().iter().map(mark_summary))
        .collect()
}

pub fn types(args: TypesArgs) -> Result<()> {
    let schema = Schema::standard()?;
    let summaries = summarize(&schema);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for summary in &summaries {
        let mut flags = Vec::new();
        if let Some(group) = summary.group {
            flags.push(group.to_string());
        }
        if summary.atom {
            flags.push("atom".to_string());
        }
        if summary.draggable {
            flags.push("draggable".to_string());
        }

        println!(
            "{} {} {}",
            summary.kind.dimmed(),
            summary.name.bold(),
            flags.join(", ").cyan()
        );
        if let Some(content) = summary.content {
            println!("    content: {}", content);
        }
        for attr in &summary.attrs {
            println!("    {} ({}) = {}", attr.name, attr.markup_name.dimmed(), attr.default);
        }
    }

    Ok(())
}
