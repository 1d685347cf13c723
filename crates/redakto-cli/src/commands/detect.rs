use std::io::Read;

use anyhow::{Context as _, Result, anyhow};
use redakto_core::{DetectEntitiesRequest, FieldError, RedactTextsRequest, RedactionStyle, Validate};
use redakto_engine::PredictionService;

use super::Context;
use crate::cli::DetectArgs;

pub async fn detect(context: &Context, args: DetectArgs) -> Result<()> {
    let request = build_request(args)?;
    let service = PredictionService::new(context.registry()?);

    let response = service.detect_entities(&request).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub async fn redact(
    context: &Context,
    args: DetectArgs,
    style: RedactionStyle,
    placeholder: Option<String>,
    json: bool,
) -> Result<()> {
    let request = RedactTextsRequest {
        detect: build_request(args)?,
        style,
        placeholder,
    };
    let service = PredictionService::new(context.registry()?);
    let response = service.redact_texts(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }
    for item in &response.output {
        println!("{}", item.redacted_text);
        if !item.redactions.is_empty() {
            let summary: Vec<String> = item
                .redactions
                .iter()
                .map(|r| format!("{}={}", r.label, r.count))
                .collect();
            eprintln!("  redacted: {}", summary.join(", "));
        }
    }
    Ok(())
}

fn build_request(args: DetectArgs) -> Result<DetectEntitiesRequest> {
    let input_texts = if let Some(path) = &args.file {
        vec![
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ]
    } else if args.texts.is_empty() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        vec![text]
    } else {
        args.texts
    };

    DetectEntitiesRequest {
        entity_set_id: args.entity_set,
        model_id: args.model,
        fine_grained: args.fine_grained,
        input_texts,
    }
    .validate("args")
    .map_err(|errors| anyhow!(describe(&errors)))
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.loc.last().map(String::as_str).unwrap_or("input"), e.msg))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(texts: &[&str]) -> DetectArgs {
        DetectArgs {
            entity_set: " grascco".into(),
            model: "patterns".into(),
            fine_grained: false,
            file: None,
            texts: texts.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_request_from_texts() {
        let request = build_request(args(&["eins", "zwei"])).unwrap();
        assert_eq!(request.entity_set_id, "grascco");
        assert_eq!(request.input_texts.len(), 2);
    }

    #[test]
    fn test_request_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.txt");
        std::fs::write(&path, "Sehr geehrte Frau Roth,\n\nDanke.").unwrap();

        let mut a = args(&[]);
        a.file = Some(path);
        let request = build_request(a).unwrap();
        assert_eq!(request.input_texts, vec!["Sehr geehrte Frau Roth,\n\nDanke."]);
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let err = build_request(args(&["ok", " "])).unwrap_err();
        assert!(err.to_string().starts_with("input_texts:"));
        assert!(err.to_string().contains("[1]"));
    }
}
