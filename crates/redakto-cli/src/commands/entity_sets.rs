use anyhow::Result;
use redakto_engine::AppInfoService;

use super::Context;

pub async fn handle(context: &Context, id: Option<String>, model: Option<String>) -> Result<()> {
    let service = AppInfoService::new(context.registry()?);

    match (id, model) {
        (Some(id), Some(model)) => {
            let details = service.supported_model_details(&id, &model).await?;
            println!("{}", serde_json::to_string_pretty(&details)?);
        }
        (Some(id), None) => {
            let details = service.entity_set_details(&id).await?;
            println!("{}", serde_json::to_string_pretty(&details)?);
        }
        (None, _) => {
            let ids = service.entity_set_ids().await;
            if ids.is_empty() {
                println!("No entity sets in {}", context.catalog_path().display());
                return Ok(());
            }
            for id in ids {
                let details = service.entity_set_details(&id).await?;
                let models: Vec<&str> = details
                    .supported_models
                    .iter()
                    .map(|m| m.model_id.as_str())
                    .collect();
                println!(
                    "{:<16} {:<24} models: {}",
                    id,
                    details.corpus_name.as_deref().unwrap_or("-"),
                    models.join(", ")
                );
            }
        }
    }
    Ok(())
}
