use crate::errors::{BackupDrError, Result};
use crate::models::{ApplicationItem, SlaItem};
use dialoguer::Select;
use std::io::IsTerminal;

/// Prompts only make sense when a human is attached to stdin.
pub fn stdin_is_interactive() -> bool {
    std::io::stdin().is_terminal()
}

/// Interactive SLA template selection
pub fn pick_template_name(templates: &[SlaItem]) -> Result<String> {
    if templates.is_empty() {
        return Err(BackupDrError::ConfigurationError(
            "No SLA templates visible to this session".to_string(),
        ));
    }

    let labels: Vec<String> = templates
        .iter()
        .map(|template| format!("{} (id: {})", template.name, template.id))
        .collect();

    let selection = Select::new()
        .with_prompt("Select SLA template")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(templates[selection].name.clone())
}

/// Interactive policy selection within one SLA template
pub fn pick_policy_name(policies: &[SlaItem], template_name: &str) -> Result<String> {
    if policies.is_empty() {
        return Err(BackupDrError::ConfigurationError(format!(
            "SLA template '{template_name}' has no policies"
        )));
    }

    let labels: Vec<String> = policies
        .iter()
        .map(|policy| format!("{} (id: {})", policy.name, policy.id))
        .collect();

    let selection = Select::new()
        .with_prompt(format!("Select policy of SLA template '{template_name}'"))
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(policies[selection].name.clone())
}

/// Interactive application selection
pub fn pick_application_name(applications: &[ApplicationItem]) -> Result<String> {
    if applications.is_empty() {
        return Err(BackupDrError::ConfigurationError(
            "No applications visible to this session".to_string(),
        ));
    }

    let labels: Vec<String> = applications
        .iter()
        .map(|app| format!("{} (id: {})", app.name, app.id))
        .collect();

    let selection = Select::new()
        .with_prompt("Select application to back up")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(applications[selection].name.clone())
}
