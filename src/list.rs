use crate::client::ApiClient;
use crate::config::Config;
use crate::errors::{BackupDrError, Result};
use serde_json::json;
use tracing::{info, warn};

pub async fn list_templates(config: Config, json_output: bool) -> Result<()> {
    if !json_output {
        info!(api = %config.api_url, "listing SLA templates");
    }

    let session = ApiClient::new(&config).open_session().await?;
    let templates = session.templates().await?;

    if json_output {
        let output = json!({
            "templates": templates.iter().map(|template| json!({
                "id": template.id,
                "name": template.name
            })).collect::<Vec<_>>()
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if templates.is_empty() {
        warn!("No SLA templates visible to this session");
    } else {
        println!("\nAvailable SLA templates:");
        for template in templates {
            println!("  {:<40} (id: {})", template.name, template.id);
        }
    }

    Ok(())
}

/// Lists the policies of one SLA template. The template name resolves the
/// same way the backup path resolves it, including the not-found failure.
pub async fn list_policies(
    config: Config,
    template: Option<String>,
    json_output: bool,
) -> Result<()> {
    let template_name = template
        .or_else(|| config.template_name.clone())
        .ok_or_else(|| {
            BackupDrError::ConfigurationError(
                "missing SLA template name; pass --template or BACKUPDR_TEMPLATE_NAME".to_string(),
            )
        })?;

    if !json_output {
        info!(template = %template_name, "listing SLA template policies");
    }

    let session = ApiClient::new(&config).open_session().await?;
    let template_id = session
        .templates()
        .await?
        .into_iter()
        .find(|candidate| candidate.name == template_name)
        .map(|candidate| candidate.id)
        .ok_or_else(|| BackupDrError::TemplateNotFound(template_name.clone()))?;

    let policies = session.policies(template_id).await?;

    if json_output {
        let output = json!({
            "template": template_name,
            "template_id": template_id,
            "policies": policies.iter().map(|policy| json!({
                "id": policy.id,
                "name": policy.name
            })).collect::<Vec<_>>()
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if policies.is_empty() {
        warn!(template = %template_name, "SLA template has no policies");
    } else {
        println!("\nPolicies of SLA template '{}':", template_name);
        for policy in policies {
            println!("  {:<40} (id: {})", policy.name, policy.id);
        }
    }

    Ok(())
}

pub async fn list_applications(config: Config, json_output: bool) -> Result<()> {
    if !json_output {
        info!(api = %config.api_url, "listing applications");
    }

    let session = ApiClient::new(&config).open_session().await?;
    let applications = session.applications().await?;

    if json_output {
        let output = json!({
            "applications": applications.iter().map(|app| json!({
                "id": app.id,
                "name": app.name
            })).collect::<Vec<_>>()
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if applications.is_empty() {
        warn!("No applications visible to this session");
    } else {
        println!("\nAvailable applications:");
        for app in applications {
            println!("  {:<40} (id: {})", app.name, app.id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method, Mock, MockServer};

    fn test_config(base_url: &str) -> Config {
        Config {
            api_url: base_url.to_string(),
            access_token: "tok-1".to_string(),
            template_name: None,
            policy_name: None,
            app_name: None,
            label: None,
        }
    }

    fn mock_backend<'a>(server: &'a MockServer) -> (Mock<'a>, Mock<'a>) {
        let session = server.mock(|when, then| {
            when.method(Method::POST).path("/session");
            then.status(200).json_body(json!({"id": "S1", "rights": []}));
        });
        let templates = server.mock(|when, then| {
            when.method(Method::GET).path("/slt");
            then.status(200)
                .json_body(json!({"items": [{"id": 7, "name": "bronze"}]}));
        });
        (session, templates)
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_list_policies_scopes_to_the_resolved_template() {
        let server = MockServer::start();
        let _backend = mock_backend(&server);
        let policies = server.mock(|when, then| {
            when.method(Method::GET).path("/slt/7/policy");
            then.status(200)
                .json_body(json!({"items": [{"id": 2, "name": "daily"}]}));
        });

        list_policies(
            test_config(&server.base_url()),
            Some("bronze".to_string()),
            true,
        )
        .await
        .unwrap();

        policies.assert();
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_list_policies_fails_for_unknown_template() {
        let server = MockServer::start();
        let _backend = mock_backend(&server);
        let policies = server.mock(|when, then| {
            when.method(Method::GET).path("/slt/7/policy");
            then.status(200).json_body(json!({"items": []}));
        });

        let err = list_policies(
            test_config(&server.base_url()),
            Some("gold".to_string()),
            false,
        )
        .await
        .unwrap_err();

        // The lookup misses before any policy fetch happens.
        assert_eq!(policies.hits(), 0);
        assert!(matches!(err, BackupDrError::TemplateNotFound(ref name) if name == "gold"));
        assert_eq!(err.to_string(), "Failed to retrieve SLA template 'gold'");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_list_policies_requires_a_template_name() {
        let err = list_policies(test_config("http://127.0.0.1:1"), None, false)
            .await
            .unwrap_err();

        assert!(matches!(err, BackupDrError::ConfigurationError(_)));
        assert!(err.to_string().contains("--template"));
    }
}
