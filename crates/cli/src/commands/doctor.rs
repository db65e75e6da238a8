use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use serde::Serialize;
use slackline_core::config::{AppConfig, LoadOptions};
use slackline_core::AccessCredential;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            match inspect_credential_file(&config.storage.credential_path) {
                Ok(credential) => {
                    let team = credential.team_name.as_deref().unwrap_or("unknown team");
                    checks.push(DoctorCheck {
                        name: "slack_credential",
                        status: CheckStatus::Pass,
                        details: format!(
                            "access token stored in `{}` for {team}",
                            config.storage.credential_path.display()
                        ),
                    });
                    checks.push(check_notification_destination(&config, &credential));
                }
                Err(error) => {
                    checks.push(DoctorCheck {
                        name: "slack_credential",
                        status: CheckStatus::Fail,
                        details: format!("{error:#}"),
                    });
                    checks.push(DoctorCheck {
                        name: "notification_destination",
                        status: CheckStatus::Skipped,
                        details: "skipped because no Slack credential is stored".to_string(),
                    });
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["slack_credential", "notification_destination"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

/// Unlike the server, which treats an unreadable file as "not connected",
/// the doctor reports why the credential could not be used.
fn inspect_credential_file(path: &Path) -> anyhow::Result<AccessCredential> {
    if !path.exists() {
        bail!(
            "no credential file at `{}`; open the app page and click \"Add to Slack\"",
            path.display()
        );
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read credential file `{}`", path.display()))?;
    let credential = serde_json::from_str::<AccessCredential>(&raw)
        .with_context(|| format!("credential file `{}` is not valid JSON", path.display()))?;

    if !credential.has_token() {
        bail!("credential file `{}` has no access_token", path.display());
    }

    Ok(credential)
}

fn check_notification_destination(
    config: &AppConfig,
    credential: &AccessCredential,
) -> DoctorCheck {
    if let Some(url) = credential.webhook_url() {
        let channel = credential
            .incoming_webhook
            .as_ref()
            .and_then(|webhook| webhook.channel.as_deref())
            .unwrap_or("its configured channel");
        let host = url.split('/').nth(2).unwrap_or("unknown host");
        return DoctorCheck {
            name: "notification_destination",
            status: CheckStatus::Pass,
            details: format!("incoming webhook on {host} posts to {channel}"),
        };
    }

    if let Some(channel) = config.slack.default_channel.as_deref() {
        return DoctorCheck {
            name: "notification_destination",
            status: CheckStatus::Pass,
            details: format!("chat.postMessage to {channel}"),
        };
    }

    DoctorCheck {
        name: "notification_destination",
        status: CheckStatus::Fail,
        details: "credential has no incoming webhook and slack.default_channel is unset"
            .to_string(),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
