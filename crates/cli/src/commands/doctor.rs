use milesquote_core::config::{AppConfig, DeliveryStrategy, LoadOptions, RecipientMode};
use milesquote_core::RateTable;
use serde::Serialize;

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
            checks.push(check_rate_table(&config));
            checks.push(check_delivery_readiness(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["rate_table", "delivery_readiness"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    // Skipped checks mean simulated delivery, which is a valid deployment.
    let any_failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_rate_table(config: &AppConfig) -> DoctorCheck {
    match RateTable::from_config(&config.rates) {
        Ok(rates) => {
            let airlines = rates.airlines().map(ToString::to_string).collect::<Vec<_>>();
            DoctorCheck {
                name: "rate_table",
                status: CheckStatus::Pass,
                details: format!("{} airlines loaded ({})", airlines.len(), airlines.join(", ")),
            }
        }
        Err(error) => {
            DoctorCheck { name: "rate_table", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn check_delivery_readiness(config: &AppConfig) -> DoctorCheck {
    let name = "delivery_readiness";
    match config.delivery.strategy {
        DeliveryStrategy::Messaging => {
            let messaging = &config.delivery.messaging;
            if !messaging.has_credentials() {
                return DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "messaging credentials absent; lead messages will be simulated"
                        .to_string(),
                };
            }
            if messaging.recipient == RecipientMode::Sales && messaging.default_recipient.is_none()
            {
                return DoctorCheck {
                    name,
                    status: CheckStatus::Fail,
                    details: "recipient = \"sales\" requires delivery.messaging.default_recipient"
                        .to_string(),
                };
            }
            DoctorCheck {
                name,
                status: CheckStatus::Pass,
                details: format!("messaging gateway configured at {}", messaging.api_base_url),
            }
        }
        DeliveryStrategy::Webhook => match &config.delivery.webhook.url {
            Some(_) => DoctorCheck {
                name,
                status: CheckStatus::Pass,
                details: "webhook url configured".to_string(),
            },
            None => DoctorCheck {
                name,
                status: CheckStatus::Skipped,
                details: "webhook url absent; leads will only be logged".to_string(),
            },
        },
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
