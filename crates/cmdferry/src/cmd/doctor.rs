use serde::Serialize;

use crate::cmd::DoctorArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(_args: DoctorArgs, format: OutputFormat) -> CliResult<i32> {
    let checks = vec![
        platform_check(),
        fifo_create_check(),
        pipe_alloc_check(),
        shell_check(),
    ];

    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    let overall = if has_fail { "fail" } else { "pass" };

    let output = DoctorOutput { checks, overall };
    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("cmdferry doctor\n");
            for c in &output.checks {
                println!("  [{:>4}] {:<18} {}", status_text(c.status), c.name, c.detail);
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Skip => "SKIP",
    }
}

fn platform_check() -> CheckResult {
    #[cfg(unix)]
    {
        CheckResult {
            name: "platform".to_string(),
            status: CheckStatus::Pass,
            detail: "named fifos and inherited descriptors available".to_string(),
        }
    }

    #[cfg(not(unix))]
    {
        CheckResult {
            name: "platform".to_string(),
            status: CheckStatus::Fail,
            detail: "fifo-based transfer requires a unix platform".to_string(),
        }
    }
}

fn fifo_create_check() -> CheckResult {
    #[cfg(unix)]
    {
        use cmdferry_channel::LengthFifo;
        let dir = std::env::temp_dir().join(format!(
            "cmdferry-doctor-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        let _ = std::fs::create_dir_all(&dir);
        let result = LengthFifo::create(dir.join("doctor.fifo"));
        let check = match result {
            Ok(_) => CheckResult {
                name: "fifo_create".to_string(),
                status: CheckStatus::Pass,
                detail: "temp dir fifo creation succeeded".to_string(),
            },
            Err(err) => CheckResult {
                name: "fifo_create".to_string(),
                status: CheckStatus::Fail,
                detail: format!("temp dir fifo creation failed: {err}"),
            },
        };
        let _ = std::fs::remove_dir_all(&dir);
        check
    }

    #[cfg(not(unix))]
    {
        CheckResult {
            name: "fifo_create".to_string(),
            status: CheckStatus::Skip,
            detail: "fifo check not implemented on this platform".to_string(),
        }
    }
}

fn pipe_alloc_check() -> CheckResult {
    #[cfg(unix)]
    {
        use cmdferry_channel::BytePipe;
        match BytePipe::create() {
            Ok(_) => CheckResult {
                name: "pipe_alloc".to_string(),
                status: CheckStatus::Pass,
                detail: "anonymous pipe allocation succeeded".to_string(),
            },
            Err(err) => CheckResult {
                name: "pipe_alloc".to_string(),
                status: CheckStatus::Fail,
                detail: format!("anonymous pipe allocation failed: {err}"),
            },
        }
    }

    #[cfg(not(unix))]
    {
        CheckResult {
            name: "pipe_alloc".to_string(),
            status: CheckStatus::Skip,
            detail: "pipe check not implemented on this platform".to_string(),
        }
    }
}

fn shell_check() -> CheckResult {
    match cmdferry_session::execute("exit 0") {
        Ok(status) if status.success() => CheckResult {
            name: "shell".to_string(),
            status: CheckStatus::Pass,
            detail: "sh is invocable".to_string(),
        },
        Ok(status) => CheckResult {
            name: "shell".to_string(),
            status: CheckStatus::Fail,
            detail: format!("sh exited with {:?}", status.code()),
        },
        Err(err) => CheckResult {
            name: "shell".to_string(),
            status: CheckStatus::Fail,
            detail: format!("sh invocation failed: {err}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctor_output_serializes_overall_status() {
        let output = DoctorOutput {
            checks: vec![CheckResult {
                name: "x".to_string(),
                status: CheckStatus::Pass,
                detail: "ok".to_string(),
            }],
            overall: "pass",
        };
        let json = serde_json::to_string(&output).expect("doctor output should serialize");
        assert!(json.contains("\"overall\":\"pass\""));
    }

    #[test]
    fn all_checks_pass_on_a_working_host() {
        let checks = vec![
            platform_check(),
            fifo_create_check(),
            pipe_alloc_check(),
            shell_check(),
        ];
        for check in checks {
            assert!(
                matches!(check.status, CheckStatus::Pass),
                "{} failed: {}",
                check.name,
                check.detail
            );
        }
    }
}
